//! This module stores the per-bay state projection.

use parking_lot::RwLock;
use smallvec::SmallVec;

/// The projected state of a single service bay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BayState {
	/// The name of the occupying request, if any
	pub occupant: Option<String>,
	/// Service progress from 0 to 100
	pub progress: u8,
}

impl BayState {
	/// Whether this bay is currently occupied
	pub fn occupied(&self) -> bool {
		self.occupant.is_some()
	}
}

/// A read-model of every bay, consumed by a presentation layer.
///
/// The board mirrors state owned by the workers and is never the
/// source of truth for the simulation itself.
pub struct Board {
	/// The projected state of each bay, indexed by bay number
	bays: RwLock<SmallVec<[BayState; 4]>>,
}

impl Board {
	/// Create a new board with the given number of bays
	pub fn new(bays: usize) -> Self {
		Self {
			bays: RwLock::new(SmallVec::from_elem(BayState::default(), bays)),
		}
	}

	/// Mark a bay as occupied by the named request, at zero progress
	pub fn claim(&self, bay: usize, occupant: &str) {
		if let Some(state) = self.bays.write().get_mut(bay) {
			state.occupant = Some(occupant.to_string());
			state.progress = 0;
		}
	}

	/// Advance the progress of a bay.
	///
	/// Progress is clipped at 100 and never decreases while the bay
	/// remains occupied.
	pub fn progress(&self, bay: usize, progress: u8) {
		if let Some(state) = self.bays.write().get_mut(bay) {
			state.progress = state.progress.max(progress.min(100));
		}
	}

	/// Mark a bay as free again
	pub fn release(&self, bay: usize) {
		if let Some(state) = self.bays.write().get_mut(bay) {
			state.occupant = None;
			state.progress = 0;
		}
	}

	/// A snapshot of the state of a single bay
	pub fn bay(&self, bay: usize) -> Option<BayState> {
		self.bays.read().get(bay).cloned()
	}

	/// A snapshot of the state of every bay
	pub fn bays(&self) -> Vec<BayState> {
		self.bays.read().to_vec()
	}

	/// The number of currently occupied bays
	pub fn occupied(&self) -> usize {
		self.bays.read().iter().filter(|b| b.occupied()).count()
	}
}

#[cfg(test)]
mod tests {

	use super::*;

	#[test]
	fn claim_progress_release() {
		let board = Board::new(2);
		assert_eq!(board.occupied(), 0);
		// ----------
		board.claim(0, "Car-1");
		assert_eq!(board.occupied(), 1);
		let state = board.bay(0).unwrap();
		assert_eq!(state.occupant.as_deref(), Some("Car-1"));
		assert_eq!(state.progress, 0);
		// ----------
		board.progress(0, 40);
		assert_eq!(board.bay(0).unwrap().progress, 40);
		// ----------
		board.release(0);
		let state = board.bay(0).unwrap();
		assert_eq!(state.occupant, None);
		assert_eq!(state.progress, 0);
	}

	#[test]
	fn progress_is_clipped_and_monotonic() {
		let board = Board::new(1);
		board.claim(0, "Car-1");
		board.progress(0, 250);
		assert_eq!(board.bay(0).unwrap().progress, 100);
		// A stale lower report never rewinds progress
		board.progress(0, 10);
		assert_eq!(board.bay(0).unwrap().progress, 100);
	}

	#[test]
	fn out_of_range_bays_are_ignored() {
		let board = Board::new(1);
		board.claim(5, "Car-1");
		board.progress(5, 50);
		board.release(5);
		assert_eq!(board.bay(5), None);
		assert_eq!(board.occupied(), 0);
	}
}
