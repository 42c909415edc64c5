use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

const RESYNC_INTERVAL: Duration = Duration::from_secs(5);

/// A clock issuing strictly monotonic event stamps.
///
/// Every request lifecycle event (arrival, service start, departure) is
/// stamped through the same clock, so the stamps of any one request are
/// strictly ordered and every stamp is unique across the facility.
pub struct Clock {
	/// The latest stamp issued by this clock
	stamp: AtomicU64,
	/// The reference time when this clock was synced
	reference: ArcSwap<(u64, Instant)>,
}

impl Default for Clock {
	fn default() -> Self {
		Self::new()
	}
}

impl Clock {
	/// Creates a new event stamp clock
	pub fn new() -> Self {
		// Get the current unix time in nanoseconds
		let reference_unix = Self::current_unix_ns();
		// Get a new monotonically increasing clock
		let reference_time = Instant::now();
		// Return the new event stamp clock
		Self {
			stamp: AtomicU64::new(reference_unix),
			reference: ArcSwap::new(Arc::new((reference_unix, reference_time))),
		}
	}

	/// Gets the current system time in nanoseconds since the Unix epoch
	fn current_unix_ns() -> u64 {
		// Get the current system time
		let timestamp = SystemTime::now().duration_since(UNIX_EPOCH);
		// Count the nanoseconds since the Unix epoch
		timestamp.unwrap_or_default().as_nanos() as u64
	}

	/// Gets the current estimated time in nanoseconds since the Unix epoch
	fn current_time_ns(&self) -> u64 {
		// Get the current reference time
		let reference = self.reference.load();
		// Calculate the nanoseconds since the Unix epoch
		reference.0 + reference.1.elapsed().as_nanos() as u64
	}

	/// Resyncs the reference pair against the system clock
	fn resync_reference(&self) {
		// Calculate the duration since last syncing
		let duration = self.reference.load().1.elapsed();
		// Check if we should sync the reference
		if duration > RESYNC_INTERVAL {
			// Get the current unix time in nanoseconds
			let reference_unix = Self::current_unix_ns();
			// Get a new monotonically increasing clock
			let reference_time = Instant::now();
			// Store the timestamp and monotonic instant
			self.reference.store(Arc::new((reference_unix, reference_time)));
		}
	}

	/// Returns a strictly monotonically increasing stamp in nanoseconds
	pub fn next_stamp(&self) -> u64 {
		// Prevent clock drift periodically
		self.resync_reference();
		// Get the current nanoseconds since the Unix epoch
		let mut current = self.current_time_ns();
		// Loop until we reach the next incremental stamp
		loop {
			// Get the last stamp issued by this clock
			let last = self.stamp.load(Ordering::Acquire);
			// Increase the stamp to ensure strict monotonicity
			if current <= last {
				current = last + 1;
			}
			// Try to update the last stamp atomically
			if self
				.stamp
				.compare_exchange(last, current, Ordering::AcqRel, Ordering::Relaxed)
				.is_ok()
			{
				return current;
			}
		}
	}
}

#[cfg(test)]
mod tests {

	use super::*;
	use std::thread;

	#[test]
	fn stamps_strictly_increase() {
		let clock = Clock::new();
		let mut last = clock.next_stamp();
		for _ in 0..10_000 {
			let next = clock.next_stamp();
			assert!(next > last);
			last = next;
		}
	}

	#[test]
	fn stamps_unique_across_threads() {
		// The total number of concurrent threads
		const THREADS: usize = 8;
		// The total stamps to issue per thread
		const STAMPS: usize = 10_000;
		// Create the shared clock
		let clock = Arc::new(Clock::new());
		// Keep the reference to the threads
		let mut handles = Vec::new();
		// Spin up a number of threads
		for _ in 0..THREADS {
			let clock = clock.clone();
			handles.push(thread::spawn(move || {
				let mut stamps = Vec::with_capacity(STAMPS);
				for _ in 0..STAMPS {
					stamps.push(clock.next_stamp());
				}
				stamps
			}));
		}
		// Collect the stamps from all threads
		let mut all = Vec::with_capacity(THREADS * STAMPS);
		for handle in handles {
			all.extend(handle.join().unwrap());
		}
		// Check that every issued stamp is unique
		all.sort_unstable();
		all.dedup();
		assert_eq!(all.len(), THREADS * STAMPS);
	}
}
