//! This module stores the facility projection events.

use crossbeam_queue::ArrayQueue;
use std::time::Duration;

/// A state transition pushed towards the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacilityEvent {
	/// A request has arrived at the facility
	Arrived {
		name: String,
	},
	/// A request has entered the waiting area
	Queued {
		name: String,
		waiting: Vec<String>,
	},
	/// A request could not be admitted to the waiting area
	Rejected {
		name: String,
	},
	/// A bay has started servicing a request
	ServiceStarted {
		bay: usize,
		name: String,
	},
	/// A bay has advanced its service progress
	ServiceProgress {
		bay: usize,
		progress: u8,
	},
	/// A bay has finished servicing a request
	ServiceFinished {
		bay: usize,
		name: String,
	},
	/// A bay is free again
	BayFreed {
		bay: usize,
	},
	/// A request has departed the facility
	Departed {
		name: String,
		wait: Duration,
		service: Duration,
		total: Duration,
	},
}

/// A bounded, lossy buffer of projection events.
///
/// The buffer is never required for correctness of the simulation, so
/// publishing drops the event when no consumer has kept pace and the
/// buffer is full.
pub struct EventBuffer {
	/// A queue for storing the published events
	buffer: ArrayQueue<FacilityEvent>,
}

impl EventBuffer {
	/// Creates a new event buffer with the given capacity
	pub fn new(capacity: usize) -> Self {
		Self {
			buffer: ArrayQueue::new(capacity),
		}
	}

	/// Publish an event, dropping it if the buffer is full
	pub fn publish(&self, event: FacilityEvent) {
		let _ = self.buffer.push(event);
	}

	/// Take the oldest buffered event, if any
	pub fn pop(&self) -> Option<FacilityEvent> {
		self.buffer.pop()
	}

	/// Drain every buffered event, oldest first
	pub fn drain(&self) -> Vec<FacilityEvent> {
		let mut events = Vec::with_capacity(self.buffer.len());
		while let Some(event) = self.buffer.pop() {
			events.push(event);
		}
		events
	}

	/// The number of currently buffered events
	pub fn len(&self) -> usize {
		self.buffer.len()
	}

	/// Whether the buffer is currently empty
	pub fn is_empty(&self) -> bool {
		self.buffer.is_empty()
	}
}

#[cfg(test)]
mod tests {

	use super::*;

	#[test]
	fn drain_preserves_publish_order() {
		let buffer = EventBuffer::new(8);
		buffer.publish(FacilityEvent::Arrived {
			name: "Car-1".into(),
		});
		buffer.publish(FacilityEvent::BayFreed {
			bay: 0,
		});
		let events = buffer.drain();
		assert_eq!(events.len(), 2);
		assert!(matches!(events[0], FacilityEvent::Arrived { .. }));
		assert!(matches!(events[1], FacilityEvent::BayFreed { .. }));
		assert!(buffer.is_empty());
	}

	#[test]
	fn publishing_to_a_full_buffer_is_lossy() {
		let buffer = EventBuffer::new(2);
		for bay in 0..5 {
			buffer.publish(FacilityEvent::BayFreed {
				bay,
			});
		}
		// The oldest two events survive, the rest were dropped
		let events = buffer.drain();
		assert_eq!(
			events,
			vec![
				FacilityEvent::BayFreed {
					bay: 0
				},
				FacilityEvent::BayFreed {
					bay: 1
				},
			]
		);
	}
}
