// Copyright © SurrealDB Ltd
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! This module stores the facility semaphore locking logic.

use crate::stats::Stats;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A counting semaphore which records its blocked time.
///
/// Every acquire, timed acquire, and try-acquire records the elapsed
/// blocked time and one wait operation into the shared [`Stats`]
/// aggregator, including the zero-wait case. The permit counter never
/// goes negative; every successful acquire is paired with exactly one
/// release from some other execution path.
pub struct Semaphore {
	counter: Mutex<usize>, // Number of available permits
	condvar: Condvar,      // Condition variable for waiting threads
	stats: Arc<Stats>,     // Aggregator for blocked time and wait counts
}

impl Semaphore {
	/// Create a new semaphore with `permits` available
	pub fn new(permits: usize, stats: Arc<Stats>) -> Self {
		Self {
			counter: Mutex::new(permits),
			condvar: Condvar::new(),
			stats,
		}
	}

	/// Acquire a permit (blocking if none are available)
	pub fn acquire(&self) {
		// Note the time at which we began waiting
		let start = Instant::now();
		// Lock the permit counter
		let mut counter = self.counter.lock();
		// Wait until a permit becomes available
		while *counter == 0 {
			self.condvar.wait(&mut counter);
		}
		// Take the permit
		*counter -= 1;
		// Release the counter lock before recording
		drop(counter);
		// Record the blocked time and the operation
		self.record(start);
	}

	/// Acquire a permit, giving up after the specified timeout.
	///
	/// Returns `true` if a permit was obtained, `false` if the timeout
	/// elapsed first. The operation is recorded either way.
	pub fn acquire_timeout(&self, timeout: Duration) -> bool {
		// Note the time at which we began waiting
		let start = Instant::now();
		// Calculate the deadline for this wait
		let deadline = start + timeout;
		// Lock the permit counter
		let mut counter = self.counter.lock();
		// Wait until a permit becomes available or the deadline passes
		while *counter == 0 {
			if self.condvar.wait_until(&mut counter, deadline).timed_out() && *counter == 0 {
				// Release the counter lock before recording
				drop(counter);
				// Record the blocked time and the operation
				self.record(start);
				// No permit was obtained in time
				return false;
			}
		}
		// Take the permit
		*counter -= 1;
		// Release the counter lock before recording
		drop(counter);
		// Record the blocked time and the operation
		self.record(start);
		// The permit was obtained
		true
	}

	/// Acquire a permit without blocking, if one is immediately available
	pub fn try_acquire(&self) -> bool {
		// Lock the permit counter
		let mut counter = self.counter.lock();
		// Take a permit if one is available
		let acquired = match *counter {
			0 => false,
			_ => {
				*counter -= 1;
				true
			}
		};
		// Release the counter lock before recording
		drop(counter);
		// Record the operation with zero blocked time
		self.stats.record_wait();
		// Whether the permit was obtained
		acquired
	}

	/// Acquire a permit held by an RAII guard.
	///
	/// The permit is released when the returned [`Permit`] is dropped,
	/// on every exit path including panics.
	pub fn acquire_permit(&self) -> Permit<'_> {
		self.acquire();
		Permit {
			semaphore: self,
		}
	}

	/// Release a permit, allowing another waiting thread to proceed
	pub fn release(&self) {
		let mut counter = self.counter.lock();
		*counter += 1;
		self.condvar.notify_one(); // Wake up one waiting thread
	}

	/// The number of currently available permits
	pub fn permits(&self) -> usize {
		*self.counter.lock()
	}

	/// Record the blocked time and the operation into the aggregator
	fn record(&self, start: Instant) {
		self.stats.add_wait(start.elapsed());
		self.stats.record_wait();
	}
}

/// An RAII guard for a single semaphore permit.
pub struct Permit<'a> {
	semaphore: &'a Semaphore,
}

impl Drop for Permit<'_> {
	fn drop(&mut self) {
		self.semaphore.release();
	}
}

#[cfg(test)]
mod tests {

	use super::*;
	use std::sync::mpsc::channel;
	use std::thread;

	fn semaphore(permits: usize) -> Arc<Semaphore> {
		Arc::new(Semaphore::new(permits, Arc::new(Stats::new())))
	}

	#[test]
	fn acquire_release_pairing() {
		let s = semaphore(1);
		s.acquire();
		s.release();
		s.acquire();
		s.release();
		assert_eq!(s.permits(), 1);
	}

	#[test]
	fn exhausted_acquire_blocks_until_release() {
		// The initial number of permits
		const PERMITS: usize = 3;
		// Create the shared semaphore
		let s = semaphore(PERMITS);
		// Exhaust every available permit
		for _ in 0..PERMITS {
			s.acquire();
		}
		assert_eq!(s.permits(), 0);
		// ----------
		// The next acquire must block until a release occurs
		let (tx, rx) = channel();
		let s2 = s.clone();
		let handle = thread::spawn(move || {
			s2.acquire();
			tx.send(()).unwrap();
		});
		// The blocked thread must not proceed on its own
		assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
		// ----------
		// A single release wakes exactly one blocked acquirer
		s.release();
		rx.recv_timeout(Duration::from_secs(5)).unwrap();
		handle.join().unwrap();
		// The counter has returned to zero
		assert_eq!(s.permits(), 0);
	}

	#[test]
	fn permit_releases_on_drop() {
		let s = semaphore(1);
		{
			let _permit = s.acquire_permit();
			assert_eq!(s.permits(), 0);
		}
		assert_eq!(s.permits(), 1);
	}

	#[test]
	fn permit_releases_on_panic() {
		let s = semaphore(1);
		let s2 = s.clone();
		// A panicking holder must still release its permit
		let result = thread::spawn(move || {
			let _permit = s2.acquire_permit();
			panic!("holder failed");
		})
		.join();
		assert!(result.is_err());
		assert_eq!(s.permits(), 1);
	}

	#[test]
	fn timed_acquire_times_out() {
		let s = semaphore(0);
		let start = Instant::now();
		assert!(!s.acquire_timeout(Duration::from_millis(50)));
		assert!(start.elapsed() >= Duration::from_millis(50));
	}

	#[test]
	fn timed_acquire_succeeds() {
		let s = semaphore(0);
		let s2 = s.clone();
		let handle = thread::spawn(move || {
			thread::sleep(Duration::from_millis(20));
			s2.release();
		});
		assert!(s.acquire_timeout(Duration::from_secs(5)));
		handle.join().unwrap();
		assert_eq!(s.permits(), 0);
	}

	#[test]
	fn try_acquire_does_not_block() {
		let s = semaphore(1);
		assert!(s.try_acquire());
		assert!(!s.try_acquire());
		s.release();
		assert!(s.try_acquire());
	}

	#[test]
	fn every_acquire_is_counted() {
		let stats = Arc::new(Stats::new());
		let s = Semaphore::new(1, stats.clone());
		// Zero-wait acquires are counted too
		s.acquire();
		// Failed attempts are counted as well
		assert!(!s.try_acquire());
		assert!(!s.acquire_timeout(Duration::from_millis(10)));
		s.release();
		assert!(s.try_acquire());
		// ----------
		let snapshot = stats.snapshot();
		assert_eq!(snapshot.wait_count, 4);
	}
}
