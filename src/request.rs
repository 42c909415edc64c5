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

//! This module stores the serviced request type.

use crate::clock::Clock;
use crate::semaphore::Semaphore;
use crate::stats::Stats;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A single unit of work passing through the facility.
///
/// A request carries its identity, three set-at-most-once lifecycle
/// stamps, and a private completion semaphore. The originating thread
/// owns the request until it is handed to the waiting area; the worker
/// which claims it is the only party to signal its completion, exactly
/// once.
pub struct Request {
	/// The display name of this request
	name: String,
	/// The private completion rendezvous, signalled exactly once
	serviced: Semaphore,
	/// The stamp at which this request arrived (0 = unset)
	arrival: AtomicU64,
	/// The stamp at which service began (0 = unset)
	service_start: AtomicU64,
	/// The stamp at which this request departed (0 = unset)
	departure: AtomicU64,
}

impl Request {
	/// Create a new request with the given name
	pub fn new(name: impl Into<String>, stats: Arc<Stats>) -> Self {
		Self {
			name: name.into(),
			serviced: Semaphore::new(0, stats),
			arrival: AtomicU64::new(0),
			service_start: AtomicU64::new(0),
			departure: AtomicU64::new(0),
		}
	}

	/// The display name of this request
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Record the arrival stamp, if not already recorded
	pub fn record_arrival(&self, clock: &Clock) {
		Self::record(&self.arrival, clock);
	}

	/// Record the service start stamp, if not already recorded
	pub fn record_service_start(&self, clock: &Clock) {
		Self::record(&self.service_start, clock);
	}

	/// Record the departure stamp, if not already recorded
	pub fn record_departure(&self, clock: &Clock) {
		Self::record(&self.departure, clock);
	}

	/// The arrival stamp in nanoseconds, or 0 if never recorded
	pub fn arrival_ns(&self) -> u64 {
		self.arrival.load(Ordering::Acquire)
	}

	/// The service start stamp in nanoseconds, or 0 if never recorded
	pub fn service_start_ns(&self) -> u64 {
		self.service_start.load(Ordering::Acquire)
	}

	/// The departure stamp in nanoseconds, or 0 if never recorded
	pub fn departure_ns(&self) -> u64 {
		self.departure.load(Ordering::Acquire)
	}

	/// The time spent waiting between arrival and service start.
	///
	/// Collapses to zero if either stamp was never recorded.
	pub fn waiting_time(&self) -> Duration {
		Self::span(self.arrival_ns(), self.service_start_ns())
	}

	/// The time spent in service between service start and departure.
	///
	/// Collapses to zero if either stamp was never recorded.
	pub fn service_time(&self) -> Duration {
		Self::span(self.service_start_ns(), self.departure_ns())
	}

	/// The total time between arrival and departure.
	///
	/// Collapses to zero if either stamp was never recorded.
	pub fn total_time(&self) -> Duration {
		Self::span(self.arrival_ns(), self.departure_ns())
	}

	/// Signal that service of this request has completed.
	///
	/// Called by the one worker which serviced this request, exactly once.
	pub fn complete(&self) {
		self.serviced.release();
	}

	/// Block the calling thread until service of this request completes
	pub fn await_completion(&self) {
		self.serviced.acquire();
	}

	/// Store a stamp into a lifecycle slot, only if it is still unset
	fn record(slot: &AtomicU64, clock: &Clock) {
		let stamp = clock.next_stamp();
		let _ = slot.compare_exchange(0, stamp, Ordering::AcqRel, Ordering::Acquire);
	}

	/// The non-negative span between two stamps, zero if either is unset
	fn span(from: u64, to: u64) -> Duration {
		match (from, to) {
			(0, _) | (_, 0) => Duration::ZERO,
			(from, to) => Duration::from_nanos(to.saturating_sub(from)),
		}
	}
}

#[cfg(test)]
mod tests {

	use super::*;
	use std::thread;

	fn request(name: &str) -> Request {
		Request::new(name, Arc::new(Stats::new()))
	}

	#[test]
	fn unrecorded_stamps_collapse_to_zero() {
		let req = request("Car-1");
		assert_eq!(req.waiting_time(), Duration::ZERO);
		assert_eq!(req.service_time(), Duration::ZERO);
		assert_eq!(req.total_time(), Duration::ZERO);
		// A lone arrival stamp still reports zero durations
		req.record_arrival(&Clock::new());
		assert_eq!(req.waiting_time(), Duration::ZERO);
		assert_eq!(req.total_time(), Duration::ZERO);
	}

	#[test]
	fn stamps_are_recorded_once_and_ordered() {
		let clock = Clock::new();
		let req = request("Car-1");
		// ----------
		req.record_arrival(&clock);
		req.record_service_start(&clock);
		req.record_departure(&clock);
		let arrival = req.arrival_ns();
		let start = req.service_start_ns();
		let departure = req.departure_ns();
		assert!(0 < arrival && arrival < start && start < departure);
		// ----------
		// Re-recording must not overwrite an existing stamp
		req.record_arrival(&clock);
		req.record_service_start(&clock);
		req.record_departure(&clock);
		assert_eq!(req.arrival_ns(), arrival);
		assert_eq!(req.service_start_ns(), start);
		assert_eq!(req.departure_ns(), departure);
	}

	#[test]
	fn durations_are_exact() {
		let clock = Clock::new();
		let req = request("Car-1");
		req.record_arrival(&clock);
		req.record_service_start(&clock);
		req.record_departure(&clock);
		// The reported spans partition the total exactly
		assert_eq!(req.total_time(), req.waiting_time() + req.service_time());
	}

	#[test]
	fn completion_rendezvous() {
		let req = Arc::new(request("Car-1"));
		let req2 = req.clone();
		// The request thread blocks until its worker signals completion
		let handle = thread::spawn(move || {
			req2.await_completion();
		});
		thread::sleep(Duration::from_millis(20));
		req.complete();
		handle.join().unwrap();
	}
}
