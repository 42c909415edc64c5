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

//! This module stores the core facility coordinator type.

use crate::board::Board;
use crate::clock::Clock;
use crate::err::{Error, FacilityResult};
use crate::events::{EventBuffer, FacilityEvent};
use crate::ledger::{Ledger, ServiceRecord};
use crate::logger::Logger;
use crate::options::{sample_window, FacilityOptions};
use crate::queue::WaitingArea;
use crate::request::Request;
use crate::semaphore::Semaphore;
use crate::stats::{Stats, StatsSnapshot};
use crate::worker;
use crossbeam_queue::ArrayQueue;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// The shared facility state referenced by every thread.
pub(crate) struct Inner {
	/// The configuration for this facility
	pub(crate) options: FacilityOptions,
	/// The aggregator for blocked time and useful work
	pub(crate) stats: Arc<Stats>,
	/// The clock issuing lifecycle event stamps
	pub(crate) clock: Clock,
	/// The bounded waiting area for pending requests
	pub(crate) area: WaitingArea,
	/// The admission semaphore bounding concurrent services
	pub(crate) bays: Semaphore,
	/// The pool of free bay indices for the projection
	pub(crate) bay_pool: ArrayQueue<usize>,
	/// The per-bay state projection
	pub(crate) board: Board,
	/// The buffer of projection events
	pub(crate) events: EventBuffer,
	/// The ledger of completed services
	pub(crate) ledger: Ledger,
	/// The synchronized log sink
	pub(crate) logger: Logger,
	/// Whether the worker threads should keep running
	pub(crate) enabled: AtomicBool,
}

impl Inner {
	/// Write a message to the synchronized log sink
	pub(crate) fn log(&self, message: &str) {
		self.logger.log(message);
	}

	/// Carry one request through its facility lifecycle.
	///
	/// Runs on the request's own thread: records the arrival, enters
	/// the waiting area, blocks on the private completion semaphore,
	/// then records the departure and reports the measured durations.
	pub(crate) fn attend(&self, request: Arc<Request>) -> FacilityResult<ServiceRecord> {
		// Record the arrival of this request
		request.record_arrival(&self.clock);
		self.log(&format!("{} arrived.", request.name()));
		self.events.publish(FacilityEvent::Arrived {
			name: request.name().to_string(),
		});
		// Enter the waiting area, or report the failure
		if let Err(e) = self.area.push(request.clone()) {
			self.log(&format!("{} could not enter waiting area: {e}", request.name()));
			self.events.publish(FacilityEvent::Rejected {
				name: request.name().to_string(),
			});
			return Err(e);
		}
		// Project the new queue contents
		let waiting = self.area.snapshot();
		self.log(&format!("{} entered waiting area (Queue: {})", request.name(), waiting.len()));
		self.events.publish(FacilityEvent::Queued {
			name: request.name().to_string(),
			waiting,
		});
		// Block until the servicing worker signals completion
		self.log(&format!("{} is waiting for service.", request.name()));
		request.await_completion();
		// Record the departure of this request
		request.record_departure(&self.clock);
		// Build the completed service record
		let record = ServiceRecord::from_request(&request);
		self.log(&format!(
			"{} service completed, leaving. (Wait: {}ms, Service: {}ms, Total: {}ms)",
			record.name,
			record.wait().as_millis(),
			record.service().as_millis(),
			record.total().as_millis(),
		));
		self.events.publish(FacilityEvent::Departed {
			name: record.name.clone(),
			wait: record.wait(),
			service: record.service(),
			total: record.total(),
		});
		// Add the record to the completed service ledger
		self.ledger.insert(record.clone());
		// Return the completed record
		Ok(record)
	}
}

/// A multi-threaded service facility simulation.
///
/// The facility owns every shared coordination primitive: the bounded
/// waiting area, the bay admission semaphore, the statistics
/// aggregator, and the state projection consumed by a presentation
/// layer. Requests are produced by their own threads and serviced by a
/// fixed pool of worker threads. Facilities are self-contained, so any
/// number of independent instances can coexist in one process.
pub struct Facility {
	/// The shared facility state
	inner: Arc<Inner>,
	/// Handles to the spawned worker threads
	workers: RwLock<Vec<JoinHandle<()>>>,
}

impl Facility {
	/// Create a new facility with the given options
	pub fn new(options: FacilityOptions) -> FacilityResult<Self> {
		Self::with_logger(options, Logger::new())
	}

	/// Create a new facility logging to the given sink
	pub fn with_logger(options: FacilityOptions, logger: Logger) -> FacilityResult<Self> {
		// Check the configured values before building anything
		options.validate()?;
		// Create the shared statistics aggregator
		let stats = Arc::new(Stats::new());
		// Seed the pool of free bay indices
		let bay_pool = ArrayQueue::new(options.bays);
		for bay in 0..options.bays {
			let _ = bay_pool.push(bay);
		}
		// Create the shared facility state
		let inner = Arc::new(Inner {
			area: WaitingArea::new(options.capacity, options.admission, stats.clone()),
			bays: Semaphore::new(options.bays, stats.clone()),
			bay_pool,
			board: Board::new(options.bays),
			events: EventBuffer::new(options.event_capacity.max(1)),
			ledger: Ledger::new(),
			logger,
			clock: Clock::new(),
			enabled: AtomicBool::new(true),
			stats,
			options,
		});
		// Return the new facility
		Ok(Self {
			inner,
			workers: RwLock::new(Vec::new()),
		})
	}

	/// The configuration of this facility
	pub fn options(&self) -> &FacilityOptions {
		&self.inner.options
	}

	/// The per-bay state projection
	pub fn board(&self) -> &Board {
		&self.inner.board
	}

	/// The buffer of projection events
	pub fn events(&self) -> &EventBuffer {
		&self.inner.events
	}

	/// The ledger of completed services
	pub fn ledger(&self) -> &Ledger {
		&self.inner.ledger
	}

	/// An ordered snapshot of the names of all waiting requests
	pub fn queue_snapshot(&self) -> Vec<String> {
		self.inner.area.snapshot()
	}

	/// Write a message to the synchronized log sink
	pub fn log(&self, message: &str) {
		self.inner.log(message);
	}

	/// Take a read-only snapshot of the statistics counters
	pub fn stats(&self) -> StatsSnapshot {
		self.inner.stats.snapshot()
	}

	/// Start the worker threads, one per configured worker.
	///
	/// Starting an already started or stopped facility is a no-op.
	pub fn start(&self) {
		// Check whether the facility can start workers
		if !self.inner.enabled.load(Ordering::Acquire) {
			return;
		}
		// Lock the worker handle registry
		let mut workers = self.workers.write();
		// Check that the workers are not already running
		if workers.is_empty() {
			// Spawn one worker thread per configured worker
			for id in 1..=self.inner.options.worker_count() {
				let inner = self.inner.clone();
				workers.push(thread::spawn(move || worker::run(inner, id)));
			}
		}
	}

	/// Submit a request to the facility on its own producer thread.
	///
	/// The returned handle joins to the completed service record, or
	/// to the error which prevented the request from being admitted.
	pub fn submit(&self, name: impl Into<String>) -> JoinHandle<FacilityResult<ServiceRecord>> {
		// Create the request with its private completion semaphore
		let request = Arc::new(Request::new(name, self.inner.stats.clone()));
		// Attend the request on its own producer thread
		let inner = self.inner.clone();
		thread::spawn(move || inner.attend(request))
	}

	/// Stop the facility and join every worker thread.
	///
	/// Workers blocked on an empty waiting area are woken with stop
	/// tokens; workers mid-service observe the stop flag within one
	/// progress tick. No bay or mutex permit is ever left held.
	pub fn stop(&self) {
		// Signal the workers to stop, only once
		if !self.inner.enabled.swap(false, Ordering::AcqRel) {
			return;
		}
		// Take the worker handles out of the registry
		let mut workers = std::mem::take(&mut *self.workers.write());
		// Close the waiting area, waking each blocked worker
		self.inner.area.close(workers.len());
		// Join the worker threads
		for handle in workers.drain(..) {
			if handle.join().is_err() {
				tracing::error!("Worker thread panicked");
			}
		}
	}

	/// Run one complete simulation window.
	///
	/// Starts the workers, generates the configured number of arrivals
	/// with random inter-arrival delays, waits for every request to
	/// depart, stops the workers, and returns the final statistics
	/// snapshot.
	pub fn run(&self) -> FacilityResult<StatsSnapshot> {
		// A stopped facility cannot run again
		if !self.inner.enabled.load(Ordering::Acquire) {
			return Err(Error::Stopped);
		}
		// Start the worker threads
		self.start();
		// Keep the reference to the request threads
		let mut requests = Vec::with_capacity(self.inner.options.arrivals);
		// Generate the configured number of arrivals
		let mut rng = rand::rng();
		for id in 1..=self.inner.options.arrivals {
			// Submit the next arriving request
			requests.push(self.submit(format!("Car-{id}")));
			// Pause for a random inter-arrival delay
			thread::sleep(sample_window(
				&mut rng,
				self.inner.options.arrival_min,
				self.inner.options.arrival_max,
			));
		}
		// Wait for every request to depart
		for handle in requests {
			match handle.join() {
				// A rejected request was already logged by its thread
				Ok(_) => (),
				Err(_) => tracing::error!("Request thread panicked"),
			}
		}
		// Stop the worker threads
		self.stop();
		// Return the final statistics snapshot
		Ok(self.inner.stats.snapshot())
	}
}

impl Drop for Facility {
	/// Stops the worker threads when the facility is dropped
	fn drop(&mut self) {
		self.stop();
	}
}

#[cfg(test)]
mod tests {

	use super::*;
	use std::io;
	use std::time::Duration;

	fn quiet(options: FacilityOptions) -> Facility {
		Facility::with_logger(options, Logger::with_writer(Box::new(io::sink()))).unwrap()
	}

	fn fast_options() -> FacilityOptions {
		FacilityOptions::default()
			.with_arrival_window(Duration::ZERO, Duration::from_millis(2))
			.with_service_window(Duration::from_millis(5), Duration::from_millis(10))
			.with_progress_interval(Duration::from_millis(1))
	}

	#[test]
	fn invalid_options_are_rejected() {
		let res = Facility::new(FacilityOptions::new(0, 1));
		assert!(matches!(res, Err(Error::InvalidCapacity(0))));
	}

	#[test]
	fn run_completes_every_request() {
		let facility = quiet(fast_options().with_capacity(3).with_bays(2).with_arrivals(10));
		let snapshot = facility.run().unwrap();
		// Every arrival departed and was recorded in the ledger
		assert_eq!(facility.ledger().len(), 10);
		assert!(facility.queue_snapshot().is_empty());
		// Every bay has been freed
		assert_eq!(facility.board().occupied(), 0);
		// Work was recorded for every completed service
		assert!(snapshot.work_ns > 0);
		assert!(snapshot.wait_count > 0);
	}

	#[test]
	fn run_after_stop_is_refused() {
		let facility = quiet(fast_options().with_arrivals(1));
		facility.stop();
		assert_eq!(facility.run(), Err(Error::Stopped));
	}

	#[test]
	fn submit_after_stop_is_refused() {
		let facility = quiet(fast_options());
		facility.start();
		facility.stop();
		let res = facility.submit("Car-1").join().unwrap();
		assert_eq!(res, Err(Error::Stopped));
	}

	#[test]
	fn independent_facilities_coexist() {
		let a = quiet(fast_options().with_arrivals(3));
		let b = quiet(fast_options().with_arrivals(5));
		a.run().unwrap();
		b.run().unwrap();
		assert_eq!(a.ledger().len(), 3);
		assert_eq!(b.ledger().len(), 5);
	}

	#[test]
	fn departures_report_consistent_durations() {
		let facility = quiet(fast_options().with_arrivals(4));
		facility.run().unwrap();
		for record in facility.ledger().records() {
			// The lifecycle stamps are strictly ordered
			assert!(record.arrival_ns < record.service_start_ns);
			assert!(record.service_start_ns < record.departure_ns);
			// The reported spans partition the total exactly
			assert_eq!(record.total(), record.wait() + record.service());
		}
	}
}
