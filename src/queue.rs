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

//! This module stores the bounded waiting area logic.

use crate::err::{Error, FacilityResult};
use crate::options::AdmissionPolicy;
use crate::request::Request;
use crate::semaphore::Semaphore;
use crate::stats::Stats;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A capacity-limited FIFO waiting area for pending requests.
///
/// Three semaphores implement the bounded-buffer protocol: `empty`
/// holds one permit per free slot, `full` one permit per occupied slot,
/// and the binary `mutex` guards queue mutation. Capacity gates are
/// always acquired before the mutex, and the mutex is always released
/// before the paired capacity signal, so no thread ever sleeps while
/// holding it.
pub struct WaitingArea {
	/// The fixed capacity of the waiting area
	capacity: usize,
	/// How arrivals are admitted when the area is full
	admission: AdmissionPolicy,
	/// Binary semaphore guarding queue mutation
	mutex: Semaphore,
	/// One permit per free waiting slot
	empty: Semaphore,
	/// One permit per occupied waiting slot
	full: Semaphore,
	/// Whether the area has been closed to consumers
	closed: AtomicBool,
	/// The queued requests, in arrival order. This cell is only ever
	/// locked while holding the `mutex` semaphore.
	queue: Mutex<VecDeque<Arc<Request>>>,
}

impl WaitingArea {
	/// Create a new waiting area with the given capacity
	pub fn new(capacity: usize, admission: AdmissionPolicy, stats: Arc<Stats>) -> Self {
		Self {
			capacity,
			admission,
			mutex: Semaphore::new(1, stats.clone()),
			empty: Semaphore::new(capacity, stats.clone()),
			full: Semaphore::new(0, stats),
			closed: AtomicBool::new(false),
			queue: Mutex::new(VecDeque::with_capacity(capacity)),
		}
	}

	/// The fixed capacity of the waiting area
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Add a request to the back of the waiting area.
	///
	/// Blocks while the area is at capacity, unless the admission
	/// policy gives up first, in which case [`Error::FacilityFull`] is
	/// returned and the area is unchanged.
	pub fn push(&self, request: Arc<Request>) -> FacilityResult<()> {
		// Refuse new requests once the area is closed
		if self.closed.load(Ordering::Acquire) {
			return Err(Error::Stopped);
		}
		// Gate on a free waiting slot per the admission policy
		match self.admission {
			AdmissionPolicy::Block => self.empty.acquire(),
			AdmissionPolicy::Timeout(timeout) => {
				if !self.empty.acquire_timeout(timeout) {
					return Err(Error::FacilityFull);
				}
			}
			AdmissionPolicy::Reject => {
				if !self.empty.try_acquire() {
					return Err(Error::FacilityFull);
				}
			}
		}
		// Append to the queue while holding the mutation lock
		{
			let _permit = self.mutex.acquire_permit();
			self.queue.lock().push_back(request);
		}
		// Signal that a queued request is available
		self.full.release();
		// All ok
		Ok(())
	}

	/// Remove the request at the head of the waiting area.
	///
	/// Blocks while the area is empty. Returns `None` if the caller was
	/// woken by a stop token after [`WaitingArea::close`], without
	/// touching the queue. A missing head with the `full` permit held
	/// is a protocol invariant violation.
	pub fn pop(&self) -> FacilityResult<Option<Arc<Request>>> {
		// Wait until a queued request is available
		self.full.acquire();
		// A permit consumed after closing is a stop token
		if self.closed.load(Ordering::Acquire) {
			return Ok(None);
		}
		// Remove the head while holding the mutation lock
		let request = {
			let _permit = self.mutex.acquire_permit();
			self.queue.lock().pop_front()
		};
		// Signal that a waiting slot has freed up
		self.empty.release();
		// The enqueue protocol guarantees a queued request per permit
		request.map(Some).ok_or(Error::QueueCorrupted)
	}

	/// The number of requests currently waiting
	pub fn len(&self) -> usize {
		let _permit = self.mutex.acquire_permit();
		self.queue.lock().len()
	}

	/// Whether the waiting area is currently empty
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// An ordered snapshot of the names of all waiting requests
	pub fn snapshot(&self) -> Vec<String> {
		let _permit = self.mutex.acquire_permit();
		self.queue.lock().iter().map(|r| r.name().to_string()).collect()
	}

	/// Close the area and wake up to `consumers` blocked consumers.
	///
	/// Each released stop token wakes one consumer blocked in
	/// [`WaitingArea::pop`], which then observes the closed flag and
	/// returns `None` instead of dequeuing.
	pub fn close(&self, consumers: usize) {
		// Mark the area as closed before waking anyone
		self.closed.store(true, Ordering::Release);
		// Wake each blocked consumer with a stop token
		for _ in 0..consumers {
			self.full.release();
		}
	}
}
