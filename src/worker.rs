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

//! This module stores the service worker loop.

use crate::events::FacilityEvent;
use crate::facility::Inner;
use crate::options::sample_window;
use crate::request::Request;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// The main loop of one service worker (pump).
///
/// Each iteration dequeues the next waiting request, acquires a bay,
/// simulates its service while reporting progress, signals the
/// request's private completion semaphore, and frees the bay. The loop
/// runs until the facility is stopped; a worker never restarts.
pub(crate) fn run(inner: Arc<Inner>, id: usize) {
	inner.log(&format!("Pump {id} is operational."));
	loop {
		// Take the next request from the waiting area
		let request = match inner.area.pop() {
			Ok(Some(request)) => request,
			// A stop token woke us, exit the loop permanently
			Ok(None) => {
				inner.log(&format!("Pump {id} stopped."));
				break;
			}
			// A protocol invariant violation, never a silent skip
			Err(e) => {
				tracing::error!("Pump {id} dequeue failed: {e}");
				inner.log(&format!("Pump {id} halted: {e}"));
				break;
			}
		};
		// Request permission to use a service bay
		let _bay = inner.bays.acquire_permit();
		// A stop observed here abandons the request unserviced
		if !inner.enabled.load(Ordering::Acquire) {
			inner.log(&format!("Pump {id} interrupted before servicing {}.", request.name()));
			break;
		}
		// Take a free bay index for the projection
		let Some(bay) = inner.bay_pool.pop() else {
			// The admission semaphore bounds holders to the pool size
			tracing::error!("Pump {id} admitted with no free bay index");
			break;
		};
		// Service the request in the claimed bay
		let completed = service(&inner, id, bay, &request);
		// Return the bay index before releasing the admission permit
		let _ = inner.bay_pool.push(bay);
		// A stop observed mid-service terminates the worker
		if !completed {
			break;
		}
	}
}

/// Simulate the service of one request in the claimed bay.
///
/// Returns `false` if a stop was observed mid-service, in which case
/// the request is abandoned without its completion being signalled.
fn service(inner: &Arc<Inner>, id: usize, bay: usize, request: &Arc<Request>) -> bool {
	// Record the time at which service began
	request.record_service_start(&inner.clock);
	inner.log(&format!("Pump {id}: {} begins service.", request.name()));
	// Project the claimed bay
	inner.board.claim(bay, request.name());
	inner.events.publish(FacilityEvent::ServiceStarted {
		bay,
		name: request.name().to_string(),
	});
	// Choose a bounded service duration for this request
	let duration = sample_window(&mut rand::rng(), inner.options.service_min, inner.options.service_max);
	// Note the time at which the simulated service started
	let started = Instant::now();
	// Simulate the service, reporting progress at a fixed cadence
	loop {
		let elapsed = started.elapsed();
		if elapsed >= duration {
			break;
		}
		// A stop observed mid-service unwinds without signalling
		if !inner.enabled.load(Ordering::Acquire) {
			inner.log(&format!("Pump {id} interrupted while servicing {}.", request.name()));
			inner.board.release(bay);
			inner.events.publish(FacilityEvent::BayFreed {
				bay,
			});
			return false;
		}
		// Report monotonically non-decreasing progress, clipped at 100
		let progress = ((elapsed.as_nanos() * 100) / duration.as_nanos().max(1)).min(100) as u8;
		inner.board.progress(bay, progress);
		inner.events.publish(FacilityEvent::ServiceProgress {
			bay,
			progress,
		});
		// Sleep one progress tick, but never past the end of service
		thread::sleep(inner.options.progress_interval.min(duration - elapsed));
	}
	// The service has run to completion
	inner.board.progress(bay, 100);
	inner.events.publish(FacilityEvent::ServiceProgress {
		bay,
		progress: 100,
	});
	inner.log(&format!("Pump {id}: {} finishes service.", request.name()));
	inner.events.publish(FacilityEvent::ServiceFinished {
		bay,
		name: request.name().to_string(),
	});
	// Record the service time as useful work
	inner.stats.add_work(started.elapsed());
	// Signal the request's private completion semaphore, exactly once
	request.complete();
	// Free the bay for the next request
	inner.log(&format!("Pump {id}: Bay is now free."));
	inner.board.release(bay);
	inner.events.publish(FacilityEvent::BayFreed {
		bay,
	});
	true
}
