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

//! This module stores the facility statistics aggregator.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Process-wide counters for blocked time and useful work.
///
/// All counters are monotonically increasing and updated via atomic
/// fetch-add, so any number of threads may record into the same
/// aggregator without additional locking. Totals are read as a
/// [`StatsSnapshot`] once all facility activity has quiesced.
#[derive(Debug, Default)]
pub struct Stats {
	/// Total nanoseconds spent blocked on semaphore acquires
	wait_ns: AtomicU64,
	/// Total nanoseconds spent performing service work
	work_ns: AtomicU64,
	/// Total number of semaphore acquire operations
	wait_count: AtomicU64,
}

impl Stats {
	/// Create a new empty statistics aggregator
	pub fn new() -> Self {
		Self::default()
	}

	/// Record time spent blocked waiting for a permit
	pub fn add_wait(&self, duration: Duration) {
		self.wait_ns.fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
	}

	/// Record time spent performing useful service work
	pub fn add_work(&self, duration: Duration) {
		self.work_ns.fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
	}

	/// Record a single semaphore acquire operation
	pub fn record_wait(&self) {
		self.wait_count.fetch_add(1, Ordering::Relaxed);
	}

	/// Take a read-only snapshot of the current counters
	pub fn snapshot(&self) -> StatsSnapshot {
		StatsSnapshot {
			wait_ns: self.wait_ns.load(Ordering::Relaxed),
			work_ns: self.work_ns.load(Ordering::Relaxed),
			wait_count: self.wait_count.load(Ordering::Relaxed),
		}
	}
}

/// A point-in-time copy of the statistics counters.
///
/// Derived metrics are pure functions of the snapshot and carry no
/// invariants beyond their inputs being non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
	/// Total nanoseconds spent blocked on semaphore acquires
	pub wait_ns: u64,
	/// Total nanoseconds spent performing service work
	pub work_ns: u64,
	/// Total number of semaphore acquire operations
	pub wait_count: u64,
}

impl StatsSnapshot {
	/// The total accounted time, blocked plus working
	pub fn total_ns(&self) -> u64 {
		self.wait_ns + self.work_ns
	}

	/// The fraction of accounted time spent performing work
	pub fn work_ratio(&self) -> f64 {
		match self.total_ns() {
			0 => 0.0,
			total => self.work_ns as f64 / total as f64,
		}
	}

	/// The fraction of accounted time spent blocked
	pub fn wait_ratio(&self) -> f64 {
		match self.total_ns() {
			0 => 0.0,
			total => self.wait_ns as f64 / total as f64,
		}
	}

	/// The average blocked time per acquire operation
	pub fn average_wait(&self) -> Duration {
		match self.wait_count {
			0 => Duration::ZERO,
			count => Duration::from_nanos(self.wait_ns / count),
		}
	}
}

impl fmt::Display for StatsSnapshot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		// Convert the accumulated nanosecond totals to milliseconds
		let wait_ms = self.wait_ns as f64 / 1_000_000.0;
		let work_ms = self.work_ns as f64 / 1_000_000.0;
		let total_ms = wait_ms + work_ms;
		// Render the efficiency analysis report
		writeln!(f, "{}", "=".repeat(80))?;
		writeln!(f, "COMPUTATIONAL EFFICIENCY ANALYSIS")?;
		writeln!(f, "{}", "=".repeat(80))?;
		writeln!(f, "Total time spent waiting on semaphores: {wait_ms:.2} ms")?;
		writeln!(f, "Total time spent doing actual work: {work_ms:.2} ms")?;
		writeln!(f, "Total accounted time: {total_ms:.2} ms")?;
		writeln!(f, "Number of semaphore wait operations: {}", self.wait_count)?;
		// Only report per-operation averages when operations occurred
		if self.wait_count > 0 {
			let avg_ms = self.average_wait().as_nanos() as f64 / 1_000_000.0;
			writeln!(f, "Average wait time per semaphore operation: {avg_ms:.3} ms")?;
		}
		// Only report the time distribution when time was accounted
		if self.total_ns() > 0 {
			writeln!(f)?;
			writeln!(f, "Time Distribution:")?;
			writeln!(f, "  Work time: {:.2}%", self.work_ratio() * 100.0)?;
			writeln!(f, "  Wait time: {:.2}%", self.wait_ratio() * 100.0)?;
			writeln!(f, "  Efficiency ratio: {:.4}", self.work_ratio())?;
		}
		write!(f, "{}", "=".repeat(80))
	}
}
