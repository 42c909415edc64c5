//! This module stores the completed service ledger.

use crate::request::Request;
use crossbeam_skiplist::SkipMap;
use std::time::Duration;

/// The durable record of one completed service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
	/// The display name of the serviced request
	pub name: String,
	/// The stamp at which the request arrived
	pub arrival_ns: u64,
	/// The stamp at which service began
	pub service_start_ns: u64,
	/// The stamp at which the request departed
	pub departure_ns: u64,
}

impl ServiceRecord {
	/// Build a record from a completed request
	pub(crate) fn from_request(request: &Request) -> Self {
		Self {
			name: request.name().to_string(),
			arrival_ns: request.arrival_ns(),
			service_start_ns: request.service_start_ns(),
			departure_ns: request.departure_ns(),
		}
	}

	/// The time this request spent waiting for service
	pub fn wait(&self) -> Duration {
		Duration::from_nanos(self.service_start_ns.saturating_sub(self.arrival_ns))
	}

	/// The time this request spent in service
	pub fn service(&self) -> Duration {
		Duration::from_nanos(self.departure_ns.saturating_sub(self.service_start_ns))
	}

	/// The total time this request spent in the facility
	pub fn total(&self) -> Duration {
		Duration::from_nanos(self.departure_ns.saturating_sub(self.arrival_ns))
	}
}

/// A concurrent ledger of every completed service.
///
/// Records are keyed by their departure stamp, which is unique and
/// strictly increasing, so iteration yields records in completion
/// order. Inserts are lock-free and may come from any request thread.
#[derive(Default)]
pub struct Ledger {
	/// The completed records, keyed by departure stamp
	records: SkipMap<u64, ServiceRecord>,
}

impl Ledger {
	/// Create a new empty ledger
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a completed service record
	pub fn insert(&self, record: ServiceRecord) {
		self.records.insert(record.departure_ns, record);
	}

	/// The number of completed services
	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// Whether any services have completed
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Every completed record, in completion order
	pub fn records(&self) -> Vec<ServiceRecord> {
		self.records.iter().map(|entry| entry.value().clone()).collect()
	}

	/// The summed service time across all completed records
	pub fn total_service(&self) -> Duration {
		self.records.iter().map(|entry| entry.value().service()).sum()
	}

	/// The summed waiting time across all completed records
	pub fn total_wait(&self) -> Duration {
		self.records.iter().map(|entry| entry.value().wait()).sum()
	}
}
