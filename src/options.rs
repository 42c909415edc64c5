use crate::err::{Error, FacilityResult};
use rand::Rng;
use std::time::Duration;

/// Minimum accepted waiting area capacity.
pub const MIN_CAPACITY: usize = 1;

/// Maximum accepted waiting area capacity.
pub const MAX_CAPACITY: usize = 10;

/// Default waiting area capacity.
pub const DEFAULT_CAPACITY: usize = 5;

/// Default number of service bays.
pub const DEFAULT_BAYS: usize = 3;

/// Default number of simulated arrivals in a run.
pub const DEFAULT_ARRIVALS: usize = 20;

/// Default maximum number of buffered projection events.
pub const DEFAULT_EVENT_CAPACITY: usize = 512;

/// Default interval at which service progress is reported.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// How an arriving request is admitted when the waiting area is full.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionPolicy {
	/// Block until a waiting slot frees up
	#[default]
	Block,
	/// Block for at most the given duration, then reject
	Timeout(Duration),
	/// Reject immediately without blocking
	Reject,
}

/// Configuration options for [`Facility`](crate::Facility).
#[derive(Debug, Clone)]
pub struct FacilityOptions {
	/// Maximum number of requests in the waiting area.
	pub capacity: usize,
	/// Number of service bays.
	pub bays: usize,
	/// Number of worker threads, defaulting to one per bay.
	pub workers: Option<usize>,
	/// Number of simulated arrivals generated by a run.
	pub arrivals: usize,
	/// Minimum delay between simulated arrivals.
	pub arrival_min: Duration,
	/// Maximum delay between simulated arrivals.
	pub arrival_max: Duration,
	/// Minimum simulated service duration.
	pub service_min: Duration,
	/// Maximum simulated service duration.
	pub service_max: Duration,
	/// Interval at which service progress is reported.
	pub progress_interval: Duration,
	/// How arrivals are admitted when the waiting area is full.
	pub admission: AdmissionPolicy,
	/// Maximum number of buffered projection events.
	pub event_capacity: usize,
}

impl Default for FacilityOptions {
	fn default() -> Self {
		Self {
			capacity: DEFAULT_CAPACITY,
			bays: DEFAULT_BAYS,
			workers: None,
			arrivals: DEFAULT_ARRIVALS,
			arrival_min: Duration::from_millis(500),
			arrival_max: Duration::from_millis(1500),
			service_min: Duration::from_millis(1000),
			service_max: Duration::from_millis(3000),
			progress_interval: DEFAULT_PROGRESS_INTERVAL,
			admission: AdmissionPolicy::default(),
			event_capacity: DEFAULT_EVENT_CAPACITY,
		}
	}
}

impl FacilityOptions {
	/// Create new facility options with the given capacity and bay count
	pub fn new(capacity: usize, bays: usize) -> Self {
		Self {
			capacity,
			bays,
			..Self::default()
		}
	}

	/// Set the waiting area capacity
	pub fn with_capacity(mut self, capacity: usize) -> Self {
		self.capacity = capacity;
		self
	}

	/// Set the number of service bays
	pub fn with_bays(mut self, bays: usize) -> Self {
		self.bays = bays;
		self
	}

	/// Set the number of worker threads
	pub fn with_workers(mut self, workers: usize) -> Self {
		self.workers = Some(workers);
		self
	}

	/// Set the number of simulated arrivals generated by a run
	pub fn with_arrivals(mut self, arrivals: usize) -> Self {
		self.arrivals = arrivals;
		self
	}

	/// Set the delay window between simulated arrivals
	pub fn with_arrival_window(mut self, min: Duration, max: Duration) -> Self {
		self.arrival_min = min;
		self.arrival_max = max;
		self
	}

	/// Set the simulated service duration window
	pub fn with_service_window(mut self, min: Duration, max: Duration) -> Self {
		self.service_min = min;
		self.service_max = max;
		self
	}

	/// Set the interval at which service progress is reported
	pub fn with_progress_interval(mut self, interval: Duration) -> Self {
		self.progress_interval = interval;
		self
	}

	/// Set the admission policy for a full waiting area
	pub fn with_admission(mut self, admission: AdmissionPolicy) -> Self {
		self.admission = admission;
		self
	}

	/// The effective number of worker threads
	pub fn worker_count(&self) -> usize {
		self.workers.unwrap_or(self.bays)
	}

	/// Check that every configured value is within its accepted range
	pub fn validate(&self) -> FacilityResult<()> {
		// Check the waiting area capacity bounds
		if self.capacity < MIN_CAPACITY || self.capacity > MAX_CAPACITY {
			return Err(Error::InvalidCapacity(self.capacity));
		}
		// Check the service bay count
		if self.bays == 0 {
			return Err(Error::InvalidBayCount(self.bays));
		}
		// Check the worker count if explicitly configured
		if self.worker_count() == 0 {
			return Err(Error::InvalidWorkerCount(self.worker_count()));
		}
		// Check the arrival delay window
		if self.arrival_min > self.arrival_max {
			return Err(Error::InvalidWindow {
				name: "arrival",
			});
		}
		// Check the service duration window
		if self.service_min > self.service_max {
			return Err(Error::InvalidWindow {
				name: "service",
			});
		}
		// All ok
		Ok(())
	}
}

/// Sample a duration uniformly from the given window, at millisecond
/// granularity
pub(crate) fn sample_window(rng: &mut impl Rng, min: Duration, max: Duration) -> Duration {
	// A degenerate window always yields its minimum
	if min >= max {
		return min;
	}
	// Sample uniformly between the window bounds
	let millis = rng.random_range(min.as_millis() as u64..=max.as_millis() as u64);
	Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {

	use super::*;

	#[test]
	fn default_options_are_valid() {
		assert!(FacilityOptions::default().validate().is_ok());
	}

	#[test]
	fn capacity_bounds_are_enforced() {
		let res = FacilityOptions::new(0, 1).validate();
		assert_eq!(res, Err(Error::InvalidCapacity(0)));
		let res = FacilityOptions::new(MAX_CAPACITY + 1, 1).validate();
		assert_eq!(res, Err(Error::InvalidCapacity(MAX_CAPACITY + 1)));
		let res = FacilityOptions::new(MAX_CAPACITY, 1).validate();
		assert!(res.is_ok());
	}

	#[test]
	fn bay_count_must_be_positive() {
		let res = FacilityOptions::new(1, 0).validate();
		assert_eq!(res, Err(Error::InvalidBayCount(0)));
	}

	#[test]
	fn worker_count_defaults_to_bays() {
		let opts = FacilityOptions::new(2, 4);
		assert_eq!(opts.worker_count(), 4);
		let opts = opts.with_workers(2);
		assert_eq!(opts.worker_count(), 2);
		let res = FacilityOptions::new(2, 4).with_workers(0).validate();
		assert_eq!(res, Err(Error::InvalidWorkerCount(0)));
	}

	#[test]
	fn sampled_durations_stay_in_window() {
		let mut rng = rand::rng();
		let min = Duration::from_millis(10);
		let max = Duration::from_millis(30);
		for _ in 0..1000 {
			let sampled = sample_window(&mut rng, min, max);
			assert!(sampled >= min && sampled <= max);
		}
		// A degenerate window is deterministic
		assert_eq!(sample_window(&mut rng, max, max), max);
		assert_eq!(sample_window(&mut rng, max, min), max);
	}

	#[test]
	fn inverted_windows_are_rejected() {
		let res = FacilityOptions::default()
			.with_service_window(Duration::from_millis(10), Duration::from_millis(5))
			.validate();
		assert_eq!(
			res,
			Err(Error::InvalidWindow {
				name: "service",
			})
		);
		let res = FacilityOptions::default()
			.with_arrival_window(Duration::from_millis(10), Duration::from_millis(5))
			.validate();
		assert_eq!(
			res,
			Err(Error::InvalidWindow {
				name: "arrival",
			})
		);
	}
}
