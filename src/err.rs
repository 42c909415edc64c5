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

//! This module stores the facility error types.

use crate::options::{MAX_CAPACITY, MIN_CAPACITY};
use thiserror::Error;

/// A specialised result type for facility operations.
pub type FacilityResult<T> = Result<T, Error>;

/// The errors which can be emitted from a facility.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
	/// The configured waiting area capacity is out of range.
	#[error("Waiting area capacity must be between {MIN_CAPACITY} and {MAX_CAPACITY}, got {0}")]
	InvalidCapacity(usize),

	/// The configured number of service bays is out of range.
	#[error("Service bay count must be greater than 0, got {0}")]
	InvalidBayCount(usize),

	/// The configured number of workers is out of range.
	#[error("Worker count must be greater than 0, got {0}")]
	InvalidWorkerCount(usize),

	/// A configured duration window has a minimum above its maximum.
	#[error("Invalid {name} window: minimum exceeds maximum")]
	InvalidWindow {
		/// The name of the offending duration window.
		name: &'static str,
	},

	/// The waiting area could not admit a request.
	#[error("Waiting area is full")]
	FacilityFull,

	/// The facility has been stopped and accepts no further requests.
	#[error("Facility is stopped")]
	Stopped,

	/// The waiting area signalled a queued request but none was present.
	#[error("Waiting area signalled non-empty but no request was queued")]
	QueueCorrupted,
}
