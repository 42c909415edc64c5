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

//! An embedded, multi-threaded, semaphore-based service facility
//! simulation engine.
//!
//! A [`Facility`] models a car wash with a capacity-limited waiting
//! area and a fixed pool of service bays as a classic bounded-buffer
//! problem. Arriving requests queue through three counting semaphores
//! (free slots, occupied slots, and a mutation mutex), workers admit
//! themselves through a bay semaphore, and each request rendezvouses
//! with its worker through a private completion semaphore. Every
//! blocking wait is measured into a shared statistics aggregator, from
//! which an efficiency report is derived at shutdown.

mod board;
mod clock;
mod err;
mod events;
mod facility;
mod ledger;
mod logger;
mod options;
mod queue;
mod request;
mod semaphore;
mod stats;
mod worker;

pub use crate::board::{BayState, Board};
pub use crate::clock::Clock;
pub use crate::err::{Error, FacilityResult};
pub use crate::events::{EventBuffer, FacilityEvent};
pub use crate::facility::Facility;
pub use crate::ledger::{Ledger, ServiceRecord};
pub use crate::logger::Logger;
pub use crate::options::{
	AdmissionPolicy, FacilityOptions, DEFAULT_ARRIVALS, DEFAULT_BAYS, DEFAULT_CAPACITY,
	MAX_CAPACITY, MIN_CAPACITY,
};
pub use crate::queue::WaitingArea;
pub use crate::request::Request;
pub use crate::semaphore::{Permit, Semaphore};
pub use crate::stats::{Stats, StatsSnapshot};
