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

use std::io::{self, Write};
use std::process::ExitCode;
use washbay::{Facility, FacilityOptions, DEFAULT_BAYS, DEFAULT_CAPACITY, MAX_CAPACITY, MIN_CAPACITY};

fn main() -> ExitCode {
	// Initialise the diagnostic log subscriber
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_target(false)
		.init();
	// Collect the facility configuration from the console
	let capacity = prompt_capacity();
	let bays = prompt_bays();
	// Announce the configured simulation
	println!();
	println!("--- Car Wash Simulation Starting ---");
	println!("Waiting Area: {capacity}");
	println!("Service Bays: {bays}");
	println!("------------------------------------");
	println!();
	// Create the facility with the configured options
	let facility = match Facility::new(FacilityOptions::new(capacity, bays)) {
		Ok(facility) => facility,
		Err(e) => {
			eprintln!("{e}");
			return ExitCode::FAILURE;
		}
	};
	// Run one complete simulation window
	match facility.run() {
		Ok(snapshot) => {
			// Print the efficiency analysis report
			println!();
			println!("{snapshot}");
			ExitCode::SUCCESS
		}
		Err(e) => {
			eprintln!("Simulation failed: {e}");
			ExitCode::FAILURE
		}
	}
}

/// Prompt for the waiting area capacity, re-prompting until valid
fn prompt_capacity() -> usize {
	loop {
		match read_value("Enter Waiting area capacity (1-10): ", DEFAULT_CAPACITY) {
			Some(value) if (MIN_CAPACITY..=MAX_CAPACITY).contains(&value) => return value,
			Some(_) => {
				println!("Invalid capacity. Value must be between {MIN_CAPACITY} and {MAX_CAPACITY}.")
			}
			None => println!("Invalid input. Please enter a whole number."),
		}
	}
}

/// Prompt for the number of service bays, re-prompting until valid
fn prompt_bays() -> usize {
	loop {
		match read_value("Enter Number of service bays (pumps): ", DEFAULT_BAYS) {
			Some(value) if value > 0 => return value,
			Some(_) => println!("Invalid pump count. Value must be positive (greater than 0)."),
			None => println!("Invalid input. Please enter a whole number."),
		}
	}
}

/// Read one whole number from the console.
///
/// Returns `None` for unparseable input. End of input falls back to
/// the given default so a closed stdin never spins the prompt loop.
fn read_value(label: &str, default: usize) -> Option<usize> {
	// Show the prompt before reading
	print!("{label}");
	let _ = io::stdout().flush();
	// Read a single line of input
	let mut line = String::new();
	match io::stdin().read_line(&mut line) {
		// End of input, fall back to the default
		Ok(0) | Err(_) => {
			println!("{default}");
			Some(default)
		}
		// Parse the entered number
		Ok(_) => line.trim().parse::<usize>().ok(),
	}
}
