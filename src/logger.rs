//! This module stores the synchronized facility log sink.

use parking_lot::Mutex;
use std::io::{self, Write};

/// A line-oriented log sink safe for concurrent callers.
///
/// Each message is written and flushed as one line while holding the
/// sink lock, so output from concurrent threads never interleaves
/// mid-message. Write failures are swallowed; logging never brings
/// down the facility.
pub struct Logger {
	/// The output writer, guarded against interleaving
	output: Mutex<Box<dyn Write + Send>>,
}

impl Default for Logger {
	fn default() -> Self {
		Self::new()
	}
}

impl Logger {
	/// Create a new log sink writing to standard output
	pub fn new() -> Self {
		Self::with_writer(Box::new(io::stdout()))
	}

	/// Create a new log sink writing to the given writer
	pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
		Self {
			output: Mutex::new(writer),
		}
	}

	/// Write a single message as one uninterleaved line
	pub fn log(&self, message: &str) {
		// Hold the sink lock for the whole line
		let mut output = self.output.lock();
		// Write the message and terminating newline together
		let _ = writeln!(output, "{message}");
		// Flush so the line is visible immediately
		let _ = output.flush();
	}
}
