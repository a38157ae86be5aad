//! Output handling for check results.

mod console;

pub use console::ConsoleOutput;
