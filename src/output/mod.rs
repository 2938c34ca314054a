//! Output formatters for ranked results.
//!
//! - [`table`]: fixed-width console table for people
//! - [`json`]: JSON for scripting
//!
//! # Example
//!
//! ```
//! use cinerank::output::TableOutput;
//!
//! let output = TableOutput::new(&[], false);
//! output.write_to(std::io::stdout()).unwrap();
//! ```

pub mod json;
pub mod table;

pub use json::JsonOutput;
pub use table::TableOutput;
