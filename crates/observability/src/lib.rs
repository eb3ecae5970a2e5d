//! Process-wide logging setup.

pub mod tracing;

pub use crate::tracing::{LogFormat, ParseLogFormatError, init};
