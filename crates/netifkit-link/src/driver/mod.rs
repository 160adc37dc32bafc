//! Driver implementations.
//!
//! Real drivers wrap a vendor SDK; this crate ships the mock used by
//! tests and host-side integration work.

mod mock;

pub use mock::{MockRadioDriver, RadioOp};
