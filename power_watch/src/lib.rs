// THEORY:
// This file is the entry point for the `power_watch` library crate. The public
// API is the `PowerWatch` session in `pipeline` together with its `MeterConfig`
// and the `TickReport` it produces per frame. The stages behind it live in
// `core_modules` and stay usable on their own for testing and tooling.
//
// The crate does no I/O. Frame capture, display and timekeeping belong to the
// caller; `clock` offers the two clocks a caller usually needs.

pub mod clock;
pub mod config;
pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use config::{MeterConfig, ZoneLayout};
pub use error::{PowerWatchError, Result};
pub use pipeline::{Frame, PowerReading, PowerWatch, RevolutionEvent, RevolutionState, TickReport};
