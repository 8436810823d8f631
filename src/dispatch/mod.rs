//! Event dispatch

pub mod dispatcher;

pub use dispatcher::{DispatchOutcome, DispatchState, Dispatcher, MANUAL_ACTION};
