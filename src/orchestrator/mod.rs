//! Application-level orchestration.
//!
//! This module owns the request lifecycle (dispatch, single-flight, shutdown) so the
//! TUI thread never blocks on the network. UI layers talk to it over channels.

mod controller;

pub(crate) use controller::{run_controller, ControllerEvent, UiCommand};
