//! Application-level orchestration.
//!
//! This module owns the command loop that drives the label workflow on behalf
//! of interactive front ends. UI layers send commands and render the events
//! that come back, keeping workflow state out of the presentation code.

mod controller;

pub(crate) use controller::{run_controller, UiCommand};
