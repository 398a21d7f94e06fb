//! swaproute CLI library.
//!
//! Command handlers, output renderers, and terminal styling for the
//! `swaproute` binary.

pub mod commands;
pub mod output;
pub mod terminal;
