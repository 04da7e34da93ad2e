//! lif8 CLI crate
//!
//! Purpose:
//! - Provide a command-line front end to the `lif8-core` neuron model.
//!
//! Major commands (see [commands]):
//! - run: simulate from constant-drive flags or a TOML experiment, print the
//!   cycle table, write a JSON or bincode trace.
//! - verify: replay a trace file (or the built-in reference scenario) and fail
//!   at the first diverging cycle.
//! - sweep: firing profile for every constant input current.
//! - inspect: summary of a trace file.
//!
//! Notes:
//! - The binary (src/main.rs) wires up logging and argument parsing, then
//!   calls `Lif8Cli::execute()`.
//! - Core crate logging goes through the `log` facade and is picked up by the
//!   tracing subscriber.

pub mod commands;
pub mod config;
pub mod error;

pub use commands::Lif8Cli;
