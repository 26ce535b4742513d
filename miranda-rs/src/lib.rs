//! Library half of the `miranda-rs` command-line tool
//!
//! The binary is a thin wrapper around these modules; they are exposed so
//! the commands can be driven from integration tests.

pub mod cli;
pub mod commands;
pub mod database;
pub mod utils;
