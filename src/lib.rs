//! cypher_builder library - Parameterized Cypher query building
//!
//! Provides parameter allocation, condition and pattern rendering, and the
//! command, configuration and output infrastructure behind the CLI.

pub mod builder;
pub mod cli;
pub mod commands;
pub mod config;
pub mod escape;
pub mod output;
pub mod utils;

#[macro_use]
pub mod test_macros;
