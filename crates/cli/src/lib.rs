//! `rhino` command-line front end.
//!
//! Parses arguments, loads [`config::CliConfig`] and hands each subcommand
//! to the local or cluster backend.

pub mod cli;
pub mod commands;
pub mod config;
pub mod exit_codes;
