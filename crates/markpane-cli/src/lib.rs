//! Library side of the `mdp` binary, split out for testing.

pub mod cli;
pub mod commands;
