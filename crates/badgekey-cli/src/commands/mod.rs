//! Subcommand implementations.

pub mod card;
pub mod simulate;
pub mod visitors;
