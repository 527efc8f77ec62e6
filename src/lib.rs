//! tradelang: structural validator for the trading-strategy expression language.
//!
//! Hexagonal architecture: validation logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], the command-line front end in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
