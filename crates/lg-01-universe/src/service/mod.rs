//! # Service Module
//!
//! `Ledger`, the single admission path shared by inbound handlers and the
//! sync engine, plus genesis helpers.

pub mod genesis;
pub mod ledger;

pub use genesis::*;
pub use ledger::*;
