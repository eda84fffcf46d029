//! # Domain Module
//!
//! Commands, envelopes and typed waves.

pub mod command;
pub mod errors;
pub mod wave;

pub use command::*;
pub use errors::*;
pub use wave::*;
