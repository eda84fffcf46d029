//! Cross-subsystem scenarios.

pub mod fixtures;

#[cfg(test)]
mod convergence;
#[cfg(test)]
mod universe_scenario;
