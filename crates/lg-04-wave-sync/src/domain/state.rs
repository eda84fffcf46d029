//! # Node State
//!
//! Per-node (not per-connection) progression:
//!
//! ```text
//! Bootstrapping ──roots installed──▶ RootsSynced ──first cycle──▶ SteadyState
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Synchronization phase of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    /// No roots yet; only root discovery runs.
    Bootstrapping,
    /// Roots installed; the first full cycle has not completed.
    RootsSynced,
    /// Gossip, keepalive and backfill run every cycle.
    SteadyState,
}

impl NodeState {
    /// Whether message and peer sync may run.
    pub fn has_roots(self) -> bool {
        !matches!(self, Self::Bootstrapping)
    }

    /// State after roots are installed.
    pub fn on_roots_installed(self) -> Self {
        match self {
            Self::Bootstrapping => Self::RootsSynced,
            other => other,
        }
    }

    /// State after a sync cycle completes.
    pub fn on_cycle_completed(self) -> Self {
        match self {
            Self::RootsSynced => Self::SteadyState,
            other => other,
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bootstrapping => write!(f, "BOOTSTRAPPING"),
            Self::RootsSynced => write!(f, "ROOTS_SYNCED"),
            Self::SteadyState => write!(f, "STEADY_STATE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        let state = NodeState::Bootstrapping;
        assert_eq!(state.on_cycle_completed(), NodeState::Bootstrapping);
        let state = state.on_roots_installed();
        assert_eq!(state, NodeState::RootsSynced);
        assert_eq!(state.on_roots_installed(), NodeState::RootsSynced);
        assert_eq!(state.on_cycle_completed(), NodeState::SteadyState);
        assert!(NodeState::SteadyState.has_roots());
        assert!(!NodeState::Bootstrapping.has_roots());
    }
}
