//! # Lineage Test Suite
//!
//! Cross-crate scenarios that no single subsystem crate can express.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs           # Root pairs, nodes on an in-memory network
//!     ├── universe_scenario.rs  # Genesis → text → reply → duplicate → birth
//!     └── convergence.rs        # Multi-node backfill, gossip, broadcast
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lg-tests
//! cargo test -p lg-tests integration::convergence
//! ```

pub mod integration;
