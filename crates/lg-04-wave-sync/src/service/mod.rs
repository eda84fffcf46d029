//! Service layer: the node and its per-peer links.

mod handler;
mod link;
mod node;
mod sync;

#[cfg(test)]
pub(crate) mod fixtures;

pub use link::PeerLink;
pub use node::{IngestReport, Node, PeerCursor};
pub use sync::CycleReport;
