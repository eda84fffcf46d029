//! Transport adapters.

pub mod memory;
pub mod tcp;

pub use memory::{MemoryDialer, MemoryNetwork};
pub use tcp::{serve_tcp, TcpDialer};
