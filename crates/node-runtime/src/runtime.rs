//! # Node Runtime
//!
//! Owns the listener and the background tasks of one node.
//!
//! ## Startup Sequence
//!
//! 1. Bind the TCP listener (the bound port is what gets gossiped)
//! 2. Seed the peer directory from the bootstrap list
//! 3. Install the genesis pair when configured to create it
//! 4. Spawn the accept loop and the sync ticker
//! 5. Run until shutdown is signalled

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use lg_01_universe::Ledger;
use lg_03_peer_directory::PeerDirectory;
use lg_04_wave_sync::{serve_tcp, Node, TcpDialer};
use parking_lot::Mutex;
use shared_crypto::SchemeRegistry;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

use crate::config::NodeConfig;
use crate::genesis::build_root_pair;

/// One running node.
pub struct NodeRuntime {
    config: NodeConfig,
    node: Arc<Node>,
    local_addr: SocketAddr,
    listener: Mutex<Option<TcpListener>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl NodeRuntime {
    /// Bind the listener and assemble the node.
    pub async fn bind(config: NodeConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.network.listen_addr)
            .await
            .with_context(|| format!("Failed to bind {}", config.network.listen_addr))?;
        let local_addr = listener.local_addr().context("Listener has no local address")?;

        let registry = Arc::new(SchemeRegistry::with_defaults());
        let ledger = Arc::new(Ledger::in_memory(registry, config.universe.clone()));

        let directory = Arc::new(PeerDirectory::with_config(
            config.network.advertised(local_addr),
            config.directory,
        ));
        let bootstrap = config
            .network
            .bootstrap_peers()
            .context("Invalid bootstrap list")?;
        let added = directory.merge(bootstrap);
        info!("[runtime] {} bootstrap peer(s)", added);

        let node = Arc::new(Node::new(
            config.sync.clone(),
            ledger,
            directory,
            Arc::new(TcpDialer),
        ));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            node,
            local_addr,
            listener: Mutex::new(Some(listener)),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The node served by this runtime.
    pub fn node(&self) -> Arc<Node> {
        Arc::clone(&self.node)
    }

    /// Install the configured genesis pair if the ledger has none.
    pub fn initialize_genesis(&self) -> Result<()> {
        if !self.config.genesis.create {
            info!("[runtime] Waiting for roots from peers");
            return Ok(());
        }
        if self.node.ledger().is_initialized() {
            info!("[runtime] Roots already installed");
            return Ok(());
        }

        let registry = self.node.ledger().registry().clone();
        let (a, b) = build_root_pair(&self.config.genesis, &registry)
            .context("Failed to build genesis pair")?;
        self.node
            .install_roots(a.user, b.user)
            .context("Failed to install genesis pair")?;
        info!("[runtime] Genesis pair installed");
        Ok(())
    }

    /// Install genesis, then spawn the accept loop and the sync ticker.
    pub async fn start(&self) -> Result<()> {
        info!("===========================================");
        info!("  Lineage Node Runtime v{}", crate::VERSION);
        info!("===========================================");

        self.initialize_genesis()?;

        let listener = self
            .listener
            .lock()
            .take()
            .context("Runtime already started")?;

        let node = self.node();
        let mut accept_shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = serve_tcp(node, listener) => {
                    if let Err(e) = result {
                        error!("[runtime] Listener stopped: {}", e);
                    }
                }
                _ = accept_shutdown.changed() => {
                    info!("[runtime] Listener shutdown");
                }
            }
        });

        let node = self.node();
        let mut sync_shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = node.run() => {}
                _ = sync_shutdown.changed() => {
                    info!("[lg-04] Shutdown signal received");
                }
            }
        });

        info!("[runtime] Listening on {}", self.local_addr);
        info!(
            "[runtime] Advertising {}",
            self.node.directory().local_descriptor()
        );
        Ok(())
    }

    /// Stop the background tasks.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
        tokio::task::yield_now().await;
        info!("Shutdown complete");
    }
}
