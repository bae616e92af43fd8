//! Lighthouse server
//!
//! Owns the shared status store and listener registry, runs the accept loop,
//! and supervises the health monitor and broadcaster tasks.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::health::{HealthMonitor, HealthProbe, HttpProbe};
use crate::registry::{Listener, ListenerId, ListenerRegistry};
use crate::server::broadcaster::Broadcaster;
use crate::server::config::ServerConfig;
use crate::status::StatusStore;

/// Lighthouse beacon server
pub struct LighthouseServer<P: HealthProbe = HttpProbe> {
    config: ServerConfig,
    probe: Arc<P>,
    store: Arc<StatusStore>,
    registry: Arc<ListenerRegistry>,
    welcome: Bytes,
    next_listener_id: AtomicU64,
}

impl LighthouseServer<HttpProbe> {
    /// Create a server that probes `config.probe_url` over HTTP
    pub fn new(config: ServerConfig) -> Result<Self> {
        let probe = HttpProbe::new(config.probe_url.clone(), config.probe_timeout)?;
        Ok(Self::with_probe(config, probe))
    }
}

impl<P: HealthProbe> LighthouseServer<P> {
    /// Create a server with a custom health probe
    pub fn with_probe(config: ServerConfig, probe: P) -> Self {
        let store = Arc::new(StatusStore::with_id(config.lighthouse_id.clone()));
        let welcome = Bytes::from(config.welcome_message.clone().into_bytes());

        Self {
            config,
            probe: Arc::new(probe),
            store,
            registry: Arc::new(ListenerRegistry::new()),
            welcome,
            next_listener_id: AtomicU64::new(1),
        }
    }

    /// Get a reference to the listener registry
    pub fn registry(&self) -> &Arc<ListenerRegistry> {
        &self.registry
    }

    /// Get a reference to the status store
    pub fn status(&self) -> &Arc<StatusStore> {
        &self.store
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Create the listening socket
    ///
    /// Failure here is fatal: the server cannot do anything without it.
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = self.config.bind_addr;
        let bind_err = |source| Error::Bind { addr, source };

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(bind_err)?;

        socket.set_reuseaddr(true).map_err(bind_err)?;
        socket.bind(addr).map_err(bind_err)?;
        let listener = socket.listen(self.config.backlog).map_err(bind_err)?;

        tracing::info!(
            addr = %listener.local_addr()?,
            backlog = self.config.backlog,
            "Lighthouse listening"
        );

        Ok(listener)
    }

    /// Run the server
    ///
    /// This method only returns if binding fails.
    pub async fn run(&self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await;
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// On shutdown the background tasks are stopped and joined, the listening
    /// socket is dropped, and every registered listener is closed.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let cancel = CancellationToken::new();

        let monitor = HealthMonitor::new(
            Arc::clone(&self.probe),
            Arc::clone(&self.store),
            Arc::clone(&self.registry),
            self.config.health_interval,
            self.config.probe_timeout,
        )
        .spawn(cancel.child_token());

        let broadcaster = Broadcaster::new(
            Arc::clone(&self.store),
            Arc::clone(&self.registry),
            self.config.broadcast_interval,
            self.config.write_timeout,
        )
        .spawn(cancel.child_token());

        // Connections still being greeted; they are not in the registry yet.
        let mut greetings = JoinSet::new();

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
            }
            _ = self.accept_loop(&listener, &mut greetings) => {}
        }

        cancel.cancel();
        drop(listener);
        greetings.shutdown().await;

        for (task, handle) in [("health monitor", monitor), ("broadcaster", broadcaster)] {
            if let Err(e) = handle.await {
                tracing::error!(task, error = %e, "Background task failed");
            }
        }

        let closed = self.registry.close_all().await;
        tracing::info!(closed, "Lighthouse stopped");
    }

    async fn accept_loop(&self, listener: &TcpListener, greetings: &mut JoinSet<()>) {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr, greetings);
                    // Reap finished greetings so the set does not grow unbounded
                    while greetings.try_join_next().is_some() {}
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(
        &self,
        socket: TcpStream,
        peer_addr: SocketAddr,
        greetings: &mut JoinSet<()>,
    ) {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));

        tracing::debug!(listener = %id, peer = %peer_addr, "New connection");

        if let Err(e) = self.configure_socket(&socket) {
            tracing::error!(listener = %id, error = %e, "Failed to configure socket");
            return;
        }

        let listener = Listener::new(id, socket, peer_addr);
        let registry = Arc::clone(&self.registry);
        let welcome = self.welcome.clone();
        let deadline = self.config.write_timeout;

        // Greet before registering so the welcome always precedes the first
        // status block on the wire. A failed or truncated welcome still
        // registers the listener; a peer that stopped reading is pruned by
        // the next broadcast.
        greetings.spawn(async move {
            if let Err(e) = listener.send(&welcome, deadline).await {
                tracing::debug!(listener = %id, error = %e, "Failed to send welcome");
            }

            registry.register(listener).await;
        });
    }

    fn configure_socket(&self, socket: &TcpStream) -> std::io::Result<()> {
        if self.config.tcp_nodelay {
            socket.set_nodelay(true)?;
        }

        Ok(())
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}
