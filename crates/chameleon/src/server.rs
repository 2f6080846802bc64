//! `ChameleonServer` builder and server loop.
//!
//! This is the entry point for running a Chameleon server. It ties
//! together the layers: transport → protocol → engine.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chameleon_protocol::{Codec, JsonCodec};
use chameleon_room::{BuiltinCategories, CategoryProvider, Engine, RoomConfig};

use crate::handler::handle_connection;
use crate::transport::{WebSocketConnection, WebSocketListener};
use crate::ChameleonError;

/// How long a connection may sit silent before the server closes it.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared server state passed to each connection handler task.
///
/// The engine does its own locking, so nothing here needs a mutex.
pub(crate) struct ServerState<P: CategoryProvider, C: Codec> {
    pub(crate) engine: Arc<Engine<P>>,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Chameleon server.
///
/// # Example
///
/// ```rust,no_run
/// use chameleon::prelude::*;
///
/// # async fn run() -> Result<(), ChameleonError> {
/// let server = ChameleonServer::builder()
///     .bind("0.0.0.0:8080")
///     .room_config(RoomConfig { id_length: 6, ..RoomConfig::default() })
///     .category_provider(Category::food())
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ChameleonServerBuilder<P: CategoryProvider = BuiltinCategories> {
    bind_addr: String,
    room_config: RoomConfig,
    idle_timeout: Duration,
    provider: P,
}

impl ChameleonServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            provider: BuiltinCategories::default(),
        }
    }
}

impl Default for ChameleonServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: CategoryProvider> ChameleonServerBuilder<P> {
    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the room configuration used by the engine.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Sets how long an idle connection is kept open.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Replaces the source of categories for new rounds.
    pub fn category_provider<Q: CategoryProvider>(
        self,
        provider: Q,
    ) -> ChameleonServerBuilder<Q> {
        ChameleonServerBuilder {
            bind_addr: self.bind_addr,
            room_config: self.room_config,
            idle_timeout: self.idle_timeout,
            provider,
        }
    }

    /// Binds the listener and builds the server.
    ///
    /// Uses `JsonCodec` and the WebSocket transport.
    pub async fn build(self) -> Result<ChameleonServer<P>, ChameleonError> {
        let listener = WebSocketListener::bind(&self.bind_addr).await?;

        let engine = Arc::new(Engine::with_provider(
            self.room_config,
            self.provider,
        ));
        let state = Arc::new(ServerState {
            engine,
            codec: JsonCodec,
            idle_timeout: self.idle_timeout,
        });

        Ok(ChameleonServer { listener, state })
    }
}

/// A bound Chameleon server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ChameleonServer<P: CategoryProvider = BuiltinCategories> {
    listener: WebSocketListener,
    state: Arc<ServerState<P, JsonCodec>>,
}

impl ChameleonServer {
    /// Creates a new builder.
    pub fn builder() -> ChameleonServerBuilder {
        ChameleonServerBuilder::new()
    }
}

impl<P: CategoryProvider> ChameleonServer<P> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// The engine behind this server. Useful for inspecting state in
    /// tests or from an admin task running alongside.
    pub fn engine(&self) -> Arc<Engine<P>> {
        Arc::clone(&self.state.engine)
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming TCP connections and spawns a task for each that
    /// performs the WebSocket upgrade and then serves requests. Runs until
    /// the process is terminated.
    pub async fn run(self) -> Result<(), ChameleonError> {
        tracing::info!(addr = ?self.local_addr().ok(), "Chameleon server running");

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let conn =
                            match WebSocketConnection::upgrade(stream, peer).await {
                                Ok(conn) => conn,
                                Err(e) => {
                                    tracing::debug!(%peer, error = %e, "upgrade failed");
                                    return;
                                }
                            };
                        let conn_id = conn.id();
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                %conn_id,
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
