//! API server implementation

use std::net::{IpAddr, SocketAddr};

use tokio::net::TcpListener;

use warden_auth::AuthConfig;

use crate::state::AppState;
use crate::{Error, Result, app};

/// Warden API server
pub struct Server {
    addr: SocketAddr,
    state: AppState,
    auth: AuthConfig,
}

impl Server {
    /// Create a new server instance listening on `host:port`. `host` must be
    /// an IP address.
    pub fn new(host: &str, port: u16, state: AppState, auth: AuthConfig) -> Result<Self> {
        let ip = host
            .parse::<IpAddr>()
            .map_err(|e| Error::Config(format!("invalid listen host '{host}': {e}")))?;
        Ok(Self {
            addr: SocketAddr::new(ip, port),
            state,
            auth,
        })
    }

    /// The address the server will bind.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        log::info!("Warden API listening on {}", listener.local_addr()?);
        if !self.auth.enabled {
            log::warn!("Authentication is disabled; every request is anonymous");
        }

        axum::serve(listener, app(self.state, self.auth))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        log::info!("Warden API stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
