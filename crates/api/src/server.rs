//! Listener lifecycle: bind, serve, drain on shutdown.

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::error::ServerError;

/// A bound gateway, ready to serve.
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    app: axum::Router,
}

impl Server {
    /// Binds the listener at `config.addr()`.
    ///
    /// Logs a single startup line with the resolved port, which differs from
    /// `config.port` only when binding port 0.
    pub async fn bind(config: &Config, app: axum::Router) -> Result<Self, ServerError> {
        let addr = config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;

        let port = local_addr.port();
        tracing::info!(addr = %local_addr, port, "API server running on http://localhost:{port}");

        Ok(Self {
            listener,
            local_addr,
            app,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves requests until `shutdown` resolves, then waits for in-flight
    /// requests to finish.
    pub async fn run<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(ServerError::Serve)?;

        tracing::info!("server shut down gracefully");
        Ok(())
    }
}
