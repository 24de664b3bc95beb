//! Listener lifecycle: bind, serve, shut down or reload.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::api::create_router;
use crate::error::{AppError, Result};
use crate::reload::ReloadWatcher;

/// Why [`Server::serve`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeExit {
    /// The shutdown future resolved.
    Shutdown,
    /// A watched file changed in debug mode; the caller should restart.
    Reload,
}

/// A bound HTTP server that has not started accepting yet.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    router: Router,
    local_addr: SocketAddr,
    reload: Option<ReloadWatcher>,
}

impl Server {
    /// Bind the listening socket and build the route table.
    ///
    /// In debug mode the running executable is watched for rebuilds.
    pub async fn bind(addr: SocketAddr, debug: bool) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| AppError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| AppError::Bind { addr, source })?;

        let reload = if debug {
            match ReloadWatcher::for_current_exe() {
                Ok(watcher) => Some(watcher),
                Err(e) => {
                    warn!("auto-reload disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            listener,
            router: create_router(debug),
            local_addr,
            reload,
        })
    }

    /// Replace the reload watcher.
    pub fn with_reload_watcher(mut self, watcher: ReloadWatcher) -> Self {
        self.reload = Some(watcher);
        self
    }

    /// The address actually bound (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept connections until `shutdown` resolves or a reload is due.
    ///
    /// In-flight requests are allowed to finish either way.
    pub async fn serve<F>(self, shutdown: F) -> Result<ServeExit>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("HTTP server listening on {}", self.local_addr);

        let reloading = Arc::new(AtomicBool::new(false));
        let flag = reloading.clone();
        let watcher = self.reload;

        let signal = async move {
            let reload = async move {
                match watcher {
                    Some(w) => w.changed().await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                _ = shutdown => info!("shutting down"),
                _ = reload => {
                    flag.store(true, Ordering::SeqCst);
                    info!("reloading");
                }
            }
        };

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await
            .map_err(AppError::Serve)?;

        if reloading.load(Ordering::SeqCst) {
            Ok(ServeExit::Reload)
        } else {
            Ok(ServeExit::Shutdown)
        }
    }
}
