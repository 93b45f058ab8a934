use std::io;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

pub struct HttpServer {
    bind_addr: String,
    app: Router,
}

impl HttpServer {
    pub fn new(host: &str, port: u16, app: Router) -> Self {
        Self {
            bind_addr: format!("{host}:{port}"),
            app,
        }
    }

    pub async fn serve(self) -> io::Result<()> {
        let listener = TcpListener::bind(&self.bind_addr).await?;

        info!("Gallery server started on {}", self.bind_addr);
        info!("");
        info!("Usage:");
        info!("   curl http://{}/api/artworks", self.bind_addr);
        info!("   curl http://{}/api/artworks?slug=way-dao", self.bind_addr);
        info!(
            "   curl -X POST http://{}/api/artworks?action=refresh",
            self.bind_addr
        );

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
