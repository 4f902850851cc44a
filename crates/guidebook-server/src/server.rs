//! Preview server implementation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::sync::Mutex;
use tower_http::services::ServeDir;

use guidebook_site::{MkDocsRunner, SiteBuilder};

use crate::watcher::{FileWatcher, WatchEvent};
use crate::websocket::{
    inject_reload_script, ReloadHub, ReloadMessage, RELOAD_CLIENT_SCRIPT, RELOAD_PATH,
    RELOAD_SCRIPT_PATH,
};

/// Configuration for the preview server.
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Built site to serve
    pub site_dir: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,

    /// Inject the live-reload client into HTML pages
    pub live_reload: bool,

    /// Files and directories whose changes trigger a rebuild
    pub watch: Vec<PathBuf>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            site_dir: PathBuf::from("site"),
            port: 8000,
            host: "127.0.0.1".to_string(),
            open: true,
            live_reload: false,
            watch: Vec::new(),
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("Site directory not found: {0}. Run 'guidebook build' first.")]
    SiteNotFound(PathBuf),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error("Rebuild failed: {0}")]
    RebuildError(String),
}

/// Re-runs the split and `mkdocs build`, one rebuild at a time.
pub struct Rebuilder {
    builder: Arc<SiteBuilder>,
    runner: MkDocsRunner,
    running: Mutex<()>,
}

impl Rebuilder {
    pub fn new(builder: SiteBuilder, runner: MkDocsRunner) -> Self {
        Self {
            builder: Arc::new(builder),
            runner,
            running: Mutex::new(()),
        }
    }

    /// Rebuild the site. Returns the number of pages written.
    pub async fn rebuild(&self) -> Result<usize, ServerError> {
        let _guard = self.running.lock().await;

        let builder = Arc::clone(&self.builder);
        let split = tokio::task::spawn_blocking(move || builder.split())
            .await
            .map_err(|e| ServerError::RebuildError(e.to_string()))?
            .map_err(|e| ServerError::RebuildError(e.to_string()))?;

        self.runner
            .build()
            .await
            .map_err(|e| ServerError::RebuildError(e.to_string()))?;

        Ok(split.pages)
    }
}

/// Serves a built site, optionally rebuilding it when sources change.
pub struct PreviewServer {
    config: PreviewConfig,
    rebuilder: Option<Arc<Rebuilder>>,
}

impl PreviewServer {
    /// Create a new preview server.
    pub fn new(config: PreviewConfig) -> Self {
        Self {
            config,
            rebuilder: None,
        }
    }

    /// Rebuild the site whenever a watched path changes.
    pub fn with_rebuilder(mut self, rebuilder: Rebuilder) -> Self {
        self.rebuilder = Some(Arc::new(rebuilder));
        self
    }

    /// Build the router serving the site.
    pub fn router(&self, hub: ReloadHub) -> Router {
        let site = ServeDir::new(&self.config.site_dir);

        if !self.config.live_reload {
            return Router::new().fallback_service(site);
        }

        Router::new()
            .route(RELOAD_PATH, get(ws_handler))
            .route(RELOAD_SCRIPT_PATH, get(reload_script_handler))
            .fallback_service(site)
            .layer(middleware::map_response(inject_into_html))
            .with_state(hub)
    }

    /// Start the server. Runs until the process is stopped.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|_| {
                ServerError::InvalidAddress(format!("{}:{}", self.config.host, self.config.port))
            })?;

        if !self.config.site_dir.exists() {
            return Err(ServerError::SiteNotFound(self.config.site_dir.clone()));
        }

        let hub = ReloadHub::new();

        if let Some(rebuilder) = &self.rebuilder {
            let (watcher, mut rx) = FileWatcher::new(&self.config.watch)
                .map_err(|e| ServerError::WatchError(e.to_string()))?;

            let rebuilder = Arc::clone(rebuilder);
            let hub = hub.clone();
            tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    // Let the editor finish writing, then fold queued events into one rebuild
                    tokio::time::sleep(Duration::from_millis(150)).await;
                    while rx.try_recv().is_ok() {}

                    handle_watch_event(&rebuilder, &hub, event).await;
                }
                // Keep watcher alive
                drop(watcher);
            });
        }

        let app = self.router(hub);

        tracing::info!(
            "Serving {} at http://{}",
            self.config.site_dir.display(),
            addr
        );

        if self.config.open {
            let url = format!("http://{}", addr);
            let _ = open::that(&url);
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Handle file watch events.
async fn handle_watch_event(rebuilder: &Rebuilder, hub: &ReloadHub, event: WatchEvent) {
    match &event {
        WatchEvent::SourceModified(path) => {
            tracing::info!("Source modified: {}", path.display());
        }
        WatchEvent::ConfigModified(path) => {
            tracing::info!("Config modified: {}", path.display());
        }
        WatchEvent::Created(path) | WatchEvent::Deleted(path) | WatchEvent::Modified(path) => {
            tracing::debug!("Changed: {}", path.display());
        }
    }

    match rebuilder.rebuild().await {
        Ok(pages) => {
            tracing::info!("Rebuilt {} pages", pages);
            hub.send(ReloadMessage::Reload);
        }
        Err(e) => {
            tracing::error!("{}", e);
            hub.send(ReloadMessage::BuildFailed {
                message: e.to_string(),
            });
        }
    }
}

/// Add the live-reload client to successful HTML responses.
async fn inject_into_html(response: Response) -> Response {
    let is_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"));

    if response.status() != StatusCode::OK || !is_html {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Failed to read response body: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let html = inject_reload_script(&String::from_utf8_lossy(&bytes));
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(html))
}

/// Handler for the live-reload WebSocket endpoint.
async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<ReloadHub>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, hub))
}

/// Forward reload messages to one browser.
async fn handle_ws(mut socket: WebSocket, hub: ReloadHub) {
    let mut rx = hub.subscribe();

    if send_message(&mut socket, &ReloadMessage::Connected).await.is_err() {
        return;
    }

    while let Ok(msg) = rx.recv().await {
        if send_message(&mut socket, &msg).await.is_err() {
            break;
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await
}

/// Handler for the live-reload client script.
async fn reload_script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        RELOAD_CLIENT_SCRIPT,
    )
}
