//! Preview server for the generated guidelines site.
//!
//! Serves the MkDocs output directory and, in development, rebuilds the
//! site whenever the source changes and tells connected browsers to reload
//! over a WebSocket.

pub mod server;
pub mod watcher;
pub mod websocket;

pub use server::{PreviewConfig, PreviewServer, Rebuilder, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
pub use websocket::{ReloadHub, ReloadMessage};
