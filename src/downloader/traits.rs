// Collaborator traits: media resolution and progress reporting

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use super::errors::{FetchError, ResolutionError};
use super::models::{MediaItem, PlaylistInfo, StreamHandle};

/// Turns URLs into media metadata and stream bytes
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Name of the resolver (for logging)
    fn name(&self) -> &'static str;

    /// Resolve a single video URL
    async fn resolve_video(&self, url: &str) -> Result<MediaItem, ResolutionError>;

    /// Resolve a playlist URL into its title and ordered member URLs
    async fn resolve_playlist(&self, url: &str) -> Result<PlaylistInfo, ResolutionError>;

    /// Pick the stream to download. Defaults to the first audio-only stream.
    fn select_audio_stream(&self, item: &MediaItem) -> Option<StreamHandle> {
        item.streams.iter().find(|s| s.audio_only).cloned()
    }

    /// Download the stream into `directory` under a name of the resolver's
    /// choosing and return the path written.
    async fn fetch(&self, stream: &StreamHandle, directory: &Path) -> Result<PathBuf, FetchError>;
}

/// Receives progress and status updates; owned by the caller
pub trait ProgressSink: Send + Sync {
    /// Percent in `0..=100`
    fn set_progress(&self, percent: u8);

    /// Replaces the previous status line
    fn set_status(&self, message: &str);
}

/// Update forwarded by [`ChannelSink`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SinkEvent {
    Progress(u8),
    Status(String),
}

/// Sink that forwards updates to another thread (e.g. a UI loop)
#[derive(Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<SinkEvent>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<SinkEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelSink {
    fn set_progress(&self, percent: u8) {
        let _ = self.tx.send(SinkEvent::Progress(percent.min(100)));
    }

    fn set_status(&self, message: &str) {
        let _ = self.tx.send(SinkEvent::Status(message.to_string()));
    }
}

/// Sink that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn set_progress(&self, percent: u8) {
        tracing::debug!("[Progress] {}%", percent);
    }

    fn set_status(&self, message: &str) {
        if !message.is_empty() {
            tracing::info!("[Status] {}", message);
        }
    }
}
