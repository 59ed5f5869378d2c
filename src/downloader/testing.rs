// In-memory collaborators for unit tests

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::errors::{FetchError, ResolutionError};
use super::models::{MediaItem, PlaylistInfo, StreamHandle};
use super::traits::{MediaResolver, ProgressSink, SinkEvent};

pub fn video(id: &str, title: &str, author: &str) -> MediaItem {
    let source_url = format!("https://x/watch?v={}", id);
    MediaItem {
        source_url: source_url.clone(),
        title: title.to_string(),
        author_name: author.to_string(),
        duration_seconds: 180,
        streams: vec![
            StreamHandle {
                format_id: format!("{}-video", id),
                ext: "mp4".to_string(),
                source_url: source_url.clone(),
                audio_only: false,
                abr: None,
            },
            StreamHandle {
                format_id: format!("{}-audio", id),
                ext: "webm".to_string(),
                source_url,
                audio_only: true,
                abr: Some(160.0),
            },
        ],
    }
}

#[derive(Default)]
pub struct FakeResolver {
    videos: HashMap<String, Result<MediaItem, ResolutionError>>,
    playlist: Option<Result<PlaylistInfo, ResolutionError>>,
    failing_fetches: HashSet<String>,
    cancel_after: Option<(usize, CancellationToken)>,
    fetch_calls: Mutex<Vec<String>>,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video(mut self, item: MediaItem) -> Self {
        self.videos.insert(item.source_url.clone(), Ok(item));
        self
    }

    pub fn with_broken_video(mut self, url: &str, err: ResolutionError) -> Self {
        self.videos.insert(url.to_string(), Err(err));
        self
    }

    pub fn with_playlist(mut self, title: &str, items: &[MediaItem]) -> Self {
        let item_urls = items.iter().map(|i| i.source_url.clone()).collect();
        for item in items {
            self.videos.insert(item.source_url.clone(), Ok(item.clone()));
        }
        self.playlist = Some(Ok(PlaylistInfo {
            title: title.to_string(),
            item_urls,
        }));
        self
    }

    pub fn with_broken_playlist(mut self, err: ResolutionError) -> Self {
        self.playlist = Some(Err(err));
        self
    }

    pub fn failing_fetch_for(mut self, source_url: &str) -> Self {
        self.failing_fetches.insert(source_url.to_string());
        self
    }

    /// Cancel `token` once `count` fetches have happened
    pub fn cancel_after_fetches(mut self, count: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((count, token));
        self
    }

    pub fn fetch_calls(&self) -> Vec<String> {
        self.fetch_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaResolver for FakeResolver {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn resolve_video(&self, url: &str) -> Result<MediaItem, ResolutionError> {
        self.videos
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(ResolutionError::InvalidUrl(url.to_string())))
    }

    async fn resolve_playlist(&self, url: &str) -> Result<PlaylistInfo, ResolutionError> {
        self.playlist
            .clone()
            .unwrap_or_else(|| Err(ResolutionError::InvalidUrl(url.to_string())))
    }

    async fn fetch(&self, stream: &StreamHandle, directory: &Path) -> Result<PathBuf, FetchError> {
        let calls = {
            let mut calls = self.fetch_calls.lock().unwrap();
            calls.push(stream.source_url.clone());
            calls.len()
        };

        if let Some((count, token)) = &self.cancel_after {
            if calls >= *count {
                token.cancel();
            }
        }

        if self.failing_fetches.contains(&stream.source_url) {
            return Err(FetchError::Execution("HTTP Error 403: Forbidden".to_string()));
        }

        let path = directory.join(format!("{}.{}", stream.format_id, stream.ext));
        tokio::fs::write(&path, b"audio bytes").await?;
        Ok(path)
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Status(s) => Some(s),
                SinkEvent::Progress(_) => None,
            })
            .collect()
    }

    pub fn progress(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Progress(p) => Some(p),
                SinkEvent::Status(_) => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<String> {
        self.statuses().pop()
    }
}

impl ProgressSink for RecordingSink {
    fn set_progress(&self, percent: u8) {
        self.events.lock().unwrap().push(SinkEvent::Progress(percent));
    }

    fn set_status(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(SinkEvent::Status(message.to_string()));
    }
}
