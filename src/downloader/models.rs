// Common data models for downloader

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{FetchError, ResolutionError};

/// Media metadata resolved for a single video
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaItem {
    pub source_url: String,
    pub title: String,
    pub author_name: String,
    pub duration_seconds: u64,
    pub streams: Vec<StreamHandle>,
}

/// One downloadable stream of a video
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamHandle {
    /// Format ID (e.g. "140", "251")
    pub format_id: String,
    /// File extension (m4a, webm)
    pub ext: String,
    /// Page URL the stream belongs to
    pub source_url: String,
    /// Whether this stream carries audio and no video
    pub audio_only: bool,
    /// Audio bitrate in kbps
    pub abr: Option<f32>,
}

/// Playlist title and its member URLs, in playlist order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaylistInfo {
    pub title: String,
    pub item_urls: Vec<String>,
}

/// Artist/title pair and the file name built from them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub artist: String,
    pub title: String,
    pub file_base_name: String,
}

/// Terminal state of one single-item download
#[derive(Debug)]
pub enum Outcome {
    /// File written to the given path
    Completed(PathBuf),
    /// Destination already existed; nothing was fetched
    SkippedDuplicate(PathBuf),
    /// URL could not be resolved
    InvalidSource(ResolutionError),
    /// Resolved media has no audio-only stream
    NoAudioStream,
    /// Fetching or renaming failed
    TransferFailed(FetchError),
}

impl Outcome {
    /// Human-readable status line for this outcome
    pub fn status_message(&self) -> String {
        match self {
            Self::Completed(path) => {
                format!("Download completed! MP3 file saved as: {}", display_name(path))
            }
            Self::SkippedDuplicate(path) => format!(
                "Warning: Duplicate file found! Skipping download for: {}",
                display_name(path)
            ),
            Self::InvalidSource(_) => "Invalid YouTube URL.".to_string(),
            Self::NoAudioStream => "No audio stream found for the video.".to_string(),
            Self::TransferFailed(_) => "Error occurred while downloading video.".to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidSource(_) | Self::NoAudioStream | Self::TransferFailed(_)
        )
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// State of one playlist download, returned as its summary
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BatchJob {
    pub playlist_url: String,
    pub destination_dir: PathBuf,
    pub total_items: usize,
    pub completed_count: usize,
    pub cancelled: bool,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchJob {
    pub fn new(playlist_url: &str, destination_dir: PathBuf, total_items: usize) -> Self {
        Self {
            playlist_url: playlist_url.to_string(),
            destination_dir,
            total_items,
            completed_count: 0,
            cancelled: false,
            downloaded: 0,
            skipped: 0,
            failed: 0,
        }
    }

    /// Count a finished item. Never moves past `total_items`.
    pub fn record(&mut self, outcome: &Outcome) {
        if self.completed_count >= self.total_items {
            return;
        }
        self.completed_count += 1;
        match outcome {
            Outcome::Completed(_) => self.downloaded += 1,
            Outcome::SkippedDuplicate(_) => self.skipped += 1,
            _ => self.failed += 1,
        }
    }

    /// Percentage reached after `index` items (1-based)
    pub fn progress_after(&self, index: usize) -> u8 {
        if self.total_items == 0 {
            return 100;
        }
        let percent = index.min(self.total_items) * 100 / self.total_items;
        percent as u8
    }
}

/// Network configuration for the yt-dlp collaborator
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// SOCKS5/HTTP proxy URL (e.g., "socks5://127.0.0.1:1080")
    pub proxy: Option<String>,

    /// Timeout for metadata requests, in seconds
    pub timeout: Option<u32>,

    /// Timeout for a whole stream transfer, in seconds. `None` waits forever.
    pub fetch_timeout: Option<u32>,

    /// Browser to borrow cookies from (e.g. "chrome")
    pub cookies_from_browser: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout: Some(30),
            fetch_timeout: None,
            cookies_from_browser: None,
        }
    }
}

/// Default save location: the user's music folder
pub fn default_output_dir() -> PathBuf {
    dirs::audio_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Music")))
        .unwrap_or_else(|| PathBuf::from("."))
}
