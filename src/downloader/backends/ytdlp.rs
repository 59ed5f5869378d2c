use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::downloader::errors::{FetchError, ResolutionError};
use crate::downloader::models::{MediaItem, NetworkConfig, PlaylistInfo, StreamHandle};
use crate::downloader::traits::MediaResolver;
use crate::downloader::utils::{
    find_ytdlp, get_cookie_args, get_proxy_args, get_timeout_args, run_output_with_timeout,
};

/// Output template for fetched streams; the core renames the result.
const FETCH_TEMPLATE: &str = "%(title)s [%(id)s].%(ext)s";

/// Configuration for [`YtDlpResolver`]
#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    /// Explicit yt-dlp binary; discovered when `None`
    pub ytdlp_path: Option<PathBuf>,
    pub network: NetworkConfig,
}

impl ResolverConfig {
    /// Defaults overridden by `YTDLP_PATH`, `YTDLP_PROXY` and `YTDLP_TIMEOUT`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("YTDLP_PATH") {
            config.ytdlp_path = Some(PathBuf::from(path));
        }
        if let Ok(proxy) = std::env::var("YTDLP_PROXY") {
            config.network.proxy = Some(proxy);
        }
        if let Some(secs) = std::env::var("YTDLP_TIMEOUT")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
        {
            config.network.timeout = Some(secs);
        }
        config
    }

    pub fn with_ytdlp_path(mut self, path: Option<PathBuf>) -> Self {
        self.ytdlp_path = path;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.network.proxy = proxy;
        self
    }

    pub fn with_timeout(mut self, seconds: Option<u32>) -> Self {
        self.network.timeout = seconds;
        self
    }

    pub fn with_fetch_timeout(mut self, seconds: Option<u32>) -> Self {
        self.network.fetch_timeout = seconds;
        self
    }

    pub fn with_cookies_from_browser(mut self, browser: Option<String>) -> Self {
        self.network.cookies_from_browser = browser;
        self
    }
}

/// [`MediaResolver`] backed by the `yt-dlp` command-line tool
pub struct YtDlpResolver {
    ytdlp_bin: PathBuf,
    config: ResolverConfig,
}

impl YtDlpResolver {
    pub fn new(config: ResolverConfig) -> Self {
        let ytdlp_bin = config
            .ytdlp_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(find_ytdlp()));
        tracing::debug!("[YtDlp] Using binary {}", ytdlp_bin.display());
        Self { ytdlp_bin, config }
    }

    fn fetch_args(&self, stream: &StreamHandle, directory: &Path) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            stream.format_id.clone(),
            "--no-playlist".to_string(),
            "--no-progress".to_string(),
            "--no-warnings".to_string(),
            "-P".to_string(),
            directory.display().to_string(),
            "-o".to_string(),
            FETCH_TEMPLATE.to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
        ];
        args.extend(self.network_args());
        args.push(stream.source_url.clone());
        args
    }

    fn network_args(&self) -> Vec<String> {
        let network = &self.config.network;
        let mut args = get_timeout_args(network);
        args.extend(get_proxy_args(network));
        args.extend(get_cookie_args(network));
        args
    }

    async fn dump_json(&self, mut args: Vec<String>, url: &str) -> Result<serde_json::Value, ResolutionError> {
        args.extend(self.network_args());
        args.push(url.to_string());

        let timeout = self.config.network.timeout.map(u64::from);
        let output = run_output_with_timeout(&self.ytdlp_bin, args, timeout).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ResolutionError::classify(&stderr));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| ResolutionError::ParseError(format!("Invalid JSON: {}", e)))
    }
}

impl Default for YtDlpResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::from_env())
    }
}

#[async_trait]
impl MediaResolver for YtDlpResolver {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn resolve_video(&self, url: &str) -> Result<MediaItem, ResolutionError> {
        let args = vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
        ];
        let json = self.dump_json(args, url).await?;
        parse_media_item(&json, url)
    }

    async fn resolve_playlist(&self, url: &str) -> Result<PlaylistInfo, ResolutionError> {
        let args = vec![
            "--flat-playlist".to_string(),
            "--dump-single-json".to_string(),
            "--no-warnings".to_string(),
        ];
        let json = self.dump_json(args, url).await?;
        parse_playlist(&json)
    }

    async fn fetch(&self, stream: &StreamHandle, directory: &Path) -> Result<PathBuf, FetchError> {
        let args = self.fetch_args(stream, directory);
        let timeout = self.config.network.fetch_timeout.map(u64::from);
        let output = run_output_with_timeout(&self.ytdlp_bin, args, timeout).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::Execution(stderr.trim().to_string()));
        }

        let path = last_line(&output.stdout).ok_or(FetchError::MissingOutput)?;
        Ok(PathBuf::from(path))
    }
}

fn last_line(stdout: &[u8]) -> Option<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(str::to_string)
}

/// Build a [`MediaItem`] from `--dump-json` output
pub fn parse_media_item(json: &serde_json::Value, url: &str) -> Result<MediaItem, ResolutionError> {
    let title = json["title"]
        .as_str()
        .ok_or_else(|| ResolutionError::ParseError("No title in JSON".to_string()))?;
    let author = json["uploader"]
        .as_str()
        .or_else(|| json["channel"].as_str())
        .unwrap_or("Unknown");
    let source_url = json["webpage_url"]
        .as_str()
        .filter(|u| !u.is_empty())
        .unwrap_or(url)
        .to_string();

    Ok(MediaItem {
        streams: parse_streams(json, &source_url),
        source_url,
        title: title.to_string(),
        author_name: author.to_string(),
        duration_seconds: json["duration"].as_f64().unwrap_or(0.0) as u64,
    })
}

fn parse_streams(json: &serde_json::Value, source_url: &str) -> Vec<StreamHandle> {
    let Some(formats) = json["formats"].as_array() else {
        return Vec::new();
    };

    formats
        .iter()
        .filter_map(|f| {
            let format_id = f["format_id"].as_str()?;
            let vcodec = f["vcodec"].as_str();
            let acodec = f["acodec"].as_str();
            let audio_only = acodec.map_or(false, |a| a != "none")
                && vcodec.map_or(true, |v| v == "none");

            Some(StreamHandle {
                format_id: format_id.to_string(),
                ext: f["ext"].as_str().unwrap_or("").to_string(),
                source_url: source_url.to_string(),
                audio_only,
                abr: f["abr"].as_f64().map(|a| a as f32),
            })
        })
        .collect()
}

/// Build a [`PlaylistInfo`] from `--flat-playlist --dump-single-json` output
pub fn parse_playlist(json: &serde_json::Value) -> Result<PlaylistInfo, ResolutionError> {
    let entries = json["entries"]
        .as_array()
        .ok_or_else(|| ResolutionError::InvalidUrl("Not a playlist".to_string()))?;

    let item_urls = entries
        .iter()
        .filter_map(|entry| {
            entry["url"]
                .as_str()
                .or_else(|| entry["webpage_url"].as_str())
                .map(str::to_string)
                .or_else(|| {
                    entry["id"]
                        .as_str()
                        .map(|id| format!("https://www.youtube.com/watch?v={}", id))
                })
        })
        .collect();

    Ok(PlaylistInfo {
        title: json["title"].as_str().unwrap_or("").to_string(),
        item_urls,
    })
}
