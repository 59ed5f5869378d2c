// Job runner: routes a URL to the single or playlist pipeline on a worker task

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use super::backends::{ResolverConfig, YtDlpResolver};
use super::errors::BatchError;
use super::models::{BatchJob, Outcome};
use super::playlist::download_playlist;
use super::single::download_one;
use super::traits::{MediaResolver, ProgressSink};

/// Substring that marks a playlist URL. This is the whole routing rule.
pub const PLAYLIST_MARKER: &str = "/playlist?list=";

pub const STATUS_CANCEL_REQUESTED: &str = "Cancel button pressed. Cancelling...";

pub fn is_playlist_url(url: &str) -> bool {
    url.contains(PLAYLIST_MARKER)
}

/// How a job ended
#[derive(Debug)]
pub enum JobReport {
    /// Single video job
    Single(Outcome),
    /// Playlist job that got past setup (may be cancelled)
    Playlist(BatchJob),
    /// Playlist job that failed during setup
    Failed(BatchError),
}

/// Handle to a job running on a worker task
pub struct JobHandle {
    cancel: CancellationToken,
    sink: Arc<dyn ProgressSink>,
    handle: JoinHandle<JobReport>,
}

impl JobHandle {
    /// Ask the job to stop before its next item
    pub fn cancel(&self) {
        tracing::info!("[Downloader] Cancel requested");
        self.cancel.cancel();
        self.sink.set_status(STATUS_CANCEL_REQUESTED);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the job to end. Must not be called again once it returned.
    pub async fn wait(&mut self) -> Result<JobReport, JoinError> {
        (&mut self.handle).await
    }
}

pub struct Downloader {
    resolver: Arc<dyn MediaResolver>,
}

impl Downloader {
    pub fn new(resolver: Arc<dyn MediaResolver>) -> Self {
        Self { resolver }
    }

    pub fn with_ytdlp(config: ResolverConfig) -> Self {
        Self::new(Arc::new(YtDlpResolver::new(config)))
    }

    /// Run one job on the current task.
    pub async fn run(
        &self,
        url: &str,
        destination_dir: &Path,
        cancel: &CancellationToken,
        sink: &dyn ProgressSink,
    ) -> JobReport {
        sink.set_progress(0);
        sink.set_status("");

        let url = url.trim();
        let resolver = self.resolver.as_ref();

        if is_playlist_url(url) {
            tracing::info!("[Downloader] Playlist job via {}: {}", resolver.name(), url);
            match download_playlist(resolver, url, destination_dir, cancel, sink).await {
                Ok(job) => JobReport::Playlist(job),
                Err(e) => {
                    tracing::error!("[Downloader] ✗ Playlist setup failed: {}", e);
                    sink.set_status(&format!("Error occurred: {}", e));
                    JobReport::Failed(e)
                }
            }
        } else {
            tracing::info!("[Downloader] Video job via {}: {}", resolver.name(), url);
            let outcome = download_one(resolver, url, destination_dir, sink).await;
            sink.set_status(&outcome.status_message());
            JobReport::Single(outcome)
        }
    }

    /// Start a job on a tokio worker task and return at once.
    ///
    /// Every job gets a fresh cancellation token, so cancelling one job never
    /// affects the next. Must be called from within a tokio runtime.
    pub fn start(
        &self,
        url: &str,
        destination_dir: PathBuf,
        sink: Arc<dyn ProgressSink>,
    ) -> JobHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let runner = Self {
            resolver: Arc::clone(&self.resolver),
        };
        let url = url.to_string();
        let job_sink = Arc::clone(&sink);

        let handle = tokio::spawn(async move {
            runner
                .run(&url, &destination_dir, &token, job_sink.as_ref())
                .await
        });

        JobHandle {
            cancel,
            sink,
            handle,
        }
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new(Arc::new(YtDlpResolver::default()))
    }
}
