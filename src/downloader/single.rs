// Single video download: resolve, name, dedup, fetch, rename

use std::path::Path;

use super::errors::FetchError;
use super::filename::resolve_name;
use super::models::Outcome;
use super::traits::{MediaResolver, ProgressSink};

/// Download the audio of one video into `destination_dir`.
///
/// Never retries and never fails the caller: every problem becomes an
/// [`Outcome`]. The status line is left to the caller.
pub async fn download_one(
    resolver: &dyn MediaResolver,
    url: &str,
    destination_dir: &Path,
    sink: &dyn ProgressSink,
) -> Outcome {
    let item = match resolver.resolve_video(url).await {
        Ok(item) => item,
        Err(e) => {
            tracing::warn!("[Downloader] {} could not resolve {}: {}", resolver.name(), url, e);
            return Outcome::InvalidSource(e);
        }
    };

    let Some(stream) = resolver.select_audio_stream(&item) else {
        tracing::warn!("[Downloader] No audio stream for {}", url);
        return Outcome::NoAudioStream;
    };

    let name = resolve_name(&item);
    let destination = destination_dir.join(&name.file_base_name);

    match tokio::fs::try_exists(&destination).await {
        Ok(true) => {
            tracing::info!("[Downloader] Skipping existing {}", destination.display());
            return Outcome::SkippedDuplicate(destination);
        }
        Ok(false) => {}
        Err(e) => {
            tracing::warn!("[Downloader] Cannot check {}: {}", destination.display(), e);
            return Outcome::TransferFailed(FetchError::Io(e));
        }
    }

    tracing::debug!(
        "[Downloader] Fetching format {} ({}) for '{}' by '{}'",
        stream.format_id,
        stream.ext,
        name.title,
        name.artist
    );

    let fetched = match resolver.fetch(&stream, destination_dir).await {
        Ok(path) => path,
        Err(e) => {
            tracing::error!("[Downloader] Error occurred while downloading video: {}", url);
            tracing::error!("[Downloader] Error message: {}", e);
            return Outcome::TransferFailed(e);
        }
    };

    // Fetched into the same directory: this rename is atomic.
    if let Err(source) = tokio::fs::rename(&fetched, &destination).await {
        let err = FetchError::Rename {
            from: fetched,
            to: destination,
            source,
        };
        tracing::error!("[Downloader] {}", err);
        return Outcome::TransferFailed(err);
    }

    tracing::info!("[Downloader] ✓ Saved {}", destination.display());
    sink.set_progress(0);
    Outcome::Completed(destination)
}
