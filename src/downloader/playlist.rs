// Playlist batch: sequential item downloads with cooperative cancellation

use std::path::Path;

use tokio_util::sync::CancellationToken;

use super::errors::BatchError;
use super::filename::playlist_folder_name;
use super::models::BatchJob;
use super::single::download_one;
use super::traits::{MediaResolver, ProgressSink};

pub const STATUS_CANCELLED: &str = "Process canceled by user.";
pub const STATUS_BATCH_COMPLETED: &str = "Playlist download completed!";

/// Download every item of a playlist into `destination_dir/<playlist title>`.
///
/// Per-item failures are reported and skipped. Only setup failures
/// (unresolvable playlist, unusable folder) end the batch with an error.
/// `cancel` is checked before each item; an in-flight item is never
/// interrupted.
pub async fn download_playlist(
    resolver: &dyn MediaResolver,
    playlist_url: &str,
    destination_dir: &Path,
    cancel: &CancellationToken,
    sink: &dyn ProgressSink,
) -> Result<BatchJob, BatchError> {
    sink.set_progress(0);

    let playlist = resolver.resolve_playlist(playlist_url).await.map_err(|e| {
        tracing::error!("[Playlist] Cannot resolve {}: {}", playlist_url, e);
        BatchError::from(e)
    })?;

    let folder = destination_dir.join(playlist_folder_name(&playlist.title));
    create_playlist_folder(&folder).await?;

    let mut job = BatchJob::new(playlist_url, folder.clone(), playlist.item_urls.len());
    tracing::info!(
        "[Playlist] '{}': {} items into {}",
        playlist.title,
        job.total_items,
        folder.display()
    );
    sink.set_status(&format!("Downloading playlist: {}", playlist.title));

    if job.total_items == 0 {
        sink.set_progress(job.progress_after(0));
    }

    for (index, url) in playlist.item_urls.iter().enumerate().map(|(i, u)| (i + 1, u)) {
        if cancel.is_cancelled() {
            job.cancelled = true;
            tracing::info!("[Playlist] Cancelled before item {}/{}", index, job.total_items);
            sink.set_status(STATUS_CANCELLED);
            return Ok(job);
        }

        let outcome = download_one(resolver, url, &folder, sink).await;
        if outcome.is_failure() {
            tracing::warn!(
                "[Playlist] Item {}/{} failed ({}): {:?}",
                index,
                job.total_items,
                url,
                outcome
            );
        }
        sink.set_status(&outcome.status_message());
        job.record(&outcome);

        sink.set_progress(job.progress_after(index));
    }

    tracing::info!(
        "[Playlist] Done: {} downloaded, {} skipped, {} failed",
        job.downloaded,
        job.skipped,
        job.failed
    );
    sink.set_status(STATUS_BATCH_COMPLETED);
    Ok(job)
}

async fn create_playlist_folder(folder: &Path) -> Result<(), BatchError> {
    if let Ok(meta) = tokio::fs::metadata(folder).await {
        if !meta.is_dir() {
            tracing::error!("[Playlist] {} exists and is not a folder", folder.display());
            return Err(BatchError::FolderIsFile(folder.to_path_buf()));
        }
    }

    tokio::fs::create_dir_all(folder)
        .await
        .map_err(|source| BatchError::CreateFolder {
            path: folder.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::errors::ResolutionError;
    use crate::downloader::testing::{video, FakeResolver, RecordingSink};
    use tempfile::tempdir;

    fn three_songs() -> Vec<crate::downloader::models::MediaItem> {
        vec![
            video("a", "First - One", "Ch"),
            video("b", "Second - Two", "Ch"),
            video("c", "Third - Three", "Ch"),
        ]
    }

    #[tokio::test]
    async fn test_all_items_land_in_playlist_folder() {
        let dir = tempdir().unwrap();
        let resolver = FakeResolver::new().with_playlist("Road Trip: 2024!", &three_songs());
        let sink = RecordingSink::default();
        let cancel = CancellationToken::new();

        let job = download_playlist(&resolver, "https://x/playlist?list=1", dir.path(), &cancel, &sink)
            .await
            .unwrap();

        let folder = dir.path().join("Road Trip 2024");
        assert_eq!(job.destination_dir, folder);
        assert_eq!(job.total_items, 3);
        assert_eq!(job.completed_count, 3);
        assert_eq!(job.downloaded, 3);
        assert!(!job.cancelled);
        assert!(folder.join("First - One.mp3").exists());
        assert!(folder.join("Third - Three.mp3").exists());

        let statuses = sink.statuses();
        assert_eq!(statuses.first().unwrap(), "Downloading playlist: Road Trip: 2024!");
        assert_eq!(statuses.last().unwrap(), STATUS_BATCH_COMPLETED);

        // Each success resets to 0 before the batch percentage is reported.
        assert_eq!(sink.progress(), vec![0, 0, 33, 0, 66, 0, 100]);
    }

    #[tokio::test]
    async fn test_empty_playlist_reports_full_progress() {
        let dir = tempdir().unwrap();
        let resolver = FakeResolver::new().with_playlist("Empty", &[]);
        let sink = RecordingSink::default();
        let cancel = CancellationToken::new();

        let job = download_playlist(&resolver, "https://x/playlist?list=e", dir.path(), &cancel, &sink)
            .await
            .unwrap();

        assert_eq!(job.total_items, 0);
        assert_eq!(sink.progress().last(), Some(&100));
        assert_eq!(sink.last_status().unwrap(), STATUS_BATCH_COMPLETED);
        assert!(dir.path().join("Empty").is_dir());
    }

    #[tokio::test]
    async fn test_cancel_stops_before_next_item() {
        let dir = tempdir().unwrap();
        let cancel = CancellationToken::new();
        // Cancel while item 2 is in flight: item 2 finishes, item 3 never starts.
        let resolver = FakeResolver::new()
            .with_playlist("Mix", &three_songs())
            .cancel_after_fetches(2, cancel.clone());
        let sink = RecordingSink::default();

        let job = download_playlist(&resolver, "https://x/playlist?list=m", dir.path(), &cancel, &sink)
            .await
            .unwrap();

        assert!(job.cancelled);
        assert_eq!(job.completed_count, 2);
        assert_eq!(resolver.fetch_calls().len(), 2);
        assert!(!dir.path().join("Mix").join("Third - Three.mp3").exists());

        let statuses = sink.statuses();
        assert_eq!(statuses.iter().filter(|s| *s == STATUS_CANCELLED).count(), 1);
        assert_eq!(statuses.last().unwrap(), STATUS_CANCELLED);
        assert!(!statuses.iter().any(|s| s == STATUS_BATCH_COMPLETED));
    }

    #[tokio::test]
    async fn test_cancel_before_first_item_downloads_nothing() {
        let dir = tempdir().unwrap();
        let resolver = FakeResolver::new().with_playlist("Mix", &three_songs());
        let sink = RecordingSink::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let job = download_playlist(&resolver, "https://x/playlist?list=m", dir.path(), &cancel, &sink)
            .await
            .unwrap();

        assert!(job.cancelled);
        assert_eq!(job.completed_count, 0);
        assert!(resolver.fetch_calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_item_does_not_abort_batch() {
        let dir = tempdir().unwrap();
        let resolver = FakeResolver::new()
            .with_playlist("Mix", &three_songs())
            .failing_fetch_for("https://x/watch?v=a");
        let sink = RecordingSink::default();
        let cancel = CancellationToken::new();

        let job = download_playlist(&resolver, "https://x/playlist?list=m", dir.path(), &cancel, &sink)
            .await
            .unwrap();

        assert_eq!(resolver.fetch_calls().len(), 3);
        assert_eq!(job.failed, 1);
        assert_eq!(job.downloaded, 2);
        assert!(sink
            .statuses()
            .contains(&"Error occurred while downloading video.".to_string()));
        assert_eq!(sink.last_status().unwrap(), STATUS_BATCH_COMPLETED);
    }

    #[tokio::test]
    async fn test_existing_tracks_are_skipped() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("Mix");
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join("Second - Two.mp3"), b"old").unwrap();

        let resolver = FakeResolver::new().with_playlist("Mix", &three_songs());
        let sink = RecordingSink::default();
        let cancel = CancellationToken::new();

        let job = download_playlist(&resolver, "https://x/playlist?list=m", dir.path(), &cancel, &sink)
            .await
            .unwrap();

        assert_eq!(job.skipped, 1);
        assert_eq!(job.downloaded, 2);
        assert_eq!(resolver.fetch_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_unresolvable_playlist_is_fatal() {
        let dir = tempdir().unwrap();
        let resolver = FakeResolver::new()
            .with_broken_playlist(ResolutionError::InvalidUrl("no such list".to_string()));
        let sink = RecordingSink::default();
        let cancel = CancellationToken::new();

        let err = download_playlist(&resolver, "https://x/playlist?list=z", dir.path(), &cancel, &sink)
            .await
            .unwrap_err();

        assert!(matches!(err, BatchError::Resolution(ResolutionError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_folder_colliding_with_file_is_fatal() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("Mix"), b"not a folder").unwrap();
        let resolver = FakeResolver::new().with_playlist("Mix", &three_songs());
        let sink = RecordingSink::default();
        let cancel = CancellationToken::new();

        let err = download_playlist(&resolver, "https://x/playlist?list=m", dir.path(), &cancel, &sink)
            .await
            .unwrap_err();

        assert!(matches!(err, BatchError::FolderIsFile(_)));
        assert!(resolver.fetch_calls().is_empty());
    }

    #[tokio::test]
    async fn test_dot_titles_stay_inside_destination() {
        for title in ["..", "."] {
            let root = tempdir().unwrap();
            let dest = root.path().join("dest");
            std::fs::create_dir_all(&dest).unwrap();
            let resolver = FakeResolver::new().with_playlist(title, &[video("a", "First - One", "Ch")]);
            let sink = RecordingSink::default();
            let cancel = CancellationToken::new();

            let job = download_playlist(&resolver, "https://x/playlist?list=d", &dest, &cancel, &sink)
                .await
                .unwrap();

            let folder = dest.join("Untitled Playlist");
            assert_eq!(job.destination_dir, folder);
            assert!(folder.join("First - One.mp3").exists());
            assert!(!root.path().join("First - One.mp3").exists());
            assert!(!dest.join("First - One.mp3").exists());
        }
    }
}
