pub mod downloader;

pub use downloader::{
    default_output_dir, derive_name, download_one, download_playlist, is_playlist_url, sanitize,
    BatchError, BatchJob, ChannelSink, Downloader, FetchError, JobHandle, JobReport, LogSink,
    MediaItem, MediaResolver, NetworkConfig, Outcome, PlaylistInfo, ProgressSink, ResolutionError,
    ResolverConfig, SinkEvent, StreamHandle, YtDlpResolver,
};

/// Install a `tracing` fmt subscriber. Safe to call more than once.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt().with_target(false).try_init();
}
