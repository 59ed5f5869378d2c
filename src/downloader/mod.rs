// Downloader module - audio download orchestration and naming pipeline

pub mod backends;
pub mod errors;
pub mod filename;
pub mod models;
pub mod orchestrator;
pub mod playlist;
pub mod single;
pub mod traits;
pub mod utils;

#[cfg(test)]
mod testing;

pub use backends::{ResolverConfig, YtDlpResolver};
pub use errors::{BatchError, FetchError, ResolutionError};
pub use filename::{derive_name, sanitize};
pub use models::{default_output_dir, BatchJob, MediaItem, NetworkConfig, Outcome, PlaylistInfo, StreamHandle};
pub use orchestrator::{is_playlist_url, Downloader, JobHandle, JobReport};
pub use playlist::download_playlist;
pub use single::download_one;
pub use traits::{ChannelSink, LogSink, MediaResolver, ProgressSink, SinkEvent};
