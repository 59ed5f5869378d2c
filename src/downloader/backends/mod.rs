// Media resolver backends

pub mod ytdlp;

pub use ytdlp::{ResolverConfig, YtDlpResolver};
