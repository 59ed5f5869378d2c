use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::sync::mpsc::unbounded_channel;

use youtube_audio_downloader_lib::{
    default_output_dir, init_logging, ChannelSink, Downloader, JobReport, ResolverConfig, SinkEvent,
};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let mut args = std::env::args().skip(1);
    let Some(url) = args.next() else {
        eprintln!("usage: youtube-audio-downloader <video-or-playlist-url> [destination]");
        return ExitCode::from(2);
    };
    let destination = args.next().map(PathBuf::from).unwrap_or_else(default_output_dir);

    let (tx, mut rx) = unbounded_channel();
    let downloader = Downloader::with_ytdlp(ResolverConfig::from_env());
    let mut job = downloader.start(&url, destination, Arc::new(ChannelSink::new(tx)));

    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                SinkEvent::Progress(percent) => println!("[{:>3}%]", percent),
                SinkEvent::Status(status) if !status.is_empty() => println!("{}", status),
                SinkEvent::Status(_) => {}
            }
        }
    });

    let report = loop {
        tokio::select! {
            report = job.wait() => break report,
            Ok(()) = tokio::signal::ctrl_c(), if !job.is_cancelled() => job.cancel(),
        }
    };
    // The handle holds a sender; the printer stops once every sender is gone.
    drop(job);
    let _ = printer.await;

    match report {
        Ok(JobReport::Single(outcome)) if outcome.is_failure() => ExitCode::FAILURE,
        Ok(JobReport::Failed(_)) => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("[Downloader] Worker task failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
