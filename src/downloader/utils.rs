// Helper functions for backend implementations

use std::path::Path;
use std::process::{Command as StdCommand, Stdio};

use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration};

use super::errors::ProcessError;
use super::models::NetworkConfig;

/// Run a command to completion, optionally bounded by `timeout_secs`.
///
/// On timeout the child is killed. A non-zero exit status is not an error
/// here; callers inspect `Output::status`.
pub async fn run_output_with_timeout(
    program: &Path,
    args: Vec<String>,
    timeout_secs: Option<u64>,
) -> Result<std::process::Output, ProcessError> {
    let program_name = program.display().to_string();
    let mut child = TokioCommand::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ProcessError::Spawn {
            program: program_name.clone(),
            source,
        })?;

    let mut stdout_pipe = child.stdout.take().ok_or_else(|| ProcessError::Pipe {
        program: program_name.clone(),
        stream: "stdout",
    })?;
    let mut stderr_pipe = child.stderr.take().ok_or_else(|| ProcessError::Pipe {
        program: program_name.clone(),
        stream: "stderr",
    })?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe.read_to_end(&mut buf).await?;
        Ok::<Vec<u8>, std::io::Error>(buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await?;
        Ok::<Vec<u8>, std::io::Error>(buf)
    });

    let status = match timeout_secs {
        Some(secs) => match timeout(Duration::from_secs(secs), child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                let _ = child.kill().await;
                stdout_task.abort();
                stderr_task.abort();
                return Err(ProcessError::TimedOut(secs));
            }
        },
        None => child.wait().await?,
    };

    let stdout = stdout_task.await??;
    let stderr = stderr_task.await??;
    Ok(std::process::Output {
        status,
        stdout,
        stderr,
    })
}

/// Find yt-dlp binary
pub fn find_ytdlp() -> String {
    let common_paths = [
        "/opt/homebrew/bin/yt-dlp", // Homebrew on Apple Silicon
        "/usr/local/bin/yt-dlp",    // Homebrew on Intel Mac
        "/usr/bin/yt-dlp",          // System installation
    ];

    for path in common_paths {
        if Path::new(path).exists() {
            return path.to_string();
        }
    }

    #[cfg(not(windows))]
    if let Ok(output) = StdCommand::new("which").arg("yt-dlp").output() {
        if output.status.success() {
            if let Ok(path) = String::from_utf8(output.stdout) {
                let trimmed = path.trim();
                if !trimmed.is_empty() {
                    return trimmed.to_string();
                }
            }
        }
    }

    tracing::debug!("[YtDlp] Not found in common paths, relying on PATH");
    "yt-dlp".to_string()
}

/// Build proxy arguments for yt-dlp
pub fn get_proxy_args(config: &NetworkConfig) -> Vec<String> {
    let mut args = Vec::new();

    if let Some(proxy) = &config.proxy {
        args.push("--proxy".to_string());
        args.push(proxy.clone());
    }

    args
}

/// Build timeout arguments for yt-dlp
pub fn get_timeout_args(config: &NetworkConfig) -> Vec<String> {
    let mut args = Vec::new();

    if let Some(timeout) = config.timeout {
        args.push("--socket-timeout".to_string());
        args.push(timeout.to_string());
    }

    args
}

/// Build cookie arguments for yt-dlp
pub fn get_cookie_args(config: &NetworkConfig) -> Vec<String> {
    match &config.cookies_from_browser {
        Some(browser) => vec!["--cookies-from-browser".to_string(), browser.clone()],
        None => Vec::new(),
    }
}
