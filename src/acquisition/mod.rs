/*
    edskit
    https://github.com/dbalsom/edskit

    Copyright 2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------
*/

//! The acquisition coordinator: drives the Greaseweazle `gw` command line
//! tool to capture images from physical media.
//!
//! At most one hardware read runs per process, guarded by an in-process
//! handle plus a best-effort scan of the OS process table for sibling `gw`
//! invocations - the USB device is serial, and two readers corrupt each
//! other's captures. Progress is streamed line by line to a caller-supplied
//! sink; a [CancelToken] terminates the child and resolves the read as
//! [AcquisitionError::Cancelled].

mod lines;

use std::{
    path::Path,
    process::Stdio,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
        Mutex,
    },
    time::Duration,
};

use thiserror::Error;
use tokio::{io::AsyncReadExt, process::Command, sync::Notify, time::timeout};

use self::lines::LineSplitter;

const INFO_TIMEOUT: Duration = Duration::from_secs(30);
const RPM_TIMEOUT: Duration = Duration::from_secs(15);

/// Subcommands that indicate another process is talking to the hardware.
const GW_SUBCOMMANDS: [&str; 8] = ["read", "write", "convert", "erase", "info", "rpm", "seek", "clean"];

#[derive(Clone, Debug, Error)]
pub enum AcquisitionError {
    #[error("Another acquisition is already in progress")]
    DeviceBusy,
    #[error("The acquisition tool failed: {0}")]
    ExternalReadFailed(String),
    #[error("The read was cancelled")]
    Cancelled,
    #[error("The acquisition tool did not respond in time")]
    Timeout,
    #[error("An IO error occurred running the acquisition tool: {0}")]
    IoError(String),
}

impl From<std::io::Error> for AcquisitionError {
    fn from(err: std::io::Error) -> Self {
        AcquisitionError::IoError(err.to_string())
    }
}

/// Options for a hardware read, mapped onto `gw read` arguments.
#[derive(Clone, Debug)]
pub struct ReadOptions {
    /// Capture format passed as `--format` (e.g. "amstrad.cpc.720"), when
    /// set.
    pub format: Option<String>,
    /// Track range passed as `--tracks` (e.g. "c=0-79:h=0-1"), when set.
    pub tracks: Option<String>,
    /// Revolutions captured per track.
    pub revs: u8,
    /// Retries on bad reads.
    pub retries: u8,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            format: None,
            tracks: None,
            revs: 3,
            retries: 3,
        }
    }
}

/// Sink for progress lines. Called once per non-empty trimmed line, in
/// arrival order, interleaving stdout and stderr. Must not block.
pub type ProgressCallback = Box<dyn Fn(&str) + Send + Sync + 'static>;

/// A handle that aborts an in-flight read. Cloneable; triggering any clone
/// terminates the child process.
#[derive(Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        while !self.is_cancelled() {
            self.notify.notified().await;
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ReadState {
    Starting,
    Running,
}

/// Coordinator for the external `gw` tool.
pub struct Greaseweazle {
    command: String,
    active: Arc<Mutex<Option<ReadState>>>,
}

impl Default for Greaseweazle {
    fn default() -> Self {
        Self::new()
    }
}

impl Greaseweazle {
    pub fn new() -> Greaseweazle {
        Greaseweazle::with_command("gw")
    }

    /// Use an explicit tool path instead of resolving `gw` from PATH.
    pub fn with_command(command: impl Into<String>) -> Greaseweazle {
        Greaseweazle {
            command: command.into(),
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// True when this process owns an in-flight read, or any sibling `gw`
    /// process is found in the OS process table.
    pub fn is_busy(&self) -> bool {
        if self.active.lock().unwrap().is_some() {
            return true;
        }
        Self::sibling_acquisition_running()
    }

    /// Best-effort scan for other processes already talking to the
    /// hardware: a command line of `gw` followed by a device subcommand.
    fn sibling_acquisition_running() -> bool {
        let mut system = sysinfo::System::new();
        system.refresh_processes(sysinfo::ProcessesToUpdate::All, true);

        for process in system.processes().values() {
            let cmd = process.cmd();
            if cmd.len() < 2 {
                continue;
            }
            let program = Path::new(&cmd[0])
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_default();
            let subcommand = cmd[1].to_string_lossy();
            if program == "gw" && GW_SUBCOMMANDS.contains(&subcommand.as_ref()) {
                log::debug!(
                    "sibling_acquisition_running: found gw {} (pid {})",
                    subcommand,
                    process.pid()
                );
                return true;
            }
        }
        false
    }

    /// Query `gw info`, returning the reported `key: value` pairs.
    pub async fn info(&self) -> Result<Vec<(String, String)>, AcquisitionError> {
        let text = self.one_shot("info", INFO_TIMEOUT).await?;

        let pair_re = regex::Regex::new(r"(?m)^\s*([^:\r\n]+?)\s*:\s*(.+?)\s*$").unwrap();
        let pairs = pair_re
            .captures_iter(&text)
            .map(|caps| (caps[1].to_string(), caps[2].to_string()))
            .collect();
        Ok(pairs)
    }

    /// Query `gw rpm`, returning the measured spindle speed.
    pub async fn rpm(&self) -> Result<f64, AcquisitionError> {
        let text = self.one_shot("rpm", RPM_TIMEOUT).await?;

        let rpm_re = regex::Regex::new(r"(\d+(?:\.\d+)?)\s*RPM").unwrap();
        rpm_re
            .captures(&text)
            .and_then(|caps| caps[1].parse::<f64>().ok())
            .ok_or_else(|| AcquisitionError::ExternalReadFailed(text))
    }

    /// Run a one-shot subcommand with a hard timeout, returning combined
    /// stdout and stderr text.
    async fn one_shot(&self, subcommand: &str, limit: Duration) -> Result<String, AcquisitionError> {
        if self.is_busy() {
            return Err(AcquisitionError::DeviceBusy);
        }

        let mut cmd = Command::new(&self.command);
        cmd.arg(subcommand)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = timeout(limit, cmd.output())
            .await
            .map_err(|_| AcquisitionError::Timeout)??;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(text)
        }
        else {
            Err(AcquisitionError::ExternalReadFailed(text))
        }
    }

    /// Read a disk to `output_path`, streaming progress lines to the sink.
    ///
    /// Resolves with the last progress line on success. A triggered
    /// [CancelToken] terminates the child; the read then resolves as
    /// [AcquisitionError::Cancelled] once the child has exited. Fails
    /// immediately with [AcquisitionError::DeviceBusy], without spawning,
    /// when a read is already in flight here or elsewhere on the host.
    pub async fn read(
        &self,
        output_path: &Path,
        options: ReadOptions,
        progress: ProgressCallback,
        cancel: CancelToken,
    ) -> Result<String, AcquisitionError> {
        {
            let mut active = self.active.lock().unwrap();
            if active.is_some() || Self::sibling_acquisition_running() {
                return Err(AcquisitionError::DeviceBusy);
            }
            *active = Some(ReadState::Starting);
        }

        let result = self.run_read(output_path, &options, &progress, &cancel).await;

        // Terminal transition always releases the device.
        *self.active.lock().unwrap() = None;

        result
    }

    async fn run_read(
        &self,
        output_path: &Path,
        options: &ReadOptions,
        progress: &ProgressCallback,
        cancel: &CancelToken,
    ) -> Result<String, AcquisitionError> {
        let mut cmd = Command::new(&self.command);
        cmd.arg("read");
        if let Some(format) = &options.format {
            cmd.args(["--format", format]);
        }
        if let Some(tracks) = &options.tracks {
            cmd.args(["--tracks", tracks]);
        }
        cmd.args(["--revs", &options.revs.to_string()]);
        cmd.args(["--retries", &options.retries.to_string()]);
        cmd.arg(output_path);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        log::info!("run_read: spawning {} read -> {}", self.command, output_path.display());
        let mut child = cmd.spawn()?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| AcquisitionError::IoError("child stdout unavailable".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| AcquisitionError::IoError("child stderr unavailable".to_string()))?;

        *self.active.lock().unwrap() = Some(ReadState::Running);

        let mut out_buf = [0u8; 4096];
        let mut err_buf = [0u8; 4096];
        let mut out_lines = LineSplitter::default();
        let mut err_lines = LineSplitter::default();
        let mut out_done = false;
        let mut err_done = false;
        let mut stderr_text = String::new();
        let mut last_line = String::new();
        let mut cancelled = false;

        let deliver = |raw_lines: Vec<String>, last: &mut String| {
            for line in raw_lines {
                let line = line.trim();
                if !line.is_empty() {
                    progress(line);
                    *last = line.to_string();
                }
            }
        };

        while !(out_done && err_done) {
            tokio::select! {
                read = stdout.read(&mut out_buf), if !out_done => match read {
                    Ok(0) | Err(_) => out_done = true,
                    Ok(n) => deliver(out_lines.push(&out_buf[..n]), &mut last_line),
                },
                read = stderr.read(&mut err_buf), if !err_done => match read {
                    Ok(0) | Err(_) => err_done = true,
                    Ok(n) => {
                        stderr_text.push_str(&String::from_utf8_lossy(&err_buf[..n]));
                        deliver(err_lines.push(&err_buf[..n]), &mut last_line);
                    }
                },
                _ = cancel.wait(), if !cancelled => {
                    log::info!("run_read: cancellation requested; terminating child");
                    cancelled = true;
                    // Terminate and keep draining until the streams close.
                    let _ = child.start_kill();
                }
            }
        }

        deliver(out_lines.flush().into_iter().collect(), &mut last_line);
        deliver(err_lines.flush().into_iter().collect(), &mut last_line);

        let status = child.wait().await?;
        log::info!("run_read: child exited with {}", status);

        if status.success() {
            Ok(last_line)
        }
        else if cancelled || cancel.is_cancelled() {
            Err(AcquisitionError::Cancelled)
        }
        else {
            Err(AcquisitionError::ExternalReadFailed(stderr_text))
        }
    }
}
