//! Continuous monitoring of a growing log file.
//!
//! `Monitor::open` opens the file and moves to its end, so the monitor starts
//! in `PollLoop`. Each poll hands appended lines to the matcher; every match
//! is printed and mailed on its own as soon as it is seen. When a poll finds
//! nothing new the loop sleeps for the poll interval. The shutdown future is
//! raced against both the poll and the sleep, and is the only way to reach
//! `Stopped`.

use std::future::Future;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use chrono::Local;

use super::alerts::{Mailer, Notifier};
use super::config::PatternSet;
use super::log_io::LogTailer;
use super::matcher::{self, MatchEntry};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    PollLoop,
    Stopped,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MonitorStats {
    pub lines_read: usize,
    pub alerts: usize,
}

/// Result of a single pass over newly appended data.
#[derive(Debug, Default)]
pub struct Poll {
    pub lines_read: usize,
    pub entries: Vec<MatchEntry>,
}

pub struct Monitor<M, W> {
    tailer: LogTailer,
    patterns: PatternSet,
    notifier: Notifier<M>,
    out: W,
    interval: Duration,
    state: MonitorState,
    stats: MonitorStats,
}

impl<M: Mailer, W: Write> Monitor<M, W> {
    /// Open the log and skip everything already in it. Console output goes
    /// to `out`.
    pub fn open(
        log_path: impl AsRef<Path>,
        patterns: PatternSet,
        notifier: Notifier<M>,
        interval: Duration,
        out: W,
    ) -> io::Result<Self> {
        let log_path = log_path.as_ref();
        let tailer = LogTailer::open(log_path)?;
        log::debug!(
            "Opened {:?}, skipped {} existing bytes",
            log_path,
            tailer.position()
        );

        Ok(Self {
            tailer,
            patterns,
            notifier,
            out,
            interval,
            state: MonitorState::PollLoop,
            stats: MonitorStats::default(),
        })
    }

    /// Process every complete line appended since the previous poll.
    pub async fn poll_once(&mut self) -> io::Result<Poll> {
        let lines = self.tailer.read_new_lines()?;
        self.stats.lines_read += lines.len();
        let mut poll = Poll {
            lines_read: lines.len(),
            entries: Vec::new(),
        };

        for line in &lines {
            for entry in matcher::match_line(line, &self.patterns) {
                writeln!(self.out, "\n🚨 [{}] {}", Local::now().format("%H:%M:%S"), entry)?;
                self.stats.alerts += 1;
                self.notifier.alert(&entry.to_string(), &mut self.out).await;
                poll.entries.push(entry);
            }
        }

        Ok(poll)
    }

    fn say(&mut self, message: &str) {
        if let Err(e) = writeln!(self.out, "{}", message) {
            log::warn!("Failed to write to console: {}", e);
        }
    }

    /// Poll until `shutdown` resolves.
    ///
    /// Shutdown wins over an in-flight poll, so a slow mail server cannot hold
    /// the monitor open. Read errors are logged and treated as "nothing new"
    /// so a transient failure does not end surveillance.
    pub async fn run_until<F: Future<Output = ()>>(&mut self, shutdown: F) -> MonitorStats {
        let banner = format!(
            "🔍 Monitoring {} for suspicious activity... Press Ctrl+C to stop.",
            self.tailer.path().display()
        );
        self.say(&banner);
        tokio::pin!(shutdown);

        while self.state == MonitorState::PollLoop {
            let polled = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                polled = self.poll_once() => polled,
            };

            let lines_read = match polled {
                Ok(poll) => poll.lines_read,
                Err(e) => {
                    log::warn!("Error reading {:?}: {}", self.tailer.path(), e);
                    0
                }
            };
            let delay = if lines_read == 0 {
                self.interval
            } else {
                Duration::ZERO
            };

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.state = MonitorState::Stopped;
        self.say("\n🛑 Stopping log monitoring.");
        log::info!(
            "Monitor stopped: {} line(s) read, {} alert(s), {} email(s) sent, {} failed",
            self.stats.lines_read,
            self.stats.alerts,
            self.notifier.stats().sent,
            self.notifier.stats().failed
        );
        self.stats
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    pub fn notifier(&self) -> &Notifier<M> {
        &self.notifier
    }

    pub fn output(&self) -> &W {
        &self.out
    }
}
