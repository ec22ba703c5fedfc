// Alert delivery: console reporting plus best-effort email through a `Mailer`.

use std::io::{self, Write};

use crate::core::error::NotifyError;
use crate::core::matcher::MatchEntry;

/// Subject line used for every alert email.
pub const ALERT_SUBJECT: &str = "LogHawk Security Alert";

/// Something that can deliver a plain-text email to the configured recipient.
#[allow(async_fn_in_trait)]
pub trait Mailer {
    async fn send(&mut self, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Aggregated scan-mode body: one formatted entry per line, in file order.
pub fn email_body(entries: &[MatchEntry]) -> String {
    entries.iter().map(|entry| format!("{}\n", entry)).collect()
}

/// Print the scan result: a confirmation when empty, otherwise a banner and
/// one line per entry.
pub fn report_console(entries: &[MatchEntry], out: &mut impl Write) -> io::Result<()> {
    if entries.is_empty() {
        writeln!(out, "✅ No suspicious activity detected.")?;
        return Ok(());
    }

    writeln!(out, "\n🚨 ALERT: Suspicious activity detected! 🚨")?;
    for entry in entries {
        writeln!(out, "{}", entry)?;
    }
    Ok(())
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryStats {
    pub sent: usize,
    pub failed: usize,
}

pub struct Notifier<M> {
    /// `None` runs console-only.
    mailer: Option<M>,
    stats: DeliveryStats,
}

impl<M: Mailer> Notifier<M> {
    pub fn new(mailer: Option<M>) -> Self {
        Self {
            mailer,
            stats: DeliveryStats::default(),
        }
    }

    /// Send one alert email. Succeeds trivially when email is disabled.
    pub async fn send_email(&mut self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let Some(mailer) = self.mailer.as_mut() else {
            log::debug!("Email disabled, skipping alert delivery");
            return Ok(());
        };
        mailer.send(subject, body).await
    }

    /// Best-effort delivery: a failed send is logged and dropped so that a mail
    /// outage never interrupts monitoring. Confirmation goes to `out`.
    pub async fn alert(&mut self, body: &str, out: &mut impl Write) {
        if self.mailer.is_none() {
            return;
        }
        match self.send_email(ALERT_SUBJECT, body).await {
            Ok(()) => {
                self.stats.sent += 1;
                if let Err(e) = writeln!(out, "📧 Email alert sent successfully.") {
                    log::warn!("Failed to write to console: {}", e);
                }
            }
            Err(e) => {
                self.stats.failed += 1;
                log::error!("❌ Error sending email alert: {}", e);
            }
        }
    }

    pub fn stats(&self) -> DeliveryStats {
        self.stats
    }

    pub fn mailer(&self) -> Option<&M> {
        self.mailer.as_ref()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::core::error::ConfigError;
    use std::path::PathBuf;

    /// Keeps every message instead of sending it.
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Vec<(String, String)>,
    }

    impl Mailer for RecordingMailer {
        async fn send(&mut self, subject: &str, body: &str) -> Result<(), NotifyError> {
            self.sent.push((subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    /// Always fails, like a mail server that is down.
    #[derive(Default)]
    pub struct FailingMailer {
        pub attempts: usize,
    }

    impl Mailer for FailingMailer {
        async fn send(&mut self, _subject: &str, _body: &str) -> Result<(), NotifyError> {
            self.attempts += 1;
            Err(NotifyError::Settings(ConfigError::Missing {
                path: PathBuf::from("email_config.json"),
            }))
        }
    }
}
