//! One-shot scan of a whole log file.

use std::io::{self, Write};
use std::path::Path;

use super::alerts::{email_body, report_console, Mailer, Notifier};
use super::config::PatternSet;
use super::log_io;
use super::matcher::{self, MatchEntry};

/// Match every line of the file, returning all entries in file order.
pub fn scan(log_path: impl AsRef<Path>, patterns: &PatternSet) -> io::Result<Vec<MatchEntry>> {
    let mut entries = Vec::new();
    log_io::for_each_line(log_path, |line| {
        entries.extend(matcher::match_line(line, patterns));
    })?;
    Ok(entries)
}

/// Scan, print the result to `out`, and send one aggregated email if anything
/// matched.
pub async fn run<M: Mailer>(
    log_path: impl AsRef<Path>,
    patterns: &PatternSet,
    notifier: &mut Notifier<M>,
    out: &mut impl Write,
) -> io::Result<Vec<MatchEntry>> {
    let log_path = log_path.as_ref();
    let entries = scan(log_path, patterns)?;
    log::info!("Scanned {:?}: {} match(es)", log_path, entries.len());

    report_console(&entries, out)?;
    if !entries.is_empty() {
        notifier.alert(&email_body(&entries), out).await;
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alerts::notifier::testing::RecordingMailer;
    use crate::core::alerts::ALERT_SUBJECT;
    use tempfile::tempdir;

    fn error_patterns() -> PatternSet {
        PatternSet::from_pairs([("error", "ERROR")]).unwrap()
    }

    #[test]
    fn test_scan_finds_matches_in_file_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "ERROR one\nINFO ok\nERROR two\n").unwrap();

        let entries = scan(&path, &error_patterns()).unwrap();
        assert_eq!(
            entries,
            vec![
                MatchEntry::new("error", "ERROR one"),
                MatchEntry::new("error", "ERROR two"),
            ]
        );
    }

    #[test]
    fn test_end_anchor_matches_before_line_terminator() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "ERROR disk full\r\nERROR disk full soon\n").unwrap();

        let patterns =
            PatternSet::from_pairs([("full_at_end", "full$"), ("newline", "\n")]).unwrap();
        let entries = scan(&path, &patterns).unwrap();
        assert_eq!(entries, vec![MatchEntry::new("full_at_end", "ERROR disk full")]);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "ERROR one\nINFO ok\nERROR two\n").unwrap();

        let patterns = error_patterns();
        assert_eq!(scan(&path, &patterns).unwrap(), scan(&path, &patterns).unwrap());
    }

    #[test]
    fn test_scan_missing_file() {
        let dir = tempdir().unwrap();
        assert!(scan(dir.path().join("missing.log"), &error_patterns()).is_err());
    }

    #[tokio::test]
    async fn test_run_sends_one_aggregated_email() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "INFO ok\nERROR disk full\n").unwrap();

        let mut notifier = Notifier::new(Some(RecordingMailer::default()));
        let mut out = Vec::new();
        let entries = run(&path, &error_patterns(), &mut notifier, &mut out)
            .await
            .unwrap();

        assert_eq!(entries, vec![MatchEntry::new("error", "ERROR disk full")]);
        let console = String::from_utf8(out).unwrap();
        assert!(console.contains("ALERT"));
        assert!(console.contains("[error] -> ERROR disk full"));
        assert!(console.ends_with("📧 Email alert sent successfully.\n"));

        let sent = &notifier.mailer().unwrap().sent;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ALERT_SUBJECT);
        assert_eq!(sent[0].1, "[error] -> ERROR disk full\n");
    }

    #[tokio::test]
    async fn test_run_without_matches_sends_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "INFO ok\n").unwrap();

        let mut notifier = Notifier::new(Some(RecordingMailer::default()));
        let mut out = Vec::new();
        let entries = run(&path, &error_patterns(), &mut notifier, &mut out)
            .await
            .unwrap();

        assert!(entries.is_empty());
        assert!(String::from_utf8(out).unwrap().contains("No suspicious activity"));
        assert!(notifier.mailer().unwrap().sent.is_empty());
    }
}
