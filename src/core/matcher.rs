use std::fmt;

use super::config::PatternSet;

/// A line that matched one labelled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEntry {
    pub label: String,
    /// The matching line with trailing whitespace removed.
    pub line: String,
}

impl MatchEntry {
    pub fn new(label: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            line: line.into(),
        }
    }
}

impl fmt::Display for MatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] -> {}", self.label, self.line)
    }
}

/// Test `line` against every pattern, in config order.
///
/// Patterns are searched anywhere in the line (unanchored, case-sensitive) and
/// every pattern that matches yields its own entry.
pub fn match_line(line: &str, patterns: &PatternSet) -> Vec<MatchEntry> {
    let trimmed = line.trim_end();
    patterns
        .iter()
        .filter(|(_, regex)| regex.is_match(line))
        .map(|(label, _)| MatchEntry::new(label, trimmed))
        .collect()
}
