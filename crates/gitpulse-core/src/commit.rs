//! Commit records produced by the log parser.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// One historical change as reported by the log source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Full revision id.
    pub revision: CompactString,
    /// Author name.
    pub author: CompactString,
    /// Calendar day, `YYYY-MM-DD`.
    pub date: CompactString,
    /// Subject line.
    pub message: String,
    /// Lines added, when line-change extraction was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_added: Option<u64>,
    /// Lines deleted, when line-change extraction was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_deleted: Option<u64>,
}

impl CommitRecord {
    /// Create a record without line statistics.
    pub fn new(
        revision: impl Into<CompactString>,
        author: impl Into<CompactString>,
        date: impl Into<CompactString>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            revision: revision.into(),
            author: author.into(),
            date: date.into(),
            message: message.into(),
            lines_added: None,
            lines_deleted: None,
        }
    }

    /// Return a copy carrying the given line statistics.
    pub fn with_line_stats(mut self, stats: LineStats) -> Self {
        self.lines_added = Some(stats.added);
        self.lines_deleted = Some(stats.deleted);
        self
    }

    /// Lines added, zero when unknown.
    pub fn added(&self) -> u64 {
        self.lines_added.unwrap_or(0)
    }

    /// Lines deleted, zero when unknown.
    pub fn deleted(&self) -> u64 {
        self.lines_deleted.unwrap_or(0)
    }
}

/// Added/deleted line totals for one revision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineStats {
    pub added: u64,
    pub deleted: u64,
}

impl LineStats {
    pub fn new(added: u64, deleted: u64) -> Self {
        Self { added, deleted }
    }
}
