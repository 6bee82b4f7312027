//! Parsers for `git log` and `git show --numstat` output.

use gitpulse_core::{CommitRecord, LineStats};

/// Pretty format producing one `revision|author|date|subject` line per commit.
///
/// Used together with `--date=short`.
pub const LOG_FORMAT: &str = "%H|%an|%ad|%s";

const FIELD_SEPARATOR: char = '|';

/// Parse log output produced with [`LOG_FORMAT`].
///
/// Blank lines and lines with fewer than four fields are skipped. Everything
/// after the third separator is the subject, separators included. Input order
/// is preserved.
pub fn parse_log(output: &str) -> Vec<CommitRecord> {
    output.lines().filter_map(parse_log_line).collect()
}

fn parse_log_line(line: &str) -> Option<CommitRecord> {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
        return None;
    }

    let mut fields = line.splitn(4, FIELD_SEPARATOR);
    let revision = fields.next()?;
    let author = fields.next()?;
    let date = fields.next()?;
    let message = fields.next()?;

    Some(CommitRecord::new(revision, author, date, message))
}

/// Sum the added/deleted counts of a numstat report.
///
/// Lines must start with `<added><ws><deleted><ws>`; anything else, including
/// binary entries reported as `-\t-\tpath`, is skipped.
pub fn parse_numstat(output: &str) -> LineStats {
    output
        .lines()
        .filter_map(parse_numstat_line)
        .fold(LineStats::default(), |acc, (added, deleted)| {
            LineStats::new(acc.added + added, acc.deleted + deleted)
        })
}

fn parse_numstat_line(line: &str) -> Option<(u64, u64)> {
    let (added, rest) = split_number(line)?;
    let rest = strip_whitespace(rest)?;
    let (deleted, rest) = split_number(rest)?;
    strip_whitespace(rest)?;
    Some((added, deleted))
}

/// Split a leading run of ASCII digits off `s`.
fn split_number(s: &str) -> Option<(u64, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}

/// Strip at least one leading whitespace character.
fn strip_whitespace(s: &str) -> Option<&str> {
    let trimmed = s.trim_start();
    (trimmed.len() < s.len()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_commits() {
        let output = "abc123|Alice|2024-01-05|Fix bug\ndef456|Bob|2024-01-05|Add feature";
        let commits = parse_log(output);

        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].revision, "abc123");
        assert_eq!(commits[0].author, "Alice");
        assert_eq!(commits[0].date, "2024-01-05");
        assert_eq!(commits[0].message, "Fix bug");
        assert_eq!(commits[1].author, "Bob");
        assert!(commits[1].lines_added.is_none());
    }

    #[test]
    fn test_subject_keeps_separators() {
        let commits = parse_log("abc|Alice|2024-01-05|feat: a | b || c");
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].message, "feat: a | b || c");
    }

    #[test]
    fn test_short_and_blank_lines_skipped() {
        let output = "\nabc|Alice|2024-01-05\n   \nonly-one-field\ndef|Bob|2024-01-06|ok\n";
        let commits = parse_log(output);
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].revision, "def");
    }

    #[test]
    fn test_empty_subject_is_still_a_commit() {
        let commits = parse_log("abc|Alice|2024-01-05|");
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].message, "");
    }

    #[test]
    fn test_crlf_line_endings() {
        let commits = parse_log("abc|Alice|2024-01-05|Fix\r\ndef|Bob|2024-01-06|Add\r\n");
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].message, "Fix");
    }

    #[test]
    fn test_parse_is_idempotent() {
        let output = "abc|Alice|2024-01-05|Fix\nbroken\ndef|Bob|2024-01-06|Add | more";
        assert_eq!(parse_log(output), parse_log(output));
    }

    #[test]
    fn test_numstat_skips_binary() {
        let stats = parse_numstat("10\t5\tfoo.ts\n-\t-\tbin/blob");
        assert_eq!(stats, LineStats::new(10, 5));
    }

    #[test]
    fn test_numstat_accumulates() {
        let output = "1\t2\ta.rs\n30\t0\tb.rs\n\n0\t7\tc.rs\n";
        assert_eq!(parse_numstat(output), LineStats::new(31, 9));
    }

    #[test]
    fn test_numstat_requires_trailing_whitespace() {
        // A count pair with no path separator does not match
        assert_eq!(parse_numstat("12\t4"), LineStats::default());
        assert_eq!(parse_numstat("12 4 spaced.txt"), LineStats::new(12, 4));
    }

    #[test]
    fn test_numstat_rejects_noise() {
        assert_eq!(parse_numstat("commit abc\nAuthor: x\n"), LineStats::default());
        assert_eq!(parse_numstat(""), LineStats::default());
    }
}
