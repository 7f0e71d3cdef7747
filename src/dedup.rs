// src/dedup.rs
//! Durable record of already-published links.
//!
//! One append-only log file per UTC calendar day
//! (`posted_links_YYYY-MM-DD.log`), tab-separated, one record per line:
//!
//! ```text
//! # technews dedup log v1
//! https://example.com/story<TAB>2026-08-29<TAB>2026-08-29T10:00:00+00:00
//! ```
//!
//! When the day rolls over a fresh empty store begins and older logs are not
//! consulted by `contains`. That is a deliberate trade-off: retention stays a
//! matter of deleting old files, at the cost of cross-day dedup accuracy.
//! Appends never rewrite earlier lines, so a crash mid-write loses at most
//! the single in-flight record.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const HEADER: &str = "# technews dedup log v1";

#[derive(Debug)]
pub struct DedupStore {
    path: PathBuf,
    day: NaiveDate,
    links: HashSet<String>,
}

impl DedupStore {
    /// Open (or start) the store for the given day, loading any existing log.
    ///
    /// Loading fails soft: a missing file means a fresh store, and malformed
    /// lines are skipped with a warning rather than aborting the load.
    pub fn open(dir: &Path, day: NaiveDate) -> Result<Self> {
        let path = dir.join(format!("posted_links_{day}.log"));
        let mut links = HashSet::new();

        match fs::read_to_string(&path) {
            Ok(content) => {
                for (lineno, line) in content.lines().enumerate() {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    let mut fields = line.split('\t');
                    match (fields.next(), fields.next(), fields.next()) {
                        (Some(link), Some(_day), Some(_posted_at)) if !link.is_empty() => {
                            links.insert(link.to_string());
                        }
                        _ => {
                            warn!(
                                path = %path.display(),
                                line = lineno + 1,
                                "skipping malformed dedup log line"
                            );
                        }
                    }
                }
                info!(path = %path.display(), loaded = links.len(), "dedup log loaded");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no dedup log yet, starting fresh");
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("reading dedup log {}", path.display()));
            }
        }

        Ok(Self { path, day, links })
    }

    /// Open the store for today (UTC). Creates `dir` if needed.
    pub fn open_today(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating dedup log dir {}", dir.display()))?;
        Self::open(dir, Utc::now().date_naive())
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// O(1) membership check against the loaded index.
    pub fn contains(&self, link: &str) -> bool {
        self.links.contains(link)
    }

    /// Durably record one published link. Append-only; the in-memory index is
    /// updated before the durable write is acknowledged, so `contains(link)`
    /// holds for the rest of the process even if the write errors out.
    pub fn append(&mut self, link: &str, posted_at: DateTime<Utc>) -> Result<()> {
        self.links.insert(link.to_string());

        let fresh = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening dedup log {}", self.path.display()))?;
        if fresh {
            writeln!(file, "{HEADER}").context("writing dedup log header")?;
        }
        writeln!(file, "{link}\t{}\t{}", self.day, posted_at.to_rfc3339())
            .context("appending dedup log record")?;
        file.flush().context("flushing dedup log")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 29).unwrap()
    }

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 29, 10, 0, 0).unwrap()
    }

    #[test]
    fn fresh_store_is_empty_and_absent_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = DedupStore::open(dir.path(), day()).unwrap();
        assert!(store.is_empty());
        assert!(!store.contains("https://example.com/a"));
    }

    #[test]
    fn append_then_contains_and_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let link = "https://example.com/story";

        let mut store = DedupStore::open(dir.path(), day()).unwrap();
        store.append(link, ts()).unwrap();
        assert!(store.contains(link));

        // Same store, fresh load cycle.
        let reloaded = DedupStore::open(dir.path(), day()).unwrap();
        assert!(reloaded.contains(link));
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn appends_never_rewrite_earlier_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DedupStore::open(dir.path(), day()).unwrap();
        store.append("https://example.com/a", ts()).unwrap();
        let after_one = fs::read_to_string(dir.path().join("posted_links_2026-08-29.log")).unwrap();
        store.append("https://example.com/b", ts()).unwrap();
        let after_two = fs::read_to_string(dir.path().join("posted_links_2026-08-29.log")).unwrap();
        assert!(after_two.starts_with(&after_one));
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posted_links_2026-08-29.log");
        fs::write(
            &path,
            "# technews dedup log v1\n\
             https://example.com/ok\t2026-08-29\t2026-08-29T10:00:00+00:00\n\
             this line has no tabs\n\
             \t2026-08-29\t2026-08-29T10:00:00+00:00\n\
             https://example.com/also-ok\t2026-08-29\t2026-08-29T11:00:00+00:00\n",
        )
        .unwrap();

        let store = DedupStore::open(dir.path(), day()).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.contains("https://example.com/ok"));
        assert!(store.contains("https://example.com/also-ok"));
    }

    #[test]
    fn rotation_starts_a_fresh_store_per_day() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DedupStore::open(dir.path(), day()).unwrap();
        store.append("https://example.com/yesterday", ts()).unwrap();

        let next_day = day().succ_opt().unwrap();
        let rotated = DedupStore::open(dir.path(), next_day).unwrap();
        assert!(!rotated.contains("https://example.com/yesterday"));
        assert!(rotated.is_empty());
    }
}
