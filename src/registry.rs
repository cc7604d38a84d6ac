// 🗂️ Snapshot File Registry - dated extracts on disk, grouped by generation
//
// Naming convention:
//   <client>-<type>-<YYYY>-<MM>-<DD>.<ext>   dated history
//   <client>-<type>-current.<ext>            always-regenerated alias (ignored)
//
// Every scan is a fresh point-in-time listing owned by the returned registry.

use crate::error::{FeedError, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Trailing segment of alias files
pub const CURRENT_ALIAS: &str = "current";

/// `<client>-<kind>-<YYYY>-<MM>-<DD>.<ext>`
pub fn dated_file_name(client: &str, kind: &str, date: NaiveDate, ext: &str) -> String {
    format!("{}-{}-{}.{}", client, kind, date.format("%Y-%m-%d"), ext)
}

/// `<client>-<kind>-current.<ext>`
pub fn alias_file_name(client: &str, kind: &str, ext: &str) -> String {
    format!("{}-{}-{}.{}", client, kind, CURRENT_ALIAS, ext)
}

// ============================================================================
// FILE RECORD
// ============================================================================

/// One dated extract
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub file_name: String,
    pub client_id: String,
    /// Record type, e.g. `plans`, `builders`, `feed`
    pub kind: String,
    pub date: NaiveDate,
    pub ext: String,
}

impl FileRecord {
    /// Parse a dated filename. Aliases are not dated and fail here too.
    pub fn parse(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FeedError::MalformedFilename(path.display().to_string()))?
            .to_string();
        let malformed = || FeedError::MalformedFilename(file_name.clone());

        let (stem, ext) = file_name.rsplit_once('.').ok_or_else(malformed)?;
        let segments: Vec<&str> = stem.split('-').collect();
        if segments.len() < 5 || ext.is_empty() {
            return Err(malformed());
        }

        let n = segments.len();
        let (year, month, day) = (segments[n - 3], segments[n - 2], segments[n - 1]);
        let widths_ok = year.len() == 4 && month.len() == 2 && day.len() == 2;
        let all_digits = [year, month, day]
            .iter()
            .all(|s| s.bytes().all(|b| b.is_ascii_digit()));
        if !widths_ok || !all_digits {
            return Err(malformed());
        }
        let date = NaiveDate::parse_from_str(&format!("{}-{}-{}", year, month, day), "%Y-%m-%d")
            .map_err(|_| malformed())?;

        let client_id = segments[0];
        let kind = segments[1..n - 3].join("-");
        if client_id.is_empty() || kind.is_empty() {
            return Err(malformed());
        }

        Ok(FileRecord {
            path: path.to_path_buf(),
            client_id: client_id.to_string(),
            kind,
            date,
            ext: ext.to_string(),
            file_name,
        })
    }

    /// Load a dated CSV extract back as header → value rows
    pub fn read_rows(&self) -> Result<Vec<BTreeMap<String, String>>> {
        let mut rdr = csv::Reader::from_path(&self.path)?;
        let mut rows = Vec::new();
        for row in rdr.deserialize::<BTreeMap<String, String>>() {
            rows.push(row?);
        }
        Ok(rows)
    }
}

/// `true` for `...-current.<ext>` and `...-<client>.<ext>` aliases
fn is_alias(file_name: &str, client_key: &str) -> bool {
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);
    let trailing = stem.rsplit('-').next().unwrap_or(stem);
    trailing == CURRENT_ALIAS || trailing == client_key
}

// ============================================================================
// REGISTRY
// ============================================================================

/// All records sharing one date, keyed by record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generation {
    pub date: NaiveDate,
    pub files: BTreeMap<String, FileRecord>,
}

impl Generation {
    pub fn get(&self, kind: &str) -> Option<&FileRecord> {
        self.files.get(kind)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotRegistry {
    records: Vec<FileRecord>,
}

impl SnapshotRegistry {
    /// List `dir` for dated `.<ext>` extracts of `client_key`
    ///
    /// Hidden and underscore-prefixed files, other extensions and aliases are
    /// ignored. A filename that doesn't fit the convention is logged and
    /// skipped; it never fails the scan.
    pub fn scan(dir: &Path, ext: &str, client_key: &str) -> Result<Self> {
        let mut records = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if file_name.starts_with('_') || file_name.starts_with('.') {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(ext) {
                continue;
            }
            if is_alias(file_name, client_key) {
                debug!(file = file_name, "Skipping alias");
                continue;
            }

            match FileRecord::parse(&path) {
                Ok(record) if record.client_id == client_key => records.push(record),
                Ok(record) => {
                    debug!(
                        file = %record.file_name,
                        client = %record.client_id,
                        "Skipping other client"
                    )
                }
                Err(err) => warn!(%err, "Skipping file"),
            }
        }

        debug!(dir = %dir.display(), count = records.len(), "Registry scanned");
        Ok(SnapshotRegistry { records })
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One generation per distinct date, newest first
    pub fn generations(&self) -> Vec<Generation> {
        let mut sorted: Vec<&FileRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.kind.cmp(&b.kind)));

        let mut generations: Vec<Generation> = Vec::new();
        for record in sorted {
            if let Some(current) = generations.last_mut().filter(|g| g.date == record.date) {
                current.files.insert(record.kind.clone(), record.clone());
                continue;
            }
            let mut files = BTreeMap::new();
            files.insert(record.kind.clone(), record.clone());
            generations.push(Generation {
                date: record.date,
                files,
            });
        }
        generations
    }

    /// Newest generation
    pub fn latest(&self) -> Result<BTreeMap<String, FileRecord>> {
        self.previous(0)
    }

    /// Generation `n` counting back from the newest (`n = 1` is the second-newest date)
    pub fn previous(&self, n: usize) -> Result<BTreeMap<String, FileRecord>> {
        let mut generations = self.generations();
        let available = generations.len();
        if n >= available {
            return Err(FeedError::NotFound(format!(
                "generation {} (only {} available)",
                n, available
            )));
        }
        Ok(generations.swap_remove(n).files)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) {
        fs::write(dir.path().join(name), "id,name\n1,Aspen\n").unwrap();
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_file_record() {
        let record = FileRecord::parse(Path::new("/data/acme-plans-2024-01-10.csv")).unwrap();
        assert_eq!(record.client_id, "acme");
        assert_eq!(record.kind, "plans");
        assert_eq!(record.date, date(2024, 1, 10));
        assert_eq!(record.ext, "csv");
        assert_eq!(record.file_name, "acme-plans-2024-01-10.csv");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for name in [
            "acme-plans-current.csv",
            "acme-plans-2024-1-10.csv",
            "acme-plans-2024-02-30.csv",
            "acme-2024-01-10.csv",
            "plans.csv",
            "acme-plans-2024-01-10",
        ] {
            let result = FileRecord::parse(Path::new(name));
            assert!(
                matches!(result, Err(FeedError::MalformedFilename(_))),
                "{} should be malformed",
                name
            );
        }
    }

    #[test]
    fn test_alias_detection() {
        assert!(is_alias("acme-plans-current.csv", "acme"));
        assert!(is_alias("acme-plans-acme.csv", "acme"));
        assert!(!is_alias("acme-plans-2024-01-10.csv", "acme"));
    }

    #[test]
    fn test_latest_and_previous_generations() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "acme-plans-2024-01-10.csv");
        touch(&dir, "acme-builders-2024-01-10.csv");
        touch(&dir, "acme-plans-2024-01-05.csv");
        touch(&dir, "acme-plans-current.csv");

        let registry = SnapshotRegistry::scan(dir.path(), "csv", "acme").unwrap();
        assert_eq!(registry.records().len(), 3);

        let latest = registry.latest().unwrap();
        assert_eq!(latest.len(), 2);
        assert!(latest.values().all(|r| r.date == date(2024, 1, 10)));
        assert!(latest.contains_key("plans") && latest.contains_key("builders"));

        let previous = registry.previous(1).unwrap();
        assert_eq!(previous.len(), 1);
        assert_eq!(previous["plans"].date, date(2024, 1, 5));

        assert!(matches!(registry.previous(2), Err(FeedError::NotFound(_))));
    }

    #[test]
    fn test_scan_skips_noise() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "acme-plans-2024-01-10.csv");
        touch(&dir, "_acme-plans-2024-01-09.csv");
        touch(&dir, ".acme-plans-2024-01-08.csv");
        touch(&dir, "acme-plans-2024-01-07.xml");
        touch(&dir, "acme-plans-someday.csv");
        touch(&dir, "globex-plans-2024-01-06.csv");
        fs::create_dir(dir.path().join("acme-plans-2024-01-05.csv")).unwrap();

        let registry = SnapshotRegistry::scan(dir.path(), "csv", "acme").unwrap();
        let names: Vec<&str> = registry.records().iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["acme-plans-2024-01-10.csv"]);
        assert_eq!(registry.generations().len(), 1);
    }

    #[test]
    fn test_empty_registry() {
        let dir = TempDir::new().unwrap();
        let registry = SnapshotRegistry::scan(dir.path(), "xml", "acme").unwrap();
        assert!(registry.is_empty());
        assert!(registry.latest().unwrap_err().is_not_found());
    }

    #[test]
    fn test_scans_are_independent() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "acme-feed-2024-01-10.xml");
        let first = SnapshotRegistry::scan(dir.path(), "xml", "acme").unwrap();

        touch(&dir, "acme-feed-2024-01-11.xml");
        let second = SnapshotRegistry::scan(dir.path(), "xml", "acme").unwrap();

        assert_eq!(first.records().len(), 1);
        assert_eq!(second.records().len(), 2);
        assert_eq!(second.latest().unwrap()["feed"].date, date(2024, 1, 11));
    }

    #[test]
    fn test_read_rows() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "acme-plans-2024-01-10.csv");
        let record = FileRecord::parse(&dir.path().join("acme-plans-2024-01-10.csv")).unwrap();

        let rows = record.read_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Aspen");
        assert_eq!(rows[0]["id"], "1");
    }

    #[test]
    fn test_file_name_helpers() {
        assert_eq!(
            dated_file_name("acme", "plans", date(2024, 1, 5), "csv"),
            "acme-plans-2024-01-05.csv"
        );
        assert_eq!(alias_file_name("acme", "plans", "csv"), "acme-plans-current.csv");
        let name = dated_file_name("acme", "subdivs", date(2024, 3, 1), "csv");
        let round = FileRecord::parse(Path::new(&name)).unwrap();
        assert_eq!(round.kind, "subdivs");
    }
}
