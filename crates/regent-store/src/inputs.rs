use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::StoreError;

/// Reserved sibling directory under the data root holding the rolling
/// monthly reference document shared across all dates.
pub const MONTHLY_REFERENCE_DIR: &str = "_monthly_reference";
pub const MONTHLY_DATA_FILE: &str = "monthly_fundamentals.txt";

/// The named raw-text documents available for one agent on one date.
/// Ephemeral: loaded fresh per call, read-only afterwards. Missing files
/// are represented as explicit sentinel text, never silently omitted.
#[derive(Debug, Clone)]
pub struct DailyInputBundle {
    pub date: NaiveDate,
    pub documents: BTreeMap<String, String>,
}

impl DailyInputBundle {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.documents.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: &str, content: String) {
        self.documents.insert(name.to_string(), content);
    }

    /// Whether a document carries real signal: present, non-empty, and
    /// not one of the missing/unreadable sentinels.
    pub fn is_usable(&self, name: &str) -> bool {
        match self.get(name) {
            Some(content) => {
                let trimmed = content.trim();
                !trimmed.is_empty()
                    && !trimmed.starts_with("[FILE NOT FOUND")
                    && !trimmed.starts_with("[ERROR READING FILE")
            }
            None => false,
        }
    }
}

/// Read-only view over the per-date input tree:
/// `<data_dir>/<YYYY-MM-DD>/<name>.txt` plus the monthly reference.
pub struct InputStore {
    data_dir: PathBuf,
}

impl InputStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn date_root(&self, date: NaiveDate) -> PathBuf {
        self.data_dir.join(date.to_string())
    }

    pub fn date_root_exists(&self, date: NaiveDate) -> bool {
        self.date_root(date).is_dir()
    }

    /// Load the requested documents for one date. The date's directory
    /// must exist; individual files may be missing (sentinel text stands
    /// in for them).
    pub fn load_bundle(
        &self,
        date: NaiveDate,
        files: &[String],
    ) -> Result<DailyInputBundle, StoreError> {
        let root = self.date_root(date);
        if !root.is_dir() {
            return Err(StoreError::DateRootMissing(root));
        }

        let mut documents = BTreeMap::new();
        for name in files {
            let path = root.join(name);
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => {
                    debug!(%date, file = %name, chars = content.len(), "loaded input document");
                    content
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(%date, file = %name, "input document missing");
                    format!("[FILE NOT FOUND: {name}]")
                }
                Err(e) => {
                    warn!(%date, file = %name, error = %e, "input document unreadable");
                    format!("[ERROR READING FILE: {e}]")
                }
            };
            documents.insert(name.clone(), content);
        }

        Ok(DailyInputBundle { date, documents })
    }

    /// Rolling monthly reference document, shared across all dates.
    /// Absence is normal and simply yields None.
    pub fn load_monthly(&self) -> Option<String> {
        let path = self
            .data_dir
            .join(MONTHLY_REFERENCE_DIR)
            .join(MONTHLY_DATA_FILE);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                debug!(chars = content.len(), "loaded monthly reference");
                Some(content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "monthly reference unreadable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_date_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = InputStore::new(dir.path());

        let result = store.load_bundle(date("2026-01-20"), &files(&["fundamentals.txt"]));
        assert!(matches!(result, Err(StoreError::DateRootMissing(_))));
        assert!(!store.date_root_exists(date("2026-01-20")));
    }

    #[test]
    fn missing_file_becomes_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let day = dir.path().join("2026-01-20");
        std::fs::create_dir_all(&day).unwrap();
        std::fs::write(day.join("fundamentals.txt"), "T10Y: 4.35%").unwrap();

        let store = InputStore::new(dir.path());
        let bundle = store
            .load_bundle(
                date("2026-01-20"),
                &files(&["fundamentals.txt", "calendar.txt"]),
            )
            .unwrap();

        assert_eq!(bundle.get("fundamentals.txt").unwrap(), "T10Y: 4.35%");
        assert_eq!(
            bundle.get("calendar.txt").unwrap(),
            "[FILE NOT FOUND: calendar.txt]"
        );
        assert!(bundle.is_usable("fundamentals.txt"));
        assert!(!bundle.is_usable("calendar.txt"));
        assert!(!bundle.is_usable("news.txt"));
    }

    #[test]
    fn empty_file_is_not_usable() {
        let dir = tempfile::tempdir().unwrap();
        let day = dir.path().join("2026-01-20");
        std::fs::create_dir_all(&day).unwrap();
        std::fs::write(day.join("news.txt"), "   \n").unwrap();

        let store = InputStore::new(dir.path());
        let bundle = store
            .load_bundle(date("2026-01-20"), &files(&["news.txt"]))
            .unwrap();
        assert!(!bundle.is_usable("news.txt"));
    }

    #[test]
    fn monthly_reference_loading() {
        let dir = tempfile::tempdir().unwrap();
        let store = InputStore::new(dir.path());
        assert!(store.load_monthly().is_none());

        let monthly = dir.path().join(MONTHLY_REFERENCE_DIR);
        std::fs::create_dir_all(&monthly).unwrap();
        std::fs::write(monthly.join(MONTHLY_DATA_FILE), "CPI YoY: 2.9%").unwrap();
        assert_eq!(store.load_monthly().unwrap(), "CPI YoY: 2.9%");
    }
}
