//! The persisted multi-year budget store.
//!
//! The store is a single JSON object keyed by fiscal year:
//!
//! ```json
//! {
//!   "2025": {
//!     "esoda": [{ "ID": 11, "BILL": "Φόροι", "VALUE": 62000000000.0 }],
//!     "eksoda": [...]
//!   }
//! }
//! ```
//!
//! A run loads it once, replaces the entries of the years it processed, and
//! writes it back whole. Entries of other years are carried as the JSON
//! values that were read, so rewriting the file leaves them as they were
//! (key order included).

use std::path::{Path, PathBuf};

use gov_budget_models::{BudgetSection, YearBudget};
use serde_json::{Map, Value};

use crate::StoreError;

/// In-memory view of the budget JSON store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetStore {
    years: Map<String, Value>,
}

impl BudgetStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the store at `path`, or an empty store if the file does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Malformed`] if the file is not valid JSON,
    /// [`StoreError::NotAnObject`] if its top-level value is not an object,
    /// or [`StoreError::Io`] if it cannot be read.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No store at {}; starting empty", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };
        let value: Value =
            serde_json::from_str(&content).map_err(|source| StoreError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        let Value::Object(years) = value else {
            return Err(StoreError::NotAnObject {
                path: path.to_path_buf(),
            });
        };

        log::info!(
            "Loaded store {} with {} year(s)",
            path.display(),
            years.len()
        );

        Ok(Self { years })
    }

    /// Sets the entry for `year` to the given sections.
    ///
    /// Any previous entry for that exact year is replaced wholesale and
    /// keeps its position; a new year is appended. No other entry is
    /// touched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Json`] if the sections cannot be converted to
    /// JSON.
    pub fn merge_year(
        &mut self,
        year: &str,
        esoda: BudgetSection,
        eksoda: BudgetSection,
    ) -> Result<(), StoreError> {
        let entry = YearBudget { esoda, eksoda };
        let lines = (entry.esoda.len(), entry.eksoda.len());
        let value = serde_json::to_value(entry)?;

        if self.years.insert(year.to_owned(), value).is_some() {
            log::info!(
                "Replaced year {year}: {} revenue, {} expenditure line(s)",
                lines.0,
                lines.1
            );
        } else {
            log::info!(
                "Added year {year}: {} revenue, {} expenditure line(s)",
                lines.0,
                lines.1
            );
        }

        Ok(())
    }

    /// Returns the typed entry for `year`, if present.
    ///
    /// # Errors
    ///
    /// The inner result is [`StoreError::Entry`] if the stored value does
    /// not have the `{esoda, eksoda}` shape.
    #[must_use]
    pub fn year(&self, year: &str) -> Option<Result<YearBudget, StoreError>> {
        self.years.get(year).map(|value| {
            serde_json::from_value(value.clone()).map_err(|source| StoreError::Entry {
                year: year.to_owned(),
                source,
            })
        })
    }

    /// Year keys in store order.
    pub fn years(&self) -> impl Iterator<Item = &str> {
        self.years.keys().map(String::as_str)
    }

    /// Number of years in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.years.len()
    }

    /// Whether the store has no years.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Serializes the store as pretty-printed JSON with two-space indents.
    ///
    /// Non-ASCII text is written as-is, not escaped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Json`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.years)?)
    }

    /// Writes the whole store to `path`.
    ///
    /// The JSON is written to a sibling `.tmp` file first and renamed over
    /// `path`, so an interrupted write never leaves a truncated store.
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be written, or
    /// [`StoreError::Json`] if serialization fails.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = self.to_json_string()?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = tmp_path(path);
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;

        log::info!(
            "Wrote store {} with {} year(s)",
            path.display(),
            self.years.len()
        );

        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Returns `store` with `year` set to the given sections.
///
/// Functional form of [`BudgetStore::merge_year`].
///
/// # Errors
///
/// Returns [`StoreError::Json`] if the sections cannot be converted to
/// JSON.
pub fn merge_into_store(
    mut store: BudgetStore,
    year: &str,
    esoda: BudgetSection,
    eksoda: BudgetSection,
) -> Result<BudgetStore, StoreError> {
    store.merge_year(year, esoda, eksoda)?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use gov_budget_models::BudgetLine;

    use super::*;

    fn line(id: i64, bill: &str, value: f64) -> BudgetLine {
        BudgetLine {
            id,
            bill: bill.to_owned(),
            value,
        }
    }

    fn raw_entry<'a>(store: &'a BudgetStore, year: &str) -> Option<&'a Value> {
        store.years.get(year)
    }

    fn temp_store_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("gov_budget_store_{}", uuid::Uuid::new_v4()))
            .join("budget.json")
    }

    #[test]
    fn missing_file_loads_empty() {
        let store = BudgetStore::load(&temp_store_path()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn unreadable_path_is_not_an_empty_store() {
        let path = temp_store_path();
        std::fs::create_dir_all(&path).unwrap();

        let err = BudgetStore::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn merge_into_empty_store_has_one_year() {
        let store = merge_into_store(
            BudgetStore::new(),
            "2025",
            vec![line(11, "Φόροι", 1.0)],
            vec![line(21, "Παροχές", 2.0)],
        )
        .unwrap();

        assert_eq!(store.years().collect::<Vec<_>>(), vec!["2025"]);
    }

    #[test]
    fn merge_leaves_other_years_untouched() {
        let mut store = BudgetStore::new();
        store
            .merge_year("2023", vec![line(1, "old", 5.0)], Vec::new())
            .unwrap();
        let before_2023 = raw_entry(&store, "2023").cloned();

        let a = vec![line(11, "A", 100.0)];
        let b = vec![line(21, "B", 200.0), line(22, "C", 300.0)];
        store.merge_year("2024", a.clone(), b.clone()).unwrap();

        assert_eq!(raw_entry(&store, "2023").cloned(), before_2023);
        let year = store.year("2024").unwrap().unwrap();
        assert_eq!(year, YearBudget { esoda: a, eksoda: b });
    }

    #[test]
    fn replacing_a_year_is_wholesale_and_keeps_position() {
        let mut store = BudgetStore::new();
        store
            .merge_year("2024", vec![line(1, "x", 1.0), line(2, "y", 2.0)], Vec::new())
            .unwrap();
        store.merge_year("2025", Vec::new(), Vec::new()).unwrap();
        store
            .merge_year("2024", vec![line(3, "z", 3.0)], Vec::new())
            .unwrap();

        assert_eq!(store.years().collect::<Vec<_>>(), vec!["2024", "2025"]);
        let year = store.year("2024").unwrap().unwrap();
        assert_eq!(year.esoda, vec![line(3, "z", 3.0)]);
    }

    #[test]
    fn pretty_json_keeps_native_script() {
        let mut store = BudgetStore::new();
        store
            .merge_year("2025", vec![line(11, "Φόροι", 1234.0)], Vec::new())
            .unwrap();

        let json = store.to_json_string().unwrap();
        assert!(json.contains("\"BILL\": \"Φόροι\""));
        assert!(json.contains("\"VALUE\": 1234.0"));
        assert!(json.starts_with("{\n  \"2025\": {\n    \"esoda\": ["));
    }

    #[test]
    fn save_then_load_round_trips_and_preserves_foreign_entries() {
        let path = temp_store_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"{"2026": {"esoda": [], "eksoda": [], "note": "hand-edited"}, "2023": {"esoda": [{"ID": 1, "BILL": "Ω", "VALUE": 7}], "eksoda": []}}"#,
        )
        .unwrap();

        let mut store = BudgetStore::load(&path).unwrap();
        store
            .merge_year("2025", vec![line(11, "Φόροι", 1.5)], Vec::new())
            .unwrap();
        store.save(&path).unwrap();

        let reloaded = BudgetStore::load(&path).unwrap();
        assert_eq!(
            reloaded.years().collect::<Vec<_>>(),
            vec!["2026", "2023", "2025"]
        );
        assert_eq!(
            raw_entry(&reloaded, "2026").unwrap()["note"],
            Value::String("hand-edited".to_owned())
        );
        assert_eq!(raw_entry(&reloaded, "2023").unwrap()["esoda"][0]["VALUE"], 7);
        assert!(!tmp_path(&path).exists());

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn invalid_json_is_fatal() {
        let path = temp_store_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        let err = BudgetStore::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn non_object_json_is_fatal() {
        let path = temp_store_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let err = BudgetStore::load(&path).unwrap_err();
        assert!(matches!(&err, StoreError::NotAnObject { path: p } if *p == path));
        assert!(err.to_string().contains("budget.json"));

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn malformed_entry_is_reported_per_year() {
        let mut store = BudgetStore::new();
        store.years.insert("1999".to_owned(), Value::from(5));
        assert!(matches!(
            store.year("1999"),
            Some(Err(StoreError::Entry { .. }))
        ));
        assert!(store.year("2000").is_none());
    }
}
