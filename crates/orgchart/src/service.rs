//! Where hierarchy, settings and search results come from.
//!
//! Calls are one-shot: no retry and no timeout. The [`Session`](crate::Session) decides
//! how each failure degrades.

use orgchart_core::import::assemble;
use orgchart_core::{
    ChartSettings, Employee, Error, FlatEmployee, Result, RootHint, SearchHit, SearchIndex,
    SearchOptions, is_searchable,
};
use std::path::{Path, PathBuf};

pub const EMPLOYEES_FILE: &str = "employees.json";
pub const SETTINGS_FILE: &str = "settings.json";

pub trait DataService {
    /// The whole hierarchy as one rooted record.
    fn fetch_employees(&self) -> Result<Employee>;

    fn fetch_settings(&self) -> Result<ChartSettings>;

    /// Ordered `{id, name, title}` matches. Queries shorter than two characters match nothing.
    fn search(&self, query: &str) -> Result<Vec<SearchHit>>;

    /// A single record with its subtree, or `None` when the id is unknown.
    fn fetch_employee(&self, id: &str) -> Result<Option<Employee>> {
        let root = self.fetch_employees()?;
        let mut stack = vec![root];
        while let Some(mut e) = stack.pop() {
            if e.id == id {
                return Ok(Some(e));
            }
            stack.extend(std::mem::take(&mut e.children).into_iter().rev());
        }
        Ok(None)
    }
}

fn search_root(root: &Employee, query: &str) -> Vec<SearchHit> {
    if !is_searchable(query) {
        return Vec::new();
    }
    SearchIndex::from_root(root).search(query, &SearchOptions::default())
}

/// Serves a directory holding `employees.json` and (optionally) `settings.json`.
///
/// `employees.json` may hold either the nested tree or a flat array of records with
/// `managerId` links; the latter is assembled on every read.
#[derive(Debug, Clone)]
pub struct FileDataService {
    dir: PathBuf,
    root_hint: RootHint,
}

impl FileDataService {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            root_hint: RootHint::default(),
        }
    }

    pub fn with_root_hint(mut self, hint: RootHint) -> Self {
        self.root_hint = hint;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read(&self, name: &str) -> std::io::Result<String> {
        std::fs::read_to_string(self.dir.join(name))
    }
}

/// Parses either shape of employee document.
pub fn parse_employees(text: &str, hint: &RootHint) -> Result<Employee> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if value.is_array() {
        let records: Vec<FlatEmployee> = serde_json::from_value(value)?;
        return assemble(&records, hint);
    }
    Ok(serde_json::from_value(value)?)
}

impl DataService for FileDataService {
    fn fetch_employees(&self) -> Result<Employee> {
        let text = self.read(EMPLOYEES_FILE).map_err(|e| Error::DataFetch {
            message: format!("{}: {e}", self.dir.join(EMPLOYEES_FILE).display()),
        })?;
        parse_employees(&text, &self.root_hint).map_err(|e| Error::DataFetch {
            message: e.to_string(),
        })
    }

    fn fetch_settings(&self) -> Result<ChartSettings> {
        let text = self.read(SETTINGS_FILE).map_err(|e| Error::SettingsFetch {
            message: format!("{}: {e}", self.dir.join(SETTINGS_FILE).display()),
        })?;
        ChartSettings::from_json(&text)
    }

    fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let root = self.fetch_employees().map_err(|e| Error::Search {
            message: e.to_string(),
        })?;
        Ok(search_root(&root, query))
    }
}

/// In-memory documents, mainly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticDataService {
    employees: Option<String>,
    settings: Option<String>,
}

impl StaticDataService {
    pub fn new(employees: impl Into<String>) -> Self {
        Self {
            employees: Some(employees.into()),
            settings: None,
        }
    }

    /// A service whose every call fails, for exercising the degraded paths.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn with_settings(mut self, settings: impl Into<String>) -> Self {
        self.settings = Some(settings.into());
        self
    }
}

impl DataService for StaticDataService {
    fn fetch_employees(&self) -> Result<Employee> {
        let text = self.employees.as_deref().ok_or_else(|| Error::DataFetch {
            message: "no employee document".to_string(),
        })?;
        parse_employees(text, &RootHint::default())
    }

    fn fetch_settings(&self) -> Result<ChartSettings> {
        let text = self.settings.as_deref().ok_or_else(|| Error::SettingsFetch {
            message: "no settings document".to_string(),
        })?;
        ChartSettings::from_json(text)
    }

    fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let root = self.fetch_employees().map_err(|e| Error::Search {
            message: e.to_string(),
        })?;
        Ok(search_root(&root, query))
    }
}
