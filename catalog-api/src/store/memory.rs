use super::{compare_for_sort, matches, DocumentStore, FindOptions, SortDirection};
use crate::pool::StoreConnector;
use anyhow::{Context, Result};
use async_trait::async_trait;
use filter_query::Predicate;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Read-only collections of JSON documents held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: HashMap<String, Vec<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, name: impl Into<String>, documents: Vec<Value>) -> Self {
        self.collections.insert(name.into(), documents);
        self
    }

    /// Loads every `*.json` file in `dir` as a collection named after the
    /// file stem. Each file must hold a JSON array of documents.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut store = Self::new();
        let entries = fs_err::read_dir(dir)
            .with_context(|| format!("Failed to read data directory {}", dir.display()))?;

        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let contents = fs_err::read_to_string(&path)?;
            let documents: Vec<Value> = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse collection file {}", path.display()))?;
            tracing::info!(
                "Loaded collection {} with {} documents",
                name,
                documents.len()
            );
            store.collections.insert(name.to_string(), documents);
        }

        Ok(store)
    }

    pub fn collection_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.collections.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Filter, sort, paginate and project one collection.
    pub fn execute(documents: &[Value], filter: &Predicate, options: &FindOptions) -> Vec<Value> {
        let mut matched: Vec<&Value> = documents
            .iter()
            .filter(|doc| matches(doc, filter.as_map()))
            .collect();

        if !options.sort.is_empty() {
            matched.sort_by(|a, b| {
                options
                    .sort
                    .iter()
                    .map(|key| {
                        let ordering = compare_for_sort(a, b, &key.field);
                        match key.direction {
                            SortDirection::Ascending => ordering,
                            SortDirection::Descending => ordering.reverse(),
                        }
                    })
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        matched
            .into_iter()
            .skip(options.skip)
            .take(options.limit.unwrap_or(usize::MAX))
            .map(|doc| project(doc, &options.exclude))
            .collect()
    }
}

fn project(document: &Value, exclude: &[String]) -> Value {
    let mut document = document.clone();
    if let Value::Object(map) = &mut document {
        for field in exclude {
            map.remove(field);
        }
    }
    document
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Predicate,
        options: &FindOptions,
    ) -> Result<Vec<Value>> {
        match self.collections.get(collection) {
            Some(documents) => Ok(Self::execute(documents, filter, options)),
            None => {
                tracing::debug!("Collection {} not found, returning no documents", collection);
                Ok(Vec::new())
            }
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Connects by (re)loading a data directory into a fresh [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    data_dir: PathBuf,
}

impl MemoryConnector {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

#[async_trait]
impl StoreConnector for MemoryConnector {
    async fn connect(&self) -> Result<Arc<dyn DocumentStore>> {
        let dir = self.data_dir.clone();
        let store = tokio::task::spawn_blocking(move || MemoryStore::load_dir(&dir)).await??;
        Ok(Arc::new(store))
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.data_dir.display())
    }
}
