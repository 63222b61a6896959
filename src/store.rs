//! Persisted model bundles
//!
//! One serialized blob per model family under a fixed root, filename
//! derived from the family name. Saving under the same name silently
//! replaces the previous bundle; loading a never-saved name yields a
//! sentinel `None` rather than an error. An advisory `index.json` records
//! what was saved and when; it is never consulted on the load path.

use crate::error::{CardioError, Result};
use crate::models::{Classifier, ModelKind};
use crate::preprocessing::StandardScaler;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Default storage root, relative to the working directory.
pub const DEFAULT_STORE_DIR: &str = "trained_models";

const INDEX_FILE: &str = "index.json";

/// A fitted classifier and the scaler it was fit alongside, treated as one
/// persisted unit. The pair is read-only once saved; retraining supersedes
/// it rather than mutating it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub kind: ModelKind,
    pub classifier: Classifier,
    pub scaler: StandardScaler,
}

/// Index metadata for one saved bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreEntry {
    pub name: String,
    pub slug: String,
    pub path: String,
    pub saved_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct StoreIndex {
    models: BTreeMap<String, StoreEntry>,
}

/// Filesystem-backed store for model bundles.
#[derive(Debug, Clone)]
pub struct ModelStore {
    root: PathBuf,
}

impl ModelStore {
    /// Open (creating if needed) a store rooted at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        if !root.exists() {
            fs::create_dir_all(&root)?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bundle_path(&self, kind: ModelKind) -> PathBuf {
        self.root.join(format!("{}_model.bin", kind.slug()))
    }

    /// Persist a bundle, replacing any previous save for the same family.
    pub fn save(&self, bundle: &ModelBundle) -> Result<PathBuf> {
        let path = self.bundle_path(bundle.kind);
        let bytes = bincode::serialize(bundle)?;

        let mut file = File::create(&path)?;
        file.write_all(&bytes)?;

        self.update_index(bundle.kind, &path)?;
        tracing::info!(model = bundle.kind.name(), path = %path.display(), "saved bundle");
        Ok(path)
    }

    /// Load the bundle saved for `kind`, or `None` if nothing was saved.
    pub fn load(&self, kind: ModelKind) -> Result<Option<ModelBundle>> {
        let path = self.bundle_path(kind);
        if !path.exists() {
            return Ok(None);
        }

        let mut bytes = Vec::new();
        File::open(&path)?.read_to_end(&mut bytes)?;
        let bundle: ModelBundle = bincode::deserialize(&bytes)?;
        Ok(Some(bundle))
    }

    /// Saved bundles as recorded by the index, sorted by name.
    pub fn list(&self) -> Result<Vec<StoreEntry>> {
        Ok(self.read_index()?.models.into_values().collect())
    }

    fn update_index(&self, kind: ModelKind, path: &Path) -> Result<()> {
        let mut index = self.read_index()?;
        index.models.insert(
            kind.slug(),
            StoreEntry {
                name: kind.name().to_string(),
                slug: kind.slug(),
                path: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                saved_at: chrono::Utc::now().to_rfc3339(),
            },
        );

        let file = File::create(self.root.join(INDEX_FILE))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &index)?;
        Ok(())
    }

    fn read_index(&self) -> Result<StoreIndex> {
        let path = self.root.join(INDEX_FILE);
        if !path.exists() {
            return Ok(StoreIndex::default());
        }
        let file = File::open(&path)?;
        let index = serde_json::from_reader(BufReader::new(file))?;
        Ok(index)
    }
}

impl Default for ModelStore {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_STORE_DIR),
        }
    }
}

// Consumers that only see `Ok(None)` from `load` report it as this error.
pub(crate) fn not_found(kind: ModelKind) -> CardioError {
    CardioError::ModelNotFound(format!("no saved model for '{}'", kind.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn fitted_bundle(kind: ModelKind) -> ModelBundle {
        let x = array![
            [0.0, 0.0],
            [0.5, 0.1],
            [1.0, 0.2],
            [5.0, 3.0],
            [5.5, 3.1],
            [6.0, 3.2]
        ];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut scaler = crate::preprocessing::StandardScaler::new();
        let x_scaled = scaler.fit_transform(&x).unwrap();

        let mut classifier = kind.instantiate();
        classifier.fit(&x_scaled, &y).unwrap();

        ModelBundle {
            kind,
            classifier,
            scaler,
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::open(dir.path()).unwrap();

        let bundle = fitted_bundle(ModelKind::DecisionTree);
        let path = store.save(&bundle).unwrap();
        assert!(path.ends_with("decision_tree_model.bin"));

        let loaded = store.load(ModelKind::DecisionTree).unwrap().unwrap();
        assert_eq!(loaded.kind, ModelKind::DecisionTree);
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::open(dir.path()).unwrap();
        assert!(store.load(ModelKind::Svm).unwrap().is_none());
    }

    #[test]
    fn test_save_overwrites_silently() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::open(dir.path()).unwrap();

        let bundle = fitted_bundle(ModelKind::Knn);
        store.save(&bundle).unwrap();
        store.save(&bundle).unwrap();

        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].slug, "knn");
    }

    #[test]
    fn test_index_lists_saved_models() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::open(dir.path()).unwrap();

        store.save(&fitted_bundle(ModelKind::DecisionTree)).unwrap();
        store.save(&fitted_bundle(ModelKind::Knn)).unwrap();

        let names: Vec<String> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Decision Tree", "KNN"]);
    }
}
