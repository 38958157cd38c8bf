//! Lazily-loaded, process-wide classifier handles.
//!
//! Each slot is filled at most once. Concurrent first requests block on the same
//! initialisation instead of racing, and a failed load leaves the slot empty so the
//! next request tries again.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::config::ModelPaths;
use crate::error::ApiError;
use crate::inference::{ImageClassifier, ModelLoader};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Plant,
    Toxicity,
    Other,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [ModelKind::Plant, ModelKind::Toxicity, ModelKind::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Plant => "plant",
            ModelKind::Toxicity => "toxicity",
            ModelKind::Other => "other",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct ModelSlot {
    kind: ModelKind,
    path: PathBuf,
    handle: OnceCell<Arc<dyn ImageClassifier>>,
    attempts: AtomicUsize,
}

impl ModelSlot {
    fn new(kind: ModelKind, path: PathBuf) -> Self {
        Self {
            kind,
            path,
            handle: OnceCell::new(),
            attempts: AtomicUsize::new(0),
        }
    }

    fn ensure(&self, loader: &dyn ModelLoader) -> bool {
        if self.handle.get().is_some() {
            debug!("{} model already loaded", self.kind);
            return true;
        }

        let loaded = self.handle.get_or_try_init(|| {
            self.attempts.fetch_add(1, Ordering::Relaxed);
            let handle = loader.load(&self.path)?;
            info!("{} model loaded from {}", self.kind, self.path.display());
            Ok::<_, anyhow::Error>(handle)
        });

        match loaded {
            Ok(_) => true,
            Err(e) => {
                warn!(
                    "failed to load {} model from {}: {:#}",
                    self.kind,
                    self.path.display(),
                    e
                );
                false
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelStatus {
    pub name: ModelKind,
    pub path: String,
    pub loaded: bool,
    pub load_attempts: usize,
}

pub struct ModelCache {
    loader: Arc<dyn ModelLoader>,
    slots: [ModelSlot; 3],
}

impl ModelCache {
    pub fn new(paths: ModelPaths, loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            slots: [
                ModelSlot::new(ModelKind::Plant, paths.plant),
                ModelSlot::new(ModelKind::Toxicity, paths.toxicity),
                ModelSlot::new(ModelKind::Other, paths.other),
            ],
        }
    }

    fn slot(&self, kind: ModelKind) -> &ModelSlot {
        match kind {
            ModelKind::Plant => &self.slots[0],
            ModelKind::Toxicity => &self.slots[1],
            ModelKind::Other => &self.slots[2],
        }
    }

    /// Loads every model that isn't loaded yet. One failure doesn't stop the others.
    ///
    /// Returns how many models are usable afterwards. Blocks while loading, so call it
    /// off the async executor.
    pub fn ensure_loaded(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.ensure(self.loader.as_ref()))
            .count()
    }

    pub fn get(&self, kind: ModelKind) -> Result<Arc<dyn ImageClassifier>, ApiError> {
        self.slot(kind)
            .handle
            .get()
            .cloned()
            .ok_or(ApiError::ModelUnavailable(kind))
    }

    pub fn path(&self, kind: ModelKind) -> &Path {
        &self.slot(kind).path
    }

    pub fn status(&self) -> Vec<ModelStatus> {
        self.slots
            .iter()
            .map(|slot| ModelStatus {
                name: slot.kind,
                path: slot.path.display().to_string(),
                loaded: slot.handle.get().is_some(),
                load_attempts: slot.attempts.load(Ordering::Relaxed),
            })
            .collect()
    }
}
