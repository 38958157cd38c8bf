use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::ModelCache;
use crate::config::ServerConfig;
use crate::inference::ModelLoader;

/// Everything the handlers share, built once in `main` and handed to actix as `web::Data`.
pub struct AppState {
    pub models: ModelCache,
    pub details_csv: PathBuf,
    pub index_page: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(config: &ServerConfig, loader: Arc<dyn ModelLoader>) -> Self {
        AppState {
            models: ModelCache::new(config.models.clone(), loader),
            details_csv: config.details_csv.clone(),
            index_page: config.index_page.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}
