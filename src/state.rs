use crate::store::MemoryStore;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub store: Arc<Mutex<MemoryStore>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, store: MemoryStore) -> Self {
        Self {
            data_path,
            store: Arc::new(Mutex::new(store)),
        }
    }
}
