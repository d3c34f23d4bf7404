use crate::errors::AppError;
use crate::store::MemoryStore;
use std::path::Path;
use tokio::fs;
use tracing::{error, info};

pub async fn load_store(path: &Path) -> MemoryStore {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<MemoryStore>(&bytes) {
            Ok(store) => {
                info!("loaded {} keys from {}", store.len(), path.display());
                store
            }
            Err(err) => {
                error!("failed to parse data file: {err}");
                MemoryStore::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => MemoryStore::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            MemoryStore::default()
        }
    }
}

pub async fn persist_store(path: &Path, store: &MemoryStore) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(store).map_err(AppError::internal)?;
    atomic_write(path, &payload).await?;
    Ok(())
}

async fn atomic_write(path: &Path, payload: &[u8]) -> Result<(), std::io::Error> {
    let tmp_path = path.with_extension(format!("tmp.{}", std::process::id()));
    fs::write(&tmp_path, payload).await?;
    if let Err(err) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(err);
    }
    Ok(())
}
