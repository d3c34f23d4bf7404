pub mod app;
pub mod bmi;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod history;
pub mod models;
pub mod poll;
pub mod state;
pub mod stats;
pub mod storage;
pub mod store;
pub mod trackers;

pub use app::router;
pub use config::Config;
pub use history::{AppendOutcome, Entry, HistoryLog, LogOrdering, LogPolicy};
pub use state::AppState;
pub use storage::{load_store, persist_store};
pub use store::{KeyValueStore, MemoryStore};
