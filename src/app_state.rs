// Application state management

use std::sync::{Arc, Mutex};

use tracing::info;

use crate::store::MarketStore;

pub type SharedState = Arc<Mutex<AppState>>;

pub struct AppState {
    pub store: MarketStore,

    /// Rolling log of recent market activity, capped at 1000 entries
    pub activity: Vec<String>,

    data_file: String,
}

impl AppState {
    /// Build state from the configured data file, loading any persisted
    /// snapshot found there
    pub fn new() -> Self {
        let data_file = std::env::var("DATA_FILE").unwrap_or_else(|_| "data/state.json".to_string());

        let store = match MarketStore::load_from_disk(&data_file) {
            Ok(store) => {
                info!("loaded persisted state from {}", data_file);
                store
            }
            Err(_) => {
                info!("no persisted state found, starting fresh");
                MarketStore::new()
            }
        };

        Self {
            store,
            activity: Vec::new(),
            data_file,
        }
    }

    /// Build state around an existing store, skipping disk entirely
    pub fn with_store(store: MarketStore) -> Self {
        Self {
            store,
            activity: Vec::new(),
            data_file: "data/state.json".to_string(),
        }
    }

    pub fn save_to_disk(&self) -> Result<(), String> {
        self.store.save_to_disk(&self.data_file)
    }

    pub fn log_activity(&mut self, action: &str, details: &str) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        info!(target: "activity", "{} | {}", action, details);
        self.activity.push(format!("[{}] {} | {}", timestamp, action, details));
        if self.activity.len() > 1000 {
            self.activity.remove(0);
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_store(MarketStore::new())
    }
}
