use reqwest::Client;
use std::sync::{Arc, RwLock};

use crate::pipeline::QuakeMap;
use crate::settings::Settings;

// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub http_client: Client,
    /// Last successfully built map; replaced whole on refresh
    pub map: Arc<RwLock<QuakeMap>>,
}

impl AppState {
    pub fn new(settings: Settings, http_client: Client, map: QuakeMap) -> Self {
        Self {
            settings: Arc::new(settings),
            http_client,
            map: Arc::new(RwLock::new(map)),
        }
    }

    pub fn snapshot(&self) -> QuakeMap {
        match self.map.read() {
            Ok(map) => map.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn publish(&self, map: QuakeMap) {
        match self.map.write() {
            Ok(mut current) => *current = map,
            Err(poisoned) => *poisoned.into_inner() = map,
        }
    }
}
