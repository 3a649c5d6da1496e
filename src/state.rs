use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::inventory::Inventory;
use crate::models::CallEvent;
use crate::services::classifier::IntentClassifier;
use crate::services::crm::CrmExporter;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    /// Read-only after startup; shared across all concurrent calls.
    pub inventory: Arc<Inventory>,
    pub classifier: IntentClassifier,
    pub crm: Box<dyn CrmExporter>,
    pub call_events_tx: broadcast::Sender<CallEvent>,
}
