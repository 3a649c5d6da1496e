use std::env;

use crate::services::dialogue::DialogueLimits;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub migrations_dir: String,
    pub inventory_path: String,
    pub admin_token: String,
    pub consent_retry_limit: u32,
    pub objection_limit: u32,
    pub max_turns: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "callflow.db".to_string()),
            migrations_dir: env::var("MIGRATIONS_DIR").unwrap_or_else(|_| "migrations".to_string()),
            inventory_path: env::var("INVENTORY_PATH")
                .unwrap_or_else(|_| "data/inventory.json".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            consent_retry_limit: env::var("CONSENT_RETRY_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            objection_limit: env::var("OBJECTION_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            max_turns: env::var("MAX_TURNS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50),
        }
    }

    pub fn dialogue_limits(&self) -> DialogueLimits {
        DialogueLimits {
            consent_retry_limit: self.consent_retry_limit,
            objection_limit: self.objection_limit,
            max_turns: self.max_turns,
        }
    }
}
