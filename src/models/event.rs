use serde::{Deserialize, Serialize};

use crate::models::session::{CallStage, Disposition};

/// Lifecycle event broadcast to the operator event stream after each
/// processed turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallEvent {
    pub call_id: String,
    pub stage: CallStage,
    pub directive: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disposition: Option<Disposition>,
}
