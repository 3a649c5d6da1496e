pub mod log;

use async_trait::async_trait;

use crate::models::CallSession;

/// Downstream hand-off of a finished call: transcript, constraints, and
/// disposition go to whatever CRM or follow-up system is wired in.
#[async_trait]
pub trait CrmExporter: Send + Sync {
    async fn export(&self, session: &CallSession) -> anyhow::Result<()>;
}
