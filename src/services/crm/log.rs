use async_trait::async_trait;

use crate::models::CallSession;
use crate::services::crm::CrmExporter;

/// Default exporter: emits the finished call as a structured log record.
/// Stands in until a real CRM integration is configured.
pub struct LogCrmExporter;

#[async_trait]
impl CrmExporter for LogCrmExporter {
    async fn export(&self, session: &CallSession) -> anyhow::Result<()> {
        let disposition = session
            .disposition
            .as_ref()
            .map(|d| d.label())
            .unwrap_or("none");
        tracing::info!(
            call_id = %session.id,
            lead_phone = %session.lead_phone,
            disposition,
            turns = session.lead_turns(),
            "exporting finished call"
        );
        Ok(())
    }
}
