use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::constraints::ConstraintSet;
use crate::models::intent::Intent;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CallStage {
    Opening,
    ConsentCheck,
    NeedsDiscovery,
    Presentation,
    ObjectionHandling,
    Closing,
    /// Terminal; the outcome lives in `CallSession::disposition`.
    Disposition,
}

impl CallStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStage::Opening => "opening",
            CallStage::ConsentCheck => "consent_check",
            CallStage::NeedsDiscovery => "needs_discovery",
            CallStage::Presentation => "presentation",
            CallStage::ObjectionHandling => "objection_handling",
            CallStage::Closing => "closing",
            CallStage::Disposition => "disposition",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "consent_check" => CallStage::ConsentCheck,
            "needs_discovery" => CallStage::NeedsDiscovery,
            "presentation" => CallStage::Presentation,
            "objection_handling" => CallStage::ObjectionHandling,
            "closing" => CallStage::Closing,
            "disposition" => CallStage::Disposition,
            _ => CallStage::Opening,
        }
    }

    /// Position in the forward call flow. Presentation and
    /// ObjectionHandling share a rank because they may loop.
    pub fn ordinal(&self) -> u8 {
        match self {
            CallStage::Opening => 0,
            CallStage::ConsentCheck => 1,
            CallStage::NeedsDiscovery => 2,
            CallStage::Presentation | CallStage::ObjectionHandling => 3,
            CallStage::Closing => 4,
            CallStage::Disposition => 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Disposition {
    Booked,
    DeclinedNow {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reschedule_time: Option<String>,
    },
    HandedOff,
    NoResponse,
}

impl Disposition {
    pub fn label(&self) -> &'static str {
        match self {
            Disposition::Booked => "booked",
            Disposition::DeclinedNow { .. } => "declined_now",
            Disposition::HandedOff => "handed_off",
            Disposition::NoResponse => "no_response",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Agent,
    Lead,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub utterance: String,
    /// Classified intent for lead turns; agent turns carry none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
}

/// Aggregate root for one outbound call. All mutation goes through the
/// dialogue service, which is the single writer per session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSession {
    pub id: String,
    pub lead_phone: String,
    pub lead_name: Option<String>,
    pub stage: CallStage,
    pub constraints: ConstraintSet,
    pub transcript: Vec<TranscriptEntry>,
    pub disposition: Option<Disposition>,
    /// Consecutive Unclear turns at ConsentCheck.
    pub consent_retries: u32,
    /// Consecutive Objection turns across Presentation/ObjectionHandling.
    pub consecutive_objections: u32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl CallSession {
    pub fn new(lead_phone: &str, lead_name: Option<&str>) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            lead_phone: lead_phone.to_string(),
            lead_name: lead_name.map(|n| n.to_string()),
            stage: CallStage::Opening,
            constraints: ConstraintSet::new(),
            transcript: Vec::new(),
            disposition: None,
            consent_retries: 0,
            consecutive_objections: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.disposition.is_some()
    }

    /// Number of lead turns taken so far, for the max-turn cap.
    pub fn lead_turns(&self) -> usize {
        self.transcript
            .iter()
            .filter(|e| e.speaker == Speaker::Lead)
            .count()
    }

    pub fn record_lead(&mut self, utterance: &str, intent: Intent) {
        self.transcript.push(TranscriptEntry {
            speaker: Speaker::Lead,
            utterance: utterance.to_string(),
            intent: Some(intent),
        });
    }

    pub fn record_agent(&mut self, summary: &str) {
        self.transcript.push(TranscriptEntry {
            speaker: Speaker::Agent,
            utterance: summary.to_string(),
            intent: None,
        });
    }

    /// First write wins; a set disposition is immutable.
    pub fn set_disposition(&mut self, disposition: Disposition) {
        if self.disposition.is_none() {
            self.disposition = Some(disposition);
            self.stage = CallStage::Disposition;
        }
    }
}

/// Listing row for the operator surface; cheap to load, no transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSummary {
    pub id: String,
    pub lead_phone: String,
    pub lead_name: Option<String>,
    pub stage: CallStage,
    pub disposition: Option<Disposition>,
    pub updated_at: NaiveDateTime,
}
