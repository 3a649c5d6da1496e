use serde::{Deserialize, Serialize};

use crate::models::intent::{ObjectionReason, QuestionTopic};
use crate::models::session::Disposition;
use crate::models::vehicle::Vehicle;

/// Structured instruction for the next communicative act. The phrasing
/// layer downstream turns this into natural language; the engine never
/// emits final text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "act", rename_all = "snake_case")]
pub enum ResponseDirective {
    /// Opening line of the call.
    Greet,
    AskConsent,
    /// Ask a discovery question; `missing` names the constraint fields
    /// still uncovered.
    ProbeNeeds {
        missing: Vec<String>,
    },
    PresentVehicles {
        vehicles: Vec<Vehicle>,
    },
    /// Acknowledge the objection, answer it, and steer back to the offer.
    AcknowledgeObjection {
        reason: ObjectionReason,
    },
    AnswerQuestion {
        topic: QuestionTopic,
    },
    /// Disclose that the caller is an automated agent.
    AiDisclosure,
    OfferHandoff,
    /// Safe fallback: restate and ask again without advancing.
    Reprompt,
    ConfirmBooking {
        vehicle: Vehicle,
    },
    CallEnded {
        disposition: Disposition,
    },
}

impl ResponseDirective {
    pub fn label(&self) -> &'static str {
        match self {
            ResponseDirective::Greet => "greet",
            ResponseDirective::AskConsent => "ask_consent",
            ResponseDirective::ProbeNeeds { .. } => "probe_needs",
            ResponseDirective::PresentVehicles { .. } => "present_vehicles",
            ResponseDirective::AcknowledgeObjection { .. } => "acknowledge_objection",
            ResponseDirective::AnswerQuestion { .. } => "answer_question",
            ResponseDirective::AiDisclosure => "ai_disclosure",
            ResponseDirective::OfferHandoff => "offer_handoff",
            ResponseDirective::Reprompt => "reprompt",
            ResponseDirective::ConfirmBooking { .. } => "confirm_booking",
            ResponseDirective::CallEnded { .. } => "call_ended",
        }
    }
}
