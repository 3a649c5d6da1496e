use serde::{Deserialize, Serialize};

use crate::models::constraints::Usage;
use crate::models::vehicle::{BodyType, FuelType};

/// A single stated preference: one field, one value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum Preference {
    Usage(Usage),
    BodyType(BodyType),
    FuelType(FuelType),
    Brand(String),
    MaxMonthlyBudget(i64),
    ElectricInterest(bool),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionTopic {
    Pricing,
    Contract,
    Delivery,
    Maintenance,
    VehicleDetail,
    General,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ObjectionReason {
    Price,
    Commitment,
    Timing,
    Trust,
    Other,
}

/// Classified communicative purpose of one customer utterance. Produced
/// fresh each turn; persisted only as part of the transcript entry that
/// recorded it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    Affirm,
    Decline,
    Reschedule {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<String>,
    },
    AskQuestion {
        topic: QuestionTopic,
    },
    /// One utterance may carry several field/value pairs
    /// ("an electric SUV" states fuel type and body type at once).
    ExpressPreference {
        prefs: Vec<Preference>,
        correction: bool,
    },
    Objection {
        reason: ObjectionReason,
    },
    RequestHuman,
    RequestAiDisclosure,
    Unclear,
}

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Affirm => "affirm",
            Intent::Decline => "decline",
            Intent::Reschedule { .. } => "reschedule",
            Intent::AskQuestion { .. } => "ask_question",
            Intent::ExpressPreference { .. } => "express_preference",
            Intent::Objection { .. } => "objection",
            Intent::RequestHuman => "request_human",
            Intent::RequestAiDisclosure => "request_ai_disclosure",
            Intent::Unclear => "unclear",
        }
    }
}
