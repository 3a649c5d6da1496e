use chrono::Utc;

use crate::inventory::Inventory;
use crate::models::{
    CallSession, CallStage, Disposition, Intent, ResponseDirective,
};
use crate::services::{recommend, tracker};

/// Escalation thresholds. Configurable via `AppConfig`, not business law.
#[derive(Debug, Clone, Copy)]
pub struct DialogueLimits {
    /// Consecutive Unclear turns tolerated at ConsentCheck before the call
    /// is written off as NoResponse.
    pub consent_retry_limit: u32,
    /// Consecutive objections before a handoff is offered.
    pub objection_limit: u32,
    /// Hard cap on lead turns for the whole call.
    pub max_turns: u32,
}

impl Default for DialogueLimits {
    fn default() -> Self {
        Self {
            consent_retry_limit: 2,
            objection_limit: 3,
            max_turns: 50,
        }
    }
}

/// Directive for the agent's first utterance, before any lead turn.
pub fn opening_directive() -> ResponseDirective {
    ResponseDirective::Greet
}

/// Advance the call by one lead turn. Single writer: this is the only
/// place session state mutates during a call. Terminal sessions are left
/// untouched and answer with their recorded disposition. Unhandled
/// stage/intent pairs fall back to a reprompt, never an error.
pub fn advance(
    session: &mut CallSession,
    utterance: &str,
    intent: Intent,
    inventory: &Inventory,
    limits: &DialogueLimits,
) -> ResponseDirective {
    if session.is_terminal() {
        return ended(session);
    }

    session.record_lead(utterance, intent.clone());
    session.updated_at = Utc::now().naive_utc();

    let directive = if session.lead_turns() as u32 > limits.max_turns {
        session.set_disposition(Disposition::NoResponse);
        ended(session)
    } else {
        match intent {
            // Escape hatches available from every stage.
            Intent::RequestHuman => {
                session.set_disposition(Disposition::HandedOff);
                ended(session)
            }
            Intent::RequestAiDisclosure => ResponseDirective::AiDisclosure,
            other => advance_stage(session, other, inventory, limits),
        }
    };

    session.record_agent(directive.label());
    directive
}

/// External cancellation: any stage may drop straight to a terminal
/// disposition. A no-op if the call already ended.
pub fn cancel(session: &mut CallSession, disposition: Disposition) -> ResponseDirective {
    session.set_disposition(disposition);
    session.updated_at = Utc::now().naive_utc();
    ended(session)
}

fn advance_stage(
    session: &mut CallSession,
    intent: Intent,
    inventory: &Inventory,
    limits: &DialogueLimits,
) -> ResponseDirective {
    match session.stage {
        CallStage::Opening => {
            // Any response moves us to the consent check.
            session.stage = CallStage::ConsentCheck;
            ResponseDirective::AskConsent
        }

        CallStage::ConsentCheck => match intent {
            Intent::Affirm => {
                session.consent_retries = 0;
                session.stage = CallStage::NeedsDiscovery;
                probe(session)
            }
            Intent::Decline => {
                session.set_disposition(Disposition::DeclinedNow {
                    reschedule_time: None,
                });
                ended(session)
            }
            Intent::Reschedule { time } => {
                session.set_disposition(Disposition::DeclinedNow {
                    reschedule_time: time,
                });
                ended(session)
            }
            Intent::Unclear => {
                session.consent_retries += 1;
                if session.consent_retries > limits.consent_retry_limit {
                    session.set_disposition(Disposition::NoResponse);
                    ended(session)
                } else {
                    ResponseDirective::AskConsent
                }
            }
            Intent::AskQuestion { topic } => {
                session.consent_retries = 0;
                ResponseDirective::AnswerQuestion { topic }
            }
            Intent::ExpressPreference { .. } => {
                // Volunteered early; keep it, but consent still gates the
                // move past this stage.
                session.consent_retries = 0;
                session.constraints = tracker::apply(&session.constraints, &intent);
                ResponseDirective::AskConsent
            }
            _ => ResponseDirective::Reprompt,
        },

        CallStage::NeedsDiscovery => match intent {
            Intent::ExpressPreference { .. } => {
                session.constraints = tracker::apply(&session.constraints, &intent);
                if session.constraints.covers_discovery_minimum() {
                    session.stage = CallStage::Presentation;
                    present(session, inventory)
                } else {
                    probe(session)
                }
            }
            Intent::AskQuestion { topic } => ResponseDirective::AnswerQuestion { topic },
            Intent::Decline => {
                session.set_disposition(Disposition::DeclinedNow {
                    reschedule_time: None,
                });
                ended(session)
            }
            Intent::Reschedule { time } => {
                session.set_disposition(Disposition::DeclinedNow {
                    reschedule_time: time,
                });
                ended(session)
            }
            _ => probe(session),
        },

        CallStage::Presentation | CallStage::ObjectionHandling => match intent {
            Intent::Affirm => {
                session.consecutive_objections = 0;
                if session.stage == CallStage::ObjectionHandling {
                    // Objection resolved; back to the offer.
                    session.stage = CallStage::Presentation;
                    present(session, inventory)
                } else {
                    session.stage = CallStage::Closing;
                    confirm(session, inventory)
                }
            }
            Intent::Objection { reason } => {
                session.consecutive_objections += 1;
                if session.consecutive_objections >= limits.objection_limit {
                    // Escape valve: stop arguing, offer a specialist.
                    session.set_disposition(Disposition::HandedOff);
                    ResponseDirective::OfferHandoff
                } else {
                    session.stage = CallStage::ObjectionHandling;
                    ResponseDirective::AcknowledgeObjection { reason }
                }
            }
            Intent::ExpressPreference { .. } => {
                session.consecutive_objections = 0;
                session.constraints = tracker::apply(&session.constraints, &intent);
                session.stage = CallStage::Presentation;
                present(session, inventory)
            }
            Intent::AskQuestion { topic } => {
                session.consecutive_objections = 0;
                session.stage = CallStage::Presentation;
                ResponseDirective::AnswerQuestion { topic }
            }
            Intent::Decline => {
                session.set_disposition(Disposition::DeclinedNow {
                    reschedule_time: None,
                });
                ended(session)
            }
            Intent::Reschedule { time } => {
                session.set_disposition(Disposition::DeclinedNow {
                    reschedule_time: time,
                });
                ended(session)
            }
            _ => ResponseDirective::Reprompt,
        },

        CallStage::Closing => match intent {
            Intent::Affirm => {
                session.set_disposition(Disposition::Booked);
                ended(session)
            }
            Intent::Decline => {
                session.set_disposition(Disposition::DeclinedNow {
                    reschedule_time: None,
                });
                ended(session)
            }
            Intent::Reschedule { time } => {
                session.set_disposition(Disposition::DeclinedNow {
                    reschedule_time: time,
                });
                ended(session)
            }
            Intent::Objection { reason } => {
                // Closing never regresses; handle the pushback in place,
                // with the same escape valve as the presentation loop.
                session.consecutive_objections += 1;
                if session.consecutive_objections >= limits.objection_limit {
                    session.set_disposition(Disposition::HandedOff);
                    ResponseDirective::OfferHandoff
                } else {
                    ResponseDirective::AcknowledgeObjection { reason }
                }
            }
            Intent::AskQuestion { topic } => ResponseDirective::AnswerQuestion { topic },
            Intent::ExpressPreference { .. } => {
                session.constraints = tracker::apply(&session.constraints, &intent);
                confirm(session, inventory)
            }
            _ => ResponseDirective::Reprompt,
        },

        // Unreachable while disposition is unset, but the match must be
        // total; answer as if terminal.
        CallStage::Disposition => ended(session),
    }
}

fn probe(session: &CallSession) -> ResponseDirective {
    ResponseDirective::ProbeNeeds {
        missing: session
            .constraints
            .missing_fields()
            .into_iter()
            .map(|f| f.to_string())
            .collect(),
    }
}

fn present(session: &CallSession, inventory: &Inventory) -> ResponseDirective {
    ResponseDirective::PresentVehicles {
        vehicles: recommend::recommend(&session.constraints, inventory),
    }
}

fn confirm(session: &CallSession, inventory: &Inventory) -> ResponseDirective {
    match recommend::recommend(&session.constraints, inventory).into_iter().next() {
        Some(vehicle) => ResponseDirective::ConfirmBooking { vehicle },
        None => ResponseDirective::Reprompt,
    }
}

fn ended(session: &CallSession) -> ResponseDirective {
    ResponseDirective::CallEnded {
        disposition: session
            .disposition
            .clone()
            .unwrap_or(Disposition::NoResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BodyType, FuelType, ObjectionReason, Preference, Usage, Vehicle};

    fn vehicle(make: &str, model: &str, body: BodyType, fuel: FuelType, price: i64) -> Vehicle {
        Vehicle {
            make: make.to_string(),
            model: model.to_string(),
            variant: "Base".to_string(),
            body_type: body,
            fuel_type: fuel,
            monthly_price: price,
            initial_payment: price * 6,
            contract_months: 36,
            annual_mileage: 10_000,
            features: vec![],
            range_miles: None,
            load_volume_m3: None,
        }
    }

    fn inventory() -> Inventory {
        Inventory {
            vehicles: vec![
                vehicle("Tesla", "Model 3", BodyType::Saloon, FuelType::Electric, 389),
                vehicle("Volkswagen", "Golf", BodyType::Hatchback, FuelType::Petrol, 259),
                vehicle("Kia", "Sportage", BodyType::Suv, FuelType::Hybrid, 309),
            ],
            add_on_services: vec![],
        }
    }

    fn session() -> CallSession {
        CallSession::new("+447700900123", Some("Alex"))
    }

    fn limits() -> DialogueLimits {
        DialogueLimits::default()
    }

    fn discovery_prefs() -> Intent {
        Intent::ExpressPreference {
            prefs: vec![
                Preference::Usage(Usage::Personal),
                Preference::FuelType(FuelType::Electric),
            ],
            correction: false,
        }
    }

    /// Drive a fresh session to the Presentation stage.
    fn to_presentation(inv: &Inventory) -> CallSession {
        let mut s = session();
        advance(&mut s, "hello", Intent::Affirm, inv, &limits());
        advance(&mut s, "sure", Intent::Affirm, inv, &limits());
        advance(&mut s, "an electric car for me", discovery_prefs(), inv, &limits());
        assert_eq!(s.stage, CallStage::Presentation);
        s
    }

    #[test]
    fn opening_moves_to_consent_on_any_response() {
        let inv = inventory();
        let mut s = session();
        let d = advance(&mut s, "hello?", Intent::Unclear, &inv, &limits());
        assert_eq!(s.stage, CallStage::ConsentCheck);
        assert!(matches!(d, ResponseDirective::AskConsent));
    }

    #[test]
    fn consent_decline_ends_the_call() {
        let inv = inventory();
        let mut s = session();
        advance(&mut s, "hello", Intent::Affirm, &inv, &limits());
        let d = advance(&mut s, "no, now's not a good time", Intent::Decline, &inv, &limits());
        assert_eq!(
            s.disposition,
            Some(Disposition::DeclinedNow {
                reschedule_time: None
            })
        );
        assert!(matches!(d, ResponseDirective::CallEnded { .. }));
    }

    #[test]
    fn consent_reschedule_captures_the_time() {
        let inv = inventory();
        let mut s = session();
        advance(&mut s, "hello", Intent::Affirm, &inv, &limits());
        advance(
            &mut s,
            "call me back tomorrow",
            Intent::Reschedule {
                time: Some("tomorrow".to_string()),
            },
            &inv,
            &limits(),
        );
        assert_eq!(
            s.disposition,
            Some(Disposition::DeclinedNow {
                reschedule_time: Some("tomorrow".to_string())
            })
        );
    }

    #[test]
    fn third_unclear_at_consent_is_no_response() {
        let inv = inventory();
        let mut s = session();
        advance(&mut s, "hello", Intent::Affirm, &inv, &limits());

        let d1 = advance(&mut s, "", Intent::Unclear, &inv, &limits());
        assert!(matches!(d1, ResponseDirective::AskConsent));
        let d2 = advance(&mut s, "", Intent::Unclear, &inv, &limits());
        assert!(matches!(d2, ResponseDirective::AskConsent));
        let d3 = advance(&mut s, "", Intent::Unclear, &inv, &limits());
        assert!(matches!(d3, ResponseDirective::CallEnded { .. }));
        assert_eq!(s.disposition, Some(Disposition::NoResponse));
    }

    #[test]
    fn discovery_coverage_gates_presentation() {
        let inv = inventory();
        let mut s = session();
        advance(&mut s, "hello", Intent::Affirm, &inv, &limits());
        advance(&mut s, "sure", Intent::Affirm, &inv, &limits());
        assert_eq!(s.stage, CallStage::NeedsDiscovery);

        // Usage alone is not enough coverage.
        let d = advance(
            &mut s,
            "it's for me",
            Intent::ExpressPreference {
                prefs: vec![Preference::Usage(Usage::Personal)],
                correction: false,
            },
            &inv,
            &limits(),
        );
        assert_eq!(s.stage, CallStage::NeedsDiscovery);
        assert!(matches!(d, ResponseDirective::ProbeNeeds { .. }));

        let d = advance(
            &mut s,
            "something electric",
            Intent::ExpressPreference {
                prefs: vec![Preference::FuelType(FuelType::Electric)],
                correction: false,
            },
            &inv,
            &limits(),
        );
        assert_eq!(s.stage, CallStage::Presentation);
        match d {
            ResponseDirective::PresentVehicles { vehicles } => {
                assert!(!vehicles.is_empty());
            }
            other => panic!("expected vehicles, got {other:?}"),
        }
    }

    #[test]
    fn affirm_on_presented_vehicle_reaches_booked() {
        let inv = inventory();
        let mut s = to_presentation(&inv);

        let d = advance(&mut s, "the tesla sounds great", Intent::Affirm, &inv, &limits());
        assert_eq!(s.stage, CallStage::Closing);
        assert!(matches!(d, ResponseDirective::ConfirmBooking { .. }));

        let d = advance(&mut s, "yes book it", Intent::Affirm, &inv, &limits());
        assert_eq!(s.disposition, Some(Disposition::Booked));
        assert!(matches!(d, ResponseDirective::CallEnded { .. }));
    }

    #[test]
    fn objection_loops_between_presentation_and_handling() {
        let inv = inventory();
        let mut s = to_presentation(&inv);

        let d = advance(
            &mut s,
            "bit steep",
            Intent::Objection {
                reason: ObjectionReason::Price,
            },
            &inv,
            &limits(),
        );
        assert_eq!(s.stage, CallStage::ObjectionHandling);
        assert!(matches!(d, ResponseDirective::AcknowledgeObjection { .. }));

        let d = advance(&mut s, "ok fair enough", Intent::Affirm, &inv, &limits());
        assert_eq!(s.stage, CallStage::Presentation);
        assert!(matches!(d, ResponseDirective::PresentVehicles { .. }));
        assert_eq!(s.consecutive_objections, 0);
    }

    #[test]
    fn third_consecutive_objection_offers_handoff() {
        let inv = inventory();
        let mut s = to_presentation(&inv);

        for i in 0..2 {
            let d = advance(
                &mut s,
                "hmm",
                Intent::Objection {
                    reason: ObjectionReason::Other,
                },
                &inv,
                &limits(),
            );
            assert!(
                matches!(d, ResponseDirective::AcknowledgeObjection { .. }),
                "objection {i} should be acknowledged"
            );
        }

        let d = advance(
            &mut s,
            "still not convinced",
            Intent::Objection {
                reason: ObjectionReason::Other,
            },
            &inv,
            &limits(),
        );
        assert!(matches!(d, ResponseDirective::OfferHandoff));
        assert_eq!(s.disposition, Some(Disposition::HandedOff));
    }

    #[test]
    fn request_human_hands_off_from_any_stage() {
        let inv = inventory();
        for turns in [0usize, 1, 2] {
            let mut s = session();
            for _ in 0..turns {
                advance(&mut s, "yes", Intent::Affirm, &inv, &limits());
            }
            advance(&mut s, "get me a person", Intent::RequestHuman, &inv, &limits());
            assert_eq!(s.disposition, Some(Disposition::HandedOff));
        }
    }

    #[test]
    fn ai_disclosure_never_changes_stage() {
        let inv = inventory();
        let mut s = to_presentation(&inv);
        let stage_before = s.stage;
        let d = advance(&mut s, "are you a robot?", Intent::RequestAiDisclosure, &inv, &limits());
        assert!(matches!(d, ResponseDirective::AiDisclosure));
        assert_eq!(s.stage, stage_before);
    }

    #[test]
    fn terminal_session_is_a_noop_for_any_intent() {
        let inv = inventory();
        let mut s = session();
        advance(&mut s, "hello", Intent::Affirm, &inv, &limits());
        advance(&mut s, "no", Intent::Decline, &inv, &limits());
        let disposition = s.disposition.clone();
        let transcript_len = s.transcript.len();

        let post_terminal = [
            Intent::Affirm,
            Intent::RequestHuman,
            Intent::Unclear,
            Intent::AskQuestion {
                topic: crate::models::QuestionTopic::General,
            },
            discovery_prefs(),
        ];
        for intent in post_terminal {
            let d = advance(&mut s, "anything", intent, &inv, &limits());
            match d {
                ResponseDirective::CallEnded { disposition: d } => {
                    assert_eq!(Some(d), disposition.clone());
                }
                other => panic!("expected CallEnded, got {other:?}"),
            }
        }
        assert_eq!(s.transcript.len(), transcript_len);
        assert_eq!(s.disposition, disposition);
    }

    #[test]
    fn stage_never_regresses() {
        let inv = inventory();
        let mut s = session();
        let script: Vec<(&str, Intent)> = vec![
            ("hello", Intent::Unclear),
            ("yes", Intent::Affirm),
            ("electric for me", discovery_prefs()),
            (
                "too dear",
                Intent::Objection {
                    reason: ObjectionReason::Price,
                },
            ),
            ("go on then", Intent::Affirm),
            ("yes", Intent::Affirm),
            ("yes", Intent::Affirm),
        ];

        let mut last_ordinal = s.stage.ordinal();
        for (utterance, intent) in script {
            advance(&mut s, utterance, intent, &inv, &limits());
            let ordinal = s.stage.ordinal();
            assert!(
                ordinal >= last_ordinal,
                "stage regressed from {last_ordinal} to {ordinal}"
            );
            last_ordinal = ordinal;
        }
        assert_eq!(s.disposition, Some(Disposition::Booked));
    }

    #[test]
    fn turn_cap_forces_no_response() {
        let inv = inventory();
        let tight = DialogueLimits {
            max_turns: 3,
            ..DialogueLimits::default()
        };
        let mut s = session();
        advance(&mut s, "hm", Intent::Unclear, &inv, &tight);
        advance(&mut s, "yes", Intent::Affirm, &inv, &tight);
        advance(
            &mut s,
            "what is this about?",
            Intent::AskQuestion {
                topic: crate::models::QuestionTopic::General,
            },
            &inv,
            &tight,
        );
        let d = advance(&mut s, "err", Intent::Unclear, &inv, &tight);
        assert!(matches!(d, ResponseDirective::CallEnded { .. }));
        assert_eq!(s.disposition, Some(Disposition::NoResponse));
    }

    #[test]
    fn cancel_ends_any_stage_immediately() {
        let inv = inventory();
        let mut s = to_presentation(&inv);
        let d = cancel(&mut s, Disposition::HandedOff);
        assert!(matches!(d, ResponseDirective::CallEnded { .. }));
        assert_eq!(s.disposition, Some(Disposition::HandedOff));

        // Cancelling again keeps the original outcome.
        cancel(&mut s, Disposition::NoResponse);
        assert_eq!(s.disposition, Some(Disposition::HandedOff));
    }
}
