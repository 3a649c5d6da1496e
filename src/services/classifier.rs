use crate::inventory::Inventory;
use crate::models::{
    BodyType, CallStage, FuelType, Intent, ObjectionReason, Preference, QuestionTopic, Usage,
};

// Keyword tables. Single words are matched on token boundaries, phrases by
// substring, all case-insensitive.

const HUMAN_PHRASES: &[&str] = &[
    "speak to a human",
    "talk to a human",
    "real person",
    "speak to someone",
    "talk to someone",
    "a human",
    "an advisor",
    "a manager",
    "transfer me",
    "put me through",
];

const AI_DISCLOSURE_PHRASES: &[&str] = &[
    "are you a robot",
    "are you a bot",
    "are you an ai",
    "are you ai",
    "are you human",
    "are you real",
    "is this a robot",
    "is this an ai",
    "is this automated",
    "talking to a machine",
    "speaking to a machine",
    "a recording",
];

const RESCHEDULE_PHRASES: &[&str] = &[
    "call me back",
    "call back",
    "ring me back",
    "try me again",
    "call again",
    "another time",
    "better time would be",
];

const TIME_PHRASES: &[&str] = &[
    "tomorrow morning",
    "tomorrow afternoon",
    "tomorrow evening",
    "tomorrow",
    "this evening",
    "this afternoon",
    "tonight",
    "next week",
    "next month",
    "the weekend",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

const CORRECTION_PHRASES: &[&str] = &[
    "actually",
    "instead",
    "i meant",
    "scratch that",
    "change that",
    "make that",
    "forget the",
];

const AFFIRM_WORDS: &[&str] = &[
    "yes", "yeah", "yep", "sure", "ok", "okay", "alright", "definitely", "absolutely", "perfect",
];

const AFFIRM_PHRASES: &[&str] = &[
    "sounds good",
    "that works",
    "go ahead",
    "go for it",
    "why not",
    "happy to",
    "let's do it",
    "i'll take it",
    "book it",
];

const DECLINE_PHRASES: &[&str] = &[
    "not interested",
    "no thanks",
    "no thank you",
    "not a good time",
    "stop calling",
    "don't call",
    "do not call",
    "remove me",
    "take me off",
    "leave me alone",
];

/// Rule-based intent classifier. Total and side-effect free: every
/// utterance maps to exactly one intent, falling back to Unclear. The
/// brand vocabulary comes from the loaded inventory so we never recognise
/// a make the catalog cannot serve.
pub struct IntentClassifier {
    brands: Vec<String>,
}

impl IntentClassifier {
    pub fn new(brands: Vec<String>) -> Self {
        Self { brands }
    }

    pub fn from_inventory(inventory: &Inventory) -> Self {
        Self::new(inventory.brands())
    }

    /// Context-sensitive classification: the same words can mean different
    /// things at different stages ("no" declines a consent check but
    /// objects to a closing ask).
    pub fn classify(&self, utterance: &str, stage: CallStage) -> Intent {
        let text = utterance.trim().to_lowercase();
        if text.is_empty() {
            // Silence or an empty synthetic turn.
            return Intent::Unclear;
        }

        if contains_any_phrase(&text, HUMAN_PHRASES) {
            return Intent::RequestHuman;
        }
        if contains_any_phrase(&text, AI_DISCLOSURE_PHRASES) {
            return Intent::RequestAiDisclosure;
        }

        if contains_any_phrase(&text, RESCHEDULE_PHRASES) {
            return Intent::Reschedule {
                time: first_phrase(&text, TIME_PHRASES).map(|t| t.to_string()),
            };
        }

        if let Some(reason) = objection_reason(&text) {
            return Intent::Objection { reason };
        }

        // An explicit decline wins even when the sentence mentions a fuel
        // type or brand ("I'm not interested in an electric car" is a
        // decline, not an electric preference).
        if contains_any_phrase(&text, DECLINE_PHRASES) {
            return Intent::Decline;
        }

        let prefs = self.extract_preferences(&text);
        if !prefs.is_empty() {
            return Intent::ExpressPreference {
                prefs,
                correction: contains_any_phrase(&text, CORRECTION_PHRASES),
            };
        }

        if is_question(&text) {
            return Intent::AskQuestion {
                topic: question_topic(&text),
            };
        }

        let affirms = contains_any_word(&text, AFFIRM_WORDS) || contains_any_phrase(&text, AFFIRM_PHRASES);
        let bare_negation = contains_any_word(&text, &["no", "nope", "nah"]);

        if affirms && !bare_negation {
            return Intent::Affirm;
        }
        if bare_negation {
            // A plain "no" pushes back on the current ask: a decline while
            // we are still seeking consent, an objection once an offer is
            // on the table.
            return match stage {
                CallStage::Presentation | CallStage::ObjectionHandling | CallStage::Closing => {
                    Intent::Objection {
                        reason: ObjectionReason::Other,
                    }
                }
                _ => Intent::Decline,
            };
        }

        Intent::Unclear
    }

    fn extract_preferences(&self, text: &str) -> Vec<Preference> {
        let mut prefs = Vec::new();

        if contains_any_word(text, &["business", "company", "work"]) || text.contains("fleet") {
            prefs.push(Preference::Usage(Usage::Business));
        } else if contains_any_word(text, &["personal", "myself", "family", "private"]) {
            prefs.push(Preference::Usage(Usage::Personal));
        }

        for (words, body) in [
            (&["suv", "crossover", "4x4"][..], BodyType::Suv),
            (&["hatchback", "hatch"][..], BodyType::Hatchback),
            (&["saloon", "sedan"][..], BodyType::Saloon),
            (&["estate", "wagon", "tourer"][..], BodyType::Estate),
            (&["van"][..], BodyType::Van),
        ] {
            if contains_any_word(text, words) {
                prefs.push(Preference::BodyType(body));
            }
        }

        let electric_declined = contains_any_phrase(
            text,
            &[
                "not electric",
                "no electric",
                "nothing electric",
                "don't want electric",
                "not an ev",
                "no ev",
            ],
        );
        if electric_declined {
            prefs.push(Preference::ElectricInterest(false));
        } else if contains_any_word(text, &["electric", "ev"]) {
            prefs.push(Preference::FuelType(FuelType::Electric));
            prefs.push(Preference::ElectricInterest(true));
        }
        if contains_any_word(text, &["petrol"]) {
            prefs.push(Preference::FuelType(FuelType::Petrol));
        }
        if contains_any_word(text, &["diesel"]) {
            prefs.push(Preference::FuelType(FuelType::Diesel));
        }
        if contains_any_word(text, &["hybrid"]) {
            prefs.push(Preference::FuelType(FuelType::Hybrid));
        }

        for brand in &self.brands {
            if text.contains(&brand.to_lowercase()) {
                prefs.push(Preference::Brand(brand.clone()));
            }
        }

        if let Some(budget) = parse_budget(text) {
            prefs.push(Preference::MaxMonthlyBudget(budget));
        }

        prefs
    }
}

fn contains_any_phrase(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text.contains(p))
}

fn first_phrase<'a>(text: &str, phrases: &[&'a str]) -> Option<&'a str> {
    phrases.iter().find(|p| text.contains(*p)).copied()
}

fn contains_any_word(text: &str, words: &[&str]) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|token| words.contains(&token))
}

fn is_question(text: &str) -> bool {
    text.contains('?')
        || text.starts_with("what")
        || text.starts_with("how")
        || text.starts_with("when")
        || text.starts_with("where")
        || text.starts_with("which")
        || text.starts_with("who")
        || text.starts_with("do you")
        || text.starts_with("can i")
        || text.starts_with("can you")
        || text.starts_with("could you tell")
        || text.starts_with("is there")
}

fn question_topic(text: &str) -> QuestionTopic {
    if contains_any_word(text, &["price", "cost", "much", "deposit", "payment", "cheaper"]) {
        QuestionTopic::Pricing
    } else if contains_any_word(text, &["contract", "term", "mileage", "length", "months"]) {
        QuestionTopic::Contract
    } else if contains_any_word(text, &["delivery", "deliver", "get", "arrive", "soon"]) {
        QuestionTopic::Delivery
    } else if contains_any_word(text, &["maintenance", "service", "servicing", "breakdown", "insurance"]) {
        QuestionTopic::Maintenance
    } else if contains_any_word(text, &["range", "boot", "charge", "charging", "spec", "colour", "color"]) {
        QuestionTopic::VehicleDetail
    } else {
        QuestionTopic::General
    }
}

fn objection_reason(text: &str) -> Option<ObjectionReason> {
    if contains_any_phrase(
        text,
        &[
            "too expensive",
            "too much",
            "can't afford",
            "cannot afford",
            "too pricey",
            "over my budget",
            "bit steep",
        ],
    ) {
        Some(ObjectionReason::Price)
    } else if contains_any_phrase(
        text,
        &[
            "long contract",
            "tied in",
            "tied down",
            "locked in",
            "too long",
            "commitment",
        ],
    ) {
        Some(ObjectionReason::Commitment)
    } else if contains_any_phrase(
        text,
        &[
            "need to think",
            "think about it",
            "think it over",
            "not ready",
            "talk to my",
            "speak to my",
            "sleep on it",
        ],
    ) {
        Some(ObjectionReason::Timing)
    } else if contains_any_phrase(
        text,
        &[
            "scam",
            "don't trust",
            "do not trust",
            "cold call",
            "how did you get my number",
            "sounds dodgy",
        ],
    ) {
        Some(ObjectionReason::Trust)
    } else {
        None
    }
}

/// Find a plausible monthly figure. Requires a budget cue (a pound sign or
/// money wording) so bare numbers like "3 kids" are not misread.
fn parse_budget(text: &str) -> Option<i64> {
    let has_cue = text.contains('£')
        || contains_any_word(text, &["budget", "month", "monthly", "spend", "afford", "pay"]);
    if !has_cue {
        return None;
    }

    text.split(|c: char| !(c.is_ascii_digit() || c == ','))
        .filter_map(|token| token.replace(',', "").parse::<i64>().ok())
        .find(|n| (50..=5_000).contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> IntentClassifier {
        IntentClassifier::new(vec![
            "Tesla".to_string(),
            "Mercedes-Benz".to_string(),
            "Volkswagen".to_string(),
        ])
    }

    #[test]
    fn silence_is_unclear() {
        assert_eq!(
            classifier().classify("   ", CallStage::ConsentCheck),
            Intent::Unclear
        );
    }

    #[test]
    fn bad_time_is_decline_at_consent_check() {
        let intent = classifier().classify("no, now's not a good time", CallStage::ConsentCheck);
        assert_eq!(intent, Intent::Decline);
    }

    #[test]
    fn bare_no_is_stage_sensitive() {
        let c = classifier();
        assert_eq!(c.classify("no", CallStage::ConsentCheck), Intent::Decline);
        assert_eq!(
            c.classify("no", CallStage::Closing),
            Intent::Objection {
                reason: ObjectionReason::Other
            }
        );
    }

    #[test]
    fn decline_mentioning_a_fuel_type_is_still_a_decline() {
        let intent =
            classifier().classify("I'm not interested in an electric car", CallStage::NeedsDiscovery);
        assert_eq!(intent, Intent::Decline);
    }

    #[test]
    fn decline_mentioning_a_brand_is_still_a_decline() {
        let intent = classifier().classify(
            "stop calling me about Tesla deals",
            CallStage::Presentation,
        );
        assert_eq!(intent, Intent::Decline);
    }

    #[test]
    fn callback_request_captures_time() {
        let intent = classifier().classify("could you call me back tomorrow?", CallStage::ConsentCheck);
        assert_eq!(
            intent,
            Intent::Reschedule {
                time: Some("tomorrow".to_string())
            }
        );
    }

    #[test]
    fn electric_suv_carries_two_preferences() {
        let intent = classifier().classify("I'm after an electric SUV", CallStage::NeedsDiscovery);
        match intent {
            Intent::ExpressPreference { prefs, correction } => {
                assert!(!correction);
                assert!(prefs.contains(&Preference::BodyType(BodyType::Suv)));
                assert!(prefs.contains(&Preference::FuelType(FuelType::Electric)));
                assert!(prefs.contains(&Preference::ElectricInterest(true)));
            }
            other => panic!("expected preference intent, got {other:?}"),
        }
    }

    #[test]
    fn budget_needs_a_money_cue() {
        let c = classifier();
        assert_eq!(c.classify("we have 3 kids", CallStage::NeedsDiscovery), Intent::Unclear);
        match c.classify("no more than £400 a month", CallStage::NeedsDiscovery) {
            Intent::ExpressPreference { prefs, .. } => {
                assert!(prefs.contains(&Preference::MaxMonthlyBudget(400)));
            }
            other => panic!("expected budget preference, got {other:?}"),
        }
    }

    #[test]
    fn correction_is_tagged() {
        match classifier().classify("actually make that a hatchback", CallStage::NeedsDiscovery) {
            Intent::ExpressPreference { correction, .. } => assert!(correction),
            other => panic!("expected correction, got {other:?}"),
        }
    }

    #[test]
    fn brand_vocabulary_comes_from_inventory() {
        let intent = classifier().classify("something by tesla maybe", CallStage::NeedsDiscovery);
        match intent {
            Intent::ExpressPreference { prefs, .. } => {
                assert!(prefs.contains(&Preference::Brand("Tesla".to_string())));
            }
            other => panic!("expected brand preference, got {other:?}"),
        }
    }

    #[test]
    fn price_pushback_is_an_objection() {
        let intent = classifier().classify("that's too expensive for me", CallStage::Presentation);
        assert_eq!(
            intent,
            Intent::Objection {
                reason: ObjectionReason::Price
            }
        );
    }

    #[test]
    fn human_request_beats_everything() {
        let intent = classifier().classify(
            "no, I want to speak to a real person about the price",
            CallStage::Presentation,
        );
        assert_eq!(intent, Intent::RequestHuman);
    }

    #[test]
    fn ai_disclosure_question() {
        let intent = classifier().classify("wait, are you a robot?", CallStage::Opening);
        assert_eq!(intent, Intent::RequestAiDisclosure);
    }

    #[test]
    fn questions_get_topics() {
        let c = classifier();
        assert_eq!(
            c.classify("how much is the deposit?", CallStage::Presentation),
            Intent::AskQuestion {
                topic: QuestionTopic::Pricing
            }
        );
        assert_eq!(
            c.classify("when could you deliver it?", CallStage::Closing),
            Intent::AskQuestion {
                topic: QuestionTopic::Delivery
            }
        );
    }
}
