pub mod constraints;
pub mod directive;
pub mod event;
pub mod intent;
pub mod session;
pub mod vehicle;

pub use constraints::{ConstraintSet, ElectricInterest, Usage};
pub use directive::ResponseDirective;
pub use event::CallEvent;
pub use intent::{Intent, ObjectionReason, Preference, QuestionTopic};
pub use session::{CallSession, CallStage, CallSummary, Disposition, Speaker, TranscriptEntry};
pub use vehicle::{AddOnService, BodyType, FuelType, Vehicle};
