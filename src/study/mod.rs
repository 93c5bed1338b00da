//! Flip-card study sessions

pub mod session;

use uuid::Uuid;

pub use session::{AnswerOutcome, StudyError, StudySession, StudyState, StudySummary};

/// Receives each counted answer so lifetime card tallies can be updated
pub trait AnswerRecorder {
    fn record_answer(&mut self, deck_id: Uuid, card_id: Uuid, correct: bool);
}
