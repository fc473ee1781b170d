use super::{
    question::{Answer, Question},
    state::{Outcome, Phase},
};

/// What the screen needs to show for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizView {
    pub phase: Phase,
    pub score: u32,
    pub wrong_attempts: u32,
    pub max_wrong_attempts: u32,
    /// Whole seconds left on the question timer, rounded up.
    pub remaining_seconds: Option<i64>,
    pub question: Option<Question>,
    pub question_number: u32,
    pub awaiting_next: bool,
    pub awaiting_confirmation: bool,
    pub outcome: Option<Outcome>,
    /// Answer read from the hand in the latest step.
    pub last_answer: Option<Answer>,
}

impl QuizView {
    /// Whether a raised hand is currently being judged.
    pub fn accepts_answers(&self) -> bool {
        self.phase == Phase::Playing && !self.awaiting_next && !self.awaiting_confirmation
    }
}
