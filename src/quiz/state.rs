use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use super::question::{Catalogue, Question, QuestionPool};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Opening,
    Playing,
    GameOver,
}

/// Where the player is with the current question. Waiting for the next
/// question and waiting for a timeout to be acknowledged can never overlap.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum QuestionStatus {
    Answering,
    AwaitingNext,
    AwaitingConfirmation,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every question was asked.
    Completed,
    OutOfAttempts,
}

/// Countdown for the current question, polled against the frame clock.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct QuestionTimer {
    deadline: Option<DateTime<Utc>>,
}

impl QuestionTimer {
    pub fn start(&mut self, now: DateTime<Utc>, budget: Duration) {
        self.deadline = Some(now + budget);
    }

    pub fn stop(&mut self) {
        self.deadline = None;
    }

    pub fn is_active(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.deadline, Some(deadline) if now >= deadline)
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.deadline
            .map(|deadline| std::cmp::max(deadline - now, Duration::zero()))
    }
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: Phase,
    pub score: u32,
    pub wrong_attempts: u32,
    pub pool: QuestionPool,
    pub current_question: Option<Question>,
    pub question_number: u32,
    pub status: QuestionStatus,
    pub timer: QuestionTimer,
}

impl GameState {
    /// State at process start and after a reset: the opening screen with the
    /// first question already drawn and the timer stopped.
    pub fn fresh<R: Rng>(catalogue: &Catalogue, rng: &mut R) -> GameState {
        let mut state = GameState {
            phase: Phase::Opening,
            score: 0,
            wrong_attempts: 0,
            pool: catalogue.pool(),
            current_question: None,
            question_number: 0,
            status: QuestionStatus::Answering,
            timer: QuestionTimer::default(),
        };
        state.draw_next(rng);
        state
    }

    /// Replaces the current question. The question number moves on even when
    /// the pool is empty, in which case `None` is returned.
    pub fn draw_next<R: Rng>(&mut self, rng: &mut R) -> Option<Question> {
        self.question_number += 1;
        self.current_question = self.pool.draw(rng);
        self.current_question.clone()
    }

    pub fn awaiting_next(&self) -> bool {
        self.status == QuestionStatus::AwaitingNext
    }

    pub fn awaiting_confirmation(&self) -> bool {
        self.status == QuestionStatus::AwaitingConfirmation
    }
}
