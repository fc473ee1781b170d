use chrono::{DateTime, Duration, Utc};
use rand::{rngs::StdRng, Rng};

use super::{
    question::{Answer, Catalogue},
    state::{GameState, Outcome, Phase, QuestionStatus},
    view::QuizView,
};

pub const MAX_WRONG_ATTEMPTS: u32 = 3;

#[derive(Debug, Copy, Clone)]
pub struct Rules {
    /// Points for a correct answer.
    pub award: u32,
    /// Time allowed per question.
    pub question_time: Duration,
    pub max_wrong_attempts: u32,
    /// Count a wrong finger count as a wrong attempt, not just timeouts.
    pub penalize_wrong_guesses: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            award: 10,
            question_time: Duration::seconds(7),
            max_wrong_attempts: MAX_WRONG_ATTEMPTS,
            penalize_wrong_guesses: false,
        }
    }
}

/// Player commands, one per key.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    Start,
    Advance,
    Acknowledge,
    Reset,
}

pub struct QuizStateMachine<R: Rng = StdRng> {
    catalogue: Catalogue,
    rules: Rules,
    rng: R,
    state: GameState,
    last_answer: Option<Answer>,
}

impl<R: Rng> QuizStateMachine<R> {
    pub fn new(catalogue: Catalogue, rules: Rules, mut rng: R) -> Self {
        let state = GameState::fresh(&catalogue, &mut rng);

        QuizStateMachine {
            catalogue,
            rules,
            rng,
            state,
            last_answer: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.state.phase {
            Phase::GameOver if self.out_of_attempts() => Some(Outcome::OutOfAttempts),
            Phase::GameOver => Some(Outcome::Completed),
            _ => None,
        }
    }

    /// One frame: poll the timer, evaluate the hand, then apply the key.
    pub fn step(
        &mut self,
        fingers: Option<u8>,
        event: Option<QuizEvent>,
        now: DateTime<Utc>,
    ) -> QuizView {
        self.last_answer = None;
        self.tick(now);

        if let Some(count) = fingers {
            self.observe(count);
        }

        if let Some(event) = event {
            self.handle(event, now);
        }

        self.view(now)
    }

    pub fn handle(&mut self, event: QuizEvent, now: DateTime<Utc>) {
        match (event, self.state.phase, self.state.status) {
            (QuizEvent::Start, Phase::Opening, _) => self.start(now),
            (QuizEvent::Advance, Phase::Playing, QuestionStatus::AwaitingNext) => {
                self.next_question(now)
            }
            (QuizEvent::Acknowledge, Phase::Playing, QuestionStatus::AwaitingConfirmation) => {
                self.next_question(now)
            }
            (QuizEvent::Reset, Phase::GameOver, _) => self.reset(),
            (event, phase, status) => {
                debug!("ignoring {:?} during {:?} ({:?})", event, phase, status)
            }
        }
    }

    /// Evaluates a finger count against the current question. Counts outside
    /// 1 to 5 are not answers.
    pub fn observe(&mut self, fingers: u8) {
        if self.state.phase != Phase::Playing || self.state.status != QuestionStatus::Answering {
            return;
        }

        let answer = match Answer::new(fingers) {
            Ok(answer) => answer,
            Err(_) => return,
        };
        self.last_answer = Some(answer);

        let correct = match &self.state.current_question {
            Some(question) => question.answer,
            None => return,
        };

        if answer == correct {
            self.state.status = QuestionStatus::AwaitingNext;
            self.state.score = self.state.score.saturating_add(self.rules.award);
            self.state.timer.stop();
            info!(
                "question {} answered {}, score {}",
                self.state.question_number, answer, self.state.score
            );
        } else if self.rules.penalize_wrong_guesses {
            self.state.wrong_attempts += 1;
            info!(
                "wrong answer {} ({}/{})",
                answer, self.state.wrong_attempts, self.rules.max_wrong_attempts
            );
            if self.out_of_attempts() {
                self.game_over();
            }
        }
    }

    /// Polls the question timer.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if self.state.phase != Phase::Playing
            || self.state.status == QuestionStatus::AwaitingConfirmation
            || !self.state.timer.is_expired(now)
        {
            return;
        }

        self.state.timer.stop();
        self.state.wrong_attempts += 1;
        info!(
            "question {} timed out ({}/{})",
            self.state.question_number, self.state.wrong_attempts, self.rules.max_wrong_attempts
        );

        if self.out_of_attempts() {
            self.game_over();
        } else {
            self.state.status = QuestionStatus::AwaitingConfirmation;
        }
    }

    pub fn view(&self, now: DateTime<Utc>) -> QuizView {
        QuizView {
            phase: self.state.phase,
            score: self.state.score,
            wrong_attempts: self.state.wrong_attempts,
            max_wrong_attempts: self.rules.max_wrong_attempts,
            remaining_seconds: self
                .state
                .timer
                .remaining(now)
                .map(|left| (left.num_milliseconds() + 999) / 1000),
            question: self.state.current_question.clone(),
            question_number: self.state.question_number,
            awaiting_next: self.state.awaiting_next(),
            awaiting_confirmation: self.state.awaiting_confirmation(),
            outcome: self.outcome(),
            last_answer: self.last_answer,
        }
    }

    fn out_of_attempts(&self) -> bool {
        self.state.wrong_attempts >= self.rules.max_wrong_attempts
    }

    fn start(&mut self, now: DateTime<Utc>) {
        info!("starting game with {} questions", self.catalogue.len());
        self.state.phase = Phase::Playing;

        if self.state.current_question.is_none() && self.state.draw_next(&mut self.rng).is_none()
        {
            self.game_over();
            return;
        }

        self.state.status = QuestionStatus::Answering;
        self.state.timer.start(now, self.rules.question_time);
    }

    fn next_question(&mut self, now: DateTime<Utc>) {
        self.last_answer = None;

        match self.state.draw_next(&mut self.rng) {
            Some(_) => {
                debug!(
                    "question {}, {} left",
                    self.state.question_number,
                    self.state.pool.len()
                );
                self.state.status = QuestionStatus::Answering;
                self.state.timer.start(now, self.rules.question_time);
            }
            None => self.game_over(),
        }
    }

    fn game_over(&mut self) {
        self.state.phase = Phase::GameOver;
        self.state.timer.stop();
        info!(
            "game over: score {}, {} wrong attempts",
            self.state.score, self.state.wrong_attempts
        );
    }

    fn reset(&mut self) {
        info!("resetting game");
        self.state = GameState::fresh(&self.catalogue, &mut self.rng);
        self.last_answer = None;
    }
}
