pub mod machine;
pub mod question;
pub mod state;
pub mod view;

pub use machine::{QuizEvent, QuizStateMachine, Rules, MAX_WRONG_ATTEMPTS};
pub use question::{Answer, Catalogue, Question, QuestionPool};
pub use state::{GameState, Outcome, Phase, QuestionStatus, QuestionTimer};
pub use view::QuizView;
