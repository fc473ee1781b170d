use opencv::core::Point;

use crate::error::Result;
use crate::hand::HandLandmarks;
use crate::img::{frame::Frame, Assets, QUESTION_SIZE};
use crate::quiz::{Outcome, Phase, QuizView};

const TEXT_COLOR: (f64, f64, f64) = (0., 255., 255.);
const WARNING_COLOR: (f64, f64, f64) = (0., 0., 255.);
const QUESTION_TOP: i32 = 50;

pub struct Renderer {
    assets: Assets,
    show_landmarks: bool,
}

impl Renderer {
    pub fn new(assets: Assets, show_landmarks: bool) -> Renderer {
        Renderer {
            assets,
            show_landmarks,
        }
    }

    pub fn draw(
        &self,
        frame: Frame,
        view: &QuizView,
        hand: Option<&HandLandmarks>,
    ) -> Result<Frame> {
        let frame = match view.phase {
            Phase::Opening => self.draw_opening(frame)?,
            Phase::Playing => self.draw_playing(frame, view, hand)?,
            Phase::GameOver => self.draw_game_over(frame, view)?,
        };

        Ok(frame)
    }

    fn draw_opening(&self, mut frame: Frame) -> Result<Frame> {
        if let Some(logo) = &self.assets.logo {
            frame = frame.overlay_centered(logo)?;
        }

        let origin = Point::new(frame.width() / 2 - 200, frame.height() - 50);
        frame.put_text("Press SPACE to start", origin, 0.7, TEXT_COLOR)
    }

    fn draw_playing(
        &self,
        mut frame: Frame,
        view: &QuizView,
        hand: Option<&HandLandmarks>,
    ) -> Result<Frame> {
        if let Some(image) = view
            .question
            .as_ref()
            .and_then(|question| self.assets.question(&question.image))
        {
            let origin = Point::new((frame.width() - QUESTION_SIZE.0) / 2, QUESTION_TOP);
            frame = frame.overlay(image, origin)?;
        }

        frame = frame
            .put_text(
                &format!("Score: {}", view.score),
                Point::new(10, 30),
                0.7,
                TEXT_COLOR,
            )?
            .put_text(
                &format!(
                    "Mistakes: {}/{}",
                    view.wrong_attempts, view.max_wrong_attempts
                ),
                Point::new(10, 60),
                0.7,
                TEXT_COLOR,
            )?;

        if let Some(seconds) = view.remaining_seconds {
            let origin = Point::new(frame.width() - 130, 30);
            let color = if seconds <= 2 { WARNING_COLOR } else { TEXT_COLOR };
            frame = frame.put_text(&format!("Time: {}", seconds), origin, 0.7, color)?;
        }

        if view.awaiting_next {
            if let Some(correct) = &self.assets.correct {
                frame = frame.overlay_centered(correct)?;
            }
            let origin = Point::new(10, frame.height() - 20);
            frame = frame.put_text("Press N for the next question", origin, 0.7, TEXT_COLOR)?;
        }

        if view.awaiting_confirmation {
            if let Some(time_up) = &self.assets.time_up {
                frame = frame.overlay_centered(time_up)?;
            }
            let origin = Point::new(10, frame.height() - 20);
            frame = frame.put_text("Time is up! Press L to continue", origin, 0.7, TEXT_COLOR)?;
        }

        if let Some(hand) = hand {
            if self.show_landmarks {
                frame = frame.draw_landmarks(hand)?;
            }

            if let Some(answer) = view.last_answer {
                let origin = Point::new(10, frame.height() - 80);
                frame = frame.put_text(
                    &format!("Your answer: {}", answer),
                    origin,
                    0.7,
                    TEXT_COLOR,
                )?;
            }
        }

        Ok(frame)
    }

    fn draw_game_over(&self, mut frame: Frame, view: &QuizView) -> Result<Frame> {
        let banner = match view.outcome {
            Some(Outcome::Completed) => self.assets.win.as_ref(),
            _ => self.assets.game_over.as_ref(),
        };
        if let Some(banner) = banner {
            frame = frame.overlay_centered(banner)?;
        }

        let center = frame.width() / 2;
        let bottom = frame.height();
        frame
            .put_text(
                &format!("Total score: {}", view.score),
                Point::new(center - 100, bottom - 80),
                1.0,
                TEXT_COLOR,
            )?
            .put_text(
                "Press BACKSPACE to play again",
                Point::new(center - 200, bottom - 40),
                0.7,
                TEXT_COLOR,
            )
    }
}
