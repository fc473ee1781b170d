use opencv::highgui::{destroy_all_windows, imshow, named_window, poll_key, WINDOW_AUTOSIZE};

use crate::{
    error::Result,
    hand::{count_fingers, tracker::HandTracker, HandLandmarks},
    img::frame::Frame,
    input::{command_for_key, Command},
    quiz::{Phase, QuizEvent, QuizStateMachine, QuizView},
    render::Renderer,
    stream::CameraStream,
};

/// The game loop: one pass per camera frame, all on the calling thread.
pub struct Pipeline {
    camera: CameraStream,
    tracker: Box<dyn HandTracker>,
    quiz: QuizStateMachine,
    renderer: Renderer,
    window: String,
}

pub fn new(
    camera: CameraStream,
    tracker: Box<dyn HandTracker>,
    quiz: QuizStateMachine,
    renderer: Renderer,
    window: String,
) -> Pipeline {
    Pipeline {
        camera,
        tracker,
        quiz,
        renderer,
        window,
    }
}

impl Pipeline {
    /// Runs until the quit key is pressed or the camera stops delivering.
    pub fn run(&mut self) -> Result<()> {
        named_window(&self.window, WINDOW_AUTOSIZE)?;
        let mut pending: Option<QuizEvent> = None;

        let result = loop {
            match self.process_frame(pending.take()) {
                Ok(Some(Command::Quit)) => {
                    info!("quit requested");
                    break Ok(());
                }
                Ok(Some(Command::Quiz(event))) => pending = Some(event),
                Ok(None) => {}
                Err(e) => break Err(e),
            }
        };

        destroy_all_windows()?;
        result
    }

    /// Captures, judges and shows one frame, applying the key pressed during
    /// the previous frame. Returns the key pressed during this one.
    fn process_frame(&mut self, event: Option<QuizEvent>) -> Result<Option<Command>> {
        let frame = self.camera.next_frame()?;

        let (view, hand) = judge(&mut self.quiz, self.tracker.as_mut(), &frame, event)?;
        let frame = self.renderer.draw(frame, &view, hand.as_ref())?;

        imshow(&self.window, &frame.mat)?;

        Ok(command_for_key(poll_key()?))
    }
}

/// Runs the hand tracker on `frame` and advances the quiz at the time the
/// frame was captured.
pub(crate) fn judge(
    quiz: &mut QuizStateMachine,
    tracker: &mut dyn HandTracker,
    frame: &Frame,
    event: Option<QuizEvent>,
) -> Result<(QuizView, Option<HandLandmarks>)> {
    let now = frame.start_date;

    let before = quiz.view(now);
    let hand = match before.phase {
        Phase::Playing => tracker.detect(&frame.mat)?,
        _ => None,
    };

    let fingers = match &hand {
        Some(hand) if before.accepts_answers() => {
            let count = count_fingers(hand);
            debug!(
                "frame {}\tfingers {}\t{} hand {:.2}",
                frame.num, count, hand.handedness, hand.confidence
            );
            Some(count)
        }
        _ => None,
    };

    Ok((quiz.step(fingers, event, now), hand))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use opencv::{
        core::{Mat, Scalar, CV_8UC3},
        prelude::*,
    };
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{
        hand::tracker::NoTracker,
        quiz::{Catalogue, Question, Rules},
    };

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    fn frame(num: i64, start_date: DateTime<Utc>) -> Frame {
        Frame {
            mat: Mat::new_rows_cols_with_default(4, 4, CV_8UC3, Scalar::all(0.0)).unwrap(),
            num,
            start_date,
        }
    }

    #[test]
    fn timer_follows_the_frame_capture_time() {
        let catalogue = Catalogue::new(vec![Question::new("q.png", 2).unwrap()]);
        let mut quiz =
            QuizStateMachine::new(catalogue, Rules::default(), StdRng::seed_from_u64(1));
        let mut tracker = NoTracker;

        let (view, _) = judge(&mut quiz, &mut tracker, &frame(0, at(0)), Some(QuizEvent::Start))
            .unwrap();
        assert_eq!(view.phase, Phase::Playing);

        // the wall clock is long past this deadline, the frame is not
        let (view, hand) = judge(&mut quiz, &mut tracker, &frame(1, at(3)), None).unwrap();
        assert!(hand.is_none());
        assert_eq!(view.wrong_attempts, 0);
        assert_eq!(view.remaining_seconds, Some(4));

        let (view, _) = judge(&mut quiz, &mut tracker, &frame(2, at(7)), None).unwrap();
        assert_eq!(view.wrong_attempts, 1);
        assert!(view.awaiting_confirmation);
    }
}
