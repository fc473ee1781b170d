use std::path::PathBuf;
use std::time::Duration as StdDuration;

use chrono::Duration;
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    error::Result,
    hand::tracker::{DetectorProcess, HandTracker, NoTracker},
    img::Assets,
    quiz::{Catalogue, QuizStateMachine, Rules, MAX_WRONG_ATTEMPTS},
    render::Renderer,
    stream::CameraStream,
};

extern crate pretty_env_logger;
#[macro_use]
extern crate log;

pub mod error;
pub mod hand;
mod img;
pub mod input;
pub mod pipeline;
pub mod quiz;
mod render;
pub mod stream;

/// Finger-counting quiz game
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Config {
    /// Index of the camera to read from.
    #[clap(short, long, default_value_t = 0)]
    pub camera: i32,

    /// JSON file with the question catalogue.
    #[clap(short, long, parse(from_os_str), default_value = "questions.json")]
    pub questions: PathBuf,

    /// Directory holding logo.png, correct.png, time_up.png, game_over.png and win.png.
    #[clap(short, long, parse(from_os_str), default_value = "asset")]
    pub assets: PathBuf,

    /// Command that starts the hand landmark detector. Without it no hands
    /// are detected.
    #[clap(short, long)]
    pub detector: Option<String>,

    #[clap(long, default_value_t = 500)]
    pub detector_timeout_ms: u64,

    #[clap(long, default_value_t = 0.7)]
    pub min_confidence: f32,

    /// Seconds allowed per question.
    #[clap(long, default_value_t = 7)]
    pub question_seconds: i64,

    /// Points for a correct answer.
    #[clap(long, default_value_t = 10)]
    pub award: u32,

    /// Count wrong finger answers as mistakes, not only timeouts.
    #[clap(long)]
    pub penalize_wrong_guesses: bool,

    /// Do not draw the hand skeleton.
    #[clap(long)]
    pub hide_landmarks: bool,

    /// Seed for question order.
    #[clap(long)]
    pub seed: Option<u64>,

    #[clap(long, default_value = "FingerFacts")]
    pub window_title: String,
}

impl Config {
    pub fn rules(&self) -> Rules {
        Rules {
            award: self.award,
            question_time: Duration::seconds(self.question_seconds.max(1)),
            max_wrong_attempts: MAX_WRONG_ATTEMPTS,
            penalize_wrong_guesses: self.penalize_wrong_guesses,
        }
    }

    fn tracker(&self) -> Result<Box<dyn HandTracker>> {
        match &self.detector {
            Some(command) => Ok(Box::new(DetectorProcess::spawn(
                command,
                StdDuration::from_millis(self.detector_timeout_ms),
                self.min_confidence,
            )?)),
            None => {
                warn!("no hand detector configured, only the keyboard will work");
                Ok(Box::new(NoTracker))
            }
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

pub fn start() -> Result<()> {
    pretty_env_logger::init_timed();

    let config = Config::parse();
    debug!("{:?}", config);

    run(config)
}

pub fn run(config: Config) -> Result<()> {
    let catalogue = Catalogue::load(&config.questions)?;
    let assets = Assets::load(&config.assets, &catalogue)?;

    let rules = config.rules();
    info!(
        "{} seconds per question, {} points per answer",
        rules.question_time.num_seconds(),
        rules.award
    );

    let quiz = QuizStateMachine::new(catalogue, rules, config.rng());
    let tracker = config.tracker()?;
    let camera = CameraStream::open(config.camera)?;
    let renderer = Renderer::new(assets, !config.hide_landmarks);

    let mut pipe = crate::pipeline::new(camera, tracker, quiz, renderer, config.window_title);
    pipe.run()
}
