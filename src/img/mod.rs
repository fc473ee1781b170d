use std::collections::HashMap;
use std::path::{Path, PathBuf};

use opencv::core::{Mat, Size};
use opencv::imgcodecs::{imread, IMREAD_UNCHANGED};
use opencv::imgproc::{resize, INTER_AREA};
use opencv::prelude::*;

use crate::error::Result;
use crate::quiz::Catalogue;

pub mod frame;

pub const QUESTION_SIZE: (i32, i32) = (300, 261);
const BANNER_SIZE: (i32, i32) = (400, 300);
const BADGE_SIZE: (i32, i32) = (300, 200);

/// Reads an image with its alpha channel and scales it to `size`.
/// A missing or unreadable file gives `None`.
pub fn load_image(path: &Path, size: (i32, i32)) -> Result<Option<Mat>> {
    let raw = imread(&path.to_string_lossy(), IMREAD_UNCHANGED)?;
    if raw.rows() == 0 || raw.cols() == 0 {
        warn!("could not load image {}", path.display());
        return Ok(None);
    }

    let mut resized = Mat::default();
    resize(
        &raw,
        &mut resized,
        Size::new(size.0, size.1),
        0.0,
        0.0,
        INTER_AREA,
    )?;

    debug!("loaded {} as {}x{}", path.display(), size.0, size.1);

    Ok(Some(resized))
}

/// Every picture the game draws, decoded once at startup.
pub struct Assets {
    pub logo: Option<Mat>,
    pub correct: Option<Mat>,
    pub time_up: Option<Mat>,
    pub game_over: Option<Mat>,
    pub win: Option<Mat>,
    questions: HashMap<PathBuf, Mat>,
}

impl Assets {
    pub fn load(dir: &Path, catalogue: &Catalogue) -> Result<Assets> {
        let mut questions = HashMap::new();
        for question in catalogue.iter() {
            if let Some(image) = load_image(&question.image, QUESTION_SIZE)? {
                questions.insert(question.image.clone(), image);
            }
        }

        info!(
            "loaded {}/{} question images",
            questions.len(),
            catalogue.len()
        );

        Ok(Assets {
            logo: load_image(&dir.join("logo.png"), BANNER_SIZE)?,
            correct: load_image(&dir.join("correct.png"), BADGE_SIZE)?,
            time_up: load_image(&dir.join("time_up.png"), BADGE_SIZE)?,
            game_over: load_image(&dir.join("game_over.png"), BANNER_SIZE)?,
            win: load_image(&dir.join("win.png"), BANNER_SIZE)?,
            questions,
        })
    }

    pub fn question(&self, image: &Path) -> Option<&Mat> {
        self.questions.get(image)
    }
}
