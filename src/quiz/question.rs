use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use rand::Rng;
use serde::Deserialize;

use crate::error::{QuizError, Result};

/// A multiple-choice answer, shown to the player as A to E and given by
/// raising 1 to 5 fingers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Answer(u8);

impl Answer {
    pub fn new(fingers: u8) -> Result<Answer> {
        if (1..=5).contains(&fingers) {
            Ok(Answer(fingers))
        } else {
            Err(QuizError::InvalidAnswer(fingers))
        }
    }

    pub fn fingers(&self) -> u8 {
        self.0
    }

    pub fn letter(&self) -> char {
        (b'A' + self.0 - 1) as char
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Question {
    pub image: PathBuf,
    pub answer: Answer,
}

impl Question {
    pub fn new<P: Into<PathBuf>>(image: P, answer: u8) -> Result<Question> {
        Ok(Question {
            image: image.into(),
            answer: Answer::new(answer)?,
        })
    }
}

#[derive(Deserialize, Debug)]
struct QuestionJson {
    image: PathBuf,
    answer: u8,
}

/// The fixed, ordered set of questions a game is played with.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    questions: Vec<Question>,
}

impl Catalogue {
    pub fn new(questions: Vec<Question>) -> Catalogue {
        Catalogue { questions }
    }

    /// Reads a JSON array of `{"image": ..., "answer": 1-5}` records. Relative
    /// image paths are taken from the catalogue's own directory.
    pub fn load(path: &Path) -> Result<Catalogue> {
        let text = fs::read_to_string(path).map_err(|e| QuizError::Catalogue {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));

        let catalogue = Catalogue::parse(&text, base).map_err(|e| QuizError::Catalogue {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        info!(
            "loaded {} questions from {}",
            catalogue.len(),
            path.display()
        );

        Ok(catalogue)
    }

    pub fn parse(text: &str, base: &Path) -> Result<Catalogue> {
        let records: Vec<QuestionJson> = serde_json::from_str(text)?;

        let questions = records
            .into_iter()
            .map(|record| {
                let image = if record.image.is_relative() {
                    base.join(&record.image)
                } else {
                    record.image
                };
                Question::new(image, record.answer)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Catalogue { questions })
    }

    pub fn iter(&self) -> std::slice::Iter<Question> {
        self.questions.iter()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn pool(&self) -> QuestionPool {
        QuestionPool {
            remaining: self.questions.clone(),
        }
    }
}

/// Questions not yet asked in the current game.
#[derive(Debug, Clone)]
pub struct QuestionPool {
    remaining: Vec<Question>,
}

impl QuestionPool {
    /// Removes and returns a uniformly chosen question, `None` once empty.
    pub fn draw<R: Rng>(&mut self, rng: &mut R) -> Option<Question> {
        if self.remaining.is_empty() {
            return None;
        }

        let pick = rng.gen_range(0..self.remaining.len());
        Some(self.remaining.swap_remove(pick))
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn catalogue(size: u8) -> Catalogue {
        Catalogue::new(
            (0..size)
                .map(|i| Question::new(format!("q{}.png", i), i % 5 + 1).unwrap())
                .collect(),
        )
    }

    #[test]
    fn answers_are_limited_to_five_fingers() {
        assert!(Answer::new(0).is_err());
        assert!(Answer::new(6).is_err());
        assert_eq!(Answer::new(1).unwrap().letter(), 'A');
        assert_eq!(Answer::new(5).unwrap().to_string(), "E");
    }

    #[test]
    fn pool_draws_every_question_once() {
        let catalogue = catalogue(10);
        let mut pool = catalogue.pool();
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();

        for left in (0..10).rev() {
            let question = pool.draw(&mut rng).unwrap();
            assert!(seen.insert(question.image.clone()));
            assert_eq!(pool.len(), left);
        }

        assert!(pool.is_empty());
        assert!(pool.draw(&mut rng).is_none());
        assert_eq!(seen.len(), catalogue.len());
    }

    #[test]
    fn parses_catalogue_relative_to_its_directory() {
        let text = r#"[
            {"image": "img/q1.png", "answer": 3},
            {"image": "/abs/q2.png", "answer": 5}
        ]"#;
        let catalogue = Catalogue::parse(text, Path::new("data")).unwrap();
        let questions: Vec<&Question> = catalogue.iter().collect();

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].image, Path::new("data").join("img/q1.png"));
        assert_eq!(questions[0].answer.fingers(), 3);
        assert_eq!(questions[1].image, PathBuf::from("/abs/q2.png"));
    }

    #[test]
    fn rejects_out_of_range_answers() {
        let text = r#"[{"image": "q1.png", "answer": 7}]"#;
        match Catalogue::parse(text, Path::new("")) {
            Err(QuizError::InvalidAnswer(7)) => {}
            other => panic!("expected an invalid answer, got {:?}", other),
        }
    }

    #[test]
    fn missing_catalogue_file_names_the_path() {
        let path = Path::new("does/not/exist.json");
        match Catalogue::load(path) {
            Err(QuizError::Catalogue { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected a catalogue error, got {:?}", other),
        }
    }
}
