use crate::error::{QuizError, Result};

pub mod finger;
pub mod tracker;

pub use finger::{count_fingers, Finger};

pub const LANDMARK_COUNT: usize = 21;

/// Landmark indices of the 21-point hand model.
pub mod index {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// Bones of the hand skeleton, as pairs of landmark indices.
pub const CONNECTIONS: [(usize, usize); 21] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    (5, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    (9, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    (13, 17),
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
];

/// A single landmark in normalized image coordinates. Smaller `y` is higher
/// on screen. `z` is carried along but never used for counting.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Landmark {
        Landmark { x, y, z: 0.0 }
    }
}

/// One detected hand. Always holds exactly 21 landmarks.
#[derive(Clone, Debug)]
pub struct HandLandmarks {
    landmarks: [Landmark; LANDMARK_COUNT],
    pub confidence: f32,
    pub handedness: String,
}

impl HandLandmarks {
    pub fn new(landmarks: &[Landmark]) -> Result<HandLandmarks> {
        let landmarks: [Landmark; LANDMARK_COUNT] = landmarks
            .try_into()
            .map_err(|_| QuizError::LandmarkCount(landmarks.len()))?;

        Ok(HandLandmarks {
            landmarks,
            confidence: 1.0,
            handedness: String::new(),
        })
    }

    pub fn with_detection(mut self, confidence: f32, handedness: String) -> HandLandmarks {
        self.confidence = confidence;
        self.handedness = handedness;
        self
    }

    pub fn get(&self, index: usize) -> &Landmark {
        &self.landmarks[index]
    }

    /// Landmark positions scaled to a `width` x `height` image.
    pub fn to_pixels(&self, width: i32, height: i32) -> Vec<(i32, i32)> {
        self.landmarks
            .iter()
            .map(|lm| {
                (
                    (lm.x * width as f32).round() as i32,
                    (lm.y * height as f32).round() as i32,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_landmark_count() {
        let short = vec![Landmark::default(); 20];
        match HandLandmarks::new(&short) {
            Err(QuizError::LandmarkCount(20)) => {}
            other => panic!("expected a landmark count error, got {:?}", other),
        }

        let long = vec![Landmark::default(); 22];
        assert!(HandLandmarks::new(&long).is_err());
    }

    #[test]
    fn scales_landmarks_to_pixels() {
        let mut points = vec![Landmark::default(); LANDMARK_COUNT];
        points[index::INDEX_TIP] = Landmark::new(0.5, 0.25);
        let hand = HandLandmarks::new(&points).unwrap();

        let pixels = hand.to_pixels(640, 480);
        assert_eq!(pixels.len(), LANDMARK_COUNT);
        assert_eq!(pixels[index::INDEX_TIP], (320, 120));
        assert_eq!(pixels[index::WRIST], (0, 0));
    }

    #[test]
    fn connections_stay_inside_the_hand() {
        for (a, b) in CONNECTIONS.iter() {
            assert!(*a < LANDMARK_COUNT && *b < LANDMARK_COUNT);
        }
    }
}
