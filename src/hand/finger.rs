use enum_iterator::Sequence;

use super::{index, HandLandmarks};

/// Horizontal tip-to-MCP distance above which the thumb counts as raised.
///
/// This only holds for a hand held palm-forward and upright. A rotated hand
/// will miscount the thumb.
pub const THUMB_SPREAD: f32 = 0.1;

#[derive(Debug, Copy, Clone, Ord, PartialOrd, PartialEq, Eq, Sequence)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    /// Tip landmark and the joint it is compared against.
    pub fn joints(&self) -> (usize, usize) {
        match self {
            Finger::Thumb => (index::THUMB_TIP, index::THUMB_MCP),
            Finger::Index => (index::INDEX_TIP, index::INDEX_PIP),
            Finger::Middle => (index::MIDDLE_TIP, index::MIDDLE_PIP),
            Finger::Ring => (index::RING_TIP, index::RING_PIP),
            Finger::Pinky => (index::PINKY_TIP, index::PINKY_PIP),
        }
    }

    pub fn is_raised(&self, hand: &HandLandmarks) -> bool {
        let (tip, joint) = self.joints();
        let tip = hand.get(tip);
        let joint = hand.get(joint);

        match self {
            Finger::Thumb => (tip.x - joint.x).abs() > THUMB_SPREAD,
            _ => tip.y < joint.y,
        }
    }
}

/// Number of raised fingers, 0 to 5.
pub fn count_fingers(hand: &HandLandmarks) -> u8 {
    enum_iterator::all::<Finger>()
        .filter(|finger| finger.is_raised(hand))
        .count() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::{Landmark, LANDMARK_COUNT};

    /// A fist: every tip sits below its joint and the thumb is tucked in.
    fn fist() -> Vec<Landmark> {
        let mut points = vec![Landmark::new(0.5, 0.5); LANDMARK_COUNT];
        for finger in enum_iterator::all::<Finger>() {
            let (tip, joint) = finger.joints();
            points[joint] = Landmark::new(0.5, 0.5);
            points[tip] = Landmark::new(0.52, 0.6);
        }
        points
    }

    fn raise(points: &mut [Landmark], finger: Finger) {
        let (tip, joint) = finger.joints();
        match finger {
            Finger::Thumb => points[tip].x = points[joint].x - 0.2,
            _ => points[tip].y = points[joint].y - 0.15,
        }
    }

    fn hand(points: &[Landmark]) -> HandLandmarks {
        HandLandmarks::new(points).unwrap()
    }

    #[test]
    fn open_hand_counts_five() {
        let mut points = fist();
        for finger in enum_iterator::all::<Finger>() {
            raise(&mut points, finger);
        }
        assert_eq!(count_fingers(&hand(&points)), 5);
    }

    #[test]
    fn fist_counts_zero() {
        assert_eq!(count_fingers(&hand(&fist())), 0);
    }

    #[test]
    fn counts_each_raised_finger_once() {
        let mut points = fist();
        raise(&mut points, Finger::Index);
        raise(&mut points, Finger::Middle);
        raise(&mut points, Finger::Ring);
        assert_eq!(count_fingers(&hand(&points)), 3);

        raise(&mut points, Finger::Thumb);
        assert_eq!(count_fingers(&hand(&points)), 4);
    }

    #[test]
    fn tip_level_with_joint_is_not_raised() {
        let mut points = fist();
        let (tip, joint) = Finger::Index.joints();
        points[tip].y = points[joint].y;
        assert!(!Finger::Index.is_raised(&hand(&points)));
    }

    #[test]
    fn thumb_uses_horizontal_spread_in_both_directions() {
        let mut points = fist();
        let (tip, joint) = Finger::Thumb.joints();

        points[tip].x = points[joint].x + 0.15;
        assert!(Finger::Thumb.is_raised(&hand(&points)));

        points[tip].x = points[joint].x - 0.15;
        assert!(Finger::Thumb.is_raised(&hand(&points)));

        points[tip].x = points[joint].x + 0.05;
        assert!(!Finger::Thumb.is_raised(&hand(&points)));
    }

    #[test]
    fn count_stays_in_range() {
        let values = [0.0f32, 0.3, 0.5, 0.7, 1.0];
        for (i, a) in values.iter().enumerate() {
            for b in values.iter() {
                let points: Vec<Landmark> = (0..LANDMARK_COUNT)
                    .map(|n| {
                        if n % 2 == i % 2 {
                            Landmark::new(*a, *b)
                        } else {
                            Landmark::new(*b, *a)
                        }
                    })
                    .collect();
                assert!(count_fingers(&hand(&points)) <= 5);
            }
        }
    }
}
