use crate::quiz::QuizEvent;

const SPACE: i32 = b' ' as i32;
const BACKSPACE: i32 = 8;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    Quiz(QuizEvent),
    Quit,
}

/// Maps a key code from the window's key poll. `-1` means no key was pressed.
pub fn command_for_key(key: i32) -> Option<Command> {
    if key < 0 {
        return None;
    }

    match key & 0xFF {
        SPACE => Some(Command::Quiz(QuizEvent::Start)),
        BACKSPACE => Some(Command::Quiz(QuizEvent::Reset)),
        code => match (code as u8).to_ascii_lowercase() {
            b'n' => Some(Command::Quiz(QuizEvent::Advance)),
            b'l' => Some(Command::Quiz(QuizEvent::Acknowledge)),
            b'q' => Some(Command::Quit),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_game_keys() {
        assert_eq!(command_for_key(32), Some(Command::Quiz(QuizEvent::Start)));
        assert_eq!(
            command_for_key('n' as i32),
            Some(Command::Quiz(QuizEvent::Advance))
        );
        assert_eq!(
            command_for_key('l' as i32),
            Some(Command::Quiz(QuizEvent::Acknowledge))
        );
        assert_eq!(command_for_key(8), Some(Command::Quiz(QuizEvent::Reset)));
        assert_eq!(command_for_key('q' as i32), Some(Command::Quit));
    }

    #[test]
    fn upper_case_keys_behave_the_same() {
        assert_eq!(command_for_key('N' as i32), command_for_key('n' as i32));
        assert_eq!(command_for_key('Q' as i32), Some(Command::Quit));
    }

    #[test]
    fn ignores_no_key_and_unknown_keys() {
        assert_eq!(command_for_key(-1), None);
        assert_eq!(command_for_key('x' as i32), None);
        assert_eq!(command_for_key(13), None);
    }

    #[test]
    fn ignores_modifier_bits_above_the_low_byte() {
        assert_eq!(command_for_key(0x10000 | 'q' as i32), Some(Command::Quit));
    }
}
