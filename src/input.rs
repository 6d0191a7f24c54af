use crossterm::event::{poll, read, Event, KeyCode};
use crossterm::terminal;
use std::collections::HashMap;
use std::io;
use std::time::Duration;

use crate::interpreter::KEY_COUNT;

/// map of characters read from the keyboard to hex keypad codes, using the
/// left-hand side of a qwerty keyboard:
///
///   1 2 3 4        1 2 3 C
///   q w e r   =>   4 5 6 D
///   a s d f        7 8 9 E
///   z x c v        A 0 B F
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// Supplies the current press state of the 16-key pad, refreshed once per
/// frame by the host loop and handed to the interpreter as plain booleans.
pub trait Input {
    /// drain pending key events and return the resulting keypad image
    fn poll_keys(&mut self) -> Result<[bool; KEY_COUNT], io::Error>;

    /// whether the user asked to leave the emulator
    fn quit_requested(&self) -> bool;
}

/// simple implementation of Input, using STDIN in raw mode
pub struct StdinInput {
    keymap: HashMap<char, u8>,
    quit: bool,
}

impl StdinInput {
    pub fn new() -> Self {
        terminal::enable_raw_mode().unwrap();
        StdinInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            quit: false,
        }
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        terminal::disable_raw_mode().unwrap();
    }
}

impl Input for StdinInput {
    fn poll_keys(&mut self) -> Result<[bool; KEY_COUNT], io::Error> {
        // terminals report key repeats rather than releases, so a held key
        // shows up as a press in most frames and decays when it stops
        // repeating; good enough for a keypad with no edge detection
        let mut keys = [false; KEY_COUNT];
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                match evt.code {
                    KeyCode::Char(key) => {
                        if let Some(&mapped) = self.keymap.get(&key) {
                            keys[mapped as usize] = true;
                        }
                    }
                    KeyCode::Esc => self.quit = true,
                    _ => {}
                }
            }
        }
        Ok(keys)
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

/// dummy Input implementation for testing
pub struct DummyInput {
    keys: [bool; KEY_COUNT],
}

impl DummyInput {
    pub fn new(pressed: &[u8]) -> Self {
        let mut keys = [false; KEY_COUNT];
        for &key in pressed {
            keys[key as usize] = true;
        }
        DummyInput { keys }
    }
}

impl Input for DummyInput {
    fn poll_keys(&mut self) -> Result<[bool; KEY_COUNT], io::Error> {
        Ok(self.keys)
    }

    fn quit_requested(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keymap_covers_the_whole_pad() {
        let seen: std::collections::HashSet<u8> = CHIP8_CONVENTIONAL_KEYMAP
            .iter()
            .map(|&(_, code)| code)
            .collect();
        assert_eq!(seen.len(), KEY_COUNT);
    }

    #[test]
    fn test_dummy_input_reports_pressed_keys() -> Result<(), io::Error> {
        let mut input = DummyInput::new(&[0x01, 0x0f]);
        let keys = input.poll_keys()?;
        assert!(keys[0x01]);
        assert!(keys[0x0f]);
        assert_eq!(keys.iter().filter(|&&k| k).count(), 2);
        assert!(!input.quit_requested());
        Ok(())
    }
}
