use crate::error::{Chip8Error, Result};

pub const NUM_KEYS: usize = 16;

/// Key's variants are the 16 keys from the CHIP-8's hexadecimal keyboard.
/// The recommended key mapping is:
///
/// Keypad                   Keyboard
/// +-+-+-+-+                +-+-+-+-+
/// |1|2|3|C|                |1|2|3|4|
/// +-+-+-+-+                +-+-+-+-+
/// |4|5|6|D|                |Q|W|E|R|
/// +-+-+-+-+       =>       +-+-+-+-+
/// |7|8|9|E|                |A|S|D|F|
/// +-+-+-+-+                +-+-+-+-+
/// |A|0|B|F|                |Z|X|C|V|
/// +-+-+-+-+                +-+-+-+-+
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone)]
pub enum Key {
    Key0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Key {
    /// Index of the key on the keypad, 0x0 - 0xF
    pub fn index(self) -> u8 {
        match self {
            Key::Key0 => 0x0,
            Key::Key1 => 0x1,
            Key::Key2 => 0x2,
            Key::Key3 => 0x3,
            Key::Key4 => 0x4,
            Key::Key5 => 0x5,
            Key::Key6 => 0x6,
            Key::Key7 => 0x7,
            Key::Key8 => 0x8,
            Key::Key9 => 0x9,
            Key::A => 0xA,
            Key::B => 0xB,
            Key::C => 0xC,
            Key::D => 0xD,
            Key::E => 0xE,
            Key::F => 0xF,
        }
    }
}

/// Implemented by front ends that can report which keypad keys are currently held
pub trait AsKeyboard {
    fn keys_down(&self) -> Vec<Key>;
}

/// Up/down state of the 16 keypad keys
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Keyboard {
    key_input: [bool; NUM_KEYS],
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    pub fn set_key(&mut self, idx: u8, pressed: bool) -> Result<()> {
        if idx as usize >= NUM_KEYS {
            return Err(Chip8Error::InvalidKey(idx));
        }
        self.key_input[idx as usize] = pressed;
        Ok(())
    }

    /// Return whether the key at the given index is down
    pub fn get_key_state(&self, idx: u8) -> Result<bool> {
        self.key_input
            .get(idx as usize)
            .copied()
            .ok_or(Chip8Error::InvalidKey(idx))
    }

    /// Replace the whole keypad state with the keys currently held on the host.
    /// Every key not in `keys` is released
    pub fn update(&mut self, keys: &[Key]) {
        self.key_input = [false; NUM_KEYS];
        for key in keys {
            self.key_input[key.index() as usize] = true;
        }
    }

    /// Scan the keypad in ascending order. When several keys are held the last
    /// one found (the highest index) wins
    pub fn pressed_key(&self) -> Option<u8> {
        let mut found = None;
        for (idx, &down) in self.key_input.iter().enumerate() {
            if down {
                found = Some(idx as u8);
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_release() {
        let mut keyboard = Keyboard::new();
        assert_eq!(keyboard.get_key_state(0xA).unwrap(), false);

        keyboard.set_key(0xA, true).unwrap();
        assert_eq!(keyboard.get_key_state(0xA).unwrap(), true);

        keyboard.set_key(0xA, false).unwrap();
        assert_eq!(keyboard.get_key_state(0xA).unwrap(), false);
    }

    #[test]
    fn rejects_out_of_range_keys() {
        let mut keyboard = Keyboard::new();
        assert!(matches!(
            keyboard.set_key(0x10, true),
            Err(Chip8Error::InvalidKey(0x10))
        ));
        assert!(keyboard.get_key_state(0xFF).is_err());
    }

    #[test]
    fn update_replaces_state() {
        let mut keyboard = Keyboard::new();
        keyboard.set_key(0x2, true).unwrap();
        keyboard.update(&[Key::Key1, Key::C]);

        assert_eq!(keyboard.get_key_state(0x1).unwrap(), true);
        assert_eq!(keyboard.get_key_state(0xC).unwrap(), true);
        assert_eq!(keyboard.get_key_state(0x2).unwrap(), false);
    }

    #[test]
    fn last_pressed_key_wins() {
        let mut keyboard = Keyboard::new();
        assert_eq!(keyboard.pressed_key(), None);

        keyboard.set_key(0x3, true).unwrap();
        assert_eq!(keyboard.pressed_key(), Some(0x3));

        keyboard.set_key(0x9, true).unwrap();
        keyboard.set_key(0x1, true).unwrap();
        assert_eq!(keyboard.pressed_key(), Some(0x9));
    }

    #[test]
    fn key_indices() {
        assert_eq!(Key::Key0.index(), 0x0);
        assert_eq!(Key::Key9.index(), 0x9);
        assert_eq!(Key::F.index(), 0xF);
    }
}
