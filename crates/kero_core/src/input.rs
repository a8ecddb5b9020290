//! Button state tracking as a bitmask.
//!
//! The game never sees host key codes. Hosts translate keyboard events
//! through [`button_from_key`] and feed `button_down` / `button_up`. Presses
//! are edge-triggered by `button_down`'s return value; gameplay code reads the
//! held mask every frame.

/// Discrete buttons of the N-Gage style keypad the game was designed around.
/// The discriminant is the bit position inside a [`ButtonMask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Button {
    Backspace = 1,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    Num0,
    Asterisk,
    Hash,
    SoftLeft,
    SoftRight,
    Select,
    Up,
    Down,
    Left,
    Right,
}

impl Button {
    pub const ALL: &'static [Button] = &[
        Button::Backspace,
        Button::Num1,
        Button::Num2,
        Button::Num3,
        Button::Num4,
        Button::Num5,
        Button::Num6,
        Button::Num7,
        Button::Num8,
        Button::Num9,
        Button::Num0,
        Button::Asterisk,
        Button::Hash,
        Button::SoftLeft,
        Button::SoftRight,
        Button::Select,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
    ];

    pub const fn bit(self) -> u32 {
        1u32 << (self as u32)
    }

    /// Name used by replay files and logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::Backspace => "backspace",
            Self::Num1 => "1",
            Self::Num2 => "2",
            Self::Num3 => "3",
            Self::Num4 => "4",
            Self::Num5 => "5",
            Self::Num6 => "6",
            Self::Num7 => "7",
            Self::Num8 => "8",
            Self::Num9 => "9",
            Self::Num0 => "0",
            Self::Asterisk => "asterisk",
            Self::Hash => "hash",
            Self::SoftLeft => "softleft",
            Self::SoftRight => "softright",
            Self::Select => "select",
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.label() == label)
    }
}

impl std::fmt::Display for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Set of currently held buttons, one bit per [`Button`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonMask(u32);

impl ButtonMask {
    pub const EMPTY: ButtonMask = ButtonMask(0);

    pub fn from_buttons(buttons: &[Button]) -> Self {
        let mut mask = Self::EMPTY;
        for &button in buttons {
            mask.set(button);
        }
        mask
    }

    pub fn set(&mut self, button: Button) {
        self.0 |= button.bit();
    }

    pub fn clear(&mut self, button: Button) {
        self.0 &= !button.bit();
    }

    pub fn is_set(self, button: Button) -> bool {
        self.0 & button.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Host-neutral keyboard keys the game understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    W,
    A,
    S,
    D,
    Space,
    LShift,
    Escape,
    Return,
    Backspace,
    Asterisk,
    Hash,
    SoftLeft,
    SoftRight,
    Select,
    Digit(u8),
}

pub fn button_from_key(key: Key) -> Option<Button> {
    let button = match key {
        Key::Backspace => Button::Backspace,
        Key::Digit(1) => Button::Num1,
        Key::Digit(2) => Button::Num2,
        Key::Digit(3) => Button::Num3,
        Key::Digit(4) => Button::Num4,
        Key::Digit(5) | Key::LShift => Button::Num5,
        Key::Digit(6) => Button::Num6,
        Key::Digit(7) | Key::Space => Button::Num7,
        Key::Digit(8) => Button::Num8,
        Key::Digit(9) => Button::Num9,
        Key::Digit(0) => Button::Num0,
        Key::Digit(_) => return None,
        Key::Asterisk => Button::Asterisk,
        Key::Hash => Button::Hash,
        Key::SoftLeft | Key::Escape => Button::SoftLeft,
        Key::SoftRight => Button::SoftRight,
        Key::Select | Key::Return => Button::Select,
        Key::Up | Key::W => Button::Up,
        Key::Down | Key::S => Button::Down,
        Key::Left | Key::A => Button::Left,
        Key::Right | Key::D => Button::Right,
    };
    Some(button)
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: ButtonMask,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the button was not already held.
    pub fn button_down(&mut self, button: Button) -> bool {
        let newly = !self.held.is_set(button);
        self.held.set(button);
        newly
    }

    pub fn button_up(&mut self, button: Button) {
        self.held.clear(button);
    }

    pub fn is_held(&self, button: Button) -> bool {
        self.held.is_set(button)
    }

    pub fn mask(&self) -> ButtonMask {
        self.held
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_set_and_clear() {
        let mut mask = ButtonMask::EMPTY;
        mask.set(Button::Left);
        assert!(mask.is_set(Button::Left));
        assert!(!mask.is_set(Button::Right));
        mask.set(Button::Right);
        assert!(mask.is_set(Button::Right));
        mask.clear(Button::Left);
        assert!(!mask.is_set(Button::Left));
        mask.clear(Button::Right);
        assert!(mask.is_empty());
    }

    #[test]
    fn test_every_button_has_distinct_bit() {
        let mut seen = 0u32;
        for &button in Button::ALL {
            assert_eq!(seen & button.bit(), 0, "{button} shares a bit");
            seen |= button.bit();
        }
    }

    #[test]
    fn test_labels_round_trip() {
        for &button in Button::ALL {
            assert_eq!(Button::from_label(button.label()), Some(button));
        }
        assert_eq!(Button::from_label("jump"), None);
    }

    #[test]
    fn test_key_aliases() {
        assert_eq!(button_from_key(Key::Space), Some(Button::Num7));
        assert_eq!(button_from_key(Key::Digit(7)), Some(Button::Num7));
        assert_eq!(button_from_key(Key::LShift), Some(Button::Num5));
        assert_eq!(button_from_key(Key::Escape), Some(Button::SoftLeft));
        assert_eq!(button_from_key(Key::W), Some(Button::Up));
        assert_eq!(button_from_key(Key::A), Some(Button::Left));
        assert_eq!(button_from_key(Key::Digit(42)), None);
    }

    #[test]
    fn test_button_down_reports_new_press_once() {
        let mut input = InputState::new();
        assert!(input.button_down(Button::Num7));
        assert!(!input.button_down(Button::Num7));
        assert!(input.is_held(Button::Num7));
    }
}
