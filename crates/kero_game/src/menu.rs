//! Pause menu and the cheat sequence typed while paused.

use kero_core::input::{Button, ButtonMask};

const CHEAT_SEQUENCE: [Button; 5] = [
    Button::Num5,
    Button::Num4,
    Button::Num2,
    Button::Num8,
    Button::Num7,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Resume,
    Settings,
    Quit,
}

impl MenuItem {
    const ORDER: [MenuItem; 3] = [MenuItem::Resume, MenuItem::Settings, MenuItem::Quit];

    pub fn index(self) -> usize {
        match self {
            Self::Resume => 0,
            Self::Settings => 1,
            Self::Quit => 2,
        }
    }

    fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    fn previous(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Paused,
    Resumed,
    Moved(MenuItem),
    Quit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuResponse {
    pub action: Option<MenuAction>,
    pub cheat_entered: bool,
}

/// Last few presses, oldest first once the ring wraps.
#[derive(Debug, Clone, Default)]
struct CheatBuffer {
    keys: [Option<Button>; CHEAT_SEQUENCE.len()],
    head: usize,
}

impl CheatBuffer {
    /// Record a press. Returns true when the buffer now spells the sequence.
    fn push(&mut self, button: Button) -> bool {
        self.keys[self.head] = Some(button);
        self.head = (self.head + 1) % self.keys.len();
        (0..self.keys.len())
            .map(|i| self.keys[(self.head + i) % self.keys.len()])
            .eq(CHEAT_SEQUENCE.iter().copied().map(Some))
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone)]
pub struct PauseMenu {
    pub paused: bool,
    pub selection: MenuItem,
    cheat: CheatBuffer,
}

impl Default for PauseMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl PauseMenu {
    pub fn new() -> Self {
        Self {
            paused: false,
            selection: MenuItem::Resume,
            cheat: CheatBuffer::default(),
        }
    }

    /// React to a fresh press of `button`. `held` already includes it.
    pub fn handle_button_down(&mut self, button: Button, held: ButtonMask) -> MenuResponse {
        let mut response = MenuResponse::default();

        if self.paused {
            if self.cheat.push(button) {
                log::info!("Cheat sequence entered");
                response.cheat_entered = true;
                self.cheat.clear();
            }
        } else {
            self.cheat.clear();
        }

        let soft_key = held.is_set(Button::SoftLeft) || held.is_set(Button::SoftRight);
        if soft_key && !self.paused {
            self.paused = true;
            self.selection = MenuItem::Resume;
            response.action = Some(MenuAction::Paused);
        } else if self.paused {
            response.action = match button {
                Button::Num7 | Button::Select => self.confirm(),
                Button::Up => {
                    self.selection = self.selection.previous();
                    Some(MenuAction::Moved(self.selection))
                }
                Button::Down => {
                    self.selection = self.selection.next();
                    Some(MenuAction::Moved(self.selection))
                }
                _ => None,
            };
        }
        response
    }

    fn confirm(&mut self) -> Option<MenuAction> {
        match self.selection {
            MenuItem::Resume => {
                self.paused = false;
                Some(MenuAction::Resumed)
            }
            MenuItem::Settings => None,
            MenuItem::Quit => Some(MenuAction::Quit),
        }
    }
}
