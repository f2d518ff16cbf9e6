//! Input state
//!
//! The host forwards key and pointer events; the scene reads a per-frame
//! snapshot. Held keys persist across frames, presses and pointer motion are
//! cleared by [`InputState::end_frame`].

use std::collections::{HashMap, HashSet};

use bitflags::bitflags;

use crate::foundation::math::{utils, Vec2, Vec3};

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A key
    A,
    /// B key
    B,
    /// C key
    C,
    /// D key
    D,
    /// E key
    E,
    /// F key
    F,
    /// G key
    G,
    /// H key
    H,
    /// I key
    I,
    /// J key
    J,
    /// K key
    K,
    /// L key
    L,
    /// M key
    M,
    /// N key
    N,
    /// O key
    O,
    /// P key
    P,
    /// Q key
    Q,
    /// R key
    R,
    /// S key
    S,
    /// T key
    T,
    /// U key
    U,
    /// V key
    V,
    /// W key
    W,
    /// X key
    X,
    /// Y key
    Y,
    /// Z key
    Z,
    /// 0 key on the top row
    Digit0,
    /// 1 key on the top row
    Digit1,
    /// 2 key on the top row
    Digit2,
    /// 3 key on the top row
    Digit3,
    /// 4 key on the top row
    Digit4,
    /// 5 key on the top row
    Digit5,
    /// 6 key on the top row
    Digit6,
    /// 7 key on the top row
    Digit7,
    /// 8 key on the top row
    Digit8,
    /// 9 key on the top row
    Digit9,
    /// Space bar
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow key
    Up,
    /// Down arrow key
    Down,
    /// Left arrow key
    Left,
    /// Right arrow key
    Right,
    /// Either shift key
    Shift,
    /// Either control key
    Control,
    /// Either alt key
    Alt,
}

impl KeyCode {
    const DIGITS: [Self; 10] = [
        Self::Digit0,
        Self::Digit1,
        Self::Digit2,
        Self::Digit3,
        Self::Digit4,
        Self::Digit5,
        Self::Digit6,
        Self::Digit7,
        Self::Digit8,
        Self::Digit9,
    ];

    /// Numeric value of a top-row digit key
    pub fn digit(self) -> Option<u8> {
        Self::DIGITS
            .iter()
            .position(|&key| key == self)
            .and_then(|index| u8::try_from(index).ok())
    }

    fn modifier(self) -> Modifiers {
        match self {
            Self::Shift => Modifiers::SHIFT,
            Self::Control => Modifiers::CONTROL,
            Self::Alt => Modifiers::ALT,
            _ => Modifiers::empty(),
        }
    }
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

bitflags! {
    /// Modifier keys held during a press
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Shift held
        const SHIFT = 1 << 0;
        /// Control held
        const CONTROL = 1 << 1;
        /// Alt held
        const ALT = 1 << 2;
    }
}

/// Which keys drive the movement vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementMapping {
    /// W/A/S/D
    Wasd,
    /// Arrow keys
    Arrows,
    /// Either set
    #[default]
    Both,
}

/// A key chord registered under an action name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    /// Key that triggers the action
    pub key: KeyCode,
    /// Modifiers that must be held
    pub modifiers: Modifiers,
}

/// Per-frame input snapshot
#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<KeyCode>,
    pressed: Vec<(KeyCode, Modifiers)>,
    pointer_delta: Vec2,
    pointer_locked: bool,
    mapping: MovementMapping,
    bindings: HashMap<String, KeyBinding>,
}

impl InputState {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the movement keys
    pub fn set_movement_mapping(&mut self, mapping: MovementMapping) {
        self.mapping = mapping;
    }

    fn modifiers(&self) -> Modifiers {
        self.held
            .iter()
            .fold(Modifiers::empty(), |mods, key| mods | key.modifier())
    }

    /// Record a key going down; repeats while held are ignored
    pub fn key_down(&mut self, key: KeyCode) {
        let modifiers = self.modifiers();
        if self.held.insert(key) {
            self.pressed.push((key, modifiers));
        }
    }

    /// Record a key going up
    pub fn key_up(&mut self, key: KeyCode) {
        self.held.remove(&key);
    }

    /// Record a mouse click; the left button captures the pointer
    pub fn mouse_down(&mut self, button: MouseButton) {
        if button == MouseButton::Left {
            self.pointer_locked = true;
        }
    }

    /// Release or capture the pointer
    pub fn set_pointer_locked(&mut self, locked: bool) {
        self.pointer_locked = locked;
    }

    /// Whether pointer motion steers the camera
    pub fn is_pointer_locked(&self) -> bool {
        self.pointer_locked
    }

    /// Accumulate pointer motion while captured
    pub fn pointer_moved(&mut self, dx: f32, dy: f32) {
        if self.pointer_locked {
            self.pointer_delta += Vec2::new(dx, dy);
        }
    }

    /// Pointer motion since the last frame
    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_delta
    }

    /// Whether `key` is down
    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// Keys pressed this frame, in order
    pub fn just_pressed(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.pressed.iter().map(|(key, _)| *key)
    }

    /// Register `action` to fire on `key` with `modifiers` held
    pub fn bind(&mut self, action: impl Into<String>, key: KeyCode, modifiers: Modifiers) {
        self.bindings.insert(action.into(), KeyBinding { key, modifiers });
    }

    /// Whether a registered action fired this frame
    pub fn action_triggered(&self, action: &str) -> bool {
        let Some(binding) = self.bindings.get(action) else {
            return false;
        };
        self.pressed
            .iter()
            .any(|(key, mods)| *key == binding.key && mods.contains(binding.modifiers))
    }

    fn axis(&self, positive: [KeyCode; 2], negative: [KeyCode; 2]) -> f32 {
        let keys = |pair: [KeyCode; 2]| match self.mapping {
            MovementMapping::Wasd => self.is_held(pair[0]),
            MovementMapping::Arrows => self.is_held(pair[1]),
            MovementMapping::Both => self.is_held(pair[0]) || self.is_held(pair[1]),
        };
        f32::from(u8::from(keys(positive))) - f32::from(u8::from(keys(negative)))
    }

    /// Local movement direction: `+z` forward, `+x` left, normalized or zero
    pub fn movement_vector(&self) -> Vec3 {
        let forward = self.axis([KeyCode::W, KeyCode::Up], [KeyCode::S, KeyCode::Down]);
        let left = self.axis([KeyCode::A, KeyCode::Left], [KeyCode::D, KeyCode::Right]);
        utils::normalize_or_zero(&Vec3::new(left, 0.0, forward))
    }

    /// Clear per-frame presses and pointer motion
    pub fn end_frame(&mut self) {
        self.pressed.clear();
        self.pointer_delta = Vec2::zeros();
    }
}
