//! Input management system
//!
//! Raw device events are pushed by the hosting window layer through an
//! [`InputHandle`] between frames; everything else in the runtime only
//! ever sees the polled, frame-scoped accessors. Mouse deltas accumulate
//! while pointer lock is active and reset when taken, so each poll
//! observes the travel since the previous one. Raw device callbacks are
//! never exposed to other systems.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use crate::ecs::{System, SystemError, World};

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// W key
    W,
    /// A key
    A,
    /// S key
    S,
    /// D key
    D,
    /// Space key
    Space,
    /// Left shift key
    ShiftLeft,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
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

/// A raw device event captured by the hosting window layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A key went down
    KeyPressed(Key),

    /// A key went up
    KeyReleased(Key),

    /// A mouse button changed state
    MouseButton {
        /// The button that changed
        button: MouseButton,
        /// Whether the button is now pressed
        pressed: bool,
    },

    /// Relative mouse motion
    MouseMoved {
        /// Horizontal travel in pixels
        dx: f32,
        /// Vertical travel in pixels
        dy: f32,
    },

    /// Pointer lock was acquired or released
    PointerLock(bool),
}

#[derive(Debug, Default)]
struct InputState {
    queue: VecDeque<InputEvent>,
    keys: HashMap<Key, bool>,
    buttons: HashMap<MouseButton, bool>,
    mouse_dx: f32,
    mouse_dy: f32,
    pointer_locked: bool,
}

/// Cloneable handle onto the input system's polled state
///
/// The window layer pushes raw events in; gameplay systems poll. Pushed
/// events take effect at the next input pass, so every system within a
/// frame observes the same input state.
#[derive(Clone, Default)]
pub struct InputHandle {
    state: Arc<Mutex<InputState>>,
}

impl InputHandle {
    fn lock(&self) -> std::sync::MutexGuard<'_, InputState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a raw device event for the next input pass
    pub fn push_event(&self, event: InputEvent) {
        self.lock().queue.push_back(event);
    }

    /// Whether `key` is currently held down
    pub fn is_key_down(&self, key: Key) -> bool {
        self.lock().keys.get(&key).copied().unwrap_or(false)
    }

    /// Whether `button` is currently held down
    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.lock().buttons.get(&button).copied().unwrap_or(false)
    }

    /// Accumulated mouse travel since the previous poll; resets on read
    pub fn take_mouse_delta(&self) -> (f32, f32) {
        let mut state = self.lock();
        let delta = (state.mouse_dx, state.mouse_dy);
        state.mouse_dx = 0.0;
        state.mouse_dy = 0.0;
        delta
    }

    /// Whether pointer lock is currently active
    pub fn pointer_locked(&self) -> bool {
        self.lock().pointer_locked
    }
}

/// System draining raw device events into polled input state
///
/// Runs first in the frame so every later system observes this frame's
/// input.
#[derive(Default)]
pub struct InputSystem {
    handle: InputHandle,
}

impl InputSystem {
    /// Priority the input pass runs at
    pub const PRIORITY: i32 = 0;

    /// Create a new input system
    pub fn new() -> Self {
        Self::default()
    }

    /// The handle the window layer and gameplay systems share
    pub fn handle(&self) -> InputHandle {
        self.handle.clone()
    }
}

impl System for InputSystem {
    fn name(&self) -> &str {
        "input"
    }

    fn priority(&self) -> i32 {
        Self::PRIORITY
    }

    fn init(&mut self, _world: &mut World) -> Result<(), SystemError> {
        log::info!("input system ready");
        Ok(())
    }

    fn update(&mut self, _world: &mut World, _dt: f32) -> Result<(), SystemError> {
        let mut state = self.handle.lock();
        while let Some(event) = state.queue.pop_front() {
            match event {
                InputEvent::KeyPressed(key) => {
                    state.keys.insert(key, true);
                }
                InputEvent::KeyReleased(key) => {
                    state.keys.insert(key, false);
                }
                InputEvent::MouseButton { button, pressed } => {
                    state.buttons.insert(button, pressed);
                }
                InputEvent::MouseMoved { dx, dy } => {
                    // Motion only counts while the pointer is captured.
                    if state.pointer_locked {
                        state.mouse_dx += dx;
                        state.mouse_dy += dy;
                    }
                }
                InputEvent::PointerLock(locked) => {
                    state.pointer_locked = locked;
                }
            }
        }
        Ok(())
    }
}
