//! Input handling for the field window.
//!
//! [`PointerTracker`] turns cursor pixels into the repulsion target in field
//! units. [`Input`] wraps it together with the keyboard state used for the
//! runner's shortcuts.

use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Keys the runner reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Toggle light/dark.
    T,
    /// Pause/resume the animation.
    Space,
    /// Close the window.
    Escape,
    Other,
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::KeyT => KeyCode::T,
            WinitKeyCode::Space => KeyCode::Space,
            WinitKeyCode::Escape => KeyCode::Escape,
            _ => KeyCode::Other,
        }
    }
}

/// Maps cursor positions onto the field's XY plane.
///
/// The window spans the full box width and height: its centre is the origin,
/// its edges are `±bounds`, and Y points up.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    extent: Vec2,
    window_size: (u32, u32),
    target: Vec2,
    inside: bool,
}

impl PointerTracker {
    /// `extent` is the box half size in X and Y.
    pub fn new(extent: Vec2) -> Self {
        Self {
            extent,
            window_size: (0, 0),
            target: Vec2::ZERO,
            inside: false,
        }
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    /// Cursor moved to `(x, y)` window pixels.
    pub fn moved(&mut self, x: f32, y: f32) -> Vec2 {
        let (w, h) = self.window_size;
        if w > 0 && h > 0 {
            self.target = Vec2::new(
                (x / w as f32 - 0.5) * self.extent.x * 2.0,
                -(y / h as f32 - 0.5) * self.extent.y * 2.0,
            );
            self.inside = true;
        }
        self.target
    }

    /// Cursor left the window: the target snaps back to the origin.
    pub fn left(&mut self) -> Vec2 {
        self.target = Vec2::ZERO;
        self.inside = false;
        self.target
    }

    #[inline]
    pub fn target(&self) -> Vec2 {
        self.target
    }

    #[inline]
    pub fn is_inside(&self) -> bool {
        self.inside
    }
}

/// Keyboard and pointer state.
///
/// Key presses are edge-triggered: `key_pressed` is true from the press until
/// the next [`Input::begin_frame`].
#[derive(Debug, Clone)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    pointer: PointerTracker,
}

impl Input {
    pub fn new(extent: Vec2) -> Self {
        Self {
            keys_held: HashSet::new(),
            keys_pressed: HashSet::new(),
            pointer: PointerTracker::new(extent),
        }
    }

    /// Check if a key went down since the last `begin_frame`.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Check if a key is currently held down.
    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn pointer(&self) -> &PointerTracker {
        &self.pointer
    }

    /// Clear edge-triggered state.
    pub(crate) fn begin_frame(&mut self) {
        self.keys_pressed.clear();
    }

    pub(crate) fn set_window_size(&mut self, width: u32, height: u32) {
        self.pointer.set_window_size(width, height);
    }

    pub(crate) fn press(&mut self, key: KeyCode) {
        // Held keys auto-repeat; only the first press counts
        if self.keys_held.insert(key) {
            self.keys_pressed.insert(key);
        }
    }

    pub(crate) fn release(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
    }

    /// Process a winit window event.
    pub(crate) fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    let key = KeyCode::from(code);
                    match event.state {
                        ElementState::Pressed => self.press(key),
                        ElementState::Released => self.release(key),
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer.moved(position.x as f32, position.y as f32);
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer.left();
            }
            WindowEvent::Resized(size) => {
                self.pointer.set_window_size(size.width, size.height);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> PointerTracker {
        let mut t = PointerTracker::new(Vec2::new(420.0, 260.0));
        t.set_window_size(800, 600);
        t
    }

    #[test]
    fn test_centre_maps_to_origin() {
        let mut t = tracker();
        assert_eq!(t.moved(400.0, 300.0), Vec2::ZERO);
        assert!(t.is_inside());
    }

    #[test]
    fn test_corners_map_to_bounds() {
        let mut t = tracker();
        assert_eq!(t.moved(0.0, 0.0), Vec2::new(-420.0, 260.0));
        assert_eq!(t.moved(800.0, 600.0), Vec2::new(420.0, -260.0));
    }

    #[test]
    fn test_leave_resets_target() {
        let mut t = tracker();
        t.moved(10.0, 10.0);
        assert_eq!(t.left(), Vec2::ZERO);
        assert_eq!(t.target(), Vec2::ZERO);
        assert!(!t.is_inside());
    }

    #[test]
    fn test_zero_sized_window_keeps_target() {
        let mut t = PointerTracker::new(Vec2::new(420.0, 260.0));
        assert_eq!(t.moved(100.0, 100.0), Vec2::ZERO);
    }

    #[test]
    fn test_key_state() {
        let mut input = Input::new(Vec2::ONE);

        assert!(!input.key_held(KeyCode::Space));
        input.press(KeyCode::Space);
        assert!(input.key_held(KeyCode::Space));
        assert!(input.key_pressed(KeyCode::Space));

        // After begin_frame, pressed is cleared but held remains
        input.begin_frame();
        assert!(input.key_held(KeyCode::Space));
        assert!(!input.key_pressed(KeyCode::Space));

        // Auto-repeat while held does not re-trigger
        input.press(KeyCode::Space);
        assert!(!input.key_pressed(KeyCode::Space));

        input.release(KeyCode::Space);
        input.press(KeyCode::Space);
        assert!(input.key_pressed(KeyCode::Space));
    }
}
