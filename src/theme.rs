//! Light/dark theme, its colour palette, and the persisted preference.
//!
//! The theme only recolours nodes and links; it never touches simulation
//! state. Consumers register interest explicitly through
//! [`ThemeWatcher::subscribe`] and are called back when the theme changes.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ThemeStoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    /// The other theme.
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<winit::window::Theme> for Theme {
    fn from(theme: winit::window::Theme) -> Self {
        match theme {
            winit::window::Theme::Light => Theme::Light,
            winit::window::Theme::Dark => Theme::Dark,
        }
    }
}

/// Colours for nodes and links, in sRGB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub point_color: Vec3,
    pub point_opacity: f32,
    pub line_color: Vec3,
    pub line_opacity: f32,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                point_color: hex_rgb(0x4ecdc4),
                point_opacity: 0.9,
                line_color: hex_rgb(0x64c8dc),
                line_opacity: 0.28,
            },
            Theme::Light => Self {
                point_color: hex_rgb(0x5b8bd0),
                point_opacity: 0.9,
                line_color: hex_rgb(0x5080c8),
                line_opacity: 0.18,
            },
        }
    }

    pub fn point_rgba(&self) -> [f32; 4] {
        self.point_color.extend(self.point_opacity).to_array()
    }

    pub fn line_rgba(&self) -> [f32; 4] {
        self.line_color.extend(self.line_opacity).to_array()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::for_theme(Theme::default())
    }
}

/// `0xRRGGBB` to RGB in `[0, 1]`.
pub fn hex_rgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

type ThemeListener = Box<dyn FnMut(Theme)>;

/// Current theme plus the callbacks to run when it changes.
pub struct ThemeWatcher {
    current: Theme,
    listeners: Vec<ThemeListener>,
}

impl ThemeWatcher {
    pub fn new(theme: Theme) -> Self {
        Self {
            current: theme,
            listeners: Vec::new(),
        }
    }

    #[inline]
    pub fn current(&self) -> Theme {
        self.current
    }

    /// Register a callback. It is invoked immediately with the current theme
    /// and again on every change.
    pub fn subscribe<F>(&mut self, mut listener: F)
    where
        F: FnMut(Theme) + 'static,
    {
        listener(self.current);
        self.listeners.push(Box::new(listener));
    }

    /// Switch theme. Returns `true` (and notifies) only if it actually changed.
    pub fn set(&mut self, theme: Theme) -> bool {
        if theme == self.current {
            return false;
        }
        self.current = theme;
        for listener in &mut self.listeners {
            listener(theme);
        }
        true
    }

    /// Flip between light and dark, returning the new theme.
    pub fn toggle(&mut self) -> Theme {
        let next = self.current.toggle();
        self.set(next);
        next
    }
}

impl fmt::Debug for ThemeWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeWatcher")
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for ThemeWatcher {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

#[derive(Serialize, Deserialize)]
struct StoredTheme {
    theme: Theme,
}

/// The single persisted preference: which theme the user picked last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored theme. `Ok(None)` if nothing has been saved yet.
    pub fn load(&self) -> Result<Option<Theme>, ThemeStoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let stored: StoredTheme = serde_json::from_str(&json)?;
        Ok(Some(stored.theme))
    }

    pub fn save(&self, theme: Theme) -> Result<(), ThemeStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string(&StoredTheme { theme })?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn temp_store(name: &str) -> ThemeStore {
        let dir = std::env::temp_dir().join(format!("plexus-theme-{}-{}", name, std::process::id()));
        ThemeStore::new(dir.join("theme.json"))
    }

    #[test]
    fn test_toggle() {
        assert_eq!(Theme::Dark.toggle(), Theme::Light);
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
        assert_eq!(Theme::default(), Theme::Dark);
    }

    #[test]
    fn test_palettes() {
        let dark = Palette::for_theme(Theme::Dark);
        assert_eq!(dark.point_color, hex_rgb(0x4ecdc4));
        assert_eq!(dark.line_opacity, 0.28);

        let light = Palette::for_theme(Theme::Light);
        assert_eq!(light.line_color, hex_rgb(0x5080c8));
        assert_eq!(light.line_rgba()[3], 0.18);
        assert_ne!(dark, light);
    }

    #[test]
    fn test_hex_rgb() {
        assert_eq!(hex_rgb(0xff0000), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(hex_rgb(0x0000ff), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_watcher_notifies_on_change_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut watcher = ThemeWatcher::new(Theme::Dark);
        let sink = seen.clone();
        watcher.subscribe(move |t| sink.borrow_mut().push(t));

        assert!(!watcher.set(Theme::Dark));
        assert!(watcher.set(Theme::Light));
        assert_eq!(watcher.toggle(), Theme::Dark);

        assert_eq!(*seen.borrow(), vec![Theme::Dark, Theme::Light, Theme::Dark]);
    }

    #[test]
    fn test_store_round_trip() {
        let store = temp_store("roundtrip");
        assert_eq!(store.load().unwrap(), None);

        store.save(Theme::Light).unwrap();
        assert_eq!(store.load().unwrap(), Some(Theme::Light));
        let json = fs::read_to_string(store.path()).unwrap();
        assert_eq!(json, r#"{"theme":"light"}"#);

        store.save(Theme::Dark).unwrap();
        assert_eq!(store.load().unwrap(), Some(Theme::Dark));

        let _ = fs::remove_dir_all(store.path().parent().unwrap());
    }

    #[test]
    fn test_store_corrupt_file() {
        let store = temp_store("corrupt");
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "purple").unwrap();
        assert!(matches!(store.load(), Err(ThemeStoreError::Parse(_))));
        let _ = fs::remove_dir_all(store.path().parent().unwrap());
    }
}
