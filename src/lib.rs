//! # plexus
//!
//! An ambient particle-network background: a few dozen nodes drifting inside a
//! box, thin links between every pair that comes close, and a pointer that
//! pushes nodes out of its way.
//!
//! ## Quick Start
//!
//! ```ignore
//! use plexus::prelude::*;
//!
//! fn main() -> Result<(), SimulationError> {
//!     Simulation::new()
//!         .with_field(FieldConfig::default().with_node_count(96))
//!         .with_theme_store(ThemeStore::new("plexus-theme.json"))
//!         .run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### The field
//!
//! [`ParticleField`] owns every node's position and velocity plus the link
//! buffer. It has no window or GPU state: call [`ParticleField::step`] once per
//! frame and read the buffers back. Each step
//!
//! 1. pushes nodes near the pointer away in the XY plane,
//! 2. damps velocities,
//! 3. integrates positions and bounces them off the box walls,
//! 4. advances the pulse that sizes the nodes,
//! 5. rebuilds the links between nodes closer than
//!    [`FieldConfig::connect_distance`], stopping at
//!    [`FieldConfig::max_segments`],
//! 6. turns the whole scene slowly around the vertical axis.
//!
//! ### Links
//!
//! [`SegmentBuffer`] has a fixed physical capacity and a logical length. Only
//! the first [`SegmentBuffer::len`] segments are drawn; the rest is zeroed.
//!
//! ### Themes
//!
//! [`Theme`] picks a [`Palette`]. Interested code registers with
//! [`ThemeWatcher::subscribe`]; [`ThemeStore`] remembers the user's choice.
//!
//! ### Running
//!
//! [`Simulation`] opens a transparent window and drives the field from a
//! [`FrameLoop`]. Hiding the window pauses the loop; showing it resumes from
//! the same state. `T` toggles the theme, `Space` pauses, `Escape` quits.

pub mod camera;
pub mod config;
pub mod error;
pub mod field;
pub mod frame_loop;
mod gpu;
pub mod input;
pub mod segments;
mod simulation;
pub mod theme;
pub mod time;

pub use camera::Camera;
pub use config::{Config, FieldConfig, PulseConfig, WindowConfig};
pub use error::{ConfigError, GpuError, SimulationError, ThemeStoreError};
pub use field::{FieldSnapshot, ParticleField};
pub use frame_loop::FrameLoop;
pub use glam::{Vec2, Vec3};
pub use input::{Input, KeyCode, PointerTracker};
pub use segments::SegmentBuffer;
pub use simulation::Simulation;
pub use theme::{Palette, Theme, ThemeStore, ThemeWatcher};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use plexus::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{Config, FieldConfig};
    pub use crate::error::SimulationError;
    pub use crate::field::ParticleField;
    pub use crate::simulation::Simulation;
    pub use crate::theme::{Palette, Theme, ThemeStore};
    pub use glam::{Vec2, Vec3};
}
