//! The particle field simulator.
//!
//! A fixed set of nodes drifts inside a box. Each frame the pointer pushes
//! nearby nodes away in the XY plane, velocities are damped, positions are
//! integrated, nodes bounce off the box walls, and links between close nodes
//! are rebuilt into a fixed-capacity [`SegmentBuffer`].
//!
//! The simulator owns no window or GPU state. A host calls [`ParticleField::step`]
//! once per displayed frame and hands the buffers to a renderer.
//!
//! ```
//! use plexus::{FieldConfig, ParticleField};
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let mut field = ParticleField::new(FieldConfig::default(), &mut rng);
//! field.set_pointer(plexus::Vec2::new(40.0, -10.0));
//! field.step(1.0);
//! assert!(field.segments().len() <= field.segments().capacity());
//! ```

use glam::{Vec2, Vec3};
use rand::Rng;
use std::f32::consts::TAU;

use crate::config::FieldConfig;
use crate::segments::SegmentBuffer;

/// Copy of everything [`ParticleField::step`] mutates.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSnapshot {
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
    pub phases: Vec<f32>,
    pub pointer: Vec2,
    pub time: f32,
    pub rotation: f32,
    pub point_size: f32,
}

/// Nodes, their links, and the pointer that disturbs them.
#[derive(Debug, Clone)]
pub struct ParticleField {
    config: FieldConfig,
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    /// Per-node phase in `[0, 2π)`. Reserved: nothing reads it yet.
    phases: Vec<f32>,
    pointer: Vec2,
    time: f32,
    rotation: f32,
    point_size: f32,
    segments: SegmentBuffer,
}

impl ParticleField {
    /// Scatter `config.node_count` nodes uniformly through the box with small
    /// random velocities.
    pub fn new(config: FieldConfig, rng: &mut impl Rng) -> Self {
        let n = config.node_count;
        let bounds = config.bounds;
        let speed = config.initial_speed;

        let mut positions = Vec::with_capacity(n);
        let mut velocities = Vec::with_capacity(n);
        let mut phases = Vec::with_capacity(n);

        for _ in 0..n {
            positions.push(Vec3::new(
                centered(rng) * bounds.x * 2.0,
                centered(rng) * bounds.y * 2.0,
                centered(rng) * bounds.z * 2.0,
            ));
            velocities.push(Vec3::new(
                centered(rng) * speed.x,
                centered(rng) * speed.y,
                centered(rng) * speed.z,
            ));
            phases.push(rng.gen_range(0.0..TAU));
        }

        Self::assemble(config, positions, velocities, phases)
    }

    /// Build a field from explicit positions and velocities. Phases are zero.
    ///
    /// `config.node_count` is replaced by the number of positions given.
    ///
    /// # Panics
    ///
    /// Panics if `positions` and `velocities` differ in length.
    pub fn from_state(mut config: FieldConfig, positions: Vec<Vec3>, velocities: Vec<Vec3>) -> Self {
        assert_eq!(
            positions.len(),
            velocities.len(),
            "every node needs exactly one velocity"
        );
        config.node_count = positions.len();
        let phases = vec![0.0; positions.len()];
        Self::assemble(config, positions, velocities, phases)
    }

    fn assemble(
        config: FieldConfig,
        positions: Vec<Vec3>,
        velocities: Vec<Vec3>,
        phases: Vec<f32>,
    ) -> Self {
        let mut segments = SegmentBuffer::with_capacity(config.max_segments);
        segments.rebuild(&positions, config.connect_distance);
        let point_size = config.pulse.size_at(0.0);

        Self {
            config,
            positions,
            velocities,
            phases,
            pointer: Vec2::ZERO,
            time: 0.0,
            rotation: 0.0,
            point_size,
            segments,
        }
    }

    /// Advance the field by `dt` frames. `dt = 1.0` is one display refresh.
    pub fn step(&mut self, dt: f32) {
        let config = &self.config;
        // Read once so a pointer update mid-frame cannot split the frame.
        let pointer = self.pointer;
        let radius = config.repulsion_radius;
        let damping = config.damping.powf(dt);
        let bounds = config.bounds;

        for (pos, vel) in self.positions.iter_mut().zip(self.velocities.iter_mut()) {
            let away = pos.truncate() - pointer;
            let dist = away.length();
            if dist < radius && dist > config.repulsion_epsilon {
                let force = (radius - dist) / radius * config.repulsion_strength * dt;
                let push = away / dist * force;
                vel.x += push.x;
                vel.y += push.y;
            }

            *vel *= damping;
            *pos += *vel * dt;

            reflect(pos.x, &mut vel.x, bounds.x);
            reflect(pos.y, &mut vel.y, bounds.y);
            reflect(pos.z, &mut vel.z, bounds.z);
        }

        self.time += config.time_step * dt;
        self.point_size = config.pulse.size_at(self.time);
        self.segments.rebuild(&self.positions, config.connect_distance);
        self.rotation += config.rotation_speed * dt;
    }

    /// Move the repulsion target, in field units (XY plane).
    pub fn set_pointer(&mut self, target: Vec2) {
        self.pointer = target;
    }

    /// Reset the repulsion target to the origin.
    pub fn clear_pointer(&mut self) {
        self.pointer = Vec2::ZERO;
    }

    #[inline]
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    #[inline]
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn phases(&self) -> &[f32] {
        &self.phases
    }

    pub fn segments(&self) -> &SegmentBuffer {
        &self.segments
    }

    /// Time accumulator driving the pulse.
    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Scene rotation around the vertical axis, in radians.
    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Current display size of a node.
    #[inline]
    pub fn point_size(&self) -> f32 {
        self.point_size
    }

    pub fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            positions: self.positions.clone(),
            velocities: self.velocities.clone(),
            phases: self.phases.clone(),
            pointer: self.pointer,
            time: self.time,
            rotation: self.rotation,
            point_size: self.point_size,
        }
    }
}

/// Uniform sample in `[-0.5, 0.5)`.
#[inline]
fn centered(rng: &mut impl Rng) -> f32 {
    rng.gen::<f32>() - 0.5
}

/// Elastic wall: flip the velocity once the node is outside and still moving out.
/// The position is left alone, so a node may overshoot by one frame of travel.
#[inline]
fn reflect(pos: f32, vel: &mut f32, bound: f32) {
    if (pos > bound && *vel > 0.0) || (pos < -bound && *vel < 0.0) {
        *vel = -*vel;
    }
}
