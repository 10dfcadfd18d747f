//! Fixed-capacity buffer of link segments between nearby nodes.
//!
//! The buffer is sized once and never grows. Each rebuild writes links in
//! pair order `(0,1), (0,2), .. (1,2), ..` until either the pairs run out or
//! the buffer is full; pairs past that point are dropped for the frame.

use glam::Vec3;

/// Largest number of segments a buffer will hold.
pub const MAX_CAPACITY: usize = 1 << 20;

/// Link segments stored as consecutive endpoint pairs.
///
/// The backing storage always holds `2 * capacity()` vertices. Only the first
/// `vertex_count()` are meaningful; the rest are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentBuffer {
    vertices: Vec<Vec3>,
    len: usize,
}

impl SegmentBuffer {
    /// Create an empty buffer holding at most `capacity` segments.
    ///
    /// Capacities above [`MAX_CAPACITY`] are clamped to it.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.min(MAX_CAPACITY);
        Self {
            vertices: vec![Vec3::ZERO; capacity * 2],
            len: 0,
        }
    }

    /// Maximum number of segments.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.vertices.len() / 2
    }

    /// Number of segments written by the last rebuild.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Number of valid vertices (the draw range).
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.len * 2
    }

    /// Endpoints of the valid segments, two vertices per segment.
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices[..self.vertex_count()]
    }

    /// The whole backing storage including the zeroed tail.
    pub fn raw(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Iterate over valid segments as `(start, end)`.
    pub fn iter(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.vertices().chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }

    /// Recompute all links from scratch.
    ///
    /// Every unordered pair closer than `max_distance` is linked, in index
    /// order, until the buffer is full. Returns the number of segments written.
    pub fn rebuild(&mut self, positions: &[Vec3], max_distance: f32) -> usize {
        let capacity = self.capacity();
        let mut written = 0;

        'outer: for (i, &a) in positions.iter().enumerate() {
            for &b in &positions[i + 1..] {
                if written >= capacity {
                    break 'outer;
                }
                if a.distance(b) < max_distance {
                    self.vertices[written * 2] = a;
                    self.vertices[written * 2 + 1] = b;
                    written += 1;
                }
            }
        }

        self.vertices[written * 2..].fill(Vec3::ZERO);
        self.len = written;
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_only_close_pairs() {
        let mut buffer = SegmentBuffer::with_capacity(10);
        let positions = [
            Vec3::ZERO,
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::new(500.0, 0.0, 0.0),
        ];

        assert_eq!(buffer.rebuild(&positions, 10.0), 1);
        let segments: Vec<_> = buffer.iter().collect();
        assert_eq!(segments, vec![(Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0))]);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut buffer = SegmentBuffer::with_capacity(4);
        let positions = [Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0)];
        assert_eq!(buffer.rebuild(&positions, 10.0), 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_stops_at_capacity_in_pair_order() {
        let mut buffer = SegmentBuffer::with_capacity(3);
        // Everything within range: pairs (0,1) (0,2) (0,3) fill the buffer
        let positions: Vec<Vec3> = (0..4).map(|i| Vec3::splat(i as f32)).collect();

        assert_eq!(buffer.rebuild(&positions, 100.0), 3);
        assert!(buffer.is_full());
        let starts: Vec<_> = buffer.iter().map(|(a, _)| a).collect();
        assert_eq!(starts, vec![Vec3::ZERO; 3]);
        let ends: Vec<_> = buffer.iter().map(|(_, b)| b).collect();
        assert_eq!(ends, vec![positions[1], positions[2], positions[3]]);
    }

    #[test]
    fn test_rebuild_zeroes_stale_tail() {
        let mut buffer = SegmentBuffer::with_capacity(4);
        let close: Vec<Vec3> = (0..3).map(|i| Vec3::new(i as f32, 1.0, 1.0)).collect();
        assert_eq!(buffer.rebuild(&close, 100.0), 3);

        let far = [Vec3::ZERO, Vec3::splat(1000.0)];
        assert_eq!(buffer.rebuild(&far, 100.0), 0);
        assert_eq!(buffer.raw().len(), 8);
        assert!(buffer.raw().iter().all(|v| *v == Vec3::ZERO));
        assert!(buffer.vertices().is_empty());
    }

    #[test]
    fn test_capacity_is_clamped() {
        let buffer = SegmentBuffer::with_capacity(usize::MAX);
        assert_eq!(buffer.capacity(), MAX_CAPACITY);
        assert_eq!(buffer.raw().len(), MAX_CAPACITY * 2);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_zero_capacity_never_links() {
        let mut buffer = SegmentBuffer::with_capacity(0);
        let positions = [Vec3::ZERO, Vec3::X];
        assert_eq!(buffer.rebuild(&positions, 10.0), 0);
        assert!(buffer.is_full());
    }
}
