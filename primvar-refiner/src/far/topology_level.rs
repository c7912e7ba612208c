//! Element counts of a single level in a refined topology hierarchy.

/// Describes how many elements of each kind exist in one level of a
/// topology hierarchy.
///
/// Primvar buffers are sized from these counts: a vertex or varying buffer
/// holds [`vertex_count()`](Self::vertex_count()) values, a face-uniform
/// buffer [`face_count()`](Self::face_count()) and a face-varying buffer
/// [`face_varying_value_count()`](Self::face_varying_value_count()) for its
/// channel.
///
/// # Examples
///
/// ```
/// use primvar_refiner::far::TopologyLevel;
///
/// // A cube with one UV channel holding 14 distinct values.
/// let level = TopologyLevel::new(8, 6).with_face_varying_channel(14);
///
/// assert_eq!(level.vertex_count(), 8);
/// assert_eq!(level.face_varying_value_count(0), Some(14));
/// assert_eq!(level.face_varying_value_count(1), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TopologyLevel {
    vertex_count: usize,
    face_count: usize,
    face_varying_value_counts: Vec<usize>,
}

impl TopologyLevel {
    /// A level without face-varying channels.
    pub fn new(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertex_count,
            face_count,
            face_varying_value_counts: Vec::new(),
        }
    }

    /// Adds a face-varying channel holding `value_count` values.
    pub fn with_face_varying_channel(mut self, value_count: usize) -> Self {
        self.face_varying_value_counts.push(value_count);
        self
    }

    /// Returns the number of vertices in this level.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Returns the number of faces in this level.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.face_count
    }

    /// Returns the number of face-varying channels.
    #[inline]
    pub fn face_varying_channel_count(&self) -> usize {
        self.face_varying_value_counts.len()
    }

    /// Returns the number of face-varying values in `channel`.
    #[inline]
    pub fn face_varying_value_count(&self, channel: usize) -> Option<usize> {
        self.face_varying_value_counts.get(channel).copied()
    }
}
