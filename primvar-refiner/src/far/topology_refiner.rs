//! Topology refinement.
//!
//! A [`PrimvarRefiner`](super::primvar_refiner::PrimvarRefiner) does not know
//! how a mesh was subdivided. It only consumes, per refinement step, the
//! weights that combine parent elements into child elements. Anything that
//! can hand out these weights implements [`Topology`].
//!
//! [`TopologyRefiner`] is the table-backed implementation shipped with this
//! crate. It is assembled from a base [`TopologyLevel`] and one
//! [`Refinement`] per step:
//! * [`new()`](TopologyRefiner::new()) – Creates a refiner holding only the
//!   base level.
//! * [`add_refinement()`](TopologyRefiner::add_refinement()) – Appends the
//!   tables producing the next level.
//!
//! The result can be accessed via:
//! * [`level()`](Topology::level()) – Element counts of a level.
//! * [`refinement()`](Topology::refinement()) – Weight tables of a step.
use crate::far::{StencilTable, TopologyLevel};
use crate::{Error, Index, Result};

/// Read-only access to a refined topology hierarchy.
///
/// Level `0` is the base mesh. The step `level -> level + 1` is described by
/// [`refinement(level)`](Topology::refinement()), so there are
/// [`max_level()`](Topology::max_level()) refinements in total.
///
/// Every index in a refinement's tables must address an element of the
/// parent level. Interpolating through a topology that breaks this fails with
/// [`Error::IndexOutOfBounds`].
pub trait Topology {
    /// Returns the highest level of refinement.
    fn max_level(&self) -> usize;

    /// Returns the element counts of `level`.
    fn level(&self, level: usize) -> Option<&TopologyLevel>;

    /// Returns the weight tables that refine `level` into `level + 1`.
    fn refinement(&self, level: usize) -> Option<&Refinement>;

    /// Returns the number of refinement levels, including the base level.
    #[inline]
    fn refinement_levels(&self) -> usize {
        self.max_level() + 1
    }
}

/// Weight tables of one refinement step, one per interpolation scheme.
///
/// The number of child elements follows from the tables: one vertex per
/// vertex stencil, one face per face parent, one face-varying value per
/// face-varying stencil of a channel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Refinement {
    vertex: StencilTable,
    varying: StencilTable,
    face_parents: Vec<Index>,
    face_varying: Vec<StencilTable>,
}

impl Refinement {
    /// Describes a refinement step without face-varying channels.
    ///
    /// # Arguments
    ///
    /// * `vertex` - Smooth subdivision weights, one stencil per child vertex.
    /// * `varying` - Linear weights, one stencil per child vertex.
    /// * `face_parents` - The parent face of each child face.
    pub fn new(vertex: StencilTable, varying: StencilTable, face_parents: Vec<Index>) -> Self {
        Self {
            vertex,
            varying,
            face_parents,
            face_varying: Vec::new(),
        }
    }

    /// Adds the weights of the next face-varying channel, one stencil per
    /// child face-varying value.
    pub fn with_face_varying_channel(mut self, stencils: StencilTable) -> Self {
        self.face_varying.push(stencils);
        self
    }

    #[inline]
    pub fn vertex_stencils(&self) -> &StencilTable {
        &self.vertex
    }

    #[inline]
    pub fn varying_stencils(&self) -> &StencilTable {
        &self.varying
    }

    #[inline]
    pub fn face_parents(&self) -> &[Index] {
        &self.face_parents
    }

    #[inline]
    pub fn face_varying_stencils(&self, channel: usize) -> Option<&StencilTable> {
        self.face_varying.get(channel)
    }

    #[inline]
    pub fn face_varying_channel_count(&self) -> usize {
        self.face_varying.len()
    }

    /// The element counts of the level this step produces.
    pub fn child_level(&self) -> TopologyLevel {
        self.face_varying.iter().fold(
            TopologyLevel::new(self.vertex.len(), self.face_parents.len()),
            |level, stencils| level.with_face_varying_channel(stencils.len()),
        )
    }

    /// Checks that the tables fit `parent`.
    fn validate(&self, parent: &TopologyLevel) -> Result<()> {
        if self.vertex.len() != self.varying.len() {
            return Err(Error::InvalidTopology(format!(
                "{} vertex stencils but {} varying stencils.",
                self.vertex.len(),
                self.varying.len()
            )));
        }

        if self.face_varying.len() != parent.face_varying_channel_count() {
            return Err(Error::InvalidTopology(format!(
                "{} face-varying channels refined but the parent level has {}.",
                self.face_varying.len(),
                parent.face_varying_channel_count()
            )));
        }

        #[cfg(feature = "topology_validation")]
        {
            check_indices(self.vertex.control_indices(), parent.vertex_count())?;
            check_indices(self.varying.control_indices(), parent.vertex_count())?;
            check_indices(&self.face_parents, parent.face_count())?;
            for (channel, stencils) in self.face_varying.iter().enumerate() {
                // Channel counts were checked to match above.
                let value_count = parent.face_varying_value_count(channel).unwrap_or(0);
                check_indices(stencils.control_indices(), value_count)?;
            }
        }

        Ok(())
    }
}

#[cfg(feature = "topology_validation")]
fn check_indices(indices: &[Index], len: usize) -> Result<()> {
    match indices.iter().find(|&&index| len <= usize::from(index)) {
        Some(&index) => Err(Error::IndexOutOfBounds {
            index: index.into(),
            max: len,
        }),
        None => Ok(()),
    }
}

/// Stores a refined topology hierarchy as per-level element counts and
/// per-step weight tables.
///
/// # Examples
///
/// ```
/// use primvar_refiner::far::{Refinement, StencilTable, Topology, TopologyLevel, TopologyRefiner};
/// use primvar_refiner::Index;
///
/// // One face, split into two children that both inherit from it.
/// let mut refiner = TopologyRefiner::new(TopologyLevel::new(0, 1));
/// refiner
///     .add_refinement(Refinement::new(
///         StencilTable::default(),
///         StencilTable::default(),
///         vec![Index(0), Index(0)],
///     ))
///     .unwrap();
///
/// assert_eq!(refiner.max_level(), 1);
/// assert_eq!(refiner.level(1).unwrap().face_count(), 2);
/// assert_eq!(refiner.face_total_count(), 3);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TopologyRefiner {
    levels: Vec<TopologyLevel>,
    refinements: Vec<Refinement>,
}

impl TopologyRefiner {
    /// Create a refiner that only holds the base level.
    pub fn new(base_level: TopologyLevel) -> Self {
        Self {
            levels: vec![base_level],
            refinements: Vec::new(),
        }
    }

    /// Appends a refinement step below the current finest level.
    ///
    /// Table sizes are always checked against each other. With the
    /// `topology_validation` feature every index is also checked against the
    /// element counts of the current finest level.
    pub fn add_refinement(&mut self, refinement: Refinement) -> Result<&TopologyLevel> {
        let parent = self.finest_level();
        refinement.validate(parent)?;

        let child = refinement.child_level();
        log::debug!(
            "level {}: {} vertices, {} faces, {} face-varying channel(s)",
            self.levels.len(),
            child.vertex_count(),
            child.face_count(),
            child.face_varying_channel_count()
        );

        self.refinements.push(refinement);
        self.levels.push(child);
        Ok(self.finest_level())
    }

    /// Removes all refinement steps, keeping only the base level.
    pub fn unrefine(&mut self) {
        self.levels.truncate(1);
        self.refinements.clear();
    }

    /// Returns the total number of vertices in all levels.
    pub fn vertex_total_count(&self) -> usize {
        self.levels.iter().map(TopologyLevel::vertex_count).sum()
    }

    /// Returns the total number of faces in all levels.
    pub fn face_total_count(&self) -> usize {
        self.levels.iter().map(TopologyLevel::face_count).sum()
    }

    /// Returns the number of face-varying channels.
    pub fn face_varying_channel_count(&self) -> usize {
        self.finest_level().face_varying_channel_count()
    }

    #[inline]
    fn finest_level(&self) -> &TopologyLevel {
        // `levels` always holds the base level.
        &self.levels[self.levels.len() - 1]
    }
}

impl Topology for TopologyRefiner {
    #[inline]
    fn max_level(&self) -> usize {
        self.refinements.len()
    }

    #[inline]
    fn level(&self, level: usize) -> Option<&TopologyLevel> {
        self.levels.get(level)
    }

    #[inline]
    fn refinement(&self, level: usize) -> Option<&Refinement> {
        self.refinements.get(level)
    }
}
