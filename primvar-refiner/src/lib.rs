#![cfg_attr(docsrs, feature(doc_cfg))]
//! # Primvar Refinement
//!
//! Propagates *primitive variables* (primvars) – per-element numeric data like
//! positions, colors or texture coordinates – through the levels of a
//! [subdivision surface](https://en.wikipedia.org/wiki/Subdivision_surface)
//! hierarchy.
//!
//! The hierarchy itself is *not* computed here. It is handed to a
//! [`PrimvarRefiner`](far::PrimvarRefiner) as something implementing
//! [`Topology`](far::Topology) – usually a table-backed
//! [`TopologyRefiner`](far::TopologyRefiner) – which supplies, for every
//! refinement step, the list of `(parent index, weight)` pairs that make up
//! each child element.
//!
//! Every interpolation scheme boils down to two operations on a value, see
//! [`Accumulate`](far::Accumulate):
//! * `clear()` – reset to zero.
//! * `accumulate(src, weight)` – add `src * weight`.
//!
//! ## Interpolation Schemes
//!
//! | Scheme       | Method                               | Refines      |
//! |--------------|--------------------------------------|--------------|
//! | Vertex       | [`interpolate()`][vertex]            | vertices     |
//! | Varying      | [`interpolate_varying()`][var]       | vertices     |
//! | Face-uniform | [`interpolate_face_uniform()`][uni]  | faces        |
//! | Face-varying | [`interpolate_face_varying()`][fvar] | face corners |
//!
//! [vertex]: far::PrimvarRefiner::interpolate()
//! [var]: far::PrimvarRefiner::interpolate_varying()
//! [uni]: far::PrimvarRefiner::interpolate_face_uniform()
//! [fvar]: far::PrimvarRefiner::interpolate_face_varying()
//!
//! Flat `f32` buffers with a runtime element width (`1..=4`) go through
//! [`interpolate_flat()`](far::PrimvarRefiner::interpolate_flat()).
//!
//! ## Example
//!
//! ```
//! use primvar_refiner::far::{
//!     PrimvarRefiner, Primvar, Refinement, StencilTable, TopologyLevel, TopologyRefiner,
//! };
//!
//! // Two vertices, refined into three: both ends and their midpoint.
//! let mut vertex = StencilTable::default();
//! vertex.push(&[0], &[1.0]);
//! vertex.push(&[0, 1], &[0.5, 0.5]);
//! vertex.push(&[1], &[1.0]);
//!
//! let mut refiner = TopologyRefiner::new(TopologyLevel::new(2, 0));
//! refiner
//!     .add_refinement(Refinement::new(vertex.clone(), vertex, Vec::new()))
//!     .unwrap();
//!
//! let primvar_refiner = PrimvarRefiner::new(&refiner);
//!
//! let src = [Primvar([0.0, 0.0]), Primvar([2.0, 4.0])];
//! let mut dst = [Primvar::<2>::default(); 3];
//! primvar_refiner.interpolate(0, &src, &mut dst).unwrap();
//!
//! assert_eq!(dst[1], Primvar([1.0, 2.0]));
//! ```
//!
//! ## Features
#![doc = document_features::document_features!()]
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade. Nothing is
//! printed unless the application installs a logger.

pub mod error;
pub mod far;

pub use error::{Error, Result};

/// A vertex, face or face-varying value index in the topology.
///
/// # Examples
///
/// ```
/// use primvar_refiner::Index;
///
/// // Create an index from a u32
/// let idx = Index::from(42u32);
/// assert_eq!(idx.0, 42);
///
/// // Convert back to usize
/// let value: usize = idx.into();
/// assert_eq!(value, 42);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
#[repr(transparent)]
pub struct Index(pub u32);

impl From<u32> for Index {
    #[inline]
    fn from(value: u32) -> Self {
        Index(value)
    }
}

impl From<Index> for u32 {
    #[inline]
    fn from(index: Index) -> Self {
        index.0
    }
}

impl From<usize> for Index {
    #[inline]
    fn from(value: usize) -> Self {
        Index(value as u32)
    }
}

impl From<Index> for usize {
    #[inline]
    fn from(index: Index) -> Self {
        index.0 as usize
    }
}
