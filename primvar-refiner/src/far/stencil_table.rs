//! Table of refinement stencils.
//!
//! A stencil assigns a series of parent element indices with a blending
//! weight to a single child element. Applying a stencil means clearing the
//! child and accumulating every parent value scaled by its weight.
//!
//! Each refinement step of a [`TopologyRefiner`](super::TopologyRefiner)
//! stores its weights as stencil tables. [`StencilTable::new()`] composes those
//! per-level tables into stencils that reference the base level directly, so
//! that animated base values can be pushed to any level in a single pass.
use std::borrow::Cow;

use crate::far::{Accumulate, Topology};
use crate::{Error, Index, Result};

/// Gives read access to a single stencil in a [`StencilTable`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stencil<'a> {
    indices: &'a [Index],
    weights: &'a [f32],
}

impl<'a> Stencil<'a> {
    /// Returns the indices of the parent (control) elements.
    #[inline]
    pub fn indices(&self) -> &'a [Index] {
        self.indices
    }

    /// Returns the stencil interpolation weights.
    #[inline]
    pub fn weights(&self) -> &'a [f32] {
        self.weights
    }

    /// Returns the number of `(index, weight)` pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterates the `(index, weight)` pairs in order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (Index, f32)> + 'a {
        self.indices
            .iter()
            .copied()
            .zip(self.weights.iter().copied())
    }

    /// Clears `dst` and accumulates the weighted `src` values.
    ///
    /// Fails with [`Error::IndexOutOfBounds`] if an index does not address
    /// an element of `src`. `dst` is left cleared or partially accumulated in
    /// that case.
    #[inline]
    pub fn apply<T: Accumulate>(&self, src: &[T], dst: &mut T) -> Result<()> {
        dst.clear();
        for (index, weight) in self.iter() {
            dst.accumulate(checked_get(src, index)?, weight);
        }
        Ok(())
    }
}

/// Container for stencil data.
///
/// Stencils are stored compressed: one `sizes`/`offsets` entry per stencil
/// and the `(index, weight)` pairs of all stencils back to back.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StencilTable {
    sizes: Vec<u32>,
    offsets: Vec<Index>,
    indices: Vec<Index>,
    weights: Vec<f32>,
}

impl StencilTable {
    /// Create a stencil table that references the base level of `refiner`.
    ///
    /// See [`StencilTableOptions`] for what is generated.
    pub fn new<T: Topology + ?Sized>(refiner: &T, options: StencilTableOptions) -> Result<Self> {
        let max_level = refiner.max_level();
        if max_level < options.max_level {
            return Err(Error::InvalidLevel {
                level: options.max_level,
                max: max_level,
            });
        }

        let base_count = element_count(refiner, 0, &options)?;

        // Stencils of the level being built, expressed over the base level.
        let mut current = StencilTable::identity(base_count);
        let mut table = if options.generate_control_vertices {
            current.clone()
        } else {
            StencilTable::default()
        };

        let mut scratch = Factorizer::new(base_count);

        for level in 0..options.max_level {
            let step = refinement_stencils(refiner, level, &options)?;

            let mut next = StencilTable::with_capacity(step.len(), current.weights.len());
            for child in step.iter() {
                for (index, weight) in child.iter() {
                    let parent = current.stencil(index).ok_or(Error::IndexOutOfBounds {
                        index: index.into(),
                        max: current.len(),
                    })?;
                    scratch.add(parent, weight);
                }
                scratch.flush_into(&mut next);
            }

            if options.generate_intermediate_levels || level + 1 == options.max_level {
                table.extend(&next);
            }
            current = next;
        }

        log::debug!(
            "factorized {} stencils over {} control values ({:?}, {} levels)",
            table.len(),
            base_count,
            options.interpolation_mode,
            options.max_level
        );

        Ok(table)
    }

    /// Create an empty table with room for `stencils` stencils holding
    /// `entries` `(index, weight)` pairs in total.
    pub fn with_capacity(stencils: usize, entries: usize) -> Self {
        Self {
            sizes: Vec::with_capacity(stencils),
            offsets: Vec::with_capacity(stencils),
            indices: Vec::with_capacity(entries),
            weights: Vec::with_capacity(entries),
        }
    }

    /// Create a table of `len` stencils where stencil `i` is `(i, 1.0)`.
    pub fn identity(len: usize) -> Self {
        let mut table = Self::with_capacity(len, len);
        for i in 0..len {
            table.push(&[i as u32], &[1.0]);
        }
        table
    }

    /// Create a table with one single-entry, weight `1.0` stencil per parent
    /// index.
    pub fn from_parents(parents: &[Index]) -> Self {
        let mut table = Self::with_capacity(parents.len(), parents.len());
        for parent in parents {
            table.push(&[parent.0], &[1.0]);
        }
        table
    }

    /// Appends a stencil.
    ///
    /// # Panics
    ///
    /// If `indices` and `weights` differ in length.
    pub fn push(&mut self, indices: &[u32], weights: &[f32]) -> &mut Self {
        assert_eq!(
            indices.len(),
            weights.len(),
            "A stencil needs exactly one weight per index."
        );

        self.sizes.push(indices.len() as u32);
        self.offsets.push(Index::from(self.indices.len()));
        self.indices.extend(indices.iter().map(|&i| Index(i)));
        self.weights.extend_from_slice(weights);
        self
    }

    /// Appends all stencils of `other`.
    pub fn extend(&mut self, other: &StencilTable) {
        for stencil in other.iter() {
            self.sizes.push(stencil.len() as u32);
            self.offsets.push(Index::from(self.indices.len()));
            self.indices.extend_from_slice(stencil.indices());
            self.weights.extend_from_slice(stencil.weights());
        }
    }

    /// Returns the number of stencils in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        0 == self.len()
    }

    /// Returns the number of control values indexed in the table, i.e. one
    /// past the largest index any stencil references.
    pub fn control_vertex_count(&self) -> usize {
        self.indices
            .iter()
            .max()
            .map_or(0, |&max| usize::from(max) + 1)
    }

    /// Returns a Stencil at index i in the table.
    #[inline]
    pub fn stencil(&self, i: Index) -> Option<Stencil<'_>> {
        let i = usize::from(i);
        if self.len() <= i {
            None
        } else {
            let start = usize::from(self.offsets[i]);
            let end = start + self.sizes[i] as usize;
            Some(Stencil {
                indices: &self.indices[start..end],
                weights: &self.weights[start..end],
            })
        }
    }

    /// Iterates all stencils in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Stencil<'_>> + '_ {
        self.sizes
            .iter()
            .zip(self.offsets.iter())
            .map(move |(&size, &offset)| {
                let start = usize::from(offset);
                let end = start + size as usize;
                Stencil {
                    indices: &self.indices[start..end],
                    weights: &self.weights[start..end],
                }
            })
    }

    /// Returns the number of control vertices of each stencil in the table.
    #[inline]
    pub fn sizes(&self) -> &[u32] {
        &self.sizes
    }

    /// Returns the offset to a given stencil.
    #[inline]
    pub fn offsets(&self) -> &[Index] {
        &self.offsets
    }

    /// Returns the indices of the control vertices.
    #[inline]
    pub fn control_indices(&self) -> &[Index] {
        &self.indices
    }

    /// Returns the stencil interpolation weights.
    #[inline]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Applies every stencil to `src`, writing one value per stencil to `dst`.
    ///
    /// `dst` must hold exactly [`len()`](Self::len()) values and `src` at least
    /// [`control_vertex_count()`](Self::control_vertex_count()).
    pub fn update_values<T: Accumulate>(&self, src: &[T], dst: &mut [T]) -> Result<()> {
        Error::check_buffer_size(self.len(), dst.len())?;
        let required = self.control_vertex_count();
        if src.len() < required {
            return Err(Error::InvalidBufferSize {
                expected: required,
                actual: src.len(),
            });
        }

        self.apply(src, dst)
    }

    /// Applies every stencil; buffer lengths are already validated.
    #[cfg(not(feature = "rayon"))]
    pub(crate) fn apply<T: Accumulate>(&self, src: &[T], dst: &mut [T]) -> Result<()> {
        self.iter()
            .zip(dst.iter_mut())
            .try_for_each(|(stencil, dst)| stencil.apply(src, dst))
    }

    #[cfg(feature = "rayon")]
    pub(crate) fn apply<T: Accumulate>(&self, src: &[T], dst: &mut [T]) -> Result<()> {
        use rayon::prelude::*;

        dst.par_iter_mut().enumerate().try_for_each(|(i, dst)| {
            let start = usize::from(self.offsets[i]);
            let end = start + self.sizes[i] as usize;
            Stencil {
                indices: &self.indices[start..end],
                weights: &self.weights[start..end],
            }
            .apply(src, dst)
        })
    }
}

/// Looks up the element `index` addresses.
#[inline]
pub(crate) fn checked_get<T>(src: &[T], index: Index) -> Result<&T> {
    src.get(usize::from(index)).ok_or(Error::IndexOutOfBounds {
        index: index.into(),
        max: src.len(),
    })
}

/// Merges weighted base-level stencils into one stencil, summing the
/// weights of repeated indices. Indices keep first-touch order.
struct Factorizer {
    weights: Vec<f32>,
    touched: Vec<bool>,
    order: Vec<u32>,
}

impl Factorizer {
    fn new(len: usize) -> Self {
        Self {
            weights: vec![0.0; len],
            touched: vec![false; len],
            order: Vec::new(),
        }
    }

    fn add(&mut self, stencil: Stencil<'_>, scale: f32) {
        for (index, weight) in stencil.iter() {
            let i = usize::from(index);
            if !self.touched[i] {
                self.touched[i] = true;
                self.order.push(index.0);
            }
            self.weights[i] += weight * scale;
        }
    }

    fn flush_into(&mut self, table: &mut StencilTable) {
        let weights: Vec<f32> = self
            .order
            .iter()
            .map(|&i| self.weights[i as usize])
            .collect();
        table.push(&self.order, &weights);

        for &i in &self.order {
            self.weights[i as usize] = 0.0;
            self.touched[i as usize] = false;
        }
        self.order.clear();
    }
}

fn element_count<T: Topology + ?Sized>(
    refiner: &T,
    level: usize,
    options: &StencilTableOptions,
) -> Result<usize> {
    let topology_level = refiner.level(level).ok_or(Error::InvalidLevel {
        level,
        max: refiner.max_level(),
    })?;

    Ok(match options.interpolation_mode {
        InterpolationMode::Vertex | InterpolationMode::Varying => topology_level.vertex_count(),
        InterpolationMode::FaceUniform => topology_level.face_count(),
        InterpolationMode::FaceVarying => topology_level
            .face_varying_value_count(options.face_varying_channel)
            .ok_or(Error::InvalidChannel {
                channel: options.face_varying_channel,
                count: topology_level.face_varying_channel_count(),
            })?,
    })
}

/// The stencils of the step `level -> level + 1`. Face-uniform parents are
/// turned into single-entry stencils.
fn refinement_stencils<'a, T: Topology + ?Sized>(
    refiner: &'a T,
    level: usize,
    options: &StencilTableOptions,
) -> Result<Cow<'a, StencilTable>> {
    let refinement = refiner.refinement(level).ok_or(Error::InvalidLevel {
        level,
        max: refiner.max_level(),
    })?;

    Ok(match options.interpolation_mode {
        InterpolationMode::Vertex => Cow::Borrowed(refinement.vertex_stencils()),
        InterpolationMode::Varying => Cow::Borrowed(refinement.varying_stencils()),
        InterpolationMode::FaceUniform => {
            Cow::Owned(StencilTable::from_parents(refinement.face_parents()))
        }
        InterpolationMode::FaceVarying => Cow::Borrowed(
            refinement
                .face_varying_stencils(options.face_varying_channel)
                .ok_or(Error::InvalidChannel {
                    channel: options.face_varying_channel,
                    count: refinement.face_varying_channel_count(),
                })?,
        ),
    })
}

/// The kind of primvar data being refined.
#[repr(u32)]
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, num_enum::IntoPrimitive, num_enum::TryFromPrimitive,
)]
pub enum InterpolationMode {
    /// Per-vertex data following the smooth subdivision rules.
    Vertex = 0,
    /// Per-vertex data interpolated linearly.
    Varying,
    /// Per-face data, inherited from the parent face.
    FaceUniform,
    /// Per-face-corner data, possibly discontinuous across faces.
    FaceVarying,
}

/// Options for [`StencilTable::new()`].
#[derive(Clone, Copy, Debug)]
pub struct StencilTableOptions {
    pub interpolation_mode: InterpolationMode,
    /// Prepend one identity stencil per base level element.
    pub generate_control_vertices: bool,
    /// Generate stencils for every level up to `max_level`, not just for
    /// `max_level` itself.
    pub generate_intermediate_levels: bool,
    pub max_level: usize,
    pub face_varying_channel: usize,
}

impl Default for StencilTableOptions {
    /// Create options with the following defaults:
    ///
    /// | Property                       | Value                               |
    /// |--------------------------------|-------------------------------------|
    /// | `interpolation_mode`           | [`Vertex`](InterpolationMode::Vertex) |
    /// | `generate_control_vertices`    | `false`                             |
    /// | `generate_intermediate_levels` | `true`                              |
    /// | `max_level`                    | `1`                                 |
    /// | `face_varying_channel`         | `0`                                 |
    fn default() -> Self {
        Self {
            interpolation_mode: InterpolationMode::Vertex,
            generate_control_vertices: false,
            generate_intermediate_levels: true,
            max_level: 1,
            face_varying_channel: 0,
        }
    }
}
