//! Refinement of primvar data from one level to the next.
//!
//! A [`PrimvarRefiner`] borrows the [`Topology`] it was created with. It can
//! therefore never outlive it and dropping it leaves the topology untouched.
//! Any number of primvar refiners can share one topology, also across
//! threads.
use crate::far::stencil_table::checked_get;
use crate::far::{
    Accumulate, InterpolationMode, Refinement, Topology, TopologyLevel, TopologyRefiner,
};
use crate::{Error, Result};

/// Applies the interpolation weights of a [`Topology`] to primvar data.
///
/// Every method reads values at refinement level `level` from `src` and
/// writes the values at `level + 1` to `dst`. Buffer lengths must match the
/// element counts the topology reports for these levels.
pub struct PrimvarRefiner<'a, T: Topology + ?Sized = TopologyRefiner> {
    refiner: &'a T,
}

impl<'a, T: Topology + ?Sized> Clone for PrimvarRefiner<'a, T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            refiner: self.refiner,
        }
    }
}

impl<'a, T: Topology + ?Sized> std::fmt::Debug for PrimvarRefiner<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimvarRefiner")
            .field("max_level", &self.refiner.max_level())
            .finish()
    }
}

impl<'a, T: Topology + ?Sized> PrimvarRefiner<'a, T> {
    /// Create a primvar refiner bound to `refiner`.
    #[inline]
    pub fn new(refiner: &'a T) -> Self {
        Self { refiner }
    }

    /// Returns the topology this primvar refiner is bound to.
    #[inline]
    pub fn topology_refiner(&self) -> &'a T {
        self.refiner
    }

    /// Refine vertex data using the smooth subdivision weights.
    ///
    /// A stencil index outside `src` fails with [`Error::IndexOutOfBounds`];
    /// `dst` may be partially written in that case. The same holds for all
    /// other schemes.
    pub fn interpolate<V: Accumulate>(&self, level: usize, src: &[V], dst: &mut [V]) -> Result<()> {
        let (parent, child, refinement) = self.step(level)?;
        log::trace!("interpolating {} vertices from level {}", src.len(), level);

        check_lengths(parent.vertex_count(), child.vertex_count(), src, dst)?;
        check_table(refinement.vertex_stencils().len(), dst)?;

        refinement.vertex_stencils().apply(src, dst)
    }

    /// Refine vertex data using linear weights, ignoring creases and the
    /// smooth subdivision rules.
    pub fn interpolate_varying<V: Accumulate>(
        &self,
        level: usize,
        src: &[V],
        dst: &mut [V],
    ) -> Result<()> {
        let (parent, child, refinement) = self.step(level)?;
        log::trace!(
            "interpolating {} varying values from level {}",
            src.len(),
            level
        );

        check_lengths(parent.vertex_count(), child.vertex_count(), src, dst)?;
        check_table(refinement.varying_stencils().len(), dst)?;

        refinement.varying_stencils().apply(src, dst)
    }

    /// Refine per-face data. Every child face inherits the value of its
    /// parent face.
    pub fn interpolate_face_uniform<V: Accumulate>(
        &self,
        level: usize,
        src: &[V],
        dst: &mut [V],
    ) -> Result<()> {
        let (parent, child, refinement) = self.step(level)?;
        log::trace!("interpolating {} face values from level {}", src.len(), level);

        check_lengths(parent.face_count(), child.face_count(), src, dst)?;
        check_table(refinement.face_parents().len(), dst)?;

        inherit(refinement, src, dst)
    }

    /// Refine face-varying data of the first face-varying channel.
    #[inline]
    pub fn interpolate_face_varying<V: Accumulate>(
        &self,
        level: usize,
        src: &[V],
        dst: &mut [V],
    ) -> Result<()> {
        self.interpolate_face_varying_channel(level, 0, src, dst)
    }

    /// Refine face-varying data of `channel`.
    pub fn interpolate_face_varying_channel<V: Accumulate>(
        &self,
        level: usize,
        channel: usize,
        src: &[V],
        dst: &mut [V],
    ) -> Result<()> {
        let (parent, child, refinement) = self.step(level)?;
        log::trace!(
            "interpolating {} face-varying values of channel {} from level {}",
            src.len(),
            channel,
            level
        );

        let (src_len, dst_len) = face_varying_counts(parent, child, channel)?;
        check_lengths(src_len, dst_len, src, dst)?;

        let stencils = refinement
            .face_varying_stencils(channel)
            .ok_or(Error::InvalidChannel {
                channel,
                count: refinement.face_varying_channel_count(),
            })?;
        check_table(stencils.len(), dst)?;

        stencils.apply(src, dst)
    }

    /// Refine data with the scheme selected by `mode`.
    pub fn interpolate_with_mode<V: Accumulate>(
        &self,
        mode: InterpolationMode,
        level: usize,
        src: &[V],
        dst: &mut [V],
    ) -> Result<()> {
        match mode {
            InterpolationMode::Vertex => self.interpolate(level, src, dst),
            InterpolationMode::Varying => self.interpolate_varying(level, src, dst),
            InterpolationMode::FaceUniform => self.interpolate_face_uniform(level, src, dst),
            InterpolationMode::FaceVarying => self.interpolate_face_varying(level, src, dst),
        }
    }

    /// Returns the number of `mode` elements at `level` and `level + 1`.
    ///
    /// Face-varying counts are those of the first channel.
    pub fn element_counts(&self, mode: InterpolationMode, level: usize) -> Result<(usize, usize)> {
        let (parent, child, _) = self.step(level)?;

        match mode {
            InterpolationMode::Vertex | InterpolationMode::Varying => {
                Ok((parent.vertex_count(), child.vertex_count()))
            }
            InterpolationMode::FaceUniform => Ok((parent.face_count(), child.face_count())),
            InterpolationMode::FaceVarying => face_varying_counts(parent, child, 0),
        }
    }

    fn step(
        &self,
        level: usize,
    ) -> Result<(&'a TopologyLevel, &'a TopologyLevel, &'a Refinement)> {
        let refiner = self.refiner;
        let invalid = || Error::InvalidLevel {
            level,
            max: refiner.max_level(),
        };

        let refinement = refiner.refinement(level).ok_or_else(invalid)?;
        let parent = refiner.level(level).ok_or_else(invalid)?;
        let child = refiner.level(level + 1).ok_or_else(invalid)?;

        Ok((parent, child, refinement))
    }
}

fn face_varying_counts(
    parent: &TopologyLevel,
    child: &TopologyLevel,
    channel: usize,
) -> Result<(usize, usize)> {
    let invalid = || Error::InvalidChannel {
        channel,
        count: parent.face_varying_channel_count(),
    };

    Ok((
        parent.face_varying_value_count(channel).ok_or_else(invalid)?,
        child.face_varying_value_count(channel).ok_or_else(invalid)?,
    ))
}

#[inline]
fn check_lengths<V>(src_len: usize, dst_len: usize, src: &[V], dst: &[V]) -> Result<()> {
    Error::check_buffer_size(src_len, src.len())?;
    Error::check_buffer_size(dst_len, dst.len())
}

/// A topology whose tables disagree with its own level counts.
#[inline]
fn check_table<V>(table_len: usize, dst: &[V]) -> Result<()> {
    if table_len == dst.len() {
        Ok(())
    } else {
        Err(Error::InvalidTopology(format!(
            "The refinement table holds {} entries but the child level has {} elements.",
            table_len,
            dst.len()
        )))
    }
}

#[cfg(not(feature = "rayon"))]
fn inherit<V: Accumulate>(refinement: &Refinement, src: &[V], dst: &mut [V]) -> Result<()> {
    for (dst, &parent) in dst.iter_mut().zip(refinement.face_parents()) {
        dst.clear();
        dst.accumulate(checked_get(src, parent)?, 1.0);
    }
    Ok(())
}

#[cfg(feature = "rayon")]
fn inherit<V: Accumulate>(refinement: &Refinement, src: &[V], dst: &mut [V]) -> Result<()> {
    use rayon::prelude::*;

    dst.par_iter_mut()
        .zip(refinement.face_parents().par_iter())
        .try_for_each(|(dst, &parent)| {
            dst.clear();
            dst.accumulate(checked_get(src, parent)?, 1.0);
            Ok(())
        })
}
