//! Refinement of flat `f32` buffers whose element width is only known at
//! runtime.
//!
//! A flat buffer stores `width` consecutive floats per element, e.g. `3` for
//! RGB colors. The width is mapped to one of the
//! [`Primvar<N>`](crate::far::Primvar) types and the buffers are reinterpreted
//! in place, so each supported width runs through its own monomorphized code
//! path.
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::far::primvar::{as_primvars, as_primvars_mut};
use crate::far::{InterpolationMode, PrimvarRefiner, Topology};
use crate::{Error, Result};

/// The number of floats per element a flat buffer can be refined with.
///
/// # Examples
///
/// ```
/// use primvar_refiner::far::Width;
/// use primvar_refiner::Error;
///
/// assert_eq!(Width::new(3), Ok(Width::Three));
/// assert_eq!(Width::new(5), Err(Error::InvalidWidth(5)));
/// assert_eq!(Width::Four.elements(), 4);
/// ```
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
pub enum Width {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
}

impl Width {
    /// Returns the width for `elements` floats per element.
    pub fn new(elements: usize) -> Result<Self> {
        u8::try_from(elements)
            .ok()
            .and_then(|elements| Width::try_from(elements).ok())
            .ok_or(Error::InvalidWidth(elements))
    }

    /// Returns the number of floats per element.
    #[inline]
    pub fn elements(self) -> usize {
        u8::from(self) as usize
    }
}

impl<'a, T: Topology + ?Sized> PrimvarRefiner<'a, T> {
    /// Refine a flat buffer holding `width` floats per element.
    ///
    /// `src` must hold `width` floats for every `mode` element at `level`,
    /// `dst` for every element at `level + 1`. Face-varying data is taken
    /// from the first channel.
    ///
    /// Unsupported widths are rejected with [`Error::InvalidWidth`] before
    /// either buffer is touched.
    pub fn interpolate_flat(
        &self,
        mode: InterpolationMode,
        width: usize,
        level: usize,
        src: &[f32],
        dst: &mut [f32],
    ) -> Result<()> {
        let width = checked_width(mode, width)?;

        let (src_len, dst_len) = self.element_counts(mode, level)?;
        Error::check_buffer_size(src_len * width.elements(), src.len())?;
        Error::check_buffer_size(dst_len * width.elements(), dst.len())?;

        match width {
            Width::One => self.interpolate_with_mode(
                mode,
                level,
                as_primvars::<1>(src),
                as_primvars_mut::<1>(dst),
            ),
            Width::Two => self.interpolate_with_mode(
                mode,
                level,
                as_primvars::<2>(src),
                as_primvars_mut::<2>(dst),
            ),
            Width::Three => self.interpolate_with_mode(
                mode,
                level,
                as_primvars::<3>(src),
                as_primvars_mut::<3>(dst),
            ),
            Width::Four => self.interpolate_with_mode(
                mode,
                level,
                as_primvars::<4>(src),
                as_primvars_mut::<4>(dst),
            ),
        }
    }

    /// Refine a flat buffer into a newly allocated one sized from the
    /// topology.
    pub fn interpolate_to_vec(
        &self,
        mode: InterpolationMode,
        width: usize,
        level: usize,
        src: &[f32],
    ) -> Result<Vec<f32>> {
        let elements = checked_width(mode, width)?.elements();
        let (_, dst_len) = self.element_counts(mode, level)?;
        let mut dst = vec![0.0; dst_len * elements];
        self.interpolate_flat(mode, width, level, src, &mut dst)?;
        Ok(dst)
    }
}

fn checked_width(mode: InterpolationMode, width: usize) -> Result<Width> {
    Width::new(width).inspect_err(|_| {
        log::error!("Invalid num elements for {:?} interpolation: {}", mode, width)
    })
}
