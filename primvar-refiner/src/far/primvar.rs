//! Values that can be refined.
//!
//! Everything a [`PrimvarRefiner`](super::PrimvarRefiner) does to a value is
//! expressed through [`Accumulate`]: a child value is cleared and then
//! accumulates its parents, each scaled by a weight the topology supplies.
use bytemuck::{Pod, Zeroable};

/// The numeric contract all interpolation schemes reduce to.
///
/// # Examples
///
/// ```
/// use primvar_refiner::far::{Accumulate, Primvar};
///
/// let mut value = Primvar([9.0, 9.0, 9.0]);
/// value.clear();
/// value.accumulate(&Primvar([1.0, 0.0, 0.0]), 0.5);
/// value.accumulate(&Primvar([1.0, 1.0, 1.0]), 0.5);
///
/// assert_eq!(value, Primvar([1.0, 0.5, 0.5]));
/// ```
pub trait Accumulate: Send + Sync {
    /// Sets every component to zero.
    fn clear(&mut self);

    /// Adds `src * weight`, component-wise.
    fn accumulate(&mut self, src: &Self, weight: f32);
}

/// A primvar of `N` consecutive `f32` components, e.g. `Primvar<3>` for a
/// position or an RGB color.
///
/// The layout is that of `[f32; N]` so a flat `&[f32]` holding `N` floats per
/// element can be viewed as `&[Primvar<N>]` without copying.
#[derive(Clone, Copy, Debug, PartialEq, derive_more::Deref, derive_more::DerefMut)]
#[repr(transparent)]
pub struct Primvar<const N: usize>(pub [f32; N]);

// `derive(Pod)` rejects structs with generic parameters, so the const-generic
// width needs hand-written impls.
// SAFETY: `Primvar<N>` is `repr(transparent)` over `[f32; N]` which has no
// padding and for which every bit pattern is valid.
unsafe impl<const N: usize> Zeroable for Primvar<N> {}
unsafe impl<const N: usize> Pod for Primvar<N> {}

impl<const N: usize> Default for Primvar<N> {
    #[inline]
    fn default() -> Self {
        Self([0.0; N])
    }
}

impl<const N: usize> Accumulate for Primvar<N> {
    #[inline]
    fn clear(&mut self) {
        self.0 = [0.0; N];
    }

    #[inline]
    fn accumulate(&mut self, src: &Self, weight: f32) {
        self.0.accumulate(&src.0, weight);
    }
}

impl<const N: usize> Accumulate for [f32; N] {
    #[inline]
    fn clear(&mut self) {
        *self = [0.0; N];
    }

    #[inline]
    fn accumulate(&mut self, src: &Self, weight: f32) {
        self.iter_mut()
            .zip(src.iter())
            .for_each(|(dst, src)| *dst += src * weight);
    }
}

impl Accumulate for f32 {
    #[inline]
    fn clear(&mut self) {
        *self = 0.0;
    }

    #[inline]
    fn accumulate(&mut self, src: &Self, weight: f32) {
        *self += src * weight;
    }
}

/// Views a flat buffer as primvars of width `N`.
///
/// The caller has checked that `values.len()` is a multiple of `N`.
#[inline]
pub(crate) fn as_primvars<const N: usize>(values: &[f32]) -> &[Primvar<N>] {
    bytemuck::cast_slice(values)
}

#[inline]
pub(crate) fn as_primvars_mut<const N: usize>(values: &mut [f32]) -> &mut [Primvar<N>] {
    bytemuck::cast_slice_mut(values)
}
