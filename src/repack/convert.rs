//! Per-channel alpha and gamma conversions (`spec.md` §4.1, §4.6).
//!
//! These operate on one channel value at a time; `unpack.rs`/`pack.rs` call
//! them once per channel while reordering bytes into/out of wide pixels.

use crate::alpha_gamma::{AlphaState, GammaState};
use crate::storage::Storage;
use crate::tables::gamma::{FROM_SRGB, TO_SRGB};
use crate::tables::inv_div::{
  divide_by_alpha, INV_DIV_PREMUL16, INV_DIV_PREMUL8, INV_DIV_PREMUL8_LINEAR, PREMUL16_SHIFT,
  PREMUL8_LINEAR_SHIFT, PREMUL8_SHIFT,
};

/// sRGB-encoded `0..=255` channel -> linear `0..=2047` channel.
#[inline]
#[must_use]
pub fn linearize(value: u8) -> u32 {
  FROM_SRGB[value as usize] as u32
}

/// Linear `0..=2047` channel -> sRGB-encoded `0..=255` channel.
#[inline]
#[must_use]
pub fn compress(value: u32) -> u8 {
  TO_SRGB[value.min(2047) as usize]
}

/// The `AlphaState` an unassociated channel should be premultiplied into,
/// given this axis pair's gamma and storage choice (`spec.md` §9, Open
/// Question iii): un-premultiplying out of a `Bpp128` accumulator in the
/// compressed (non-linear) domain uses the higher-precision, un-normalized
/// `alpha + 2` scheme instead of the ordinary `round(value * alpha / 255)`
/// one, since the wider accumulator has the headroom for it. The linear
/// domain always uses its own dedicated table regardless of this choice.
#[inline]
#[must_use]
pub fn premultiplied_alpha_state(storage: Storage, gamma: GammaState) -> AlphaState {
  match (storage, gamma) {
    (Storage::Bpp128, GammaState::Compressed) => AlphaState::Premultiplied16,
    _ => AlphaState::Premultiplied8,
  }
}

/// Premultiplies an unassociated channel value by its pixel's alpha,
/// producing the working representation `alpha_state`/`gamma` calls for.
///
/// `Premultiplied16` (only reachable with `GammaState::Compressed`, see
/// [`premultiplied_alpha_state`]) multiplies by `alpha + 2` without
/// normalizing, trading a wider intermediate range (up to `255 * 257`,
/// still inside a `u32` channel accumulator) for an *exact* round trip
/// through [`unpremultiply`] instead of a rounded one. Every other
/// combination uses the ordinary normalized `round(value * alpha / 255)`.
#[inline]
#[must_use]
pub fn premultiply(value: u32, alpha: u8, alpha_state: AlphaState, gamma: GammaState) -> u32 {
  match (gamma, alpha_state) {
    (GammaState::Compressed, AlphaState::Premultiplied16) => value * (alpha as u32 + 2),
    _ => (value * alpha as u32 + 127) / 255,
  }
}

/// Recovers an unassociated channel value from a premultiplied one, using
/// the reciprocal table matching `alpha_state`/`gamma`. Returns `0` for a
/// fully transparent pixel under the normalized schemes, where there is
/// nothing meaningful to recover; the `Premultiplied16` scheme needs no
/// such guard, since `premultiply`'s `alpha + 2` forward direction never
/// collapses a transparent pixel's color to an unrecoverable value.
#[inline]
#[must_use]
pub fn unpremultiply(value: u32, alpha: u8, alpha_state: AlphaState, gamma: GammaState) -> u32 {
  match gamma {
    GammaState::Linear => {
      if alpha == 0 {
        return 0;
      }
      divide_by_alpha(value, alpha, &INV_DIV_PREMUL8_LINEAR, PREMUL8_LINEAR_SHIFT).min(2047)
    }
    GammaState::Compressed => match alpha_state {
      AlphaState::Premultiplied16 => divide_by_alpha(value, alpha, &INV_DIV_PREMUL16, PREMUL16_SHIFT),
      _ => {
        if alpha == 0 {
          return 0;
        }
        divide_by_alpha(value, alpha, &INV_DIV_PREMUL8, PREMUL8_SHIFT).min(255)
      }
    },
  }
}
