//! Per-axis precalculated sample offsets and weights (`spec.md` §4.3).
//!
//! ## A note on the bilinear weight convention
//!
//! `spec.md` §4.3 defines a precalculated `(pixel_index, fraction)` pair
//! where `fraction` is "the weight applied to pixel `index+1`", but its
//! §4.4 description of the horizontal filter's inner loop
//! (`((p - q) * fraction >> 8) + q`) is only consistent with `fraction`
//! being the weight on the *first* fetched sample. The two read as
//! internally inconsistent without the original source's exact fetch
//! order in hand. This rewrite picks one fixed, self-consistent
//! convention and uses it everywhere a fraction is produced or consumed:
//!
//! **`fraction` is the weight on `pixel[index + 1]`; `256 - fraction` is
//! the weight on `pixel[index]`.**
//!
//! `horizontal.rs`'s bilinear filter interpolates accordingly. The
//! repeat-edge clamp (run past the last input pixel -> 100% weight on the
//! last pixel) holds under this convention the same way it would under
//! the other one, since it is stated in terms of "which pixel gets 100%
//! weight", not in terms of the raw fraction value.

use crate::fixed_point::{BILIN_MULT, BOXES_MULT, SUBPIXEL_MUL};

/// One `(pixel_index, fraction)` sample for the bilinear filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BilinearOffset {
  /// Index of the first of the two input pixels this sample blends.
  pub index: u32,
  /// Weight (0..=256) applied to `pixel[index + 1]`; `256 - fraction` is
  /// applied to `pixel[index]`.
  pub fraction: u16,
}

/// Builds the `dim_out + 1` bilinear offsets for one axis (`spec.md`
/// §4.3). `dim_out` here is the *intermediate* bilinear dimension (i.e.
/// already multiplied by `2^halvings` by the caller when halving is in
/// play). `subpixel_offset` shifts the initial sample position, in
/// subpixel (1/256 px) units.
#[cfg(feature = "alloc")]
#[must_use]
pub fn bilinear_offsets(
  dim_in: u32,
  dim_out: u32,
  subpixel_offset: i32,
) -> alloc::vec::Vec<BilinearOffset> {
  use alloc::vec::Vec;

  debug_assert!(dim_in >= 2, "dim_in == 1 should have selected FilterKind::One");
  debug_assert!(dim_out >= 1);

  let magnify = dim_out >= dim_in;

  // step and initial offset, in BILIN_MULT (1/2^32 px) fixed-point units.
  // `dim_out <= 1` only needs special-casing on the magnify side, where it
  // would otherwise divide by `dim_out - 1 == 0`; a minify axis always has
  // `dim_in >= 2` and a well-defined `dim_in * BILIN_MULT / dim_out` step
  // even at `dim_out == 1` (the whole input collapses onto one sample at
  // the span's centre, not pixel 0).
  let step: u64 = if magnify {
    if dim_out <= 1 { 0 } else { ((dim_in as u64 - 1) * BILIN_MULT) / (dim_out as u64 - 1) }
  } else {
    (dim_in as u64 * BILIN_MULT) / dim_out as u64
  };
  let mut pos: i64 = if magnify { 0 } else { ((step as i64) - BILIN_MULT as i64) / 2 };
  // convert the subpixel (1/256 px) placement offset into BILIN_MULT units
  pos += (subpixel_offset as i64) * (BILIN_MULT as i64) / (SUBPIXEL_MUL as i64);

  let mut offsets = Vec::with_capacity(dim_out as usize + 1);
  for _ in 0..dim_out {
    let sample = sample_at(pos, dim_in, BILIN_MULT);
    offsets.push(sample);
    pos += step as i64;
  }
  // sentinel: repeats the last in-bounds sample so lookahead reads stay
  // in range without a branch in the filter's inner loop.
  offsets.push(*offsets.last().unwrap_or(&BilinearOffset { index: 0, fraction: 0 }));
  offsets
}

fn sample_at(pos: i64, dim_in: u32, mult: u64) -> BilinearOffset {
  if pos <= 0 {
    return BilinearOffset { index: 0, fraction: 0 };
  }
  let pos = pos as u64;
  let idx_raw = pos / mult;
  if idx_raw >= dim_in as u64 - 1 {
    return BilinearOffset { index: dim_in - 2, fraction: 256 };
  }
  let frac_units = pos % mult;
  let fraction = ((frac_units * 256) / mult) as u16;
  BilinearOffset { index: idx_raw as u32, fraction }
}

/// Per-axis box-filter precalc: `dim_out + 1` span-start offsets (1/256 px
/// units) plus the normalization multiplier `span_mul` (`spec.md` §4.3).
#[derive(Debug, Clone)]
#[cfg(feature = "alloc")]
pub struct BoxPrecalc {
  /// `dim_out + 1` fractional (1/256 px) left-edge offsets; span `i`'s
  /// pixel range is recovered at runtime from `starts[i]..starts[i+1]`.
  pub starts: alloc::vec::Vec<u32>,
  /// Per-axis normalization multiplier.
  pub span_mul: u32,
}

#[cfg(feature = "alloc")]
#[must_use]
pub fn box_precalc(dim_in: u32, dim_out: u32, subpixel_offset: i32) -> BoxPrecalc {
  use alloc::vec::Vec;

  debug_assert!(dim_in > 8 * dim_out);

  let dim_in64 = dim_in as u64;
  let dim_out64 = dim_out as u64;
  let max_spx = dim_in64 * 256;

  let mut starts = Vec::with_capacity(dim_out as usize + 1);
  for i in 0..=dim_out64 {
    let base = (i * dim_in64 * 256) / dim_out64;
    let shifted = base as i64 + subpixel_offset as i64;
    starts.push(shifted.clamp(0, max_spx as i64) as u32);
  }

  // average step, used only to derive the single per-axis normalization
  // multiplier; exact per-pixel span length comes from `starts` at
  // runtime, not from this average.
  let span_step = (dim_in64 * 256) / dim_out64;
  let stride = span_step / 256;
  let frac = span_step % 256;
  // `box_row`'s accumulator sums `channel * spx_weight` with a full pixel
  // weighted at the raw 256 (not right-shifted down to a weight of 1 per
  // full pixel, the way the original C accumulator does), so it runs 256x
  // hotter than the `stride * 255 + ...` denominator below accounts for on
  // its own; folding that factor into the denominator here keeps `starts`'
  // edge weights at subpixel (1/256 px) precision instead of flooring them
  // to whole units before they ever reach the accumulator.
  let denom = ((stride * 255 + (frac * 255) / 256).max(1)) * 256;
  let numerator = BOXES_MULT * 255;
  let span_mul = ((numerator + denom / 2) / denom) as u32;

  BoxPrecalc { starts, span_mul }
}
