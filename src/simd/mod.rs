//! SIMD-accelerated inner loops (feature `simd`), built on the `wide` crate
//! (`spec.md` §4.8 "Implementation-variant selection").
//!
//! A [`crate::storage::WidePixel`]'s four canonical `[r, g, b, a]` channels
//! map one-to-one onto a `wide::u32x4` lane group, so every per-channel
//! blend that `horizontal.rs`/`vertical.rs` runs as a four-iteration scalar
//! loop becomes one vector op here. `wide` wraps the target's actual SIMD
//! registers behind a safe API (falling back to a scalar shim on
//! unsupported targets), which is how this crate reaches for hardware
//! acceleration at all under `#![forbid(unsafe_code)]`.
//!
//! The implementation variant (this module vs. the plain scalar one) is
//! chosen once, at [`crate::context::ScaleCtx`] construction, never per row
//! or per pixel — `ScaleCtx::use_simd` records the choice and
//! `crate::driver` reads it once per axis per batch call.

use wide::u32x4;

use crate::fixed_point::BOXES_MULT;
use crate::precalc::BilinearOffset;
use crate::storage::WidePixel;

#[inline]
fn to_vec(c: [u32; 4]) -> u32x4 {
  u32x4::new(c)
}

#[inline]
fn from_vec(v: u32x4) -> [u32; 4] {
  v.to_array()
}

/// SIMD counterpart of [`crate::horizontal::bilinear_row`]. The
/// multiply-accumulate across a pixel's four channels runs as one vector
/// op per sample; only the final divide (a runtime-variable divisor) is
/// done as a scalar unpack, since integer division is not a vectorizable
/// op on the lane widths this crate targets.
pub fn bilinear_row<P: WidePixel>(input: &[P], offsets: &[BilinearOffset], halvings: u8, output: &mut [P]) {
  let step = 1usize << halvings;
  debug_assert!(offsets.len() >= output.len() * step);

  let divisor = step as u32 * 256;
  for (i, out) in output.iter_mut().enumerate() {
    let mut acc = u32x4::splat(0);
    for k in 0..step {
      let o = offsets[i * step + k];
      let p = to_vec(input[o.index as usize].channels());
      let q = to_vec(input[o.index as usize + 1].channels());
      let frac = u32x4::splat(o.fraction as u32);
      let inv_frac = u32x4::splat(256) - frac;
      acc = acc + p * inv_frac + q * frac;
    }
    *out = P::from_channels(from_vec(acc).map(|v| v / divisor));
  }
}

/// A Bpp128 span can run up to `MAX_DIMENSION` full-weight iterations at up
/// to 2047/channel (the 11-bit linear domain); left unchecked that overflows
/// a u32 lane well before a span completes, so both box filters below flush
/// the vector accumulator into u64 scalars this often.
const BOX_FLUSH_EVERY: usize = 4096;

/// SIMD counterpart of [`crate::horizontal::box_row`].
pub fn box_row<P: WidePixel>(input: &[P], starts: &[u32], span_mul: u32, output: &mut [P]) {
  debug_assert_eq!(starts.len(), output.len() + 1);

  for (i, out) in output.iter_mut().enumerate() {
    let s0 = starts[i];
    let s1 = starts[i + 1];
    debug_assert!(s1 > s0);

    let first_idx = (s0 / 256) as usize;
    let last_idx = ((s1 - 1) / 256) as usize;

    let mut acc = u32x4::splat(0);
    let mut acc64 = [0u64; 4];
    if first_idx == last_idx {
      let weight = u32x4::splat(s1 - s0);
      acc = acc + to_vec(input[first_idx].channels()) * weight;
    } else {
      let first_weight = u32x4::splat(256 - (s0 % 256));
      acc = acc + to_vec(input[first_idx].channels()) * first_weight;
      let full = u32x4::splat(256);
      let mut since_flush = 0usize;
      for idx in (first_idx + 1)..last_idx {
        acc = acc + to_vec(input[idx].channels()) * full;
        since_flush += 1;
        if since_flush == BOX_FLUSH_EVERY {
          for (dst, v) in acc64.iter_mut().zip(from_vec(acc)) {
            *dst += v as u64;
          }
          acc = u32x4::splat(0);
          since_flush = 0;
        }
      }
      let last_weight = u32x4::splat(((s1 - 1) % 256) + 1);
      acc = acc + to_vec(input[last_idx].channels()) * last_weight;
    }
    for (dst, v) in acc64.iter_mut().zip(from_vec(acc)) {
      *dst += v as u64;
    }

    // Rounds rather than truncates; see `horizontal::box_row`.
    *out = P::from_channels(acc64.map(|v| ((v * span_mul as u64 + BOXES_MULT as u64 / 2) / BOXES_MULT as u64) as u32));
  }
}

/// SIMD counterpart of [`crate::vertical::bilinear_rows_for_output_row`].
pub fn bilinear_rows_for_output_row<P: WidePixel>(
  rows: &[&[P]],
  rows_next: &[&[P]],
  offsets: &[BilinearOffset],
  width: usize,
  output: &mut [P],
) {
  debug_assert_eq!(rows.len(), offsets.len());
  debug_assert_eq!(rows_next.len(), offsets.len());
  debug_assert_eq!(output.len(), width);

  let divisor = offsets.len() as u32 * 256;
  for col in 0..width {
    let mut acc = u32x4::splat(0);
    for k in 0..offsets.len() {
      let p = to_vec(rows[k][col].channels());
      let q = to_vec(rows_next[k][col].channels());
      let frac = u32x4::splat(offsets[k].fraction as u32);
      let inv_frac = u32x4::splat(256) - frac;
      acc = acc + p * inv_frac + q * frac;
    }
    output[col] = P::from_channels(from_vec(acc).map(|v| v / divisor));
  }
}

/// SIMD counterpart of [`crate::vertical::box_row`].
pub fn box_row_vertical<P: WidePixel>(rows: &[(&[P], u32)], span_mul: u32, width: usize, output: &mut [P]) {
  debug_assert!(!rows.is_empty());
  for col in 0..width {
    let mut acc = u32x4::splat(0);
    let mut acc64 = [0u64; 4];
    let mut since_flush = 0usize;
    for (row, weight) in rows {
      acc = acc + to_vec(row[col].channels()) * u32x4::splat(*weight);
      since_flush += 1;
      if since_flush == BOX_FLUSH_EVERY {
        for (dst, v) in acc64.iter_mut().zip(from_vec(acc)) {
          *dst += v as u64;
        }
        acc = u32x4::splat(0);
        since_flush = 0;
      }
    }
    for (dst, v) in acc64.iter_mut().zip(from_vec(acc)) {
      *dst += v as u64;
    }
    // Rounds rather than truncates; see `horizontal::box_row`.
    output[col] = P::from_channels(acc64.map(|v| ((v * span_mul as u64 + BOXES_MULT as u64 / 2) / BOXES_MULT as u64) as u32));
  }
}
