//! Vertical-axis filters and the horizontally-scaled row cache (`spec.md`
//! §4.5).
//!
//! The vertical pass combines several already-horizontally-scaled input
//! rows into one output row. Adjacent output rows draw on overlapping
//! ranges of input rows (more so the larger the shrink ratio), so
//! [`RowCache`] keeps the most recently produced horizontal rows around
//! instead of recomputing them for every output row that needs them.

use crate::fixed_point::BOXES_MULT;
use crate::precalc::BilinearOffset;
use crate::storage::WidePixel;

#[cfg(feature = "alloc")]
use alloc::{collections::VecDeque, vec::Vec};

/// A small cache of horizontally-scaled rows, keyed by input row index.
///
/// Rows are handed out by value (cloned on a cache hit) rather than
/// borrowed, so the vertical filters below can hold several of them at
/// once without fighting the borrow checker over repeated mutable access
/// to the same cache.
#[cfg(feature = "alloc")]
pub struct RowCache<P> {
  rows: VecDeque<(u32, Vec<P>)>,
}

#[cfg(feature = "alloc")]
impl<P: Clone> RowCache<P> {
  #[must_use]
  pub fn new() -> Self {
    Self { rows: VecDeque::new() }
  }

  /// Returns the horizontally-scaled row at `index`, computing it with
  /// `compute` on a miss. Rows indexed below `min_needed_index` are
  /// evicted first, since no later output row can still need them (input
  /// rows are only ever consumed in increasing order).
  pub fn get_or_compute(
    &mut self,
    index: u32,
    min_needed_index: u32,
    compute: impl FnOnce(u32) -> Vec<P>,
  ) -> Vec<P> {
    while let Some(&(idx, _)) = self.rows.front() {
      if idx < min_needed_index {
        self.rows.pop_front();
      } else {
        break;
      }
    }
    if let Some((_, row)) = self.rows.iter().find(|(idx, _)| *idx == index) {
      return row.clone();
    }
    let row = compute(index);
    self.rows.push_back((index, row.clone()));
    row
  }
}

#[cfg(feature = "alloc")]
impl<P: Clone> Default for RowCache<P> {
  fn default() -> Self {
    Self::new()
  }
}

/// `dim_in == dim_out`: the output row is the matching input row, unchanged.
pub fn copy_row<P: WidePixel>(input: &[P], output: &mut [P]) {
  crate::horizontal::copy_row(input, output);
}

/// `dim_in == 1`: every output row is the lone input row.
pub fn one_row<P: WidePixel>(input: &[P], output: &mut [P]) {
  crate::horizontal::one_row(input, output);
}

/// Bilinear-with-halvings for one output row. `offsets` are the `2^halvings`
/// row samples (row-index + fraction pairs) this single output row needs,
/// already sliced out of the axis's full offsets array by the caller.
/// `rows[k]` must be the horizontally-scaled row at `offsets[k].index`, and
/// `rows_next[k]` the row at `offsets[k].index + 1`.
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

  let step = offsets.len() as u32;
  for col in 0..width {
    let mut acc = [0u32; 4];
    for k in 0..offsets.len() {
      let p = rows[k][col].channels();
      let q = rows_next[k][col].channels();
      let frac = offsets[k].fraction as u32;
      for c in 0..4 {
        acc[c] += p[c] * (256 - frac) + q[c] * frac;
      }
    }
    let divisor = step * 256;
    output[col] = P::from_channels(acc.map(|v| v / divisor));
  }
}

/// Area-averaging box filter for one output row: `rows` holds every
/// horizontally-scaled row the span `starts[row_idx]..starts[row_idx + 1]`
/// covers, in ascending order, along with the per-row weight already
/// resolved by the caller from the same `starts`/`span_mul` scheme
/// `horizontal::box_row` uses on the other axis.
pub fn box_row<P: WidePixel>(rows: &[(&[P], u32)], span_mul: u32, width: usize, output: &mut [P]) {
  debug_assert!(!rows.is_empty());
  for col in 0..width {
    // u64: a Bpp128 span can cover up to MAX_DIMENSION rows at up to
    // 2047/channel, which overflows u32 before span_mul is applied.
    let mut acc = [0u64; 4];
    for (row, weight) in rows {
      let c = row[col].channels();
      for ch in 0..4 {
        acc[ch] += c[ch] as u64 * *weight as u64;
      }
    }
    // Rounds rather than truncates; see `horizontal::box_row`.
    output[col] = P::from_channels(
      acc.map(|v| (v * span_mul as u64 + BOXES_MULT as u64 / 2) / BOXES_MULT as u64).map(|v| v as u32),
    );
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::storage::WideRgba128;

  fn px(v: u32) -> WideRgba128 {
    WideRgba128::splat(v)
  }

  #[cfg(feature = "alloc")]
  #[test]
  fn row_cache_evicts_rows_below_the_watermark() {
    let mut cache: RowCache<u32> = RowCache::new();
    let mut computed = Vec::new();
    for i in 0..5u32 {
      computed.push(i);
      let _ = cache.get_or_compute(i, i.saturating_sub(1), |idx| vec![idx]);
    }
    // rows 0..=2 should have been evicted by the time row 4 is requested
    // with a watermark of 3
    let hit = cache.get_or_compute(3, 3, |_| panic!("row 3 should still be cached"));
    assert_eq!(hit, vec![3]);
  }

  #[cfg(feature = "alloc")]
  #[test]
  fn row_cache_recomputes_after_eviction() {
    let mut cache: RowCache<u32> = RowCache::new();
    let _ = cache.get_or_compute(0, 0, |idx| vec![idx]);
    let _ = cache.get_or_compute(5, 5, |idx| vec![idx]); // evicts row 0
    let mut recomputed = false;
    let _ = cache.get_or_compute(0, 0, |idx| {
      recomputed = true;
      vec![idx]
    });
    assert!(recomputed);
  }

  #[test]
  fn bilinear_rows_blend_two_rows() {
    let row_a = [px(0), px(0)];
    let row_b = [px(256), px(256)];
    let offsets = [BilinearOffset { index: 0, fraction: 128 }];
    let mut output = [px(0), px(0)];
    bilinear_rows_for_output_row(&[&row_a], &[&row_b], &offsets, 2, &mut output);
    assert_eq!(output, [px(128), px(128)]);
  }

  #[test]
  fn box_row_averages_weighted_rows() {
    let row_a = [px(0)];
    let row_b = [px(100)];
    let row_c = [px(200)];
    let span_mul = (BOXES_MULT / (3 * 256)) as u32;
    let rows: [(&[WideRgba128], u32); 3] = [(&row_a, 256), (&row_b, 256), (&row_c, 256)];
    let mut output = [px(0)];
    box_row(&rows, span_mul, 1, &mut output);
    assert_eq!(output[0], px(100));
  }

  #[test]
  fn box_row_does_not_overflow_at_max_linear_value_and_many_rows() {
    // Same overflow this axis's horizontal counterpart guards against: a
    // Bpp128 span summing 2047-valued channels across this many rows would
    // wrap a u32 accumulator well before span_mul normalization.
    const N: usize = 16384;
    let row = [px(2047)];
    let rows: [(&[WideRgba128], u32); N] = [(&row[..], 256); N];
    let span_mul = (BOXES_MULT / (N as u64 * 256)) as u32;
    let mut output = [px(0)];
    box_row(&rows, span_mul, 1, &mut output);
    assert_eq!(output[0], px(2047));
  }
}
