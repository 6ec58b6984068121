//! Row production: per-output-row orchestration over the horizontal and
//! vertical filters (`spec.md` §2 step 2, §4.5 "Row cache protocol", §4.7
//! "Batch row production").
//!
//! This is the "Row driver & batch API" component from `spec.md` §2's
//! budget table. [`batch_full`] is the one primitive; `crate::api::batch`
//! and `crate::api::scale_simple` are thin callers of it.

use alloc::vec;
use alloc::vec::Vec;

use crate::context::{AxisPrecalc, EdgeOpacity, ScaleCtx};
use crate::filter::FilterKind;
use crate::horizontal;
use crate::repack::{pack_pixel, unpack_pixel};
use crate::storage::{Storage, WidePixel, WideRgba128, WideRgba64};
use crate::vertical::{self, RowCache};

/// Produces output rows `first_out_row..first_out_row + n_out_rows` into
/// `dest`, which must hold exactly `n_out_rows * ctx.rowstride_out()`
/// bytes starting at its own row 0 (`spec.md` §4.7 `smol_scale_batch_full`).
///
/// Dispatches once on [`ScaleCtx::storage`] and runs the rest of the
/// pipeline generically over the chosen wide-pixel width, mirroring the
/// original implementation's per-storage-width function-pointer dispatch
/// without needing one (`spec.md` §4.2, §4.8) — monomorphization produces
/// the same "choose the width once, not per pixel" effect a C function
/// pointer table gives, without the pointer indirection.
pub fn batch_full(ctx: &ScaleCtx, dest: &mut [u8], first_out_row: u32, n_out_rows: u32) {
  debug_assert!(!buffers_overlap(ctx.input, dest), "input and output buffers must not overlap");

  if is_exact_copy(ctx) {
    copy_path(ctx, dest, first_out_row, n_out_rows);
    return;
  }

  match ctx.storage {
    Storage::Bpp64 | Storage::Bpp24 | Storage::Bpp32 => {
      batch_generic::<WideRgba64>(ctx, dest, first_out_row, n_out_rows)
    }
    Storage::Bpp128 => batch_generic::<WideRgba128>(ctx, dest, first_out_row, n_out_rows),
  }
}

/// Whether `ctx` can be served by a raw row memcpy instead of
/// unpack-filter-pack: both axes are `FilterKind::Copy`, source and
/// destination pixel types match byte-for-byte, no edge opacity would
/// perturb a channel value, and sRGB linearization is off (`spec.md` §8,
/// "copy-path exactness" is conditioned on "gamma flag is off" — with it on,
/// an identity-dimension scale must still run the from_srgb/to_srgb round
/// trip, which is only accurate to within 1, not the raw memcpy this path
/// takes).
fn is_exact_copy(ctx: &ScaleCtx) -> bool {
  matches!(ctx.axis_h.filter, FilterKind::Copy)
    && matches!(ctx.axis_v.filter, FilterKind::Copy)
    && ctx.pixel_type_in == ctx.pixel_type_out
    && ctx.edge_opacity == EdgeOpacity::default()
    && !ctx.with_srgb
}

fn copy_path(ctx: &ScaleCtx, dest: &mut [u8], first_out_row: u32, n_out_rows: u32) {
  let bpp = ctx.pixel_type_out.bytes_per_pixel() as usize;
  let width = ctx.width_out as usize;
  let rowstride_out = ctx.rowstride_out as usize;
  let rowstride_in = ctx.rowstride_in as usize;

  for i in 0..n_out_rows {
    let out_row_index = first_out_row + i;
    let phys_row = (out_row_index + ctx.row_offset_px).min(ctx.src_height_in.saturating_sub(1)) as usize;
    let src_row_start = phys_row * rowstride_in + ctx.col_offset_px as usize * bpp;
    let src_row = &ctx.input[src_row_start..src_row_start + width * bpp];

    let dst_row_start = i as usize * rowstride_out;
    let dst_row = &mut dest[dst_row_start..dst_row_start + width * bpp];
    dst_row.copy_from_slice(src_row);

    if let Some(cb) = ctx.post_row {
      cb(dst_row, ctx.width_out);
    }
  }
}

#[cfg(feature = "simd")]
fn bilinear_row_dispatch<P: WidePixel>(
  ctx: &ScaleCtx,
  input: &[P],
  offsets: &[crate::precalc::BilinearOffset],
  halvings: u8,
  out: &mut [P],
) {
  if ctx.use_simd {
    crate::simd::bilinear_row(input, offsets, halvings, out);
  } else {
    horizontal::bilinear_row(input, offsets, halvings, out);
  }
}

#[cfg(not(feature = "simd"))]
fn bilinear_row_dispatch<P: WidePixel>(
  _ctx: &ScaleCtx,
  input: &[P],
  offsets: &[crate::precalc::BilinearOffset],
  halvings: u8,
  out: &mut [P],
) {
  horizontal::bilinear_row(input, offsets, halvings, out);
}

#[cfg(feature = "simd")]
fn box_row_dispatch<P: WidePixel>(ctx: &ScaleCtx, input: &[P], starts: &[u32], span_mul: u32, out: &mut [P]) {
  if ctx.use_simd {
    crate::simd::box_row(input, starts, span_mul, out);
  } else {
    horizontal::box_row(input, starts, span_mul, out);
  }
}

#[cfg(not(feature = "simd"))]
fn box_row_dispatch<P: WidePixel>(_ctx: &ScaleCtx, input: &[P], starts: &[u32], span_mul: u32, out: &mut [P]) {
  horizontal::box_row(input, starts, span_mul, out);
}

#[cfg(feature = "simd")]
fn bilinear_rows_dispatch<P: WidePixel>(
  ctx: &ScaleCtx,
  rows: &[&[P]],
  rows_next: &[&[P]],
  offsets: &[crate::precalc::BilinearOffset],
  width: usize,
  out: &mut [P],
) {
  if ctx.use_simd {
    crate::simd::bilinear_rows_for_output_row(rows, rows_next, offsets, width, out);
  } else {
    vertical::bilinear_rows_for_output_row(rows, rows_next, offsets, width, out);
  }
}

#[cfg(not(feature = "simd"))]
fn bilinear_rows_dispatch<P: WidePixel>(
  _ctx: &ScaleCtx,
  rows: &[&[P]],
  rows_next: &[&[P]],
  offsets: &[crate::precalc::BilinearOffset],
  width: usize,
  out: &mut [P],
) {
  vertical::bilinear_rows_for_output_row(rows, rows_next, offsets, width, out);
}

#[cfg(feature = "simd")]
fn box_row_vertical_dispatch<P: WidePixel>(ctx: &ScaleCtx, rows: &[(&[P], u32)], span_mul: u32, width: usize, out: &mut [P]) {
  if ctx.use_simd {
    crate::simd::box_row_vertical(rows, span_mul, width, out);
  } else {
    vertical::box_row(rows, span_mul, width, out);
  }
}

#[cfg(not(feature = "simd"))]
fn box_row_vertical_dispatch<P: WidePixel>(_ctx: &ScaleCtx, rows: &[(&[P], u32)], span_mul: u32, width: usize, out: &mut [P]) {
  vertical::box_row(rows, span_mul, width, out);
}

/// `true` if the byte ranges `a` and `b` overlap in memory.
#[must_use]
pub(crate) fn buffers_overlap(a: &[u8], b: &[u8]) -> bool {
  if a.is_empty() || b.is_empty() {
    return false;
  }
  let a_start = a.as_ptr() as usize;
  let a_end = a_start + a.len();
  let b_start = b.as_ptr() as usize;
  let b_end = b_start + b.len();
  a_start < b_end && b_start < a_end
}

fn batch_generic<P: WidePixel>(ctx: &ScaleCtx, dest: &mut [u8], first_out_row: u32, n_out_rows: u32) {
  let bpp_out = ctx.pixel_type_out.bytes_per_pixel() as usize;
  let width_out = ctx.width_out as usize;
  let rowstride_out = ctx.rowstride_out as usize;

  let mut h_cache: RowCache<P> = RowCache::new();
  let mut one_row_cache: Option<Vec<P>> = None;

  for i in 0..n_out_rows {
    let out_row_index = first_out_row + i;
    let row_start = i as usize * rowstride_out;
    let row_bytes = &mut dest[row_start..row_start + width_out * bpp_out];

    let wide_row = produce_output_row::<P>(ctx, &mut h_cache, &mut one_row_cache, out_row_index);
    pack_row::<P>(ctx, &wide_row, row_bytes);

    if let Some(cb) = ctx.post_row {
      cb(row_bytes, ctx.width_out);
    }
  }
}

/// Unpacks input row `row_index` and runs the horizontal filter over it,
/// producing a wide-pixel row at `width_out` (`spec.md` §2 step 2.b).
fn horizontally_scaled_row<P: WidePixel>(ctx: &ScaleCtx, row_index: u32) -> Vec<P> {
  let bpp_in = ctx.pixel_type_in.bytes_per_pixel() as usize;
  let phys_row = (row_index + ctx.row_offset_px).min(ctx.src_height_in.saturating_sub(1));
  let row_start = phys_row as usize * ctx.rowstride_in as usize;
  let row_bytes = &ctx.input[row_start..row_start + ctx.src_width_in as usize * bpp_in];

  let width_in = ctx.width_in as usize;
  let mut unpacked: Vec<P> = Vec::with_capacity(width_in);
  for x in 0..width_in {
    let phys_col = ((x as u32 + ctx.col_offset_px) as usize).min(ctx.src_width_in as usize - 1);
    let px_bytes = &row_bytes[phys_col * bpp_in..phys_col * bpp_in + bpp_in];
    unpacked.push(unpack_pixel(px_bytes, ctx.pixel_type_in, ctx.target_alpha_state, ctx.target_gamma));
  }

  let width_out = ctx.width_out as usize;
  let mut out = vec![P::default(); width_out];
  match &ctx.axis_h.filter {
    FilterKind::Copy => horizontal::copy_row(&unpacked, &mut out),
    FilterKind::One => horizontal::one_row(&unpacked, &mut out),
    FilterKind::Bilinear { halvings } => {
      let offsets = match &ctx.axis_h.precalc {
        AxisPrecalc::Bilinear(v) => v,
        _ => unreachable!("bilinear filter must have bilinear precalc"),
      };
      bilinear_row_dispatch(ctx, &unpacked, offsets, *halvings, &mut out);
    }
    FilterKind::Box => {
      let bp = match &ctx.axis_h.precalc {
        AxisPrecalc::Box(b) => b,
        _ => unreachable!("box filter must have box precalc"),
      };
      box_row_dispatch(ctx, &unpacked, &bp.starts, bp.span_mul, &mut out);
    }
  }

  if ctx.edge_opacity.first_col != 256 {
    apply_opacity_at(&mut out, 0, ctx.edge_opacity.first_col);
  }
  if ctx.edge_opacity.last_col != 256 && width_out > 0 {
    apply_opacity_at(&mut out, width_out - 1, ctx.edge_opacity.last_col);
  }
  out
}

/// Runs the vertical filter for one output row, combining the horizontally
/// scaled input rows it needs (`spec.md` §4.5). Cached rows are reused
/// across the output rows in this batch call exactly as
/// `crate::vertical::RowCache` allows.
fn produce_output_row<P: WidePixel>(
  ctx: &ScaleCtx,
  h_cache: &mut RowCache<P>,
  one_row_cache: &mut Option<Vec<P>>,
  out_row_index: u32,
) -> Vec<P> {
  let width_out = ctx.width_out as usize;

  let mut row = match &ctx.axis_v.filter {
    FilterKind::Copy => h_cache.get_or_compute(out_row_index, out_row_index, |idx| horizontally_scaled_row::<P>(ctx, idx)),
    FilterKind::One => {
      if let Some(cached) = one_row_cache {
        cached.clone()
      } else {
        let row = horizontally_scaled_row::<P>(ctx, 0);
        *one_row_cache = Some(row.clone());
        row
      }
    }
    FilterKind::Bilinear { halvings } => {
      let offsets = match &ctx.axis_v.precalc {
        AxisPrecalc::Bilinear(v) => v,
        _ => unreachable!("bilinear filter must have bilinear precalc"),
      };
      let step = 1usize << *halvings;
      let base = (out_row_index as usize) << *halvings;
      let slice = &offsets[base..base + step];
      let min_idx = slice.iter().map(|o| o.index).min().unwrap_or(out_row_index);

      let tops: Vec<Vec<P>> = slice.iter().map(|o| h_cache.get_or_compute(o.index, min_idx, |idx| horizontally_scaled_row::<P>(ctx, idx))).collect();
      let bots: Vec<Vec<P>> =
        slice.iter().map(|o| h_cache.get_or_compute(o.index + 1, min_idx, |idx| horizontally_scaled_row::<P>(ctx, idx))).collect();
      let top_refs: Vec<&[P]> = tops.iter().map(Vec::as_slice).collect();
      let bot_refs: Vec<&[P]> = bots.iter().map(Vec::as_slice).collect();

      let mut out = vec![P::default(); width_out];
      bilinear_rows_dispatch(ctx, &top_refs, &bot_refs, slice, width_out, &mut out);
      out
    }
    FilterKind::Box => {
      let bp = match &ctx.axis_v.precalc {
        AxisPrecalc::Box(b) => b,
        _ => unreachable!("box filter must have box precalc"),
      };
      let s0 = bp.starts[out_row_index as usize];
      let s1 = bp.starts[out_row_index as usize + 1];
      let first_idx = s0 / 256;
      let last_idx = (s1 - 1) / 256;
      let min_idx = first_idx;

      let mut weighted: Vec<(u32, u32)> = Vec::new();
      if first_idx == last_idx {
        weighted.push((first_idx, s1 - s0));
      } else {
        weighted.push((first_idx, 256 - (s0 % 256)));
        for idx in (first_idx + 1)..last_idx {
          weighted.push((idx, 256));
        }
        weighted.push((last_idx, ((s1 - 1) % 256) + 1));
      }

      let rows: Vec<Vec<P>> =
        weighted.iter().map(|&(idx, _)| h_cache.get_or_compute(idx, min_idx, |i| horizontally_scaled_row::<P>(ctx, i))).collect();
      let row_refs: Vec<(&[P], u32)> = rows.iter().zip(weighted.iter()).map(|(r, &(_, w))| (r.as_slice(), w)).collect();

      let mut out = vec![P::default(); width_out];
      box_row_vertical_dispatch(ctx, &row_refs, bp.span_mul, width_out, &mut out);
      out
    }
  };

  if out_row_index == 0 && ctx.edge_opacity.first_row != 256 {
    apply_opacity_row(&mut row, ctx.edge_opacity.first_row);
  } else if out_row_index + 1 == ctx.height_out && ctx.edge_opacity.last_row != 256 {
    apply_opacity_row(&mut row, ctx.edge_opacity.last_row);
  }

  row
}

fn apply_opacity_at<P: WidePixel>(row: &mut [P], idx: usize, opacity: u16) {
  let c = row[idx].channels();
  row[idx] = P::from_channels(c.map(|v| (v * opacity as u32) / 256));
}

fn apply_opacity_row<P: WidePixel>(row: &mut [P], opacity: u16) {
  for p in row.iter_mut() {
    let c = p.channels();
    *p = P::from_channels(c.map(|v| (v * opacity as u32) / 256));
  }
}

fn pack_row<P: WidePixel>(ctx: &ScaleCtx, row: &[P], dest: &mut [u8]) {
  let bpp_out = ctx.pixel_type_out.bytes_per_pixel() as usize;
  for (x, &p) in row.iter().enumerate() {
    let bytes = pack_pixel(p, ctx.pixel_type_out, ctx.target_alpha_state, ctx.target_gamma);
    dest[x * bpp_out..x * bpp_out + bpp_out].copy_from_slice(&bytes[..bpp_out]);
  }
}
