//! Public entry points over [`crate::context::ScaleCtx`] and
//! [`crate::driver::batch_full`] (`spec.md` §4.7, `smol_scale_simple`/
//! `smol_scale_batch`/`smol_scale_batch_full`).

use crate::context::{Flags, ScaleCtx};
use crate::driver;
use crate::error::{ScaleError, ScaleResult};
use crate::pixel_type::PixelType;

/// One-shot convenience entry point: builds a context for the whole image
/// and scales it in a single call (`spec.md` §4.7 `smol_scale_simple`).
///
/// Checks that `src` and `dest` don't alias, since this is the one call
/// shape where both buffers are in hand together to check; `batch`/
/// `batch_full` trust the caller, since by the time a worker thread calls
/// them the context no longer has the destination buffer in scope to check
/// against (`spec.md` §5).
#[allow(clippy::too_many_arguments)]
pub fn scale_simple(
  src: &[u8],
  pixel_type_in: PixelType,
  width_in: u32,
  height_in: u32,
  rowstride_in: u32,
  dest: &mut [u8],
  pixel_type_out: PixelType,
  width_out: u32,
  height_out: u32,
  rowstride_out: u32,
  flags: Flags,
) -> ScaleResult<()> {
  if driver::buffers_overlap(src, dest) {
    return Err(ScaleError::BuffersOverlap);
  }
  let ctx = ScaleCtx::new(src, pixel_type_in, width_in, height_in, rowstride_in, pixel_type_out, width_out, height_out, rowstride_out, flags)?;
  batch_full(&ctx, dest, 0, height_out);
  Ok(())
}

/// Scales every output row into `dest`, which must hold exactly
/// `ctx.height_out() * ctx.rowstride_out()` bytes (`spec.md` §4.7
/// `smol_scale_batch`).
///
/// `ctx` holds no output buffer, so repeated or concurrent `batch`/
/// `batch_full` calls against the same context are always safe as long as
/// each call's `dest` is disjoint from every other's — the caller owns that
/// invariant (`spec.md` §5).
pub fn batch(ctx: &ScaleCtx, dest: &mut [u8]) {
  batch_full(ctx, dest, 0, ctx.height_out());
}

/// Scales output rows `first_out_row..first_out_row + n_out_rows` into
/// `dest`, which must hold exactly `n_out_rows * ctx.rowstride_out()` bytes
/// starting at its own row 0 (`spec.md` §4.7 `smol_scale_batch_full`).
///
/// This is the primitive a caller's own thread pool drives directly: split
/// the full output buffer into disjoint row ranges with `chunks_mut` or
/// `split_at_mut`, hand each range to a worker alongside a shared `&ScaleCtx`
/// reference, and call `batch_full` once per range (`spec.md` §5).
pub fn batch_full(ctx: &ScaleCtx, dest: &mut [u8], first_out_row: u32, n_out_rows: u32) {
  driver::batch_full(ctx, dest, first_out_row, n_out_rows)
}
