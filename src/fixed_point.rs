//! Fixed-point constants and the public subpixel-unit helpers from `spec.md`
//! §6 ("Subpixel unit").
//!
//! Mirrors `SMOL_SUBPIXEL_SHIFT`/`SMOL_SUBPIXEL_MUL`/`SMOL_BIG_MUL`/
//! `SMOL_SMALL_MUL`/`SMOL_BILIN_MULTIPLIER`/`SMOL_BOXES_MULTIPLIER` from the
//! original implementation's `smolscale-private.h`.

/// Number of fractional bits in a subpixel (spx) unit.
pub const SUBPIXEL_SHIFT: u32 = 8;

/// `1 << SUBPIXEL_SHIFT`: one whole pixel, expressed in subpixel units.
pub const SUBPIXEL_MUL: u32 = 1 << SUBPIXEL_SHIFT;

/// Small fixed-point multiplier used by the box filter's span bookkeeping.
pub const SMALL_MUL: u32 = 256;

/// Large fixed-point multiplier used by both bilinear and box precalc.
pub const BIG_MUL: u32 = 65536;

/// Fixed-point multiplier for box-filter span fractions (`BIG_MUL * SMALL_MUL`).
pub const BOXES_MULT: u64 = (BIG_MUL as u64) * (SMALL_MUL as u64);

/// Fixed-point multiplier for bilinear sample-centre stepping
/// (`BIG_MUL * BIG_MUL` = `2^32`).
pub const BILIN_MULT: u64 = (BIG_MUL as u64) * (BIG_MUL as u64);

/// Converts a pixel coordinate to subpixel (1/256 px) units.
///
/// Part of the crate's public ABI contract (`spec.md` §6).
#[inline]
#[must_use]
pub const fn to_spx(px: i32) -> i32 {
  px * SUBPIXEL_MUL as i32
}

/// Converts a subpixel coordinate back to a (rounded-up) whole pixel count.
///
/// Part of the crate's public ABI contract (`spec.md` §6).
#[inline]
#[must_use]
pub const fn from_spx(spx: i32) -> i32 {
  (spx + SUBPIXEL_MUL as i32 - 1) / SUBPIXEL_MUL as i32
}
