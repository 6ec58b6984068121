//! The immutable scaling context (`spec.md` §3 "Scaling context", §4.7,
//! §4.9–§4.11).
//!
//! [`ScaleCtx`] borrows the input buffer for its lifetime, precalculates
//! both axes' filter choice and sample tables once, and is otherwise plain
//! data: every row-production call (`crate::driver::batch_full`) reads it
//! without mutating it, so it is `Sync` and may be shared by any number of
//! concurrent callers (`spec.md` §5).
//!
//! Unlike the original C context, this one does not hold an output buffer
//! pointer: storing a raw pointer an immutable, `Sync`-shared context could
//! hand out to several threads for unsynchronized writes is exactly the
//! kind of aliasing `#![forbid(unsafe_code)]` rules out. Instead, the
//! destination slice is supplied at each `batch`/`batch_full` call, and the
//! caller is responsible for splitting it into disjoint `&mut [u8]` ranges
//! before handing work to its own thread pool (`split_at_mut`/
//! `chunks_mut`) — the same division of responsibility `spec.md` §1 already
//! draws for threading primitives in general ("the core exposes row-range
//! calls; a caller drives them from its own worker pool"). See DESIGN.md.

use crate::alpha_gamma::{AlphaState, GammaState};
use crate::error::{ScaleError, ScaleResult};
use crate::filter::{self, FilterKind};
use crate::pixel_type::PixelType;
use crate::precalc::{self, BilinearOffset, BoxPrecalc};
use crate::repack::convert::premultiplied_alpha_state;
use crate::storage::Storage;

use alloc::vec::Vec;

/// Maximum width or height this crate supports on either axis
/// (`spec.md` §1: "1:65535 upminification to 65535:1 upmagnification").
pub const MAX_DIMENSION: u32 = 65535;

/// Construction flags, a public ABI contract (`spec.md` §6).
///
/// Modeled as a small `#[non_exhaustive]` bitset over a `u32`, the way the
/// teacher models its other small closed option sets, rather than pulling
/// in the `bitflags` crate for two bits (`DESIGN.md` §4.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct Flags(u32);

impl Flags {
  /// No flags set: use the accelerated implementation if available, run
  /// the pipeline in sRGB-compressed space.
  pub const NONE: Flags = Flags(0);
  /// Disable the accelerated implementation; always use the generic one.
  pub const FORCE_GENERIC: Flags = Flags(1 << 0);
  /// Run the interior pipeline in sRGB-linear space.
  pub const LINEARIZE_SRGB: Flags = Flags(1 << 1);

  /// Builds a `Flags` from a raw bit pattern (public ABI contract).
  #[inline]
  #[must_use]
  pub const fn from_bits(bits: u32) -> Flags {
    Flags(bits)
  }

  /// This flag set's raw bit pattern (public ABI contract).
  #[inline]
  #[must_use]
  pub const fn bits(self) -> u32 {
    self.0
  }

  /// Whether every bit set in `other` is also set in `self`.
  #[inline]
  #[must_use]
  pub const fn contains(self, other: Flags) -> bool {
    self.0 & other.0 == other.0
  }
}

impl Default for Flags {
  #[inline]
  fn default() -> Self {
    Flags::NONE
  }
}

impl core::ops::BitOr for Flags {
  type Output = Flags;
  #[inline]
  fn bitor(self, rhs: Flags) -> Flags {
    Flags(self.0 | rhs.0)
  }
}

/// Integer subpixel placement, in 1/256 px units on both axes
/// (`spec.md` §4.3, §9 "Subpixel placement").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubpixelPlacement {
  /// Horizontal placement offset, in spx units.
  pub x_offset_spx: i32,
  /// Vertical placement offset, in spx units.
  pub y_offset_spx: i32,
}

/// Per-edge opacity multipliers, in 1/256ths (`spec.md` §9 "Subpixel
/// placement"). `256` means fully opaque, i.e. a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeOpacity {
  /// Multiplier applied to the first output column.
  pub first_col: u16,
  /// Multiplier applied to the last output column.
  pub last_col: u16,
  /// Multiplier applied to the first output row.
  pub first_row: u16,
  /// Multiplier applied to the last output row.
  pub last_row: u16,
}

impl Default for EdgeOpacity {
  #[inline]
  fn default() -> Self {
    Self { first_col: 256, last_col: 256, first_row: 256, last_row: 256 }
  }
}

/// A clipped source sub-rectangle, in 1/256 px units (`spec.md` §4.7
/// "`new_full_subpixel`... source sub-rectangles in 1/256-px units").
///
/// The whole-pixel part of `x_spx`/`y_spx` selects which input row/column
/// the engine treats as index 0; the fractional remainder is folded into
/// the axis's subpixel placement. `width_spx`/`height_spx` become the
/// dimension filter selection and precalc run against, in place of the
/// buffer's full `width_in`/`height_in`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRect {
  pub x_spx: i32,
  pub y_spx: i32,
  pub width_spx: u32,
  pub height_spx: u32,
}

/// A post-row callback: `(row_bytes, width_out)` (`spec.md` §6).
pub trait PostRow: Fn(&mut [u8], u32) + Sync {}
impl<F: Fn(&mut [u8], u32) + Sync> PostRow for F {}

/// Precalculated per-axis sample table, if the chosen filter needs one.
#[derive(Debug, Clone)]
pub(crate) enum AxisPrecalc {
  /// `Copy`/`One`: no table, nothing to look up.
  None,
  Bilinear(Vec<BilinearOffset>),
  Box(BoxPrecalc),
}

/// One axis's resolved filter, dimensions and precalc table.
#[derive(Debug, Clone)]
pub(crate) struct AxisPlan {
  pub filter: FilterKind,
  pub dim_out: u32,
  pub precalc: AxisPrecalc,
}

/// The immutable scaling context: input buffer, both pixel types,
/// dimensions, chosen filters/storage, and precalculated sample tables
/// (`spec.md` §3 "Scaling context").
pub struct ScaleCtx<'a> {
  pub(crate) input: &'a [u8],
  pub(crate) pixel_type_in: PixelType,
  /// Effective input width used for filter selection/precalc: the source
  /// sub-rectangle's width if one was given, else `src_width_in`.
  pub(crate) width_in: u32,
  pub(crate) height_in: u32,
  /// Physical buffer width/height/stride, used for byte addressing and to
  /// clamp sub-rectangle reads in bounds.
  pub(crate) src_width_in: u32,
  pub(crate) src_height_in: u32,
  pub(crate) rowstride_in: u32,
  pub(crate) col_offset_px: u32,
  pub(crate) row_offset_px: u32,

  pub(crate) pixel_type_out: PixelType,
  pub(crate) width_out: u32,
  pub(crate) height_out: u32,
  pub(crate) rowstride_out: u32,

  pub(crate) flags: Flags,
  pub(crate) with_srgb: bool,
  pub(crate) storage: Storage,
  pub(crate) target_alpha_state: AlphaState,
  pub(crate) target_gamma: GammaState,

  pub(crate) axis_h: AxisPlan,
  pub(crate) axis_v: AxisPlan,

  pub(crate) edge_opacity: EdgeOpacity,
  pub(crate) post_row: Option<&'a (dyn PostRow + 'a)>,

  /// Whether `crate::driver` should dispatch into `crate::simd` instead of
  /// the plain scalar filters, decided once here rather than per row
  /// (`spec.md` §4.8). Always `false` without the `simd` feature.
  pub(crate) use_simd: bool,
}

fn check_dims(width: u32, height: u32) -> ScaleResult<()> {
  if width == 0 || height == 0 {
    return Err(ScaleError::ZeroDimension);
  }
  if width > MAX_DIMENSION || height > MAX_DIMENSION {
    return Err(ScaleError::DimensionTooLarge);
  }
  Ok(())
}

fn build_axis(dim_in: u32, dim_out: u32, with_srgb: bool, subpixel_offset_spx: i32) -> (AxisPlan, Storage) {
  let sel = filter::select(dim_in, dim_out, with_srgb);
  let precalc = match sel.filter {
    FilterKind::Copy | FilterKind::One => AxisPrecalc::None,
    FilterKind::Bilinear { halvings } => {
      let intermediate_dim = sel.filter.intermediate_dim(dim_out);
      AxisPrecalc::Bilinear(precalc::bilinear_offsets(dim_in, intermediate_dim, subpixel_offset_spx))
    }
    FilterKind::Box => AxisPrecalc::Box(precalc::box_precalc(dim_in, dim_out, subpixel_offset_spx)),
  };
  (AxisPlan { filter: sel.filter, dim_out, precalc }, sel.storage)
}

impl<'a> ScaleCtx<'a> {
  /// Builds a scaling context for a one-shot or batch scale. No post-row
  /// callback, no subpixel placement, no edge opacities, no source
  /// sub-rectangle (`spec.md` §4.7, `smol_scale_new`).
  #[allow(clippy::too_many_arguments)]
  pub fn new(
    input: &'a [u8],
    pixel_type_in: PixelType,
    width_in: u32,
    height_in: u32,
    rowstride_in: u32,
    pixel_type_out: PixelType,
    width_out: u32,
    height_out: u32,
    rowstride_out: u32,
    flags: Flags,
  ) -> ScaleResult<Self> {
    Self::new_full(
      input,
      pixel_type_in,
      width_in,
      height_in,
      rowstride_in,
      pixel_type_out,
      width_out,
      height_out,
      rowstride_out,
      flags,
      None,
    )
  }

  /// As [`ScaleCtx::new`], plus an optional post-row callback
  /// (`spec.md` §4.7, `smol_scale_new_full`).
  #[allow(clippy::too_many_arguments)]
  pub fn new_full(
    input: &'a [u8],
    pixel_type_in: PixelType,
    width_in: u32,
    height_in: u32,
    rowstride_in: u32,
    pixel_type_out: PixelType,
    width_out: u32,
    height_out: u32,
    rowstride_out: u32,
    flags: Flags,
    post_row: Option<&'a (dyn PostRow + 'a)>,
  ) -> ScaleResult<Self> {
    Self::new_full_subpixel(
      input,
      pixel_type_in,
      width_in,
      height_in,
      rowstride_in,
      pixel_type_out,
      width_out,
      height_out,
      rowstride_out,
      flags,
      None,
      None,
      None,
      post_row,
    )
  }

  /// As [`ScaleCtx::new_full`], plus subpixel placement, edge opacities and
  /// a source sub-rectangle (`spec.md` §4.7, `smol_scale_new_full_subpixel`;
  /// first-class here per `spec.md` §9 Open Question ii).
  #[allow(clippy::too_many_arguments)]
  pub fn new_full_subpixel(
    input: &'a [u8],
    pixel_type_in: PixelType,
    width_in: u32,
    height_in: u32,
    rowstride_in: u32,
    pixel_type_out: PixelType,
    width_out: u32,
    height_out: u32,
    rowstride_out: u32,
    flags: Flags,
    subpixel: Option<SubpixelPlacement>,
    source_rect: Option<SourceRect>,
    edge_opacity: Option<EdgeOpacity>,
    post_row: Option<&'a (dyn PostRow + 'a)>,
  ) -> ScaleResult<Self> {
    check_dims(width_in, height_in)?;
    check_dims(width_out, height_out)?;

    let bpp_in = pixel_type_in.bytes_per_pixel();
    let bpp_out = pixel_type_out.bytes_per_pixel();
    if rowstride_in < width_in * bpp_in || rowstride_out < width_out * bpp_out {
      return Err(ScaleError::RowstrideTooSmall);
    }
    let needed_in = (rowstride_in as u64) * (height_in as u64);
    if (input.len() as u64) < needed_in {
      return Err(ScaleError::RowstrideTooSmall);
    }

    let (eff_width_in, eff_height_in, col_offset_px, row_offset_px, extra_x_spx, extra_y_spx) =
      if let Some(rect) = source_rect {
        let w = crate::fixed_point::from_spx(rect.width_spx as i32).max(1) as u32;
        let h = crate::fixed_point::from_spx(rect.height_spx as i32).max(1) as u32;
        let col_off = (rect.x_spx.max(0) as u32 / 256).min(width_in.saturating_sub(1));
        let row_off = (rect.y_spx.max(0) as u32 / 256).min(height_in.saturating_sub(1));
        let extra_x = rect.x_spx.max(0) % 256;
        let extra_y = rect.y_spx.max(0) % 256;
        (w.min(width_in), h.min(height_in), col_off, row_off, extra_x, extra_y)
      } else {
        (width_in, height_in, 0, 0, 0, 0)
      };

    let with_srgb = flags.contains(Flags::LINEARIZE_SRGB);
    let target_gamma = if with_srgb { GammaState::Linear } else { GammaState::Compressed };

    let subpixel = subpixel.unwrap_or_default();
    // total placement in spx units: explicit subpixel placement plus the
    // source rect's sub-pixel remainder (its whole-pixel part was already
    // consumed by col_offset_px/row_offset_px above).
    let x_offset_spx = subpixel.x_offset_spx + extra_x_spx;
    let y_offset_spx = subpixel.y_offset_spx + extra_y_spx;

    let (axis_h, storage_h) = build_axis(eff_width_in, width_out, with_srgb, x_offset_spx);
    let (axis_v, storage_v) = build_axis(eff_height_in, height_out, with_srgb, y_offset_spx);

    let storage = storage_h.join(storage_v);
    let target_alpha_state = premultiplied_alpha_state(storage, target_gamma);

    let use_simd = cfg!(feature = "simd") && !flags.contains(Flags::FORCE_GENERIC);
    crate::smolscale_trace!(
      "ScaleCtx: {width_in}x{height_in} -> {width_out}x{height_out}, storage={storage:?}, simd={use_simd}"
    );

    Ok(Self {
      input,
      pixel_type_in,
      width_in: eff_width_in,
      height_in: eff_height_in,
      src_width_in: width_in,
      src_height_in: height_in,
      rowstride_in,
      col_offset_px,
      row_offset_px,
      pixel_type_out,
      width_out,
      height_out,
      rowstride_out,
      flags,
      with_srgb,
      storage,
      target_alpha_state,
      target_gamma,
      axis_h,
      axis_v,
      edge_opacity: edge_opacity.unwrap_or_default(),
      post_row,
      use_simd,
    })
  }

  #[inline]
  #[must_use]
  pub fn width_out(&self) -> u32 {
    self.width_out
  }

  #[inline]
  #[must_use]
  pub fn height_out(&self) -> u32 {
    self.height_out
  }

  #[inline]
  #[must_use]
  pub fn rowstride_out(&self) -> u32 {
    self.rowstride_out
  }

  #[inline]
  #[must_use]
  pub fn storage(&self) -> Storage {
    self.storage
  }
}

// SAFETY note (no unsafe used): `ScaleCtx` is automatically `Sync` because
// every field is itself `Sync` (`&[u8]`, enums/`Vec`s of `Copy` data, and a
// `dyn PostRow + Sync` trait object) — no manual impl is needed or present.
