//! Filter and storage-width selection (`spec.md` §4.2).

use crate::storage::Storage;

/// Which filter family handles one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
  /// Input dimension equals output dimension: byte-exact pass-through.
  Copy,
  /// Input dimension is 1: replicate the single sample across the output.
  One,
  /// Standard bilinear, with `halvings` successive 2x downsamplings
  /// applied afterwards to average adjacent samples. `halvings` is in
  /// `0..=6`.
  Bilinear { halvings: u8 },
  /// Area-averaging filter for large shrink ratios.
  Box,
}

impl FilterKind {
  /// The intermediate bilinear output dimension this filter needs before
  /// halving, given the final output dimension. `Bilinear` asks for
  /// `dim_out << halvings`; every other filter just wants `dim_out`.
  #[inline]
  #[must_use]
  pub const fn intermediate_dim(self, dim_out: u32) -> u32 {
    match self {
      FilterKind::Bilinear { halvings } => dim_out << halvings,
      _ => dim_out,
    }
  }
}

/// The result of selecting a filter for one axis: the filter itself, and
/// the minimum internal storage width it requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSelection {
  pub filter: FilterKind,
  pub storage: Storage,
}

/// Chooses the filter and minimum storage width for one axis, per the
/// `spec.md` §4.2 table.
///
/// `with_srgb` is whether sRGB linearization is active; linear values need
/// 11 bits plus 8 bits of premultiplication headroom, which only fits in
/// `Bpp128`.
#[inline]
#[must_use]
pub fn select(dim_in: u32, dim_out: u32, with_srgb: bool) -> AxisSelection {
  debug_assert!(dim_in >= 1 && dim_out >= 1);

  let srgb_floor = if with_srgb { Storage::Bpp128 } else { Storage::Bpp64 };

  if dim_in == 1 {
    return AxisSelection { filter: FilterKind::One, storage: srgb_floor };
  }
  if dim_in == dim_out {
    return AxisSelection { filter: FilterKind::Copy, storage: srgb_floor };
  }
  if dim_in > 255 * dim_out {
    return AxisSelection { filter: FilterKind::Box, storage: Storage::Bpp128 };
  }
  if dim_in > 8 * dim_out {
    return AxisSelection { filter: FilterKind::Box, storage: srgb_floor };
  }

  // bilinear-Nh with the smallest N such that dim_out * 2^(N+1) >= dim_in
  let mut halvings: u8 = 0;
  while (dim_out as u64) << (halvings + 1) < dim_in as u64 {
    halvings += 1;
    debug_assert!(halvings <= 6, "dim_in/dim_out ratio should have hit the box-filter threshold first");
  }
  AxisSelection { filter: FilterKind::Bilinear { halvings }, storage: srgb_floor }
}
