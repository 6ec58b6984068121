//! Internal alpha and gamma state (`spec.md` §3).
//!
//! These states only change at the pipeline endpoints — unpack converts
//! into one of them, pack converts back out. No filter ever transitions
//! between them mid-pipeline.

/// The alpha representation a wide pixel's channels are currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlphaState {
  /// Channels are already scaled by alpha, at 8-bit precision.
  Premultiplied8,
  /// Channels were premultiplied by `alpha + 2` rather than normalized by
  /// `/ 255`, trading a wider range (up to `255 * 257`, still inside a
  /// `Bpp128` accumulator) for an exact rather than rounded un-premultiply
  /// (`spec.md` §9, Open Question iii).
  Premultiplied16,
  /// Channels are independent of alpha.
  Unassociated,
}

/// The transfer-function state a wide pixel's channels are currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GammaState {
  /// sRGB-encoded (gamma-compressed) channel values.
  Compressed,
  /// Linear-light channel values (after `from_srgb`, before `to_srgb`).
  Linear,
}
