//! Construction-time error type.
//!
//! Row production (`ScaleCtx::batch`/`batch_full`) is total: once a
//! [`ScaleCtx`](crate::context::ScaleCtx) exists it can be driven for any
//! in-range row without a fallible path. Only construction can fail.

/// An error from the `smolscale` crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScaleError {
  /// Either the input or the output has a width or height of 0.
  ZeroDimension,

  /// A width or height is larger than this crate supports (65535 per axis).
  DimensionTooLarge,

  /// The input and output buffers alias each other.
  BuffersOverlap,

  /// A rowstride is smaller than `width * bytes_per_pixel` for its image.
  RowstrideTooSmall,

  /// The allocator couldn't give us enough space for the precalc arrays or
  /// the local context's scratch rows.
  #[cfg(feature = "alloc")]
  Alloc,
}

/// Shorthand for `Result<T, ScaleError>`.
pub type ScaleResult<T> = Result<T, ScaleError>;

#[cfg(feature = "alloc")]
impl From<alloc::collections::TryReserveError> for ScaleError {
  #[inline]
  fn from(_: alloc::collections::TryReserveError) -> Self {
    Self::Alloc
  }
}
