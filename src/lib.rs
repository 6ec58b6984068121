#![cfg_attr(not(feature = "trace"), no_std)]
#![forbid(unsafe_code)]
//#![warn(missing_docs)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "trace")]
extern crate std;

/// Zero-cost tracing: compiles to nothing unless the `trace` feature is on,
/// in which case it prints to `std::io::stdout` (pulling in `std` only for
/// that feature). Used at construction-time decision points — filter and
/// storage-width selection, SIMD-vs-generic dispatch, box-filter span
/// degeneracies — never inside a per-pixel inner loop.
#[macro_export]
macro_rules! smolscale_trace {
  ($($arg:tt)*) => {
    #[cfg(feature = "trace")] {
      ::std::print!("{file}:{line}> ", file = file!(), line = line!());
      ::std::println!($($arg)*);
    }
  }
}

mod alpha_gamma;
#[cfg(feature = "alloc")]
mod api;
#[cfg(feature = "alloc")]
mod context;
#[cfg(feature = "alloc")]
mod driver;
mod error;
mod filter;
mod fixed_point;
mod horizontal;
mod pixel_type;
mod precalc;
mod repack;
#[cfg(feature = "simd")]
mod simd;
mod storage;
mod tables;
#[cfg(feature = "alloc")]
mod vertical;

// The row-production engine (`context`/`driver`/`api`) allocates its precalc
// tables and per-row scratch buffers on the heap, so it only exists behind
// the `alloc` feature; without it this crate still exposes the pure,
// allocation-free building blocks (pixel types, tables, filter selection,
// horizontal-filter slice math) per `spec.md` §1's `no-std` scope.
#[cfg(feature = "alloc")]
pub use api::{batch, batch_full, scale_simple};
#[cfg(feature = "alloc")]
pub use context::{EdgeOpacity, Flags, PostRow, ScaleCtx, SourceRect, SubpixelPlacement, MAX_DIMENSION};
pub use error::{ScaleError, ScaleResult};
pub use fixed_point::{from_spx, to_spx};
pub use pixel_type::{AlphaAssociation, ChannelOrder, PixelType};
