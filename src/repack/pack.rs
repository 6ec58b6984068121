//! Wide pixels -> packed bytes (`spec.md` §4.6).
//!
//! The inverse of `unpack.rs`: un-premultiplies out of the pipeline's
//! working state, re-premultiplies into the destination's on-disk
//! convention if it wants one, and scatters channels into the
//! destination's byte order. Three-channel destinations simply drop alpha.

use crate::alpha_gamma::{AlphaState, GammaState};
use crate::pixel_type::{AlphaAssociation, PixelType};
use crate::repack::convert::{compress, premultiply, unpremultiply};
use crate::storage::WidePixel;

/// Packs one wide pixel (in `source_alpha_state`/`source_gamma`) into
/// `pixel_type`'s on-disk byte order. Only the first
/// `pixel_type.bytes_per_pixel()` bytes of the result are meaningful.
#[inline]
#[must_use]
pub fn pack_pixel<P: WidePixel>(
  pixel: P,
  pixel_type: PixelType,
  source_alpha_state: AlphaState,
  source_gamma: GammaState,
) -> [u8; 4] {
  let channels = pixel.channels();
  let alpha = channels[3] as u8;

  let mut raw = [0u8; 4];
  for (c, &working) in channels.iter().enumerate().take(3) {
    let unassociated = unpremultiply(working, alpha, source_alpha_state, source_gamma);
    let compressed = match source_gamma {
      GammaState::Linear => compress(unassociated),
      GammaState::Compressed => unassociated.min(255) as u8,
    };
    raw[c] = match pixel_type.alpha_association() {
      Some(AlphaAssociation::Premultiplied) => {
        premultiply(compressed as u32, alpha, AlphaState::Premultiplied8, GammaState::Compressed) as u8
      }
      _ => compressed,
    };
  }
  raw[3] = alpha;

  let perm = pixel_type.channel_order().storage_order();
  let n = pixel_type.channel_order().channel_count() as usize;
  let mut bytes = [0u8; 4];
  for i in 0..n {
    bytes[i] = raw[perm[i] as usize];
  }
  bytes
}
