//! Packed bytes -> wide pixels (`spec.md` §4.6).
//!
//! Unpack always lands on the working state the caller names
//! (`target_alpha_state`/`target_gamma`), regardless of the source pixel
//! type's own alpha association or the fact that it's always gamma-
//! compressed on disk: an unassociated source gets premultiplied, a
//! premultiplied source gets un-premultiplied and re-premultiplied into the
//! target's scheme, and a three-channel source is treated as fully opaque
//! (`alpha = 255`) for the duration of the pipeline.

use crate::alpha_gamma::{AlphaState, GammaState};
use crate::pixel_type::{AlphaAssociation, PixelType};
use crate::repack::convert::{linearize, premultiply, unpremultiply};
use crate::storage::WidePixel;

/// Unpacks one pixel's worth of packed bytes (`pixel_type.bytes_per_pixel()`
/// of them, read from the front of `bytes`) into a wide pixel in canonical
/// `[r, g, b, a]` order, converted into `target_alpha_state`/`target_gamma`.
#[inline]
#[must_use]
pub fn unpack_pixel<P: WidePixel>(
  bytes: &[u8],
  pixel_type: PixelType,
  target_alpha_state: AlphaState,
  target_gamma: GammaState,
) -> P {
  let order = pixel_type.channel_order();
  let perm = order.storage_order();
  let n = order.channel_count() as usize;

  let mut raw = [0u8; 4];
  for i in 0..n {
    raw[perm[i] as usize] = bytes[i];
  }
  let alpha = if pixel_type.has_alpha() { raw[3] } else { 255 };

  let mut channels = [0u32; 4];
  for (c, &disk) in raw.iter().enumerate().take(3) {
    let unassociated = match pixel_type.alpha_association() {
      Some(AlphaAssociation::Premultiplied) => {
        unpremultiply(disk as u32, alpha, AlphaState::Premultiplied8, GammaState::Compressed)
      }
      _ => disk as u32,
    };
    let working_domain = match target_gamma {
      GammaState::Linear => linearize(unassociated as u8),
      GammaState::Compressed => unassociated,
    };
    channels[c] = premultiply(working_domain, alpha, target_alpha_state, target_gamma);
  }
  channels[3] = alpha as u32;

  P::from_channels(channels)
}
