//! Byte <-> wide-pixel conversion (`spec.md` §4.6).
//!
//! `convert` holds the per-channel alpha/gamma math; `unpack`/`pack` apply
//! it while reordering bytes according to a [`crate::pixel_type::PixelType`].

pub mod convert;
pub mod pack;
pub mod unpack;

pub use convert::{premultiplied_alpha_state, premultiply, unpremultiply};
pub use pack::pack_pixel;
pub use unpack::unpack_pixel;
