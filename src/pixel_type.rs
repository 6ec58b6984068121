//! The public pixel type enumeration (`spec.md` §3, §6).

/// One of the ten supported 8-bit-per-channel pixel encodings.
///
/// The variant order matches `spec.md` §6's ABI contract exactly:
/// `RGBA8-pre, BGRA8-pre, ARGB8-pre, ABGR8-pre, RGBA8-un, BGRA8-un,
/// ARGB8-un, ABGR8-un, RGB8, BGR8`. Do not reorder these variants; external
/// callers may depend on the discriminant values matching that sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PixelType {
  /// Red/Green/Blue/Alpha, premultiplied.
  Rgba8Premultiplied = 0,
  /// Blue/Green/Red/Alpha, premultiplied.
  Bgra8Premultiplied = 1,
  /// Alpha/Red/Green/Blue, premultiplied.
  Argb8Premultiplied = 2,
  /// Alpha/Blue/Green/Red, premultiplied.
  Abgr8Premultiplied = 3,
  /// Red/Green/Blue/Alpha, unassociated.
  Rgba8Unassociated = 4,
  /// Blue/Green/Red/Alpha, unassociated.
  Bgra8Unassociated = 5,
  /// Alpha/Red/Green/Blue, unassociated.
  Argb8Unassociated = 6,
  /// Alpha/Blue/Green/Red, unassociated.
  Abgr8Unassociated = 7,
  /// Red/Green/Blue, no alpha.
  Rgb8 = 8,
  /// Blue/Green/Red, no alpha.
  Bgr8 = 9,
}

/// Whether a pixel type's alpha channel is premultiplied into the color
/// channels or stored unassociated. Absent for the three-channel types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlphaAssociation {
  /// Channel values are already scaled by alpha.
  Premultiplied,
  /// Channel values are independent of alpha.
  Unassociated,
}

/// The channel permutation of a pixel type, independent of alpha
/// association or storage width.
///
/// `storage_order()` encodes, for each byte offset within one packed pixel,
/// which canonical channel (`0=R, 1=G, 2=B, 3=A`) lives there. This is the
/// same bijective-permutation idea the C implementation's `SmolReorderType`
/// encodes as a `reorder` code; here it is just a `const fn` table instead
/// of a macro-generated enum of named permutations, so unpack/pack/repack
/// code can be written generically over the permutation rather than once
/// per named reorder (`spec.md` §9, "Channel reorder encoded as
/// permutations").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelOrder {
  /// Red, Green, Blue, Alpha.
  Rgba,
  /// Blue, Green, Red, Alpha.
  Bgra,
  /// Alpha, Red, Green, Blue.
  Argb,
  /// Alpha, Blue, Green, Red.
  Abgr,
  /// Red, Green, Blue (no alpha byte).
  Rgb,
  /// Blue, Green, Red (no alpha byte).
  Bgr,
}

impl ChannelOrder {
  /// Channel identity stored at each byte offset of one packed pixel.
  /// For three-channel orders, byte offset 3 is unused (set to `3`, the
  /// alpha id, purely so the array stays total; callers must consult
  /// [`ChannelOrder::channel_count`] before reading it).
  #[inline]
  #[must_use]
  pub const fn storage_order(self) -> [u8; 4] {
    match self {
      Self::Rgba => [0, 1, 2, 3],
      Self::Bgra => [2, 1, 0, 3],
      Self::Argb => [3, 0, 1, 2],
      Self::Abgr => [3, 2, 1, 0],
      Self::Rgb => [0, 1, 2, 3],
      Self::Bgr => [2, 1, 0, 3],
    }
  }

  /// `3` for `Rgb`/`Bgr`, `4` otherwise.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> u8 {
    match self {
      Self::Rgb | Self::Bgr => 3,
      _ => 4,
    }
  }

  /// The byte offset within one packed pixel that holds the alpha channel.
  /// Only meaningful when [`ChannelOrder::channel_count`] is `4`.
  #[inline]
  #[must_use]
  pub const fn alpha_byte_offset(self) -> u8 {
    let order = self.storage_order();
    // linear scan is fine: this runs once per scaling context, not per pixel
    let mut i = 0;
    while i < 4 {
      if order[i] == 3 {
        return i as u8;
      }
      i += 1;
    }
    unreachable!()
  }
}

impl PixelType {
  /// The ten pixel types, in ABI order, for exhaustive iteration in tests
  /// and in the repack dispatch table builder.
  pub const ALL: [PixelType; 10] = [
    Self::Rgba8Premultiplied,
    Self::Bgra8Premultiplied,
    Self::Argb8Premultiplied,
    Self::Abgr8Premultiplied,
    Self::Rgba8Unassociated,
    Self::Bgra8Unassociated,
    Self::Argb8Unassociated,
    Self::Abgr8Unassociated,
    Self::Rgb8,
    Self::Bgr8,
  ];

  /// This pixel type's channel permutation.
  #[inline]
  #[must_use]
  pub const fn channel_order(self) -> ChannelOrder {
    match self {
      Self::Rgba8Premultiplied | Self::Rgba8Unassociated => ChannelOrder::Rgba,
      Self::Bgra8Premultiplied | Self::Bgra8Unassociated => ChannelOrder::Bgra,
      Self::Argb8Premultiplied | Self::Argb8Unassociated => ChannelOrder::Argb,
      Self::Abgr8Premultiplied | Self::Abgr8Unassociated => ChannelOrder::Abgr,
      Self::Rgb8 => ChannelOrder::Rgb,
      Self::Bgr8 => ChannelOrder::Bgr,
    }
  }

  /// `Some` for the eight four-channel types, `None` for `Rgb8`/`Bgr8`.
  #[inline]
  #[must_use]
  pub const fn alpha_association(self) -> Option<AlphaAssociation> {
    match self {
      Self::Rgba8Premultiplied
      | Self::Bgra8Premultiplied
      | Self::Argb8Premultiplied
      | Self::Abgr8Premultiplied => Some(AlphaAssociation::Premultiplied),
      Self::Rgba8Unassociated
      | Self::Bgra8Unassociated
      | Self::Argb8Unassociated
      | Self::Abgr8Unassociated => Some(AlphaAssociation::Unassociated),
      Self::Rgb8 | Self::Bgr8 => None,
    }
  }

  /// `true` for the eight four-channel types.
  #[inline]
  #[must_use]
  pub const fn has_alpha(self) -> bool {
    self.alpha_association().is_some()
  }

  /// `3` for `Rgb8`/`Bgr8`, `4` otherwise.
  #[inline]
  #[must_use]
  pub const fn bytes_per_pixel(self) -> u32 {
    self.channel_order().channel_count() as u32
  }
}
