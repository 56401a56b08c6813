//! Luminance-difference kernel.
//!
//! The one piece of numeric logic shared by both modes. Luminance is the
//! unweighted mean of R, G and B; alpha never contributes.

use crate::capture::Rgba;

/// Sum of the colour channels, `0..=765`.
#[inline]
fn channel_sum(p: Rgba) -> u16 {
    u16::from(p.r) + u16::from(p.g) + u16::from(p.b)
}

/// Unweighted luminance of a pixel, in `[0.0, 255.0]`.
#[inline]
pub fn luminance(p: Rgba) -> f32 {
    f32::from(channel_sum(p)) / 3.0
}

/// Absolute luminance difference between two pixels, rounded to the
/// nearest integer.
///
/// `|Σa - Σb| / 3` only ever has a fractional part of 0, 1/3 or 2/3, so
/// adding one before the integer division rounds without ties.
#[inline]
pub fn magnitude(a: Rgba, b: Rgba) -> u8 {
    let diff = channel_sum(a).abs_diff(channel_sum(b));
    ((diff + 1) / 3) as u8
}

/// [`magnitude`] over two raw RGBA chunks.
#[inline]
pub(crate) fn magnitude_of_chunks(a: &[u8], b: &[u8]) -> u8 {
    magnitude(Rgba::from_chunk(a), Rgba::from_chunk(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    fn any_pixel() -> impl Strategy<Value = Rgba> {
        any::<[u8; 4]>().prop_map(|[r, g, b, a]| Rgba::new(r, g, b, a))
    }

    #[test]
    fn test_black_white_is_full_scale() {
        assert_eq!(magnitude(BLACK, WHITE), 255);
        assert_eq!(luminance(WHITE), 255.0);
        assert_eq!(luminance(BLACK), 0.0);
    }

    #[test]
    fn test_alpha_ignored() {
        let opaque = Rgba::new(10, 20, 30, 255);
        let clear = Rgba::new(10, 20, 30, 0);
        assert_eq!(magnitude(opaque, clear), 0);
    }

    #[test]
    fn test_rounds_to_nearest() {
        // Channel sums differ by 1 → 0.33 → 0
        assert_eq!(magnitude(Rgba::new(1, 0, 0, 255), BLACK), 0);
        // Differ by 2 → 0.67 → 1
        assert_eq!(magnitude(Rgba::new(1, 1, 0, 255), BLACK), 1);
        // Differ by 3 → 1
        assert_eq!(magnitude(Rgba::new(1, 1, 1, 255), BLACK), 1);
    }

    #[test]
    fn test_unweighted_channels() {
        let red = Rgba::new(90, 0, 0, 255);
        let green = Rgba::new(0, 90, 0, 255);
        let blue = Rgba::new(0, 0, 90, 255);
        assert_eq!(magnitude(red, green), 0);
        assert_eq!(magnitude(green, blue), 0);
        assert_eq!(magnitude(red, BLACK), 30);
    }

    proptest! {
        #[test]
        fn prop_identical_pixels_zero(p in any_pixel()) {
            prop_assert_eq!(magnitude(p, p), 0);
        }

        #[test]
        fn prop_symmetric(a in any_pixel(), b in any_pixel()) {
            prop_assert_eq!(magnitude(a, b), magnitude(b, a));
        }

        #[test]
        fn prop_matches_rounded_float(a in any_pixel(), b in any_pixel()) {
            let expected = (luminance(a) - luminance(b)).abs().round() as u8;
            prop_assert_eq!(magnitude(a, b), expected);
        }
    }
}
