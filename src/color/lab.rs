use crate::PdfResult;

use super::{clamp_to_u8, Sample};

/// The CIE 1976 (L*, a*, b*) color space.
///
/// L* spans `[0, 100]`; the a* and b* ranges default to `[-100, 100]` and may
/// be narrowed by the Range parameter.
#[derive(Debug, Clone)]
pub struct Lab {
    white_point: [f32; 3],
    range: [f32; 4],
}

/// The g(x) mapping from decoded L, M, N to relative XYZ.
fn fn_g(x: f32) -> f32 {
    if x >= 6.0 / 29.0 {
        x.powi(3)
    } else {
        (108.0 / 841.0) * (x - 4.0 / 29.0)
    }
}

/// Remap a raster sample in `[0, high1]` onto `[low2, high2]`.
fn decode(value: f32, high1: f32, low2: f32, high2: f32) -> f32 {
    low2 + value * (high2 - low2) / high1
}

impl Lab {
    pub(crate) fn new(
        white_point: Option<Vec<f32>>,
        black_point: Option<Vec<f32>>,
        range: Option<Vec<f32>>,
    ) -> PdfResult<Self> {
        let Some(white_point) = white_point else {
            anyhow::bail!("WhitePoint missing - required for color space Lab");
        };

        if white_point.len() != 3 {
            anyhow::bail!("Invalid WhitePoint components, no fallback available");
        }

        let white_point = [white_point[0], white_point[1], white_point[2]];
        let black_point = match black_point {
            Some(bp) if bp.len() == 3 => [bp[0], bp[1], bp[2]],
            _ => [0.0; 3],
        };
        let mut range = match range {
            Some(r) if r.len() == 4 => [r[0], r[1], r[2], r[3]],
            _ => [-100.0, 100.0, -100.0, 100.0],
        };

        let [xw, yw, zw] = white_point;
        if xw < 0.0 || zw < 0.0 || yw != 1.0 {
            anyhow::bail!("Invalid WhitePoint components, no fallback available");
        }

        if black_point.iter().any(|&c| c < 0.0) {
            log::warn!("Invalid BlackPoint, falling back to default.");
        }

        if range[0] > range[1] || range[2] > range[3] {
            log::warn!("Invalid Range, falling back to defaults.");
            range = [-100.0, 100.0, -100.0, 100.0];
        }

        Ok(Self { white_point, range })
    }

    /// Convert one (L*, a*, b*) triple. `max_val` is the top of the sample
    /// range for raster input, or `None` when the components arrive already
    /// decoded.
    fn convert_to_rgb(
        &self,
        mut ls: f32,
        mut a_star: f32,
        mut b_star: f32,
        max_val: Option<f32>,
        dest: &mut [u8],
        dest_offset: usize,
    ) {
        let [amin, amax, bmin, bmax] = self.range;

        if let Some(max_val) = max_val {
            ls = decode(ls, max_val, 0.0, 100.0);
            a_star = decode(a_star, max_val, amin, amax);
            b_star = decode(b_star, max_val, bmin, bmax);
        }

        a_star = a_star.clamp(amin, amax);
        b_star = b_star.clamp(bmin, bmax);

        let m = (ls + 16.0) / 116.0;
        let l = m + a_star / 500.0;
        let n = m - b_star / 200.0;

        let x = self.white_point[0] * fn_g(l);
        let y = self.white_point[1] * fn_g(m);
        let z = self.white_point[2] * fn_g(n);

        // different sRGB matrices for D50 and D65 white points
        let (r, g, b) = if self.white_point[2] < 1.0 {
            (
                x * 3.1339 + y * -1.617 + z * -0.4906,
                x * -0.9785 + y * 1.916 + z * 0.0333,
                x * 0.072 + y * -0.229 + z * 1.4057,
            )
        } else {
            (
                x * 3.2406 + y * -1.5372 + z * -0.4986,
                x * -0.9689 + y * 1.8758 + z * 0.0415,
                x * 0.0557 + y * -0.204 + z * 1.057,
            )
        };

        dest[dest_offset] = clamp_to_u8(r.max(0.0).sqrt() * 255.0);
        dest[dest_offset + 1] = clamp_to_u8(g.max(0.0).sqrt() * 255.0);
        dest[dest_offset + 2] = clamp_to_u8(b.max(0.0).sqrt() * 255.0);
    }

    pub(crate) fn get_rgb_item(
        &self,
        src: &[f32],
        src_offset: usize,
        dest: &mut [u8],
        dest_offset: usize,
    ) {
        self.convert_to_rgb(
            src[src_offset],
            src[src_offset + 1],
            src[src_offset + 2],
            None,
            dest,
            dest_offset,
        );
    }

    pub(crate) fn get_rgb_buffer<S: Sample>(
        &self,
        src: &[S],
        src_offset: usize,
        count: usize,
        dest: &mut [u8],
        dest_offset: usize,
        bits: u8,
        alpha01: usize,
    ) {
        let max_val = ((1u32 << bits) - 1) as f32;
        let mut j = src_offset;
        let mut q = dest_offset;
        for _ in 0..count {
            self.convert_to_rgb(
                src[j].value() as f32,
                src[j + 1].value() as f32,
                src[j + 2].value() as f32,
                Some(max_val),
                dest,
                q,
            );
            j += 3;
            q += 3 + alpha01;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn d65_lab() -> Lab {
        Lab::new(Some(vec![0.9505, 1.0, 1.089]), None, None).unwrap()
    }

    #[test]
    fn zero_chroma_is_neutral_gray() {
        let cs = d65_lab();
        let mut dest = vec![0; 3];
        cs.get_rgb_item(&[50.0, 0.0, 0.0], 0, &mut dest, 0);

        assert!(dest[0].abs_diff(dest[1]) <= 1, "got {:?}", dest);
        assert!(dest[1].abs_diff(dest[2]) <= 1, "got {:?}", dest);
    }

    #[test]
    fn full_lightness_is_white() {
        let cs = d65_lab();
        let mut dest = vec![0; 3];
        cs.get_rgb_item(&[100.0, 0.0, 0.0], 0, &mut dest, 0);

        for c in dest {
            assert!(c >= 254, "got {}", c);
        }
    }

    #[test]
    fn buffer_samples_are_decoded_into_native_ranges() {
        let cs = d65_lab();

        // mid samples decode to L* = 50.2, a* = b* = 0.39 at 8 bits
        let mut from_buffer = vec![0; 3];
        cs.get_rgb_buffer(&[128u8, 128, 128], 0, 1, &mut from_buffer, 0, 8, 0);

        let mut from_item = vec![0; 3];
        cs.get_rgb_item(
            &[
                128.0 * 100.0 / 255.0,
                -100.0 + 128.0 * 200.0 / 255.0,
                -100.0 + 128.0 * 200.0 / 255.0,
            ],
            0,
            &mut from_item,
            0,
        );

        for (a, b) in from_buffer.iter().zip(&from_item) {
            assert!(a.abs_diff(*b) <= 1);
        }
    }

    #[test]
    fn out_of_range_chroma_is_clamped() {
        let narrow = Lab::new(
            Some(vec![0.9505, 1.0, 1.089]),
            None,
            Some(vec![-10.0, 10.0, -10.0, 10.0]),
        )
        .unwrap();

        let mut clamped = vec![0; 3];
        narrow.get_rgb_item(&[50.0, 90.0, -90.0], 0, &mut clamped, 0);

        let mut edge = vec![0; 3];
        narrow.get_rgb_item(&[50.0, 10.0, -10.0], 0, &mut edge, 0);

        assert_eq!(clamped, edge);
    }

    #[test]
    fn inverted_range_falls_back_to_defaults() {
        let inverted = Lab::new(
            Some(vec![0.9505, 1.0, 1.089]),
            None,
            Some(vec![100.0, -100.0, -100.0, 100.0]),
        )
        .unwrap();

        let mut a = vec![0; 3];
        let mut b = vec![0; 3];
        inverted.get_rgb_item(&[50.0, 30.0, -30.0], 0, &mut a, 0);
        d65_lab().get_rgb_item(&[50.0, 30.0, -30.0], 0, &mut b, 0);
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_invalid_white_point() {
        assert!(Lab::new(None, None, None).is_err());
        assert!(Lab::new(Some(vec![0.9, 0.5, 1.1]), None, None).is_err());
    }
}
