//! CalGray and CalRGB, the CIE-based color spaces calibrated by white point,
//! black point and gamma.

use crate::PdfResult;

use super::{clamp_to_u8, Sample};

const BRADFORD_SCALE_MATRIX: [f32; 9] = [
    0.8951, 0.2664, -0.1614, -0.7502, 1.7135, 0.0367, 0.0389, -0.0685, 1.0296,
];

const BRADFORD_SCALE_INVERSE_MATRIX: [f32; 9] = [
    0.9869929, -0.1470543, 0.1599627, 0.4323053, 0.5183603, 0.0492912, -0.0085287, 0.0400428,
    0.9684867,
];

const SRGB_D65_XYZ_TO_RGB_MATRIX: [f32; 9] = [
    3.2404542, -1.5371385, -0.4985314, -0.969266, 1.8760108, 0.0415560, 0.0556434, -0.2040259,
    1.0572252,
];

const FLAT_WHITEPOINT: [f32; 3] = [1.0, 1.0, 1.0];

const D65_WHITEPOINT: [f32; 3] = [0.95047, 1.0, 1.08883];

fn matrix_product(a: &[f32; 9], b: &[f32; 3]) -> [f32; 3] {
    [
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2],
        a[3] * b[0] + a[4] * b[1] + a[5] * b[2],
        a[6] * b[0] + a[7] * b[1] + a[8] * b[2],
    ]
}

fn convert_to_flat(source_white_point: &[f32; 3], lms: &[f32; 3]) -> [f32; 3] {
    [
        lms[0] / source_white_point[0],
        lms[1] / source_white_point[1],
        lms[2] / source_white_point[2],
    ]
}

fn convert_to_d65(source_white_point: &[f32; 3], lms: &[f32; 3]) -> [f32; 3] {
    [
        lms[0] * D65_WHITEPOINT[0] / source_white_point[0],
        lms[1] * D65_WHITEPOINT[1] / source_white_point[1],
        lms[2] * D65_WHITEPOINT[2] / source_white_point[2],
    ]
}

fn srgb_transfer_function(color: f32) -> f32 {
    if color <= 0.0031308 {
        (12.92 * color).clamp(0.0, 1.0)
    } else if color >= 0.99554525 {
        // (1 + 0.055) * x^(1/2.4) - 0.055 > 1 for x >= 0.99554525
        1.0
    } else {
        ((1.0 + 0.055) * color.powf(1.0 / 2.4) - 0.055).clamp(0.0, 1.0)
    }
}

fn decode_l_constant() -> f32 {
    ((8.0f32 + 16.0) / 116.0).powi(3) / 8.0
}

/// The L* decoding of CIE lightness, extended odd-symmetrically to negative
/// inputs as required by black-point compensation.
fn decode_l(l: f32) -> f32 {
    if l < 0.0 {
        -decode_l(-l)
    } else if l > 8.0 {
        ((l + 16.0) / 116.0).powi(3)
    } else {
        l * decode_l_constant()
    }
}

/// Scale-and-offset compensation of the source black point against a
/// destination black of zero.
fn compensate_black_point(source_black_point: &[f32; 3], xyz_flat: &[f32; 3]) -> [f32; 3] {
    if source_black_point == &[0.0, 0.0, 0.0] {
        return *xyz_flat;
    }

    let zero_decode_l = decode_l(0.0);

    let mut out = [0.0; 3];
    for i in 0..3 {
        let src = decode_l(source_black_point[i]);
        let scale = (1.0 - zero_decode_l) / (1.0 - src);
        let offset = 1.0 - scale;
        out[i] = xyz_flat[i] * scale + offset;
    }

    out
}

/// Bradford adaptation from the source white point to the flat
/// (equal-energy) white.
fn normalize_white_point_to_flat(source_white_point: &[f32; 3], xyz: &[f32; 3]) -> [f32; 3] {
    if source_white_point[0] == 1.0 && source_white_point[2] == 1.0 {
        return *xyz;
    }

    let lms = matrix_product(&BRADFORD_SCALE_MATRIX, xyz);
    let lms_flat = convert_to_flat(source_white_point, &lms);
    matrix_product(&BRADFORD_SCALE_INVERSE_MATRIX, &lms_flat)
}

/// Bradford adaptation from the source white point to D65.
fn normalize_white_point_to_d65(source_white_point: &[f32; 3], xyz: &[f32; 3]) -> [f32; 3] {
    let lms = matrix_product(&BRADFORD_SCALE_MATRIX, xyz);
    let lms_d65 = convert_to_d65(source_white_point, &lms);
    matrix_product(&BRADFORD_SCALE_INVERSE_MATRIX, &lms_d65)
}

#[derive(Debug, Clone)]
pub struct CalGray {
    white_point: [f32; 3],
    gamma: f32,
}

impl CalGray {
    pub(crate) fn new(
        white_point: Option<Vec<f32>>,
        black_point: Option<Vec<f32>>,
        gamma: Option<f32>,
    ) -> PdfResult<Self> {
        let Some(white_point) = white_point else {
            anyhow::bail!("WhitePoint missing - required for color space CalGray");
        };

        if white_point.len() != 3 {
            anyhow::bail!("Invalid WhitePoint components for CalGray, no fallback available");
        }

        let white_point = [white_point[0], white_point[1], white_point[2]];
        let mut black_point = match black_point {
            Some(bp) if bp.len() == 3 => [bp[0], bp[1], bp[2]],
            _ => [0.0; 3],
        };
        let mut gamma = gamma.unwrap_or(1.0);

        let [xw, yw, zw] = white_point;
        if xw < 0.0 || zw < 0.0 || yw != 1.0 {
            anyhow::bail!("Invalid WhitePoint components for CalGray, no fallback available");
        }

        if black_point.iter().any(|&c| c < 0.0) {
            log::warn!("Invalid BlackPoint for CalGray, falling back to default.");
            black_point = [0.0; 3];
        }

        if black_point != [0.0; 3] {
            log::info!(
                "CalGray, BlackPoint: XB: {}, YB: {}, ZB: {}, only default values are supported.",
                black_point[0],
                black_point[1],
                black_point[2]
            );
        }

        if gamma < 1.0 {
            log::warn!("Invalid Gamma: {} for CalGray, falling back to default.", gamma);
            gamma = 1.0;
        }

        Ok(Self { white_point, gamma })
    }

    fn convert_to_rgb(&self, a: f32, dest: &mut [u8], dest_offset: usize) {
        // A represents a gray component of a calibrated gray space expressed
        // as the decoded L* of CIE 1976 (L*, a*, b*), companded for sRGB
        let ag = a.powf(self.gamma);
        let l = self.white_point[1] * ag;
        let val = clamp_to_u8((295.8 * l.powf(1.0 / 3.0) - 40.8).max(0.0));

        dest[dest_offset] = val;
        dest[dest_offset + 1] = val;
        dest[dest_offset + 2] = val;
    }

    pub(crate) fn get_rgb_item(
        &self,
        src: &[f32],
        src_offset: usize,
        dest: &mut [u8],
        dest_offset: usize,
    ) {
        self.convert_to_rgb(src[src_offset], dest, dest_offset);
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
        let scale = 1.0 / ((1u32 << bits) - 1) as f32;
        let mut j = src_offset;
        let mut q = dest_offset;
        for _ in 0..count {
            self.convert_to_rgb(scale * src[j].value() as f32, dest, q);
            j += 1;
            q += 3 + alpha01;
        }
    }
}

#[derive(Debug, Clone)]
pub struct CalRgb {
    white_point: [f32; 3],
    black_point: [f32; 3],
    gamma: [f32; 3],
    /// Column-major map from gamma-encoded components to CIE XYZ.
    matrix: [f32; 9],
}

impl CalRgb {
    pub(crate) fn new(
        white_point: Option<Vec<f32>>,
        black_point: Option<Vec<f32>>,
        gamma: Option<Vec<f32>>,
        matrix: Option<Vec<f32>>,
    ) -> PdfResult<Self> {
        let Some(white_point) = white_point else {
            anyhow::bail!("WhitePoint missing - required for color space CalRGB");
        };

        if white_point.len() != 3 {
            anyhow::bail!("Invalid WhitePoint components for CalRGB, no fallback available");
        }

        let white_point = [white_point[0], white_point[1], white_point[2]];
        let mut black_point = match black_point {
            Some(bp) if bp.len() == 3 => [bp[0], bp[1], bp[2]],
            _ => [0.0; 3],
        };
        let mut gamma = match gamma {
            Some(g) if g.len() == 3 => [g[0], g[1], g[2]],
            _ => [1.0; 3],
        };
        let matrix = match matrix {
            Some(m) if m.len() == 9 => {
                let mut out = [0.0; 9];
                out.copy_from_slice(&m);
                out
            }
            _ => [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        };

        let [xw, yw, zw] = white_point;
        if xw < 0.0 || zw < 0.0 || yw != 1.0 {
            anyhow::bail!("Invalid WhitePoint components for CalRGB, no fallback available");
        }

        if black_point.iter().any(|&c| c < 0.0) {
            log::warn!(
                "Invalid BlackPoint for CalRGB [{}, {}, {}], falling back to default.",
                black_point[0],
                black_point[1],
                black_point[2]
            );
            black_point = [0.0; 3];
        }

        if gamma.iter().any(|&g| g < 0.0) {
            log::warn!(
                "Invalid Gamma [{}, {}, {}] for CalRGB, falling back to default.",
                gamma[0],
                gamma[1],
                gamma[2]
            );
            gamma = [1.0; 3];
        }

        Ok(Self {
            white_point,
            black_point,
            gamma,
            matrix,
        })
    }

    fn convert_to_rgb(
        &self,
        src: &[f32],
        src_offset: usize,
        dest: &mut [u8],
        dest_offset: usize,
        scale: f32,
    ) {
        // A, B and C represent red, green and blue components of a calibrated
        // RGB space, mapped to CIE XYZ and from there to companded sRGB
        let a = (src[src_offset] * scale).clamp(0.0, 1.0);
        let b = (src[src_offset + 1] * scale).clamp(0.0, 1.0);
        let c = (src[src_offset + 2] * scale).clamp(0.0, 1.0);

        let [gr, gg, gb] = self.gamma;
        let agr = if a == 1.0 { 1.0 } else { a.powf(gr) };
        let bgg = if b == 1.0 { 1.0 } else { b.powf(gg) };
        let cgb = if c == 1.0 { 1.0 } else { c.powf(gb) };

        let m = &self.matrix;
        let xyz = [
            m[0] * agr + m[3] * bgg + m[6] * cgb,
            m[1] * agr + m[4] * bgg + m[7] * cgb,
            m[2] * agr + m[5] * bgg + m[8] * cgb,
        ];

        let xyz_flat = normalize_white_point_to_flat(&self.white_point, &xyz);
        let xyz_black = compensate_black_point(&self.black_point, &xyz_flat);
        let xyz_d65 = normalize_white_point_to_d65(&FLAT_WHITEPOINT, &xyz_black);
        let srgb = matrix_product(&SRGB_D65_XYZ_TO_RGB_MATRIX, &xyz_d65);

        dest[dest_offset] = clamp_to_u8(srgb_transfer_function(srgb[0]) * 255.0);
        dest[dest_offset + 1] = clamp_to_u8(srgb_transfer_function(srgb[1]) * 255.0);
        dest[dest_offset + 2] = clamp_to_u8(srgb_transfer_function(srgb[2]) * 255.0);
    }

    pub(crate) fn get_rgb_item(
        &self,
        src: &[f32],
        src_offset: usize,
        dest: &mut [u8],
        dest_offset: usize,
    ) {
        self.convert_to_rgb(src, src_offset, dest, dest_offset, 1.0);
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
        let scale = 1.0 / ((1u32 << bits) - 1) as f32;
        let mut scaled = [0.0f32; 3];
        let mut j = src_offset;
        let mut q = dest_offset;
        for _ in 0..count {
            scaled[0] = src[j].value() as f32;
            scaled[1] = src[j + 1].value() as f32;
            scaled[2] = src[j + 2].value() as f32;
            self.convert_to_rgb(&scaled, 0, dest, q, scale);
            j += 3;
            q += 3 + alpha01;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn cal_gray(gamma: f32) -> CalGray {
        CalGray::new(Some(vec![0.9505, 1.0, 1.089]), None, Some(gamma)).unwrap()
    }

    fn d65_cal_rgb() -> CalRgb {
        CalRgb::new(
            Some(vec![0.95047, 1.0, 1.08883]),
            None,
            None,
            Some(vec![
                0.4124, 0.2126, 0.0193, 0.3576, 0.7152, 0.1192, 0.1805, 0.0722, 0.9505,
            ]),
        )
        .unwrap()
    }

    #[test]
    fn cal_gray_mid_value() {
        let cs = cal_gray(2.2);
        let mut dest = vec![0; 3];
        cs.get_rgb_item(&[0.5], 0, &mut dest, 0);

        // 295.8 * (0.5^2.2)^(1/3) - 40.8
        assert!(dest[0].abs_diff(137) <= 1, "got {:?}", dest);
        assert_eq!(dest[0], dest[1]);
        assert_eq!(dest[1], dest[2]);
    }

    #[test]
    fn cal_gray_endpoints() {
        let cs = cal_gray(1.0);
        let mut dest = vec![0; 6];
        cs.get_rgb_buffer(&[0u8, 255], 0, 2, &mut dest, 0, 8, 0);
        assert_eq!(&dest[..3], &[0, 0, 0]);
        assert_eq!(&dest[3..], &[255, 255, 255]);
    }

    #[test]
    fn cal_gray_rejects_invalid_white_point() {
        assert!(CalGray::new(None, None, None).is_err());
        assert!(CalGray::new(Some(vec![0.9, 2.0, 1.1]), None, None).is_err());
        assert!(CalGray::new(Some(vec![-0.1, 1.0, 1.1]), None, None).is_err());
    }

    #[test]
    fn cal_gray_resets_gamma_below_one() {
        let lenient = CalGray::new(Some(vec![0.9505, 1.0, 1.089]), None, Some(0.5)).unwrap();
        let default = cal_gray(1.0);

        let mut a = vec![0; 3];
        let mut b = vec![0; 3];
        lenient.get_rgb_item(&[0.5], 0, &mut a, 0);
        default.get_rgb_item(&[0.5], 0, &mut b, 0);
        assert_eq!(a, b);
    }

    #[test]
    fn cal_rgb_white_maps_to_white() {
        let cs = d65_cal_rgb();
        let mut dest = vec![0; 3];
        cs.get_rgb_item(&[1.0, 1.0, 1.0], 0, &mut dest, 0);
        assert_eq!(dest, [255, 255, 255]);
    }

    #[test]
    fn cal_rgb_black_maps_to_black() {
        let cs = d65_cal_rgb();
        let mut dest = vec![0xff; 3];
        cs.get_rgb_item(&[0.0, 0.0, 0.0], 0, &mut dest, 0);
        assert_eq!(dest, [0, 0, 0]);
    }

    #[test]
    fn cal_rgb_buffer_path_matches_item_path() {
        let cs = d65_cal_rgb();
        let samples = [64u8, 128, 192];

        let mut from_buffer = vec![0; 3];
        cs.get_rgb_buffer(&samples, 0, 1, &mut from_buffer, 0, 8, 0);

        let floats: Vec<f32> = samples.iter().map(|&s| s as f32 / 255.0).collect();
        let mut from_item = vec![0; 3];
        cs.get_rgb_item(&floats, 0, &mut from_item, 0);

        for (a, b) in from_buffer.iter().zip(&from_item) {
            assert!(a.abs_diff(*b) <= 1);
        }
    }

    #[test]
    fn cal_rgb_resets_negative_gamma() {
        let cs = CalRgb::new(
            Some(vec![0.95047, 1.0, 1.08883]),
            None,
            Some(vec![-1.0, 1.0, 1.0]),
            None,
        )
        .unwrap();

        let default = CalRgb::new(Some(vec![0.95047, 1.0, 1.08883]), None, None, None).unwrap();

        let mut a = vec![0; 3];
        let mut b = vec![0; 3];
        cs.get_rgb_item(&[0.25, 0.5, 0.75], 0, &mut a, 0);
        default.get_rgb_item(&[0.25, 0.5, 0.75], 0, &mut b, 0);
        assert_eq!(a, b);
    }

    #[test]
    fn cal_rgb_rejects_invalid_white_point() {
        assert!(CalRgb::new(None, None, None, None).is_err());
        assert!(CalRgb::new(Some(vec![0.9, 0.9, 1.1]), None, None, None).is_err());
    }

    #[test]
    fn decode_l_is_odd_symmetric() {
        for l in [0.5, 4.0, 9.0, 50.0] {
            assert_eq!(decode_l(-l), -decode_l(l));
        }
    }

    #[test]
    fn black_point_compensation_is_identity_for_zero_black() {
        let xyz = [0.3, 0.5, 0.7];
        assert_eq!(compensate_black_point(&[0.0; 3], &xyz), xyz);
    }
}
