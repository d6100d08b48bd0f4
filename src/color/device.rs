use super::{clamp_to_u8, Sample};

/// Grayscale, one component replicated into R, G and B.
#[derive(Debug, Clone, Copy)]
pub struct DeviceGray;

impl DeviceGray {
    pub(crate) fn get_rgb_item(
        &self,
        src: &[f32],
        src_offset: usize,
        dest: &mut [u8],
        dest_offset: usize,
    ) {
        let c = clamp_to_u8(src[src_offset] * 255.0);
        dest[dest_offset] = c;
        dest[dest_offset + 1] = c;
        dest[dest_offset + 2] = c;
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
        let scale = 255.0 / ((1u32 << bits) - 1) as f32;
        let mut j = src_offset;
        let mut q = dest_offset;
        for _ in 0..count {
            let c = clamp_to_u8(scale * src[j].value() as f32);
            j += 1;
            dest[q] = c;
            dest[q + 1] = c;
            dest[q + 2] = c;
            q += 3 + alpha01;
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeviceRgb;

impl DeviceRgb {
    pub(crate) fn get_rgb_item(
        &self,
        src: &[f32],
        src_offset: usize,
        dest: &mut [u8],
        dest_offset: usize,
    ) {
        dest[dest_offset] = clamp_to_u8(src[src_offset] * 255.0);
        dest[dest_offset + 1] = clamp_to_u8(src[src_offset + 1] * 255.0);
        dest[dest_offset + 2] = clamp_to_u8(src[src_offset + 2] * 255.0);
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
        if bits == 8 && alpha01 == 0 {
            // 8-bit RGB samples already are the output bytes
            for i in 0..count * 3 {
                dest[dest_offset + i] = src[src_offset + i].value() as u8;
            }
            return;
        }

        let scale = 255.0 / ((1u32 << bits) - 1) as f32;
        let mut j = src_offset;
        let mut q = dest_offset;
        for _ in 0..count {
            dest[q] = clamp_to_u8(scale * src[j].value() as f32);
            dest[q + 1] = clamp_to_u8(scale * src[j + 1].value() as f32);
            dest[q + 2] = clamp_to_u8(scale * src[j + 2].value() as f32);
            j += 3;
            q += 3 + alpha01;
        }
    }
}

/// Four-component ink model, converted through a bivariate polynomial fit to
/// the SWOP CMYK-to-sRGB reference table.
#[derive(Debug, Clone, Copy)]
pub struct DeviceCmyk;

impl DeviceCmyk {
    #[rustfmt::skip]
    fn convert_to_rgb(c: f32, m: f32, y: f32, k: f32, dest: &mut [u8], dest_offset: usize) {
        let r = 255.0
            + c * (-4.387332384609988 * c + 54.48615194189176 * m + 18.82290502165302 * y
                + 212.25662451639585 * k - 285.2331026137004)
            + m * (1.7149763477362134 * m - 5.6096736904047315 * y - 17.873870861415444 * k
                - 5.497006427196366)
            + y * (-2.5217340131683033 * y - 21.248923337353073 * k + 17.5119270841813)
            + k * (-21.86122147463605 * k - 189.48180835922747);

        let g = 255.0
            + c * (8.841041422036149 * c + 60.118027045597366 * m + 6.871425592049007 * y
                + 31.159100130055922 * k - 79.2970844816548)
            + m * (-15.310361306967817 * m + 17.575251261109482 * y + 131.35250912493976 * k
                - 190.9453302588951)
            + y * (4.444339102852739 * y + 9.8632861493405 * k - 24.86741582555878)
            + k * (-20.737325471181034 * k - 187.80453709719578);

        let b = 255.0
            + c * (0.8842522430003296 * c + 8.078677503112928 * m + 30.89978309703729 * y
                - 0.23883238689178934 * k - 14.183576799673286)
            + m * (10.49593273432072 * m + 63.02378494754052 * y + 50.606957656360734 * k
                - 112.23884253719248)
            + y * (0.03296041114873217 * y + 115.60384449646641 * k - 193.58209356861505)
            + k * (-22.33816807309886 * k - 180.12613974708367);

        dest[dest_offset] = clamp_to_u8(r);
        dest[dest_offset + 1] = clamp_to_u8(g);
        dest[dest_offset + 2] = clamp_to_u8(b);
    }

    pub(crate) fn get_rgb_item(
        &self,
        src: &[f32],
        src_offset: usize,
        dest: &mut [u8],
        dest_offset: usize,
    ) {
        Self::convert_to_rgb(
            src[src_offset],
            src[src_offset + 1],
            src[src_offset + 2],
            src[src_offset + 3],
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
        let scale = 1.0 / ((1u32 << bits) - 1) as f32;
        let mut j = src_offset;
        let mut q = dest_offset;
        for _ in 0..count {
            Self::convert_to_rgb(
                scale * src[j].value() as f32,
                scale * src[j + 1].value() as f32,
                scale * src[j + 2].value() as f32,
                scale * src[j + 3].value() as f32,
                dest,
                q,
            );
            j += 4;
            q += 3 + alpha01;
        }
    }
}

#[cfg(test)]
mod test {
    use crate::ColorSpace;

    #[test]
    fn gray_samples_replicate_into_rgb() {
        let cs = ColorSpace::device_gray();
        let mut dest = vec![0; 9];
        cs.get_rgb_buffer(&[0u8, 127, 255], 0, 3, &mut dest, 0, 8, 0);
        assert_eq!(dest, [0, 0, 0, 127, 127, 127, 255, 255, 255]);
    }

    #[test]
    fn gray_scales_low_bit_depths() {
        let cs = ColorSpace::device_gray();
        let mut dest = vec![0; 6];
        cs.get_rgb_buffer(&[0u8, 1], 0, 2, &mut dest, 0, 1, 0);
        assert_eq!(dest, [0, 0, 0, 255, 255, 255]);
    }

    #[test]
    fn rgb_at_eight_bits_is_passthrough() {
        let cs = ColorSpace::device_rgb();
        assert!(cs.is_passthrough(8));
        assert!(!cs.is_passthrough(4));
        assert!(!ColorSpace::device_gray().is_passthrough(8));

        let src = [10u8, 20, 30, 40, 50, 60];
        let mut dest = vec![0; 6];
        cs.get_rgb_buffer(&src, 0, 2, &mut dest, 0, 8, 0);
        assert_eq!(dest, src);
    }

    #[test]
    fn rgb_skips_alpha_bytes() {
        let cs = ColorSpace::device_rgb();
        let src = [10u8, 20, 30, 40, 50, 60];
        let mut dest = vec![0xff; 8];
        cs.get_rgb_buffer(&src, 0, 2, &mut dest, 0, 8, 1);
        assert_eq!(dest, [10, 20, 30, 0xff, 40, 50, 60, 0xff]);
    }

    #[test]
    fn cmyk_no_ink_is_white() {
        let cs = ColorSpace::device_cmyk();
        assert_eq!(cs.get_rgb(&[0.0, 0.0, 0.0, 0.0], 0), [255, 255, 255]);
    }

    #[test]
    fn cmyk_full_ink_is_near_black() {
        let cs = ColorSpace::device_cmyk();
        let mut dest = vec![0xff; 3];
        cs.get_rgb_buffer(&[255u8, 255, 255, 255], 0, 1, &mut dest, 0, 8, 0);
        assert!(dest.iter().all(|&c| c < 16), "got {:?}", dest);
    }

    #[test]
    fn cmyk_item_and_buffer_paths_agree() {
        let cs = ColorSpace::device_cmyk();
        let samples = [51u8, 102, 153, 204];
        let floats: Vec<f32> = samples.iter().map(|&s| s as f32 / 255.0).collect();

        let mut from_buffer = vec![0; 3];
        cs.get_rgb_buffer(&samples, 0, 1, &mut from_buffer, 0, 8, 0);

        // the buffer path scales by 1/255 up front, so allow one count of
        // rounding skew against the float path
        for (a, b) in from_buffer.iter().zip(cs.get_rgb(&floats, 0)) {
            assert!(a.abs_diff(b) <= 1, "{:?} vs {:?}", from_buffer, b);
        }
    }
}
