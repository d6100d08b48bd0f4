use std::{
    fmt,
    sync::Arc,
};

use smallvec::{smallvec, SmallVec};

use crate::function::TintFunction;

use super::{clamp_to_u8, ColorSpace, Sample};

/// Scratch storage for a pixel's worth of color components.
type Components = SmallVec<[f32; 4]>;

/// A Separation or DeviceN color space: named colorants converted through a
/// tint transformation function into an alternate color space.
#[derive(Clone)]
pub struct AlternateColorSpace {
    /// The number of colorants; 1 for Separation.
    num_comps: usize,
    base: Box<ColorSpace>,
    tint: Arc<dyn TintFunction>,
}

impl fmt::Debug for AlternateColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlternateColorSpace")
            .field("num_comps", &self.num_comps)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl AlternateColorSpace {
    pub(crate) fn new(num_comps: usize, base: ColorSpace, tint: Arc<dyn TintFunction>) -> Self {
        Self {
            num_comps,
            base: Box::new(base),
            tint,
        }
    }

    pub(crate) fn num_components(&self) -> usize {
        self.num_comps
    }

    pub(crate) fn get_rgb_item(
        &self,
        src: &[f32],
        src_offset: usize,
        dest: &mut [u8],
        dest_offset: usize,
    ) {
        let mut tinted: Components = smallvec![0.0; self.base.num_components()];
        self.tint
            .eval(&src[src_offset..src_offset + self.num_comps], &mut tinted);
        self.base.get_rgb_item(&tinted, 0, dest, dest_offset);
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
        let base_num_comps = self.base.num_components();
        let uses_zero_to_one_range = self.base.uses_zero_to_one_range();

        // When the staged bytes need no further scaling (passthrough base)
        // or no final buffer conversion (Lab base converts per item), stage
        // directly into `dest` and skip the finalizing pass.
        let is_passthrough =
            (self.base.is_passthrough(8) || !uses_zero_to_one_range) && alpha01 == 0;

        let mut staging = if is_passthrough {
            Vec::new()
        } else {
            vec![0; base_num_comps * count]
        };
        let base_buf: &mut [u8] = if is_passthrough { &mut *dest } else { &mut staging };
        let mut pos = if is_passthrough { dest_offset } else { 0 };

        let mut scaled: Components = smallvec![0.0; self.num_comps];
        let mut tinted: Components = smallvec![0.0; base_num_comps];

        let mut src_pos = src_offset;
        for _ in 0..count {
            for component in scaled.iter_mut() {
                *component = src[src_pos].value() as f32 * scale;
                src_pos += 1;
            }

            self.tint.eval(&scaled, &mut tinted);

            if uses_zero_to_one_range {
                for &t in tinted.iter() {
                    base_buf[pos] = clamp_to_u8(t * 255.0);
                    pos += 1;
                }
            } else {
                self.base.get_rgb_item(&tinted, 0, base_buf, pos);
                pos += base_num_comps;
            }
        }

        if !is_passthrough {
            self.base
                .get_rgb_buffer(&staging, 0, count, dest, dest_offset, 8, alpha01);
        }
    }

    pub(crate) fn get_output_length(&self, input_length: usize, alpha01: usize) -> usize {
        self.base.get_output_length(
            input_length * self.base.num_components() / self.num_comps,
            alpha01,
        )
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::{ColorSpace, ColorSpaceIr, TintFunction};

    /// Maps one tint value onto (t, 1 - t, t / 2).
    struct RampTint;

    impl TintFunction for RampTint {
        fn eval(&self, src: &[f32], dest: &mut [f32]) {
            dest[0] = src[0];
            dest[1] = 1.0 - src[0];
            dest[2] = src[0] / 2.0;
        }
    }

    /// Fixes lightness and maps the tint onto the a* axis.
    struct LabTint;

    impl TintFunction for LabTint {
        fn eval(&self, src: &[f32], dest: &mut [f32]) {
            dest[0] = 50.0;
            dest[1] = src[0] * 100.0 - 50.0;
            dest[2] = 0.0;
        }
    }

    fn separation_over_rgb() -> ColorSpace {
        ColorSpace::from_ir(ColorSpaceIr::Alternate {
            num_comps: 1,
            base: Box::new(ColorSpaceIr::DeviceRgb),
            tint: Arc::new(RampTint),
        })
        .unwrap()
    }

    #[test]
    fn pixels_compose_base_after_tint() {
        let cs = separation_over_rgb();
        let base = ColorSpace::device_rgb();

        let samples = [0u8, 128, 255];
        let mut dest = vec![0; 9];
        cs.get_rgb_buffer(&samples, 0, 3, &mut dest, 0, 8, 0);

        for (i, &s) in samples.iter().enumerate() {
            let mut tinted = [0.0f32; 3];
            RampTint.eval(&[s as f32 / 255.0], &mut tinted);

            let mut expected = vec![0; 3];
            base.get_rgb_item(&tinted, 0, &mut expected, 0);

            assert_eq!(&dest[i * 3..i * 3 + 3], expected, "pixel {}", i);
        }
    }

    #[test]
    fn staged_and_finalized_paths_agree() {
        // alpha01 = 1 forces the temporary staging buffer plus a finalizing
        // base conversion; the color bytes must match the direct path
        let cs = separation_over_rgb();
        let samples = [0u8, 128, 255];

        let mut direct = vec![0; 9];
        cs.get_rgb_buffer(&samples, 0, 3, &mut direct, 0, 8, 0);

        let mut padded = vec![0xaa; 12];
        cs.get_rgb_buffer(&samples, 0, 3, &mut padded, 0, 8, 1);

        for i in 0..3 {
            assert_eq!(&padded[i * 4..i * 4 + 3], &direct[i * 3..i * 3 + 3]);
            assert_eq!(padded[i * 4 + 3], 0xaa);
        }
    }

    #[test]
    fn lab_base_converts_per_item() {
        let cs = ColorSpace::from_ir(ColorSpaceIr::Alternate {
            num_comps: 1,
            base: Box::new(ColorSpaceIr::Lab {
                white_point: Some(vec![0.9505, 1.0, 1.089]),
                black_point: None,
                range: None,
            }),
            tint: Arc::new(LabTint),
        })
        .unwrap();

        let lab = ColorSpace::from_ir(ColorSpaceIr::Lab {
            white_point: Some(vec![0.9505, 1.0, 1.089]),
            black_point: None,
            range: None,
        })
        .unwrap();

        let mut dest = vec![0; 3];
        cs.get_rgb_buffer(&[255u8], 0, 1, &mut dest, 0, 8, 0);

        let mut expected = vec![0; 3];
        lab.get_rgb_item(&[50.0, 50.0, 0.0], 0, &mut expected, 0);

        assert_eq!(dest, expected);
    }

    #[test]
    fn item_path_composes_like_buffer_path() {
        let cs = separation_over_rgb();

        let mut via_item = vec![0; 3];
        cs.get_rgb_item(&[1.0], 0, &mut via_item, 0);

        let mut via_buffer = vec![0; 3];
        cs.get_rgb_buffer(&[255u8], 0, 1, &mut via_buffer, 0, 8, 0);

        assert_eq!(via_item, via_buffer);
    }

    #[test]
    fn output_length_scales_by_component_ratio() {
        let cs = separation_over_rgb();
        // one colorant expands to three base components per pixel
        assert_eq!(cs.get_output_length(2, 0), 6);
        assert_eq!(cs.get_output_length(2, 1), 8);
    }
}
