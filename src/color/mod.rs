mod calibrated;
mod device;
mod device_n;
mod indexed;
mod ir;
mod lab;
mod pattern;

use once_cell::sync::Lazy;

use crate::{
    function::FunctionFactory,
    objects::{Dictionary, Object},
    resolve::Resolve,
    PdfResult,
};

use self::{
    calibrated::{CalGray, CalRgb},
    device::{DeviceCmyk, DeviceGray, DeviceRgb},
    device_n::AlternateColorSpace,
    indexed::IndexedColorSpace,
    lab::Lab,
    pattern::PatternColorSpace,
};

pub use ir::ColorSpaceIr;

/// An unpacked integer raster sample, at most 16 bits wide.
pub trait Sample: Copy {
    fn value(self) -> u32;
}

impl Sample for u8 {
    #[inline]
    fn value(self) -> u32 {
        u32::from(self)
    }
}

impl Sample for u16 {
    #[inline]
    fn value(self) -> u32 {
        u32::from(self)
    }
}

/// Round-half-up conversion to a clamped output byte.
#[inline]
pub(crate) fn clamp_to_u8(val: f32) -> u8 {
    // the float-to-int cast saturates at both ends
    (val + 0.5) as u8
}

/// A PDF color space, converting component samples to 8-bit RGB.
#[derive(Debug, Clone)]
pub enum ColorSpace {
    DeviceGray(DeviceGray),
    DeviceRgb(DeviceRgb),
    DeviceCmyk(DeviceCmyk),
    CalGray(CalGray),
    CalRgb(CalRgb),
    Lab(Lab),
    Indexed(IndexedColorSpace),
    Alternate(AlternateColorSpace),
    Pattern(PatternColorSpace),
}

static DEVICE_GRAY: Lazy<ColorSpace> = Lazy::new(|| ColorSpace::DeviceGray(DeviceGray));
static DEVICE_RGB: Lazy<ColorSpace> = Lazy::new(|| ColorSpace::DeviceRgb(DeviceRgb));
static DEVICE_CMYK: Lazy<ColorSpace> = Lazy::new(|| ColorSpace::DeviceCmyk(DeviceCmyk));

impl ColorSpace {
    /// Parse a color-space descriptor into a concrete instance.
    pub fn parse(
        cs: Object,
        resolver: &mut dyn Resolve,
        resources: Option<&Dictionary>,
        function_factory: &mut dyn FunctionFactory,
    ) -> PdfResult<Self> {
        Self::from_ir(Self::parse_to_ir(cs, resolver, resources, function_factory)?)
    }

    /// Parse a color-space descriptor into its intermediate representation.
    ///
    /// The IR owns everything it needs, so it can be cached by reference key
    /// and materialized later without the object model.
    pub fn parse_to_ir(
        cs: Object,
        resolver: &mut dyn Resolve,
        resources: Option<&Dictionary>,
        function_factory: &mut dyn FunctionFactory,
    ) -> PdfResult<ColorSpaceIr> {
        ir::parse_to_ir(cs, resolver, resources, function_factory)
    }

    /// Materialize a parsed intermediate representation.
    pub fn from_ir(ir: ColorSpaceIr) -> PdfResult<Self> {
        ir::from_ir(ir)
    }

    /// The process-wide DeviceGray instance.
    pub fn device_gray() -> &'static ColorSpace {
        &DEVICE_GRAY
    }

    /// The process-wide DeviceRGB instance.
    pub fn device_rgb() -> &'static ColorSpace {
        &DEVICE_RGB
    }

    /// The process-wide DeviceCMYK instance.
    pub fn device_cmyk() -> &'static ColorSpace {
        &DEVICE_CMYK
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray(..) => "DeviceGray",
            ColorSpace::DeviceRgb(..) => "DeviceRGB",
            ColorSpace::DeviceCmyk(..) => "DeviceCMYK",
            ColorSpace::CalGray(..) => "CalGray",
            ColorSpace::CalRgb(..) => "CalRGB",
            ColorSpace::Lab(..) => "Lab",
            ColorSpace::Indexed(..) => "Indexed",
            ColorSpace::Alternate(..) => "Alternate",
            ColorSpace::Pattern(..) => "Pattern",
        }
    }

    /// Components per source pixel.
    ///
    /// Panics for Pattern, which has no pixel representation.
    pub fn num_components(&self) -> usize {
        match self {
            ColorSpace::DeviceGray(..) | ColorSpace::CalGray(..) | ColorSpace::Indexed(..) => 1,
            ColorSpace::DeviceRgb(..) | ColorSpace::CalRgb(..) | ColorSpace::Lab(..) => 3,
            ColorSpace::DeviceCmyk(..) => 4,
            ColorSpace::Alternate(cs) => cs.num_components(),
            ColorSpace::Pattern(..) => panic!("pattern color spaces have no pixel components"),
        }
    }

    /// Convert a single pixel of float components into `dest[dest_offset..]`.
    ///
    /// Components are nominally in `[0, 1]`; Lab takes its native ranges.
    pub fn get_rgb_item(&self, src: &[f32], src_offset: usize, dest: &mut [u8], dest_offset: usize) {
        match self {
            ColorSpace::DeviceGray(cs) => cs.get_rgb_item(src, src_offset, dest, dest_offset),
            ColorSpace::DeviceRgb(cs) => cs.get_rgb_item(src, src_offset, dest, dest_offset),
            ColorSpace::DeviceCmyk(cs) => cs.get_rgb_item(src, src_offset, dest, dest_offset),
            ColorSpace::CalGray(cs) => cs.get_rgb_item(src, src_offset, dest, dest_offset),
            ColorSpace::CalRgb(cs) => cs.get_rgb_item(src, src_offset, dest, dest_offset),
            ColorSpace::Lab(cs) => cs.get_rgb_item(src, src_offset, dest, dest_offset),
            ColorSpace::Indexed(cs) => cs.get_rgb_item(src, src_offset, dest, dest_offset),
            ColorSpace::Alternate(cs) => cs.get_rgb_item(src, src_offset, dest, dest_offset),
            ColorSpace::Pattern(..) => panic!("cannot convert pixels in a pattern color space"),
        }
    }

    /// Convert a single pixel into a standalone RGB triple.
    pub fn get_rgb(&self, src: &[f32], src_offset: usize) -> [u8; 3] {
        let mut rgb = [0; 3];
        self.get_rgb_item(src, src_offset, &mut rgb, 0);
        rgb
    }

    /// Convert `count` pixels of integer samples in `[0, 2^bits)`.
    ///
    /// Each output pixel occupies `3 + alpha01` bytes of `dest`; the trailing
    /// alpha byte, if any, is left untouched.
    pub fn get_rgb_buffer<S: Sample>(
        &self,
        src: &[S],
        src_offset: usize,
        count: usize,
        dest: &mut [u8],
        dest_offset: usize,
        bits: u8,
        alpha01: usize,
    ) {
        match self {
            ColorSpace::DeviceGray(cs) => {
                cs.get_rgb_buffer(src, src_offset, count, dest, dest_offset, bits, alpha01)
            }
            ColorSpace::DeviceRgb(cs) => {
                cs.get_rgb_buffer(src, src_offset, count, dest, dest_offset, bits, alpha01)
            }
            ColorSpace::DeviceCmyk(cs) => {
                cs.get_rgb_buffer(src, src_offset, count, dest, dest_offset, bits, alpha01)
            }
            ColorSpace::CalGray(cs) => {
                cs.get_rgb_buffer(src, src_offset, count, dest, dest_offset, bits, alpha01)
            }
            ColorSpace::CalRgb(cs) => {
                cs.get_rgb_buffer(src, src_offset, count, dest, dest_offset, bits, alpha01)
            }
            ColorSpace::Lab(cs) => {
                cs.get_rgb_buffer(src, src_offset, count, dest, dest_offset, bits, alpha01)
            }
            ColorSpace::Indexed(cs) => {
                cs.get_rgb_buffer(src, src_offset, count, dest, dest_offset, bits, alpha01)
            }
            ColorSpace::Alternate(cs) => {
                cs.get_rgb_buffer(src, src_offset, count, dest, dest_offset, bits, alpha01)
            }
            ColorSpace::Pattern(..) => panic!("cannot convert pixels in a pattern color space"),
        }
    }

    /// Byte length of the `dest` region [`Self::get_rgb_buffer`] fills for
    /// `input_length` input samples.
    pub fn get_output_length(&self, input_length: usize, alpha01: usize) -> usize {
        match self {
            ColorSpace::DeviceGray(..) | ColorSpace::CalGray(..) => {
                input_length * (3 + alpha01)
            }
            ColorSpace::DeviceRgb(..) | ColorSpace::CalRgb(..) | ColorSpace::Lab(..) => {
                input_length * (3 + alpha01) / 3
            }
            ColorSpace::DeviceCmyk(..) => input_length * (3 + alpha01) / 4,
            ColorSpace::Indexed(cs) => cs.get_output_length(input_length, alpha01),
            ColorSpace::Alternate(cs) => cs.get_output_length(input_length, alpha01),
            ColorSpace::Pattern(..) => panic!("pattern color spaces have no output length"),
        }
    }

    /// `true` iff raw samples of the given bit depth already are the desired
    /// RGB bytes.
    pub fn is_passthrough(&self, bits: u8) -> bool {
        matches!(self, ColorSpace::DeviceRgb(..)) && bits == 8
    }

    /// `true` unless the components live outside `[0, 1]` (Lab).
    pub fn uses_zero_to_one_range(&self) -> bool {
        !matches!(self, ColorSpace::Lab(..))
    }

    /// `true` if the PDF decode map is the identity for this color space and
    /// bit depth.
    pub fn is_default_decode(&self, decode_map: Option<&[f32]>, bpc: u8) -> bool {
        match self {
            ColorSpace::Indexed(cs) => cs.is_default_decode(decode_map, bpc),
            // the Lab sample remap performs its own decoding
            ColorSpace::Lab(..) => true,
            // not a valid image color space
            ColorSpace::Pattern(..) => true,
            _ => is_default_decode(decode_map, self.num_components()),
        }
    }

    /// Convert a raster of unpacked samples into packed RGB(A) rows in
    /// `dest`, resizing to `width` x `height` with nearest-neighbor sampling
    /// when the source dimensions differ.
    pub fn fill_rgb<S: Sample>(
        &self,
        dest: &mut [u8],
        original_width: usize,
        original_height: usize,
        width: usize,
        height: usize,
        actual_height: usize,
        bpc: u8,
        comps: &[S],
        alpha01: usize,
    ) {
        let count = original_width * original_height;
        let num_component_colors = 1usize << bpc;
        let needs_resizing = original_height != height || original_width != width;

        let mut rgb_buf: Option<Vec<u8>> = None;

        if self.is_passthrough(bpc) {
            rgb_buf = Some(comps.iter().map(|c| c.value() as u8).collect());
        } else if self.num_components() == 1
            && count > num_component_colors
            && !matches!(self, ColorSpace::DeviceGray(..) | ColorSpace::DeviceRgb(..))
        {
            // Optimization: a one-component raster can take at most 2^bpc
            // distinct values, so convert each value once up front and serve
            // the pixels from the resulting color map.
            let all_colors: Vec<u16> = (0..num_component_colors).map(|i| i as u16).collect();
            let mut color_map = vec![0; num_component_colors * 3];
            self.get_rgb_buffer(&all_colors, 0, num_component_colors, &mut color_map, 0, bpc, 0);

            if !needs_resizing {
                let mut dest_pos = 0;
                for comp in &comps[..count] {
                    let key = (comp.value() as usize).min(num_component_colors - 1) * 3;
                    dest[dest_pos..dest_pos + 3].copy_from_slice(&color_map[key..key + 3]);
                    dest_pos += 3 + alpha01;
                }
            } else {
                let mut buf = vec![0; count * 3];
                let mut rgb_pos = 0;
                for comp in &comps[..count] {
                    let key = (comp.value() as usize).min(num_component_colors - 1) * 3;
                    buf[rgb_pos..rgb_pos + 3].copy_from_slice(&color_map[key..key + 3]);
                    rgb_pos += 3;
                }
                rgb_buf = Some(buf);
            }
        } else if !needs_resizing {
            debug_assert!(dest.len() >= self.get_output_length(width * actual_height * self.num_components(), alpha01));
            self.get_rgb_buffer(comps, 0, width * actual_height, dest, 0, bpc, alpha01);
            return;
        } else {
            let mut buf = vec![0; count * 3];
            self.get_rgb_buffer(comps, 0, count, &mut buf, 0, bpc, 0);
            rgb_buf = Some(buf);
        }

        if let Some(rgb_buf) = rgb_buf {
            if needs_resizing {
                resize_rgb_image(
                    &rgb_buf,
                    dest,
                    original_width,
                    original_height,
                    width,
                    height,
                    alpha01,
                );
            } else {
                let mut dest_pos = 0;
                let mut rgb_pos = 0;
                for _ in 0..width * actual_height {
                    dest[dest_pos..dest_pos + 3].copy_from_slice(&rgb_buf[rgb_pos..rgb_pos + 3]);
                    dest_pos += 3 + alpha01;
                    rgb_pos += 3;
                }
            }
        }
    }
}

/// `true` if the decode map is the identity for a color space with
/// `num_comps` components.
pub fn is_default_decode(decode_map: Option<&[f32]>, num_comps: usize) -> bool {
    let Some(decode) = decode_map else {
        return true;
    };

    if decode.len() != 2 * num_comps {
        log::warn!("The decode map is not the correct length");
        return true;
    }

    for pair in decode.chunks_exact(2) {
        if pair[0] != 0.0 || pair[1] != 1.0 {
            return false;
        }
    }

    true
}

/// Nearest-neighbor resize of a packed RGB buffer, expanding each output
/// pixel by `alpha01` skipped bytes.
pub(crate) fn resize_rgb_image(
    src: &[u8],
    dest: &mut [u8],
    w1: usize,
    h1: usize,
    w2: usize,
    h2: usize,
    alpha01: usize,
) {
    const COMPONENTS: usize = 3;

    let alpha01 = if alpha01 != 1 { 0 } else { 1 };
    let w1_scanline = w1 * COMPONENTS;

    let x_scaled: Vec<usize> = (0..w2).map(|j| j * w1 / w2 * COMPONENTS).collect();

    let mut new_index = 0;
    for i in 0..h2 {
        let py = i * h1 / h2 * w1_scanline;
        for &x in &x_scaled {
            let old_index = py + x;
            dest[new_index] = src[old_index];
            dest[new_index + 1] = src[old_index + 1];
            dest[new_index + 2] = src[old_index + 2];
            new_index += COMPONENTS + alpha01;
        }
    }
}
