use std::{fmt, sync::Arc};

use crate::{
    error::ParseError,
    function::{FunctionFactory, TintFunction},
    objects::{assert_len, Dictionary, Object},
    resolve::Resolve,
    PdfResult,
};

use super::{
    calibrated::{CalGray, CalRgb},
    device::{DeviceCmyk, DeviceGray, DeviceRgb},
    device_n::AlternateColorSpace,
    indexed::IndexedColorSpace,
    lab::Lab,
    pattern::PatternColorSpace,
    ColorSpace,
};

/// The intermediate representation of a parsed color-space descriptor.
///
/// The IR owns every parameter it references, so it survives the object
/// model it was parsed from and can be materialized repeatedly with
/// [`ColorSpace::from_ir`]. Parameter validation happens at
/// materialization, mirroring where the descriptor may still fail.
#[derive(Clone)]
pub enum ColorSpaceIr {
    DeviceGray,
    DeviceRgb,
    DeviceCmyk,
    CalGray {
        white_point: Option<Vec<f32>>,
        black_point: Option<Vec<f32>>,
        gamma: Option<f32>,
    },
    CalRgb {
        white_point: Option<Vec<f32>>,
        black_point: Option<Vec<f32>>,
        gamma: Option<Vec<f32>>,
        matrix: Option<Vec<f32>>,
    },
    Lab {
        white_point: Option<Vec<f32>>,
        black_point: Option<Vec<f32>>,
        range: Option<Vec<f32>>,
    },
    Indexed {
        base: Box<ColorSpaceIr>,
        /// One past the maximum valid index, in `[1, 256]`.
        high_val: usize,
        lookup: Vec<u8>,
    },
    Alternate {
        num_comps: usize,
        base: Box<ColorSpaceIr>,
        tint: Arc<dyn TintFunction>,
    },
    Pattern {
        base: Option<Box<ColorSpaceIr>>,
    },
}

impl fmt::Debug for ColorSpaceIr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceGray => write!(f, "DeviceGray"),
            Self::DeviceRgb => write!(f, "DeviceRgb"),
            Self::DeviceCmyk => write!(f, "DeviceCmyk"),
            Self::CalGray {
                white_point,
                black_point,
                gamma,
            } => f
                .debug_struct("CalGray")
                .field("white_point", white_point)
                .field("black_point", black_point)
                .field("gamma", gamma)
                .finish(),
            Self::CalRgb {
                white_point,
                black_point,
                gamma,
                matrix,
            } => f
                .debug_struct("CalRgb")
                .field("white_point", white_point)
                .field("black_point", black_point)
                .field("gamma", gamma)
                .field("matrix", matrix)
                .finish(),
            Self::Lab {
                white_point,
                black_point,
                range,
            } => f
                .debug_struct("Lab")
                .field("white_point", white_point)
                .field("black_point", black_point)
                .field("range", range)
                .finish(),
            Self::Indexed {
                base,
                high_val,
                lookup,
            } => f
                .debug_struct("Indexed")
                .field("base", base)
                .field("high_val", high_val)
                .field("lookup_len", &lookup.len())
                .finish(),
            Self::Alternate {
                num_comps, base, ..
            } => f
                .debug_struct("Alternate")
                .field("num_comps", num_comps)
                .field("base", base)
                .finish_non_exhaustive(),
            Self::Pattern { base } => f.debug_struct("Pattern").field("base", base).finish(),
        }
    }
}

impl ColorSpaceIr {
    /// Components per pixel of the materialized space; `None` for Pattern.
    fn num_components(&self) -> Option<usize> {
        match self {
            Self::DeviceGray | Self::CalGray { .. } | Self::Indexed { .. } => Some(1),
            Self::DeviceRgb | Self::CalRgb { .. } | Self::Lab { .. } => Some(3),
            Self::DeviceCmyk => Some(4),
            Self::Alternate { num_comps, .. } => Some(*num_comps),
            Self::Pattern { .. } => None,
        }
    }
}

pub(crate) fn parse_to_ir(
    cs: Object,
    resolver: &mut dyn Resolve,
    resources: Option<&Dictionary>,
    function_factory: &mut dyn FunctionFactory,
) -> PdfResult<ColorSpaceIr> {
    match resolver.resolve(cs)? {
        Object::Name(name) => match name.as_str() {
            "G" | "DeviceGray" => Ok(ColorSpaceIr::DeviceGray),
            "RGB" | "DeviceRGB" => Ok(ColorSpaceIr::DeviceRgb),
            "CMYK" | "DeviceCMYK" => Ok(ColorSpaceIr::DeviceCmyk),
            "Pattern" => Ok(ColorSpaceIr::Pattern { base: None }),
            _ => {
                // any other name refers into the resource dictionary's
                // ColorSpace subdictionary
                if let Some(res) = resources {
                    if let Some(color_spaces) = res.get_object("ColorSpace") {
                        if let Object::Dictionary(color_spaces) = resolver.resolve(color_spaces)? {
                            if let Some(resource_cs) = color_spaces.get_object(&name) {
                                return match resolver.resolve(resource_cs)? {
                                    cs @ Object::Name(..) => {
                                        parse_to_ir(cs, resolver, resources, function_factory)
                                    }
                                    Object::Array(arr) => {
                                        parse_array(arr, resolver, resources, function_factory)
                                    }
                                    obj => Err(ParseError::MismatchedObjectType {
                                        expected: "color space name or array",
                                        found: obj,
                                    }
                                    .into()),
                                };
                            }
                        }
                    }
                }

                anyhow::bail!(ParseError::UnrecognizedVariant {
                    found: name,
                    ty: "ColorSpace",
                })
            }
        },
        Object::Array(arr) => parse_array(arr, resolver, resources, function_factory),
        obj => anyhow::bail!(ParseError::MismatchedObjectType {
            expected: "color space name or array",
            found: obj,
        }),
    }
}

fn parse_array(
    arr: Vec<Object>,
    resolver: &mut dyn Resolve,
    resources: Option<&Dictionary>,
    function_factory: &mut dyn FunctionFactory,
) -> PdfResult<ColorSpaceIr> {
    let Some(first) = arr.first() else {
        anyhow::bail!(ParseError::ArrayOfInvalidLength {
            expected: 1,
            found: 0,
        });
    };
    let mode = resolver.assert_name(first.clone())?;

    match mode.as_str() {
        "G" | "DeviceGray" => Ok(ColorSpaceIr::DeviceGray),
        "RGB" | "DeviceRGB" => Ok(ColorSpaceIr::DeviceRgb),
        "CMYK" | "DeviceCMYK" => Ok(ColorSpaceIr::DeviceCmyk),
        "CalGray" => {
            assert_len(&arr, 2)?;
            let params = resolver.assert_dict(arr[1].clone())?;

            Ok(ColorSpaceIr::CalGray {
                white_point: params.get_number_arr("WhitePoint", resolver)?,
                black_point: params.get_number_arr("BlackPoint", resolver)?,
                gamma: params.get_number("Gamma", resolver)?,
            })
        }
        "CalRGB" => {
            assert_len(&arr, 2)?;
            let params = resolver.assert_dict(arr[1].clone())?;

            Ok(ColorSpaceIr::CalRgb {
                white_point: params.get_number_arr("WhitePoint", resolver)?,
                black_point: params.get_number_arr("BlackPoint", resolver)?,
                gamma: params.get_number_arr("Gamma", resolver)?,
                matrix: params.get_number_arr("Matrix", resolver)?,
            })
        }
        "Lab" => {
            assert_len(&arr, 2)?;
            let params = resolver.assert_dict(arr[1].clone())?;

            Ok(ColorSpaceIr::Lab {
                white_point: params.get_number_arr("WhitePoint", resolver)?,
                black_point: params.get_number_arr("BlackPoint", resolver)?,
                range: params.get_number_arr("Range", resolver)?,
            })
        }
        "ICCBased" => {
            assert_len(&arr, 2)?;
            let stream = resolver.assert_stream(arr[1].clone())?;
            let num_comps = stream.dict.expect_integer("N", resolver)?;

            // profile evaluation is unsupported; prefer the declared
            // alternate, then a device space keyed on the component count
            if let Some(alternate) = stream.dict.get_object("Alternate") {
                let alt_ir = parse_to_ir(alternate, resolver, resources, function_factory)?;

                if let Ok(n) = usize::try_from(num_comps) {
                    if alt_ir.num_components() == Some(n) {
                        return Ok(alt_ir);
                    }
                }

                log::warn!("ICCBased color space: Ignoring incorrect /Alternate entry.");
            }

            match num_comps {
                1 => Ok(ColorSpaceIr::DeviceGray),
                3 => Ok(ColorSpaceIr::DeviceRgb),
                4 => Ok(ColorSpaceIr::DeviceCmyk),
                n => anyhow::bail!("ICCBased color space with unsupported component count {}", n),
            }
        }
        "Pattern" => {
            let base = match arr.get(1) {
                Some(obj) => match resolver.resolve(obj.clone())? {
                    Object::Null => None,
                    obj => Some(Box::new(parse_to_ir(
                        obj,
                        resolver,
                        resources,
                        function_factory,
                    )?)),
                },
                None => None,
            };

            Ok(ColorSpaceIr::Pattern { base })
        }
        "I" | "Indexed" => {
            assert_len(&arr, 4)?;
            let base = parse_to_ir(arr[1].clone(), resolver, resources, function_factory)?;

            let hival = resolver.assert_integer(arr[2].clone())?;
            if hival < 0 || hival > 255 {
                anyhow::bail!("Indexed color space high value out of range: {}", hival);
            }
            let high_val = hival as usize + 1;

            let Some(base_num_comps) = base.num_components() else {
                anyhow::bail!("Indexed color space with a pattern base");
            };
            let length = base_num_comps * high_val;

            let mut lookup = match resolver.resolve(arr[3].clone())? {
                Object::Stream(stream) => stream.get_bytes(length).to_vec(),
                Object::String(s) => s.into_bytes(),
                obj => anyhow::bail!("unrecognized indexed color space lookup table: {:?}", obj),
            };
            // short tables read as zero beyond their end
            lookup.resize(length, 0);

            Ok(ColorSpaceIr::Indexed {
                base: Box::new(base),
                high_val,
                lookup,
            })
        }
        "Separation" | "DeviceN" => {
            if arr.len() < 4 {
                anyhow::bail!(ParseError::ArrayOfInvalidLength {
                    expected: 4,
                    found: arr.len(),
                });
            }

            let names = resolver.resolve(arr[1].clone())?;
            let num_comps = match &names {
                Object::Array(names) => names.len(),
                _ => 1,
            };
            if num_comps == 0 {
                anyhow::bail!("DeviceN color space with no colorants");
            }

            let base = parse_to_ir(arr[2].clone(), resolver, resources, function_factory)?;
            let tint = function_factory.create(resolver.resolve(arr[3].clone())?)?;

            Ok(ColorSpaceIr::Alternate {
                num_comps,
                base: Box::new(base),
                tint,
            })
        }
        _ => anyhow::bail!(ParseError::UnrecognizedVariant {
            found: mode,
            ty: "ColorSpace",
        }),
    }
}

pub(crate) fn from_ir(ir: ColorSpaceIr) -> PdfResult<ColorSpace> {
    Ok(match ir {
        ColorSpaceIr::DeviceGray => ColorSpace::DeviceGray(DeviceGray),
        ColorSpaceIr::DeviceRgb => ColorSpace::DeviceRgb(DeviceRgb),
        ColorSpaceIr::DeviceCmyk => ColorSpace::DeviceCmyk(DeviceCmyk),
        ColorSpaceIr::CalGray {
            white_point,
            black_point,
            gamma,
        } => ColorSpace::CalGray(CalGray::new(white_point, black_point, gamma)?),
        ColorSpaceIr::CalRgb {
            white_point,
            black_point,
            gamma,
            matrix,
        } => ColorSpace::CalRgb(CalRgb::new(white_point, black_point, gamma, matrix)?),
        ColorSpaceIr::Lab {
            white_point,
            black_point,
            range,
        } => ColorSpace::Lab(Lab::new(white_point, black_point, range)?),
        ColorSpaceIr::Indexed {
            base,
            high_val,
            lookup,
        } => ColorSpace::Indexed(IndexedColorSpace::new(from_ir(*base)?, high_val, lookup)),
        ColorSpaceIr::Alternate {
            num_comps,
            base,
            tint,
        } => ColorSpace::Alternate(AlternateColorSpace::new(num_comps, from_ir(*base)?, tint)),
        ColorSpaceIr::Pattern { base } => {
            let base = match base {
                Some(base) => Some(from_ir(*base)?),
                None => None,
            };
            ColorSpace::Pattern(PatternColorSpace::new(base))
        }
    })
}
