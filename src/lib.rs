#![allow(
    // the conversion entry points mirror the wide raster-buffer signatures
    clippy::too_many_arguments,
    clippy::manual_range_contains,
)]

mod color;
mod error;
mod function;
mod objects;
mod resolve;

pub use crate::{
    color::{is_default_decode, ColorSpace, ColorSpaceIr, Sample},
    error::{ParseError, PdfResult},
    function::{FunctionFactory, TintFunction},
    objects::{Dictionary, Object, Reference, Stream},
    resolve::Resolve,
};
