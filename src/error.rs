use std::fmt;

use crate::objects::Object;

#[derive(Debug)]
pub enum ParseError {
    MissingRequiredKey {
        key: &'static str,
    },
    ArrayOfInvalidLength {
        expected: usize,
        found: usize,
    },
    UnrecognizedVariant {
        found: String,
        ty: &'static str,
    },
    MismatchedObjectType {
        expected: &'static str,
        found: Object,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingRequiredKey { key } => {
                write!(f, "missing required key {:?}", key)
            }
            ParseError::ArrayOfInvalidLength { expected, found } => {
                write!(f, "expected array of length {}, found {}", expected, found)
            }
            ParseError::UnrecognizedVariant { found, ty } => {
                write!(f, "unrecognized {} variant {:?}", ty, found)
            }
            ParseError::MismatchedObjectType { expected, found } => {
                write!(f, "expected {}, found {:?}", expected, found)
            }
        }
    }
}

impl std::error::Error for ParseError {}

pub type PdfResult<T> = anyhow::Result<T>;
