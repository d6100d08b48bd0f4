use std::collections::HashMap;

use crate::{error::ParseError, resolve::Resolve, PdfResult};

/// A reference to a non-existing object is considered a `null`
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub struct Reference {
    pub object_number: usize,
    pub generation: usize,
}

#[derive(Debug, Clone)]
pub enum Object {
    Null,
    True,
    False,
    Integer(i32),
    Real(f32),
    String(String),
    Name(String),
    Array(Vec<Self>),
    Stream(Stream),
    Dictionary(Dictionary),
    Reference(Reference),
}

impl Object {
    pub fn name_is(&self, name: &str) -> bool {
        matches!(self, Object::Name(n) if n == name)
    }
}

/// A stream whose contents have already been run through its decode filters.
///
/// Filter evaluation happens upstream of the color engine; a lookup table
/// arriving here is raw bytes.
#[derive(Debug, Clone)]
pub struct Stream {
    pub dict: Dictionary,
    data: Vec<u8>,
}

impl Stream {
    pub fn new(dict: Dictionary, data: Vec<u8>) -> Self {
        Self { dict, data }
    }

    /// The first `n` decoded bytes, or fewer when the stream is shorter.
    pub fn get_bytes(&self, n: usize) -> &[u8] {
        &self.data[..self.data.len().min(n)]
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    dict: HashMap<String, Object>,
}

impl Dictionary {
    pub fn new(dict: HashMap<String, Object>) -> Self {
        Self { dict }
    }

    pub fn get_object(&self, key: &str) -> Option<Object> {
        self.dict.get(key).cloned()
    }

    pub fn get_integer(&self, key: &str, resolver: &mut dyn Resolve) -> PdfResult<Option<i32>> {
        self.dict
            .get(key)
            .cloned()
            .map(|obj| resolver.assert_integer(obj))
            .transpose()
    }

    pub fn expect_integer(&self, key: &'static str, resolver: &mut dyn Resolve) -> PdfResult<i32> {
        self.get_integer(key, resolver)?
            .ok_or(ParseError::MissingRequiredKey { key }.into())
    }

    pub fn get_number(&self, key: &str, resolver: &mut dyn Resolve) -> PdfResult<Option<f32>> {
        self.dict
            .get(key)
            .cloned()
            .map(|obj| resolver.assert_number(obj))
            .transpose()
    }

    pub fn get_arr(
        &self,
        key: &str,
        resolver: &mut dyn Resolve,
    ) -> PdfResult<Option<Vec<Object>>> {
        self.dict
            .get(key)
            .cloned()
            .map(|obj| resolver.assert_arr(obj))
            .transpose()
    }

    pub fn get_number_arr(
        &self,
        key: &str,
        resolver: &mut dyn Resolve,
    ) -> PdfResult<Option<Vec<f32>>> {
        self.get_arr(key, resolver)?
            .map(|arr| {
                arr.into_iter()
                    .map(|obj| resolver.assert_number(obj))
                    .collect::<PdfResult<Vec<f32>>>()
            })
            .transpose()
    }
}

pub(crate) fn assert_len(arr: &[Object], len: usize) -> PdfResult<()> {
    if arr.len() != len {
        anyhow::bail!(ParseError::ArrayOfInvalidLength {
            expected: len,
            found: arr.len(),
        });
    }

    Ok(())
}
