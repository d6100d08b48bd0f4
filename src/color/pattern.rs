use super::ColorSpace;

/// The Pattern color space.
///
/// Carries the underlying color space of an uncolored tiling pattern, or
/// nothing for colored patterns. Patterns have no pixel representation;
/// every conversion entry point fails fast.
#[derive(Debug, Clone)]
pub struct PatternColorSpace {
    base: Option<Box<ColorSpace>>,
}

impl PatternColorSpace {
    pub(crate) fn new(base: Option<ColorSpace>) -> Self {
        Self {
            base: base.map(Box::new),
        }
    }

    /// The color space of an uncolored pattern's components, if any.
    pub fn base(&self) -> Option<&ColorSpace> {
        self.base.as_deref()
    }
}

#[cfg(test)]
mod test {
    use crate::{ColorSpace, ColorSpaceIr};

    #[test]
    fn carries_the_base_of_uncolored_patterns() {
        let cs = ColorSpace::from_ir(ColorSpaceIr::Pattern {
            base: Some(Box::new(ColorSpaceIr::DeviceCmyk)),
        })
        .unwrap();

        match cs {
            ColorSpace::Pattern(pattern) => {
                assert_eq!(pattern.base().unwrap().name(), "DeviceCMYK");
            }
            other => panic!("expected a pattern color space, found {:?}", other),
        }
    }

    #[test]
    fn colored_patterns_have_no_base() {
        let cs = ColorSpace::from_ir(ColorSpaceIr::Pattern { base: None }).unwrap();

        match cs {
            ColorSpace::Pattern(pattern) => assert!(pattern.base().is_none()),
            other => panic!("expected a pattern color space, found {:?}", other),
        }
    }

    #[test]
    #[should_panic(expected = "pattern color spaces have no pixel components")]
    fn pixel_conversion_fails_fast() {
        let cs = ColorSpace::from_ir(ColorSpaceIr::Pattern { base: None }).unwrap();
        cs.num_components();
    }
}
