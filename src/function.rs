use std::sync::Arc;

use crate::{objects::Object, PdfResult};

/// A tint transformation function, mapping the colorant values of a
/// Separation or DeviceN color space to components of its alternate space.
///
/// `dest` holds exactly `base.num_components()` slots; `eval` must fill all
/// of them. Implementations are shared between conversion calls and may be
/// invoked from multiple threads, hence `Send + Sync`.
pub trait TintFunction: Send + Sync {
    fn eval(&self, src: &[f32], dest: &mut [f32]);
}

/// Builds a [`TintFunction`] from a PDF function object.
///
/// The function evaluator itself lives outside this crate; the parser only
/// hands the (resolved) function object over and stores the result.
pub trait FunctionFactory {
    fn create(&mut self, obj: Object) -> PdfResult<Arc<dyn TintFunction>>;
}
