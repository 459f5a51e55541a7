/*!
 * Execution Request
 * The target callable plus its arguments, captured at call time and
 * consumed exactly once
 */

/// One unit of work to bound: a name (for generated expiry messages), the
/// callable, and its captured arguments
#[derive(Debug)]
pub struct ExecutionRequest<A, F> {
    name: &'static str,
    func: F,
    args: A,
}

impl<A, F> ExecutionRequest<A, F> {
    /// Capture a callable and its arguments
    pub fn new(name: &'static str, func: F, args: A) -> Self {
        Self { name, func, args }
    }

    /// The name used in generated expiry messages
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn into_parts(self) -> (&'static str, F, A) {
        (self.name, self.func, self.args)
    }
}
