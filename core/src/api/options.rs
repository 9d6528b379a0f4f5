//! Configuration options for the interpreter.

/// Configuration options for program execution.
///
/// # Example
///
/// ```
/// use ipp_core::api::ExecutionOptions;
///
/// let options = ExecutionOptions { dump_state: true };
/// assert!(options.dump_state);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExecutionOptions {
    /// Write the interpreter state to the diagnostic stream after every
    /// instruction, the same dump `BREAK` produces.
    ///
    /// Default: false
    pub dump_state: bool,
}
