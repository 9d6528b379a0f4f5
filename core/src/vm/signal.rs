/// What the execution loop does after an instruction ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    /// Advance to the next instruction.
    Continue,
    /// Continue at the given instruction index.
    Jump(usize),
    /// Save the current index on the call stack, then jump.
    Call(usize),
    /// Resume after the most recent `CALL`.
    Return,
    /// Stop with the given exit code.
    Halt(i32),
}
