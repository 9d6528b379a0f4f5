//! The execution engine: label table, operand resolution and the dispatch
//! loop over a decoded [`Program`](crate::program::Program).

mod dispatch;
mod dump;
mod error;
mod io;
mod labels;
pub mod operators;
pub mod resolver;
mod runtime;
mod signal;
mod stack;

pub use dump::{Snapshot, write_state};
pub use error::{FatalError, codes};
pub use io::InputSource;
pub use labels::LabelTable;
pub use runtime::{Interpreter, Outcome};
pub use signal::ControlSignal;
pub use stack::Stack;
