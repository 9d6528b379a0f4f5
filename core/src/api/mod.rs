//! Public API for running IPPcode22 programs.
//!
//! # Example
//!
//! ```
//! use ipp_core::api::{ExecutionOptions, run_source};
//!
//! let source = ".IPPcode22\nWRITE string@hi\nEXIT int@3\n";
//! let mut output = Vec::new();
//! let outcome = run_source(
//!     source,
//!     ExecutionOptions::default(),
//!     std::io::empty(),
//!     &mut output,
//!     std::io::sink(),
//! )
//! .unwrap();
//! assert_eq!(outcome.exit_code, 3);
//! assert_eq!(output, b"hi");
//! ```

pub mod engine;
pub mod error;
pub mod options;

pub use engine::{run_program, run_source};
pub use error::Error;
pub use options::ExecutionOptions;
