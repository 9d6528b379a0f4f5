//! Decoding of IPPcode22 source text.

pub mod error;
pub mod parser;

pub use error::{ParseError, ParseErrorKind};
pub use parser::IppParser;
pub use parser::Rule;
pub use parser::parse;
