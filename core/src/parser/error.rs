use thiserror::Error;

use crate::parser::Rule;
use crate::program::{Opcode, OperandKind, Span};
use crate::vm::codes;

/// Decode failure with the location it was detected at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (line {line})")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    /// 1-based line of `span.start`.
    pub line: usize,
}

/// Specific kinds of decode errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// First meaningful line is not `.IPPcode22`
    #[error("missing .IPPcode22 header")]
    MissingHeader,

    /// Text the grammar does not accept
    #[error("expected {expected}")]
    Syntax { expected: String },

    #[error("unknown opcode '{name}'")]
    UnknownOpcode { name: String },

    #[error("{opcode} takes {expected} operand(s), found {found}")]
    OperandCount {
        opcode: Opcode,
        expected: usize,
        found: usize,
    },

    #[error("operand {position} of {opcode} must be a {expected}, found {found}")]
    OperandKind {
        opcode: Opcode,
        position: usize,
        expected: OperandKind,
        found: &'static str,
    },

    /// Well-formed token with an unusable value (integer overflow, bad
    /// escape, unknown type name)
    #[error("invalid {what} '{text}'")]
    InvalidValue { what: &'static str, text: String },
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, source: &str) -> Self {
        let line = line_of(source, span.0.start);
        Self { kind, span, line }
    }

    pub fn exit_code(&self) -> i32 {
        match self.kind {
            ParseErrorKind::MissingHeader => codes::MALFORMED_PROGRAM,
            _ => codes::STRUCTURE,
        }
    }
}

fn line_of(source: &str, offset: usize) -> usize {
    let offset = offset.min(source.len());
    source.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Convert Pest error to a ParseError
pub fn convert_pest_error(err: pest::error::Error<Rule>, source: &str) -> ParseError {
    use pest::error::{ErrorVariant, InputLocation};

    let span = match err.location {
        InputLocation::Pos(pos) => Span::new(pos, pos),
        InputLocation::Span((start, end)) => Span::new(start, end),
    };

    let expected = match err.variant {
        ErrorVariant::ParsingError { positives, .. } => format_expected_rules(&positives),
        ErrorVariant::CustomError { message } => message,
    };

    ParseError::new(ParseErrorKind::Syntax { expected }, span, source)
}

/// Group grammar rules into the concepts a program author knows.
fn format_expected_rules(rules: &[Rule]) -> String {
    let mut concepts: Vec<&str> = Vec::new();

    for rule in rules {
        let concept = match rule {
            Rule::header => ".IPPcode22 header",
            Rule::opcode | Rule::instruction => "instruction",
            Rule::operand | Rule::bare => "operand",
            Rule::variable | Rule::frame | Rule::identifier => "variable",
            Rule::int_literal | Rule::int_value => "integer",
            Rule::bool_literal | Rule::bool_value => "bool",
            Rule::nil_literal => "nil",
            Rule::string_literal | Rule::string_value | Rule::escape => "string",
            Rule::EOI => "end of input",
            _ => "end of line",
        };
        if !concepts.contains(&concept) {
            concepts.push(concept);
        }
    }

    match concepts.split_last() {
        None => "something else".to_string(),
        Some((only, [])) => only.to_string(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
    }
}
