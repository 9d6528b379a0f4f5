use ecow::EcoString;
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use tracing::debug;

use crate::frames::Scope;
use crate::parser::error::{ParseError, ParseErrorKind, convert_pest_error};
use crate::program::{Instruction, Opcode, Operand, OperandKind, Program, Span, VarRef};
use crate::values::{Value, ValueType};

#[derive(Parser)]
#[grammar = "parser/ippcode.pest"]
pub struct IppParser;

/// Decode IPPcode22 source text into a [`Program`].
///
/// Instructions are numbered in the order they appear. Opcode names are
/// case-insensitive, operand kinds are checked against each opcode's
/// signature.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    check_header(source)?;

    let mut pairs =
        IppParser::parse(Rule::program, source).map_err(|e| convert_pest_error(e, source))?;
    let Some(root) = pairs.next() else {
        return Ok(Program::default());
    };

    let mut instructions = Vec::new();
    for pair in root.into_inner() {
        if pair.as_rule() == Rule::instruction {
            instructions.push(decode_instruction(pair, source)?);
        }
    }
    debug!(instructions = instructions.len(), "decoded program");
    Ok(Program::new(instructions))
}

/// A missing or misspelled header is reported separately from other
/// syntax errors.
fn check_header(source: &str) -> Result<(), ParseError> {
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        let code = line.split('#').next().unwrap_or_default();
        if let Some(token) = code.split_whitespace().next() {
            if token.eq_ignore_ascii_case(".IPPcode22") {
                return Ok(());
            }
            let start = offset + (code.len() - code.trim_start().len());
            return Err(ParseError::new(
                ParseErrorKind::MissingHeader,
                Span::new(start, start + token.len()),
                source,
            ));
        }
        offset += line.len();
    }
    Err(ParseError::new(
        ParseErrorKind::MissingHeader,
        Span::new(source.len(), source.len()),
        source,
    ))
}

fn decode_instruction(pair: Pair<Rule>, source: &str) -> Result<Instruction, ParseError> {
    let span = Span::from(pair.as_span());
    let mut inner = pair.into_inner();
    let Some(name) = inner.next() else {
        return Err(ParseError::new(
            ParseErrorKind::Syntax {
                expected: "instruction".to_string(),
            },
            span,
            source,
        ));
    };
    let opcode = Opcode::from_name(name.as_str()).ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::UnknownOpcode {
                name: name.as_str().to_string(),
            },
            Span::from(name.as_span()),
            source,
        )
    })?;

    let operands: Vec<Pair<Rule>> = inner.collect();
    let signature = opcode.signature();
    if operands.len() != signature.len() {
        return Err(ParseError::new(
            ParseErrorKind::OperandCount {
                opcode,
                expected: signature.len(),
                found: operands.len(),
            },
            span,
            source,
        ));
    }

    let mut decoded = Vec::with_capacity(operands.len());
    for (position, (pair, kind)) in operands.into_iter().zip(signature).enumerate() {
        decoded.push(decode_operand(pair, opcode, position, *kind, source)?);
    }
    Ok(Instruction::new(opcode, decoded).with_span(span))
}

fn decode_operand(
    pair: Pair<Rule>,
    opcode: Opcode,
    position: usize,
    expected: OperandKind,
    source: &str,
) -> Result<Operand, ParseError> {
    let span = Span::from(pair.as_span());
    // `operand` always wraps exactly one concrete token.
    let token = pair.into_inner().next();
    let Some(token) = token else {
        return Err(ParseError::new(
            ParseErrorKind::Syntax {
                expected: "operand".to_string(),
            },
            span,
            source,
        ));
    };

    let wrong_kind = |found: &'static str| {
        ParseError::new(
            ParseErrorKind::OperandKind {
                opcode,
                position: position + 1,
                expected,
                found,
            },
            span.clone(),
            source,
        )
    };
    let invalid = |what: &'static str, text: &str| {
        ParseError::new(
            ParseErrorKind::InvalidValue {
                what,
                text: text.to_string(),
            },
            span.clone(),
            source,
        )
    };

    let rule = token.as_rule();
    match (expected, rule) {
        (OperandKind::Var | OperandKind::Symb, Rule::variable) => {
            Ok(Operand::Variable(decode_variable(token)))
        }
        (OperandKind::Var, _) => Err(wrong_kind(describe(rule))),
        (OperandKind::Symb, Rule::bare) => Err(wrong_kind(describe(rule))),
        (OperandKind::Symb, _) => decode_constant(token)
            .map(Operand::Constant)
            .map_err(|(what, text)| invalid(what, &text)),
        (OperandKind::Label, Rule::bare) => Ok(Operand::LabelRef(token.as_str().into())),
        (OperandKind::Label, _) => Err(wrong_kind(describe(rule))),
        (OperandKind::Type, Rule::bare) => ValueType::from_name(token.as_str())
            .map(Operand::TypeRef)
            .ok_or_else(|| invalid("type name", token.as_str())),
        (OperandKind::Type, _) => Err(wrong_kind(describe(rule))),
    }
}

fn describe(rule: Rule) -> &'static str {
    match rule {
        Rule::variable => "variable",
        Rule::bare => "name",
        _ => "constant",
    }
}

fn decode_variable(pair: Pair<Rule>) -> VarRef {
    let mut scope = Scope::Global;
    let mut name = EcoString::new();
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::frame => scope = Scope::from_prefix(part.as_str()).unwrap_or(Scope::Global),
            Rule::identifier => name = part.as_str().into(),
            _ => {}
        }
    }
    VarRef::new(scope, name)
}

/// On failure, returns what was being decoded and the offending text.
fn decode_constant(pair: Pair<Rule>) -> Result<Value, (&'static str, String)> {
    let rule = pair.as_rule();
    let text = pair.as_str();
    let body = pair.into_inner().next().map(|p| p.as_str()).unwrap_or_default();
    match rule {
        Rule::int_literal => body
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| ("integer", body.to_string())),
        Rule::bool_literal => Ok(Value::Bool(body == "true")),
        Rule::nil_literal => Ok(Value::Nil),
        Rule::string_literal => unescape(body).map(Value::Str),
        _ => Err(("constant", text.to_string())),
    }
}

/// Expand `\ddd` decimal escapes.
fn unescape(text: &str) -> Result<EcoString, (&'static str, String)> {
    let mut out = EcoString::new();
    let mut rest = text;
    while let Some(index) = rest.find('\\') {
        out.push_str(&rest[..index]);
        let digits = rest.get(index + 1..index + 4).unwrap_or_default();
        let ch = digits
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| ("escape", format!("\\{}", digits)))?;
        out.push(ch);
        rest = &rest[index + 1 + digits.len()..];
    }
    out.push_str(rest);
    Ok(out)
}

impl From<pest::Span<'_>> for Span {
    fn from(s: pest::Span<'_>) -> Self {
        Self(s.start()..s.end())
    }
}
