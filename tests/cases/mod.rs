#![allow(dead_code)]

use ippvm::{ExecutionOptions, Program, render_error_to_string_no_color, run_program, run_source};
use once_cell::sync::Lazy;

/// Result of running a program the way the command line does.
pub struct CaseResult {
    pub stdout: String,
    /// Diagnostic stream followed by the rendered error, if any.
    pub stderr: String,
    pub exit_code: i32,
}

pub fn run(source: &str, input: &str) -> CaseResult {
    run_with(source, input, ExecutionOptions::default())
}

pub fn run_with(source: &str, input: &str, options: ExecutionOptions) -> CaseResult {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let result = run_source(source, options, input.as_bytes(), &mut stdout, &mut stderr);
    let mut stderr = String::from_utf8(stderr).unwrap();
    let exit_code = match result {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            stderr.push_str(&render_error_to_string_no_color(&err, source));
            err.exit_code()
        }
    };
    CaseResult {
        stdout: String::from_utf8(stdout).unwrap(),
        stderr,
        exit_code,
    }
}

/// Run a decoded program with `input`, returning stdout and the exit code.
pub fn run_decoded(program: &Program, input: &str) -> (String, i32) {
    let mut stdout = Vec::new();
    let result = run_program(
        program,
        ExecutionOptions::default(),
        input.as_bytes(),
        &mut stdout,
        std::io::sink(),
    );
    let code = match result {
        Ok(outcome) => outcome.exit_code,
        Err(err) => err.exit_code(),
    };
    (String::from_utf8(stdout).unwrap(), code)
}

/// Reads n and writes n! using a recursive CALL.
pub static FACTORIAL: Lazy<Program> = Lazy::new(|| {
    ippvm::parse(indoc::indoc! {"
        .IPPcode22
        DEFVAR GF@n
        DEFVAR GF@result
        READ GF@n int
        CALL fact
        WRITE GF@result
        EXIT int@0

        # result := n!, keeps n intact
        LABEL fact
        JUMPIFNEQ recurse GF@n int@0
        MOVE GF@result int@1
        RETURN
        LABEL recurse
        PUSHS GF@n
        SUB GF@n GF@n int@1
        CALL fact
        POPS GF@n
        MUL GF@result GF@result GF@n
        RETURN
    "})
    .unwrap()
});

#[macro_export]
macro_rules! program_case {
    (
        $name:ident,
        source: $source:expr,
        $(input: $input:expr,)?
        stdout: $stdout:expr,
        exit: $exit:expr
        $(, stderr_contains: $stderr:expr)?
        $(,)?
    ) => {
        #[test]
        fn $name() {
            let input: &str = $crate::program_case!(@input $($input)?);
            let result = $crate::cases::run($source, input);
            pretty_assertions::assert_eq!(result.stdout, $stdout, "stdout");
            pretty_assertions::assert_eq!(
                result.exit_code, $exit,
                "exit code, stderr:\n{}", result.stderr
            );
            $(
                assert!(
                    result.stderr.contains($stderr),
                    "expected {:?} in stderr:\n{}",
                    $stderr,
                    result.stderr
                );
            )?
        }
    };
    (@input) => { "" };
    (@input $input:expr) => { $input };
}
