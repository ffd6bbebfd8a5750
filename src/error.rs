// ABOUTME: Error taxonomy for the reader, parser, and evaluator.

use thiserror::Error;

/// The full error taxonomy this language's core can raise.
///
/// Every variant corresponds to one of the error kinds a host is expected to
/// report as `";; <KIND>: <MESSAGE>"` at the top level. Nothing below the
/// engine's entry points catches these; they propagate with `?` all the way
/// up.
#[derive(Error, Debug, Clone)]
pub enum RagnarokError {
    #[error("READ-ERROR: {0}")]
    ReadError(String),

    #[error("PARSE-ERROR: {0}")]
    ParseError(String),

    #[error("WRONG-ARG-COUNT: {function}: expected {expected} argument{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    WrongArgCount {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("WRONG-ARG-TYPE: {function}: expected {expected}, got {actual}")]
    WrongArgType {
        function: String,
        expected: String,
        actual: String,
    },

    #[error("UNBOUND-SYMBOL: Cannot find binding for {0}")]
    UnboundSymbol(String),

    #[error("NOT-CALLABLE: Cannot apply value {0}")]
    NotCallable(String),

    #[error("MODULE-ERROR: {0}")]
    ModuleError(String),

    #[error("RUNTIME-ERROR: {0}")]
    RuntimeError(String),

    /// Not an error condition; the distinguished `quit` signal. Propagated
    /// unchanged to the host rather than reported and recovered from.
    #[error("QUIT")]
    Quit,
}

impl RagnarokError {
    pub fn read_error(message: impl Into<String>) -> Self {
        RagnarokError::ReadError(message.into())
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        RagnarokError::ParseError(message.into())
    }

    pub fn wrong_arg_count(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        RagnarokError::WrongArgCount {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn wrong_arg_type(function: &str, expected: &str, actual: &str) -> Self {
        RagnarokError::WrongArgType {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn unbound_symbol(name: impl Into<String>) -> Self {
        RagnarokError::UnboundSymbol(name.into())
    }

    pub fn not_callable(description: impl Into<String>) -> Self {
        RagnarokError::NotCallable(description.into())
    }

    pub fn module_error(message: impl Into<String>) -> Self {
        RagnarokError::ModuleError(message.into())
    }

    pub fn runtime_error(message: impl Into<String>) -> Self {
        RagnarokError::RuntimeError(message.into())
    }

    /// Render the way the host's print sink is expected to: `";; KIND: message"`.
    pub fn report(&self) -> String {
        format!(";; {}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_arg_count_pluralizes_expected() {
        let e = RagnarokError::wrong_arg_count("cons", "2", 1);
        assert_eq!(
            e.to_string(),
            "WRONG-ARG-COUNT: cons: expected 2 arguments, got 1"
        );
    }

    #[test]
    fn wrong_arg_count_singular_for_one() {
        let e = RagnarokError::wrong_arg_count("ref-get", "1", 2);
        assert_eq!(
            e.to_string(),
            "WRONG-ARG-COUNT: ref-get: expected 1 argument, got 2"
        );
    }

    #[test]
    fn report_is_prefixed_with_double_semicolon() {
        let e = RagnarokError::unbound_symbol("X");
        assert_eq!(e.report(), ";; UNBOUND-SYMBOL: Cannot find binding for X");
    }

    #[test]
    fn quit_is_distinguished_from_other_errors() {
        let e = RagnarokError::Quit;
        assert!(matches!(e, RagnarokError::Quit));
    }
}
