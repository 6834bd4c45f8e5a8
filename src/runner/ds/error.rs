use thiserror::Error;

/// Errors surfaced to scripted code as language-level exceptions.
///
/// A linker *declining* is never an error; it is expressed as `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JErrorType {
    #[error("Uncaught reference error: {0}.")]
    ReferenceError(String),
    #[error("Uncaught type error: {0}.")]
    TypeError(String),
    #[error("Uncaught range error: {0}.")]
    RangeError(String),
    #[error("Uncaught syntax error: {0}.")]
    SyntaxError(String),
    #[error("Uncaught security error: {0}.")]
    SecurityError(String),
    /// An optimistic call site observed a value its static return type can not hold.
    #[error("Unwarranted optimism at program point {program_point}: {value}")]
    UnwarrantedOptimism { value: String, program_point: u32 },
}

impl JErrorType {
    pub fn not_a_function(rendered: &str) -> Self {
        JErrorType::TypeError(format!("{} is not a function", rendered))
    }

    pub fn is_type_error(&self) -> bool {
        matches!(self, JErrorType::TypeError(_))
    }

    pub fn is_security_error(&self) -> bool {
        matches!(self, JErrorType::SecurityError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_rendering_matches_engine_style() {
        let e = JErrorType::TypeError("x is not a function".to_string());
        assert_eq!(e.to_string(), "Uncaught type error: x is not a function.");
        assert!(e.is_type_error());
        assert!(!e.is_security_error());
    }
}
