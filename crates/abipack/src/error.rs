use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    MethodNotFound,
    ArgumentCountMismatch,
    MissingField,
    TypeMismatch,
    RangeOverflow,
    LengthMismatch,
    UnsupportedKind,
    InvalidSelectorLength,
}

impl ErrorKind {
    pub fn code_str(self) -> &'static str {
        match self {
            ErrorKind::MethodNotFound => "APK0001",
            ErrorKind::ArgumentCountMismatch => "APK0002",
            ErrorKind::MissingField => "APK0100",
            ErrorKind::TypeMismatch => "APK0200",
            ErrorKind::RangeOverflow => "APK0210",
            ErrorKind::LengthMismatch => "APK0220",
            ErrorKind::UnsupportedKind => "APK0300",
            ErrorKind::InvalidSelectorLength => "APK0400",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MethodNotFound => "method_not_found",
            ErrorKind::ArgumentCountMismatch => "argument_count_mismatch",
            ErrorKind::MissingField => "missing_field",
            ErrorKind::TypeMismatch => "type_mismatch",
            ErrorKind::RangeOverflow => "range_overflow",
            ErrorKind::LengthMismatch => "length_mismatch",
            ErrorKind::UnsupportedKind => "unsupported_kind",
            ErrorKind::InvalidSelectorLength => "invalid_selector_length",
        }
    }
}

/// One step from a parameter down to the value that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSeg {
    Field(String),
    Index(usize),
}

/// A terminal failure of one pack/coerce call.
///
/// `path` is stored innermost-first while the error unwinds and rendered
/// outermost-first, e.g. `t.tuples[1].fbs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub param: Option<String>,
    pub declared: Option<String>,
    path: Vec<PathSeg>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error {
            kind,
            message: message.into(),
            param: None,
            declared: None,
            path: Vec::new(),
        }
    }

    pub fn method_not_found(what: impl fmt::Display) -> Self {
        Error::new(ErrorKind::MethodNotFound, format!("method not found: {what}"))
    }

    pub fn type_mismatch(expected: impl fmt::Display, found: &str) -> Self {
        Error::new(
            ErrorKind::TypeMismatch,
            format!("expected {expected}, found {found}"),
        )
    }

    pub fn length_mismatch(expected: usize, found: usize) -> Self {
        Error::new(
            ErrorKind::LengthMismatch,
            format!("expected length {expected}, found {found}"),
        )
    }

    pub(crate) fn at_field(mut self, name: &str) -> Self {
        self.path.push(PathSeg::Field(name.to_string()));
        self
    }

    pub(crate) fn at_index(mut self, idx: usize) -> Self {
        self.path.push(PathSeg::Index(idx));
        self
    }

    pub(crate) fn for_param(mut self, name: &str, declared: impl fmt::Display) -> Self {
        self.param = Some(name.to_string());
        self.declared = Some(declared.to_string());
        self
    }

    pub fn code(&self) -> &'static str {
        self.kind.code_str()
    }

    pub fn path(&self) -> String {
        let mut out = String::new();
        for seg in self.path.iter().rev() {
            match seg {
                PathSeg::Field(name) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(name);
                }
                PathSeg::Index(idx) => out.push_str(&format!("[{idx}]")),
            }
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.code(),
            "kind": self.kind.as_str(),
            "message": self.message,
            "param": self.param,
            "declared": self.declared,
            "path": self.path(),
        })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.code(), self.kind.as_str(), self.message)?;
        let path = self.path();
        if !path.is_empty() {
            write!(f, " at {path}")?;
        }
        if let (Some(param), Some(declared)) = (&self.param, &self.declared) {
            write!(f, " (param {param}: {declared})")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

/// Failure of a full pack: either the arguments never reached the encoder, or
/// the encoder itself rejected them.
#[derive(Debug)]
pub enum PackError<E> {
    Args(Error),
    Encode(E),
}

impl<E> PackError<E> {
    pub fn args(&self) -> Option<&Error> {
        match self {
            PackError::Args(err) => Some(err),
            PackError::Encode(_) => None,
        }
    }
}

impl<E> From<Error> for PackError<E> {
    fn from(err: Error) -> Self {
        PackError::Args(err)
    }
}

impl<E: fmt::Display> fmt::Display for PackError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackError::Args(err) => err.fmt(f),
            PackError::Encode(err) => write!(f, "encode: {err}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for PackError<E> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_renders_outermost_first() {
        let err = Error::length_mismatch(24, 3)
            .at_field("fbs")
            .at_index(1)
            .at_field("tuples")
            .at_field("t");
        assert_eq!(err.path(), "t.tuples[1].fbs");
    }

    #[test]
    fn display_includes_code_and_param() {
        let err = Error::type_mismatch("bool", "text")
            .at_field("b")
            .for_param("t", "(bool)");
        assert_eq!(
            err.to_string(),
            "APK0200 type_mismatch: expected bool, found text at b (param t: (bool))"
        );
    }

    #[test]
    fn codes_are_unique() {
        let kinds = [
            ErrorKind::MethodNotFound,
            ErrorKind::ArgumentCountMismatch,
            ErrorKind::MissingField,
            ErrorKind::TypeMismatch,
            ErrorKind::RangeOverflow,
            ErrorKind::LengthMismatch,
            ErrorKind::UnsupportedKind,
            ErrorKind::InvalidSelectorLength,
        ];
        let mut codes: Vec<&str> = kinds.iter().map(|k| k.code_str()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
    }
}
