use std::borrow::Cow;
use std::fmt;

/// Represents template errors.
///
/// All errors this crate produces are syntax errors in the template source.
/// Missing context values are not errors; they render as empty output.
///
/// # Example
///
/// Here is an example of how you might want to render errors:
///
/// ```rust
/// # let template = "{{ name }}"; let ctx = nanotemplate::Value::UNDEFINED;
/// match nanotemplate::render(template, &ctx) {
///     Ok(result) => println!("{}", result),
///     Err(err) => {
///         eprintln!("could not render template:");
///         eprintln!("  {}", err);
///     }
/// }
/// ```
pub struct Error {
    kind: ErrorKind,
    detail: Option<Cow<'static, str>>,
    lineno: usize,
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("detail", &self.detail)
            .field("lineno", &self.lineno)
            .finish()
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
    }
}

impl Eq for Error {}

/// An enum describing the error kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A tag was opened but its closing delimiter is missing.
    UnclosedTag,
    /// A block was opened but its closing tag is missing.
    UnclosedBlock,
    /// A block-open tag named a directive the engine does not know.
    UnknownDirective,
    /// A closing tag appeared where no block of that name was open.
    UnexpectedCloseTag,
    /// An `{{else}}` tag appeared outside of a block body.
    UnexpectedElse,
    /// A raw (triple-delimiter) tag carried block-control content.
    InvalidRawTag,
    /// Block nesting exceeded the engine's depth limit.
    TooDeeplyNested,
}

impl ErrorKind {
    fn description(self) -> &'static str {
        match self {
            ErrorKind::UnclosedTag => "unclosed tag",
            ErrorKind::UnclosedBlock => "unclosed block",
            ErrorKind::UnknownDirective => "unknown directive",
            ErrorKind::UnexpectedCloseTag => "unexpected closing tag",
            ErrorKind::UnexpectedElse => "unexpected else tag",
            ErrorKind::InvalidRawTag => "invalid raw tag",
            ErrorKind::TooDeeplyNested => "template too deeply nested",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref detail) = self.detail {
            write!(f, "{}: {}", self.kind, detail)?;
        } else {
            write!(f, "{}", self.kind)?;
        }
        if self.lineno > 0 {
            write!(f, " (on line {})", self.lineno)?;
        }
        Ok(())
    }
}

impl Error {
    /// Creates a new error with kind and detail.
    pub fn new<D: Into<Cow<'static, str>>>(kind: ErrorKind, detail: D) -> Error {
        Error {
            kind,
            detail: Some(detail.into()),
            lineno: 0,
        }
    }

    pub(crate) fn with_line(mut self, source: &str, offset: usize) -> Error {
        self.lineno = source[..offset.min(source.len())]
            .bytes()
            .filter(|&c| c == b'\n')
            .count()
            + 1;
        self
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the line of the offending tag, if known.
    pub fn line(&self) -> Option<usize> {
        if self.lineno > 0 {
            Some(self.lineno)
        } else {
            None
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error {
            kind,
            detail: None,
            lineno: 0,
        }
    }
}
