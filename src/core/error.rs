use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    NotFound,
    Permission,
    Decode,
    Io,
}

/// Why a document could not be turned into a tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecodeFailureCategory {
    Syntax,
    IllFormed,
    Escape,
    Encoding,
    DepthLimit,
    NoRootElement,
    Unknown,
}

impl DecodeFailureCategory {
    pub fn label(self) -> &'static str {
        match self {
            DecodeFailureCategory::Syntax => "syntax",
            DecodeFailureCategory::IllFormed => "ill-formed",
            DecodeFailureCategory::Escape => "escape",
            DecodeFailureCategory::Encoding => "encoding",
            DecodeFailureCategory::DepthLimit => "depth-limit",
            DecodeFailureCategory::NoRootElement => "no-root-element",
            DecodeFailureCategory::Unknown => "unknown",
        }
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    path: Option<PathBuf>,
    offset: Option<u64>,
    category: Option<DecodeFailureCategory>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            path: None,
            offset: None,
            category: None,
            source: None,
        }
    }

    pub fn decode(category: DecodeFailureCategory) -> Self {
        Self::new(ErrorKind::Decode).with_category(category)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn category(&self) -> Option<DecodeFailureCategory> {
        self.category
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_category(mut self, category: DecodeFailureCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(category) = self.category {
            write!(f, " (category: {})", category.label())?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        if let Some(offset) = self.offset {
            write!(f, " (offset: {offset})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Permission => 6,
        ErrorKind::Decode => 7,
        ErrorKind::Io => 8,
    }
}

/// Map a file-read failure onto the crate taxonomy, keeping the path.
pub fn from_read_error(err: std::io::Error, path: &Path) -> Error {
    let (kind, hint) = match err.kind() {
        std::io::ErrorKind::NotFound => (
            ErrorKind::NotFound,
            "Check the file path; the report file does not exist.",
        ),
        std::io::ErrorKind::PermissionDenied => (
            ErrorKind::Permission,
            "Check file permissions for the current user.",
        ),
        _ => (ErrorKind::Io, "The file could not be read; try again or pick another file."),
    };
    Error::new(kind)
        .with_message("failed to read report file")
        .with_hint(hint)
        .with_path(path)
        .with_source(err)
}

#[cfg(test)]
mod tests {
    use super::{DecodeFailureCategory, Error, ErrorKind, from_read_error, to_exit_code};
    use std::error::Error as _;
    use std::path::Path;

    #[test]
    fn exit_code_mapping_is_stable() {
        let cases = [
            (ErrorKind::Internal, 1),
            (ErrorKind::Usage, 2),
            (ErrorKind::NotFound, 3),
            (ErrorKind::Permission, 6),
            (ErrorKind::Decode, 7),
            (ErrorKind::Io, 8),
        ];

        for (kind, code) in cases {
            assert_eq!(to_exit_code(kind), code);
        }
    }

    #[test]
    fn display_includes_category_and_offset() {
        let err = Error::decode(DecodeFailureCategory::IllFormed)
            .with_message("unclosed element <record>")
            .with_offset(42);
        let text = err.to_string();
        assert!(text.starts_with("Decode: unclosed element <record>"));
        assert!(text.contains("(category: ill-formed)"));
        assert!(text.contains("(offset: 42)"));
    }

    #[test]
    fn read_errors_keep_path_and_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = from_read_error(io_err, Path::new("/tmp/report.xml"));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.path(), Some(Path::new("/tmp/report.xml")));
        assert!(err.hint().is_some());
        assert_eq!(err.source().map(|s| s.to_string()), Some("gone".to_string()));

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(
            from_read_error(denied, Path::new("x.xml")).kind(),
            ErrorKind::Permission
        );
    }
}
