use std::path::PathBuf;

use miette::{LabeledSpan, NamedSource, SourceSpan};

/// A schema parse error, optionally pointing at the offending location in the
/// `.avsc` source.
///
/// JSON syntax errors carry a span. Structural errors found after parsing
/// (unknown types, duplicate fields, ...) only carry a message, since
/// `serde_json::Value` does not retain positions.
#[derive(Debug)]
pub struct ParseDiagnostic {
    pub src: NamedSource<String>,
    pub span: Option<SourceSpan>,
    pub message: String,
}

impl std::fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseDiagnostic {}

impl miette::Diagnostic for ParseDiagnostic {
    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.span.map(|_| &self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(self.message.clone()),
            span,
        ))))
    }
}

/// Two declarations with the same name but different structure were reached
/// while discovering nested declarations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("named type `{name}` is declared twice with different definitions")]
pub struct DuplicateNamedTypeError {
    pub name: String,
}

impl miette::Diagnostic for DuplicateNamedTypeError {
    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(
            "define the type once and refer to it by name everywhere else",
        ))
    }
}

/// Every way a conversion can fail. Each variant maps to its own process exit
/// status via [`ConvertError::exit_code`].
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("{message}")]
    Usage { message: String },

    #[error("input file does not exist: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    SchemaParse(Box<ParseDiagnostic>),

    #[error("write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    DuplicateNamedType(#[from] DuplicateNamedTypeError),
}

impl ConvertError {
    /// Process exit status for this error class. Zero is reserved for success
    /// and 1 for failures outside this taxonomy.
    pub fn exit_code(&self) -> u8 {
        match self {
            ConvertError::Usage { .. } => 2,
            ConvertError::InputNotFound { .. } | ConvertError::Read { .. } => 3,
            ConvertError::SchemaParse(_) => 4,
            ConvertError::Write { .. } => 5,
            ConvertError::DuplicateNamedType(_) => 6,
        }
    }

    pub(crate) fn schema_parse(
        source: &str,
        source_name: &str,
        span: Option<SourceSpan>,
        message: impl Into<String>,
    ) -> Self {
        ConvertError::SchemaParse(Box::new(ParseDiagnostic {
            src: NamedSource::new(source_name, source.to_string()),
            span,
            message: message.into(),
        }))
    }
}

impl miette::Diagnostic for ConvertError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let code = match self {
            ConvertError::Usage { .. } => "avsc2avdl::usage",
            ConvertError::InputNotFound { .. } => "avsc2avdl::input_not_found",
            ConvertError::Read { .. } => "avsc2avdl::read",
            ConvertError::SchemaParse(_) => "avsc2avdl::schema_parse",
            ConvertError::Write { .. } => "avsc2avdl::write",
            ConvertError::DuplicateNamedType(_) => "avsc2avdl::duplicate_named_type",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        match self {
            ConvertError::Usage { .. } => Some(Box::new(crate::USAGE)),
            ConvertError::DuplicateNamedType(e) => miette::Diagnostic::help(e),
            _ => None,
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            ConvertError::SchemaParse(diag) => miette::Diagnostic::source_code(diag.as_ref()),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            ConvertError::SchemaParse(diag) => miette::Diagnostic::labels(diag.as_ref()),
            _ => None,
        }
    }
}
