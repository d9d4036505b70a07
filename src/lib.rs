//! Avro schema to IDL converter: read a `.avsc` JSON schema and emit the
//! equivalent Avro IDL (`.avdl`) protocol.
//!
//! The top-level record becomes both the protocol and its first record. Every
//! record and enum defined inline anywhere in the schema is hoisted into its
//! own declaration inside the protocol, in depth-first order.
//!
//! # Converting a file
//!
//! ```no_run
//! use avsc2avdl::Converter;
//!
//! let avdl = Converter::new().convert("schemas/user.avsc")?;
//! print!("{avdl}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Rendering a schema built in code
//!
//! ```
//! use avsc2avdl::model::{Field, Schema, TypeDef};
//!
//! let schema = Schema {
//!     name: "A".to_string(),
//!     namespace: None,
//!     doc: None,
//!     fields: vec![Field::new("x", TypeDef::Int { java_class: None })],
//! };
//! assert_eq!(
//!     avsc2avdl::render_avdl(&schema),
//!     "protocol A {\n    record A {\n        int x;\n    }\n}\n"
//! );
//! ```
//!
//! # Error handling
//!
//! Fallible operations return [`ConvertError`], which implements
//! [`miette::Diagnostic`]; JSON syntax errors carry a labeled source span.
//! Each variant maps to a distinct process exit status via
//! [`ConvertError::exit_code`].

pub mod compiler;
pub mod error;
pub mod import;
pub mod model;
pub mod resolve;
pub(crate) mod suggest;

pub use compiler::Converter;
pub use error::{ConvertError, DuplicateNamedTypeError};
pub use import::load_schema;
pub use model::idl::{render_avdl, render_avdl_with};
pub use resolve::DeclarationPolicy;

/// Command-line synopsis, shared by the binary and usage diagnostics.
pub const USAGE: &str = "Usage: avsc2avdl [--redeclare] <input.avsc> <output.avdl>";
