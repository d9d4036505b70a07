// ==============================================================================
// Library API: the `Converter` Builder
// ==============================================================================
//
// Chains the loader (`.avsc` JSON -> `Schema`) and the renderer (`Schema` ->
// `.avdl` text). Follows the non-consuming `&mut self` builder pattern, so the
// same converter can be configured once and reused for many inputs. No state
// is carried from one conversion to the next.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::ConvertError;
use crate::import::load_schema;
use crate::model::idl::render_avdl_with;
use crate::model::schema::Schema;
use crate::resolve::DeclarationPolicy;

/// Builder for converting Avro JSON schemas to Avro IDL.
///
/// # Examples
///
/// ```no_run
/// use avsc2avdl::{Converter, DeclarationPolicy};
///
/// let avdl = Converter::new().convert("schemas/user.avsc")?;
/// std::fs::write("schemas/user.avdl", avdl)?;
///
/// // Keep the historical output, where a repeated inline definition is
/// // declared again every time it appears.
/// let avdl = Converter::new()
///     .policy(DeclarationPolicy::Redeclare)
///     .convert_str(r#"{"type": "record", "name": "A", "fields": []}"#, "<inline>")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Converter {
    policy: DeclarationPolicy,
}

impl Converter {
    /// Create a converter with the default [`DeclarationPolicy::Deduplicate`].
    pub fn new() -> Self {
        Converter {
            policy: DeclarationPolicy::default(),
        }
    }

    /// Choose how repeated inline definitions of a named type are declared.
    pub fn policy(&mut self, policy: DeclarationPolicy) -> &mut Self {
        self.policy = policy;
        self
    }

    /// Read and convert an `.avsc` file.
    pub fn convert(&mut self, path: impl AsRef<Path>) -> Result<String, ConvertError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConvertError::InputNotFound {
                path: path.to_path_buf(),
            },
            _ => ConvertError::Read {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        self.convert_str(&source, &path.display().to_string())
    }

    /// Convert `.avsc` text. `name` identifies the source in diagnostics.
    pub fn convert_str(&mut self, source: &str, name: &str) -> Result<String, ConvertError> {
        let schema = load_schema(source, name)?;
        self.render(&schema)
    }

    /// Render an already-loaded schema.
    pub fn render(&self, schema: &Schema) -> Result<String, ConvertError> {
        Ok(render_avdl_with(schema, self.policy)?)
    }
}
