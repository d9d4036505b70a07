use super::value::DefaultValue;

/// An Avro type, restricted to the shapes that have an IDL rendering in this
/// tool.
///
/// The tree is built once by the loader and never mutated afterwards. Named
/// types (`Record`, `Enum`) own their definitions inline; every later mention
/// of the same type is a `Reference`, which never expands into a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDef {
    // =========================================================================
    // Primitives, each with an optional `java-class` stringable hint
    // =========================================================================
    Null,
    Int {
        java_class: Option<std::string::String>,
    },
    Long {
        java_class: Option<std::string::String>,
    },
    String {
        java_class: Option<std::string::String>,
    },
    Boolean {
        java_class: Option<std::string::String>,
    },

    // =========================================================================
    // Named types
    // =========================================================================
    Enum(EnumType),
    Record(RecordType),

    // =========================================================================
    // Complex types
    // =========================================================================
    /// Member order is significant and preserved from the input.
    Union(Vec<TypeDef>),
    Map {
        values: Box<TypeDef>,
        java_key_class: Option<std::string::String>,
        java_class: Option<std::string::String>,
    },
    /// `java_key_class` mirrors the map shape. Arrays have no keys, so the
    /// loader never sets it.
    Array {
        items: Box<TypeDef>,
        java_key_class: Option<std::string::String>,
        java_class: Option<std::string::String>,
    },

    // =========================================================================
    // Reference to a record or enum defined elsewhere in the tree.
    // =========================================================================
    Reference(std::string::String),
}

/// A record definition, either nested inside a field type or (via
/// [`Schema::as_record`]) the top-level record itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordType {
    pub name: String,
    pub doc: Option<String>,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub doc: Option<String>,
    pub symbols: Vec<String>,
}

/// A field in a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub schema: TypeDef,
    pub doc: Option<String>,
    pub default: Option<DefaultValue>,
    /// Rendered as `@userDataType("...")` after the type.
    pub user_data_type: Option<String>,
}

/// The top-level record. It becomes both the IDL protocol and the first
/// record inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub name: String,
    pub namespace: Option<String>,
    pub doc: Option<String>,
    pub fields: Vec<Field>,
}

impl Field {
    /// A field with only a name and a type.
    pub fn new(name: impl Into<String>, schema: TypeDef) -> Self {
        Field {
            name: name.into(),
            schema,
            doc: None,
            default: None,
            user_data_type: None,
        }
    }
}

impl Schema {
    /// View the top-level schema as a record declaration, so it can take part
    /// in duplicate-name checks against nested records.
    pub fn as_record(&self) -> RecordType {
        RecordType {
            name: self.name.clone(),
            doc: self.doc.clone(),
            fields: self.fields.clone(),
        }
    }
}
