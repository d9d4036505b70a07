// ==============================================================================
// Loading .avsc JSON into the Schema Model
// ==============================================================================
//
// An `.avsc` file holds one JSON-encoded Avro schema. For conversion to IDL the
// top-level value must be a record; it becomes both the protocol and its first
// record. Nested records and enums are kept inline, exactly where the JSON
// defines them, and every later mention by name becomes a `Reference`.
//
// All validation happens here. The renderer trusts what this module produces:
//   - field names are unique per record, enum symbols are unique
//   - unions are non-empty
//   - a named type is defined at most once
//   - every reference names a record or enum defined earlier in the document
//     (or the record currently being defined, for recursive types)
//
// JSON is a tree and references never expand, so the result is acyclic except
// through `Reference` nodes.

use std::collections::HashSet;

use indexmap::IndexSet;
use miette::{Result, SourceSpan};
use serde_json::{Map, Value};

use crate::error::ConvertError;
use crate::model::schema::{EnumType, Field, RecordType, Schema, TypeDef};
use crate::model::value::DefaultValue;
use crate::suggest;

/// Primitive type names with an IDL rendering.
const PRIMITIVES: [&str; 5] = ["null", "boolean", "int", "long", "string"];

/// Avro types that are valid in `.avsc` but have no counterpart in the model.
const UNSUPPORTED: [&str; 4] = ["float", "double", "bytes", "fixed"];

/// Parse JSON with C-style comment stripping (`//` and `/* */`).
///
/// Avro's Java implementation uses Jackson with `ALLOW_COMMENTS`, so `.avsc`
/// files in the wild may contain comments. Comments are replaced by
/// whitespace, so error positions still match the original text.
pub fn parse_json_with_comments(input: &str) -> std::result::Result<Value, serde_json::Error> {
    serde_json::from_reader(
        json_comments::CommentSettings::c_style().strip_comments(input.as_bytes()),
    )
}

/// Parse `.avsc` text into a [`Schema`].
///
/// `source_name` is only used in diagnostics (typically the file path).
pub fn load_schema(source: &str, source_name: &str) -> std::result::Result<Schema, ConvertError> {
    let json = parse_json_with_comments(source).map_err(|e| {
        ConvertError::schema_parse(
            source,
            source_name,
            json_error_span(source, &e),
            format!("invalid JSON: {e}"),
        )
    })?;

    let mut loader = Loader::new();
    let schema = loader
        .top_level(&json)
        .map_err(|e| ConvertError::schema_parse(source, source_name, None, e.to_string()))?;

    tracing::debug!(
        schema = %schema.name,
        fields = schema.fields.len(),
        named_types = loader.defined.len(),
        "loaded schema from {source_name}"
    );
    Ok(schema)
}

/// Byte span of a JSON syntax error. `serde_json` reports 1-based line and
/// column; EOF errors point one past the last character.
fn json_error_span(source: &str, error: &serde_json::Error) -> Option<SourceSpan> {
    if error.line() == 0 {
        return None;
    }
    let line_start: usize = source
        .split_inclusive('\n')
        .take(error.line() - 1)
        .map(str::len)
        .sum();
    let offset = (line_start + error.column().saturating_sub(1)).min(source.len());
    let len = usize::from(offset < source.len());
    Some((offset, len).into())
}

/// Split a potentially fully-qualified Avro name into `(simple_name, namespace)`.
fn split_qualified_name(raw_name: &str) -> (String, Option<String>) {
    match raw_name.rsplit_once('.') {
        Some((ns, name)) => (name.to_string(), Some(ns.to_string())),
        None => (raw_name.to_string(), None),
    }
}

fn full_name(name: &str, namespace: Option<&str>) -> String {
    match namespace {
        Some(ns) => format!("{ns}.{name}"),
        None => name.to_string(),
    }
}

fn optional_str(obj: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(miette::miette!("'{key}' must be a string, found {other}")),
    }
}

/// Conversion state: the named types defined so far, by full name, and the
/// namespace of the top-level record.
struct Loader {
    defined: IndexSet<String>,
    protocol_namespace: Option<String>,
}

impl Loader {
    fn new() -> Self {
        Loader {
            defined: IndexSet::new(),
            protocol_namespace: None,
        }
    }

    fn top_level(&mut self, json: &Value) -> Result<Schema> {
        let obj = json.as_object().ok_or_else(|| {
            miette::miette!("top-level schema must be a record object, found {json}")
        })?;
        match obj.get("type").and_then(Value::as_str) {
            Some("record" | "error") => {}
            Some(other) => miette::bail!("top-level schema must be a record, found `{other}`"),
            None => miette::bail!("top-level schema missing 'type'"),
        }

        let (record, namespace) = self.parse_record(obj, None)?;
        Ok(Schema {
            name: record.name,
            namespace,
            doc: record.doc,
            fields: record.fields,
        })
    }

    /// Register a named type, rejecting redefinitions.
    ///
    /// The first type defined is the top-level record and fixes the protocol
    /// namespace. IDL declares every nested type by its simple name inside
    /// the protocol, so a nested type in any other namespace is rejected.
    fn define(&mut self, name: &str, namespace: Option<&str>) -> Result<()> {
        let full = full_name(name, namespace);
        if self.defined.is_empty() {
            self.protocol_namespace = namespace.map(str::to_string);
        } else if namespace != self.protocol_namespace.as_deref() {
            let protocol = match &self.protocol_namespace {
                Some(ns) => format!("the protocol namespace `{ns}`"),
                None => "the protocol, which has no namespace".to_string(),
            };
            match namespace {
                Some(ns) => miette::bail!(
                    "named type `{full}` is in namespace `{ns}`, outside {protocol}"
                ),
                None => miette::bail!("named type `{full}` has no namespace, unlike {protocol}"),
            }
        }
        if !self.defined.insert(full.clone()) {
            miette::bail!("named type `{full}` is defined more than once");
        }
        Ok(())
    }

    // ==========================================================================
    // JSON -> TypeDef
    // ==========================================================================

    /// Convert a JSON value to a [`TypeDef`].
    ///
    /// The `namespace` is inherited from the enclosing record and is used to
    /// resolve unqualified references and to qualify nested definitions.
    fn json_to_schema(&mut self, json: &Value, namespace: Option<&str>) -> Result<TypeDef> {
        match json {
            Value::String(s) => self.string_to_schema(s, namespace),
            Value::Array(members) => {
                if members.is_empty() {
                    miette::bail!("union must have at least one member");
                }
                let members = members
                    .iter()
                    .enumerate()
                    .map(|(i, m)| {
                        self.json_to_schema(m, namespace)
                            .map_err(|e| miette::miette!("union member {i}: {e}"))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(TypeDef::Union(members))
            }
            Value::Object(obj) => self.object_to_schema(obj, namespace),
            _ => Err(miette::miette!("invalid schema JSON: {json}")),
        }
    }

    /// A string is either a primitive name or a reference to a named type.
    fn string_to_schema(&self, s: &str, namespace: Option<&str>) -> Result<TypeDef> {
        match s {
            "null" => Ok(TypeDef::Null),
            "int" => Ok(TypeDef::Int { java_class: None }),
            "long" => Ok(TypeDef::Long { java_class: None }),
            "string" => Ok(TypeDef::String { java_class: None }),
            "boolean" => Ok(TypeDef::Boolean { java_class: None }),
            unsupported if UNSUPPORTED.contains(&unsupported) => Err(unsupported_type(unsupported)),
            name => self.resolve_reference(name, namespace),
        }
    }

    fn resolve_reference(&self, name: &str, namespace: Option<&str>) -> Result<TypeDef> {
        let resolves = if name.contains('.') {
            self.defined.contains(name)
        } else {
            namespace.is_some_and(|ns| self.defined.contains(&full_name(name, Some(ns))))
                || self.defined.contains(name)
        };
        if resolves {
            return Ok(TypeDef::Reference(name.to_string()));
        }

        let simple_names = self
            .defined
            .iter()
            .map(|full| full.rsplit_once('.').map_or(full.as_str(), |(_, n)| n));
        let candidates = PRIMITIVES
            .into_iter()
            .chain(simple_names)
            .chain(self.defined.iter().map(String::as_str));
        match suggest::closest(name, candidates) {
            Some(hint) => Err(miette::miette!(
                "undefined type `{name}` (did you mean `{hint}`?)"
            )),
            None => Err(miette::miette!(
                "undefined type `{name}` (named types must be defined before they are referenced)"
            )),
        }
    }

    fn object_to_schema(
        &mut self,
        obj: &Map<String, Value>,
        namespace: Option<&str>,
    ) -> Result<TypeDef> {
        let type_str = match obj.get("type") {
            Some(Value::String(s)) => s.as_str(),
            // `{"type": {...}}` and `{"type": [...]}` wrap another schema.
            Some(nested @ (Value::Object(_) | Value::Array(_))) => {
                return self.json_to_schema(nested, namespace);
            }
            Some(other) => miette::bail!("invalid 'type' value: {other}"),
            None => miette::bail!("schema object missing 'type' field"),
        };

        match type_str {
            "record" | "error" => {
                let (record, _) = self.parse_record(obj, namespace)?;
                Ok(TypeDef::Record(record))
            }
            "enum" => self.parse_enum(obj, namespace).map(TypeDef::Enum),
            "array" => self.parse_array(obj, namespace),
            "map" => self.parse_map(obj, namespace),
            prim @ ("null" | "int" | "long" | "string" | "boolean") => {
                parse_annotated_primitive(obj, prim)
            }
            unsupported if UNSUPPORTED.contains(&unsupported) => Err(unsupported_type(unsupported)),
            other => {
                let tags = PRIMITIVES
                    .into_iter()
                    .chain(["record", "enum", "array", "map"]);
                match suggest::closest(other, tags) {
                    Some(hint) => Err(miette::miette!(
                        "unknown schema type: {other} (did you mean `{hint}`?)"
                    )),
                    None => Err(miette::miette!("unknown schema type: {other}")),
                }
            }
        }
    }

    // ==========================================================================
    // Named Types
    // ==========================================================================

    /// Parse a record, returning it together with its resolved namespace.
    fn parse_record(
        &mut self,
        obj: &Map<String, Value>,
        default_namespace: Option<&str>,
    ) -> Result<(RecordType, Option<String>)> {
        let (name, namespace) = named_type_header(obj, "record", default_namespace)?;
        // Registered before the fields, so fields may refer back to the
        // record itself.
        self.define(&name, namespace.as_deref())?;
        let doc = optional_str(obj, "doc")?;

        let fields_json = match obj.get("fields") {
            Some(Value::Array(fields)) => fields,
            Some(other) => {
                miette::bail!("'fields' of record `{name}` must be an array, found {other}")
            }
            None => miette::bail!("record `{name}` missing 'fields'"),
        };

        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(fields_json.len());
        for (i, field_json) in fields_json.iter().enumerate() {
            let field = self
                .json_to_field(field_json, namespace.as_deref())
                .map_err(|e| miette::miette!("parse field at index {i} of record `{name}`: {e}"))?;
            if !seen.insert(field.name.clone()) {
                miette::bail!("duplicate field name `{}` in record `{name}`", field.name);
            }
            fields.push(field);
        }

        Ok((RecordType { name, doc, fields }, namespace))
    }

    fn parse_enum(
        &mut self,
        obj: &Map<String, Value>,
        default_namespace: Option<&str>,
    ) -> Result<EnumType> {
        let (name, namespace) = named_type_header(obj, "enum", default_namespace)?;
        self.define(&name, namespace.as_deref())?;
        let doc = optional_str(obj, "doc")?;

        let symbols_json = obj
            .get("symbols")
            .and_then(Value::as_array)
            .ok_or_else(|| miette::miette!("enum `{name}` missing 'symbols' array"))?;
        let mut symbols: Vec<String> = Vec::with_capacity(symbols_json.len());
        for symbol in symbols_json {
            let symbol = symbol.as_str().ok_or_else(|| {
                miette::miette!("symbols of enum `{name}` must be strings, found {symbol}")
            })?;
            if symbols.iter().any(|s| s == symbol) {
                miette::bail!("duplicate symbol `{symbol}` in enum `{name}`");
            }
            symbols.push(symbol.to_string());
        }

        Ok(EnumType { name, doc, symbols })
    }

    // ==========================================================================
    // Complex Types
    // ==========================================================================

    fn parse_array(
        &mut self,
        obj: &Map<String, Value>,
        namespace: Option<&str>,
    ) -> Result<TypeDef> {
        let items = obj
            .get("items")
            .ok_or_else(|| miette::miette!("array missing 'items'"))?;
        let items = self
            .json_to_schema(items, namespace)
            .map_err(|e| miette::miette!("parse array items schema: {e}"))?;
        if let Some(key_class) = obj.get("java-key-class") {
            tracing::warn!(
                %key_class,
                "ignoring 'java-key-class' on an array: arrays have no keys"
            );
        }
        Ok(TypeDef::Array {
            items: Box::new(items),
            java_key_class: None,
            java_class: optional_str(obj, "java-class")?,
        })
    }

    fn parse_map(&mut self, obj: &Map<String, Value>, namespace: Option<&str>) -> Result<TypeDef> {
        let values = obj
            .get("values")
            .ok_or_else(|| miette::miette!("map missing 'values'"))?;
        let values = self
            .json_to_schema(values, namespace)
            .map_err(|e| miette::miette!("parse map values schema: {e}"))?;
        Ok(TypeDef::Map {
            values: Box::new(values),
            java_key_class: optional_str(obj, "java-key-class")?,
            java_class: optional_str(obj, "java-class")?,
        })
    }

    // ==========================================================================
    // Fields and Defaults
    // ==========================================================================

    fn json_to_field(&mut self, json: &Value, namespace: Option<&str>) -> Result<Field> {
        let obj = json
            .as_object()
            .ok_or_else(|| miette::miette!("field must be an object"))?;

        let name = obj
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| miette::miette!("field missing 'name'"))?
            .to_string();
        let type_json = obj
            .get("type")
            .ok_or_else(|| miette::miette!("field `{name}` missing 'type'"))?;
        let schema = self
            .json_to_schema(type_json, namespace)
            .map_err(|e| miette::miette!("parse type for field `{name}`: {e}"))?;
        let default = obj
            .get("default")
            .map(json_to_default)
            .transpose()
            .map_err(|e| miette::miette!("default for field `{name}`: {e}"))?;

        Ok(Field {
            name,
            schema,
            doc: optional_str(obj, "doc")?,
            default,
            user_data_type: optional_str(obj, "userDataType")?,
        })
    }
}

/// Resolve the simple name and namespace of a record or enum definition.
///
/// The namespace is the explicit `namespace` key, else the prefix of a dotted
/// `name`, else the enclosing namespace. An empty namespace means none.
fn named_type_header(
    obj: &Map<String, Value>,
    kind: &str,
    default_namespace: Option<&str>,
) -> Result<(String, Option<String>)> {
    let raw_name = obj
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| miette::miette!("{kind} missing 'name'"))?;
    let (name, inferred_ns) = split_qualified_name(raw_name);
    if name.is_empty() {
        miette::bail!("{kind} has an empty name");
    }
    let namespace = optional_str(obj, "namespace")?
        .or(inferred_ns)
        .or_else(|| default_namespace.map(str::to_string))
        .filter(|ns| !ns.is_empty());
    Ok((name, namespace))
}

/// Parse a primitive written in object form, e.g.
/// `{"type": "string", "java-class": "java.math.BigDecimal"}`.
fn parse_annotated_primitive(obj: &Map<String, Value>, prim: &str) -> Result<TypeDef> {
    if let Some(logical) = obj.get("logicalType").and_then(Value::as_str) {
        tracing::warn!(
            logical_type = logical,
            "logical types are not rendered; using the underlying `{prim}`"
        );
    }
    let java_class = optional_str(obj, "java-class")?;
    Ok(match prim {
        "int" => TypeDef::Int { java_class },
        "long" => TypeDef::Long { java_class },
        "string" => TypeDef::String { java_class },
        "boolean" => TypeDef::Boolean { java_class },
        _ => TypeDef::Null,
    })
}

fn unsupported_type(name: &str) -> miette::Report {
    miette::miette!(
        "unsupported Avro type `{name}` (supported: null, int, long, string, boolean, \
         record, enum, union, map, array)"
    )
}

/// Map a JSON default onto the literal shapes IDL can express.
///
/// Strings are re-escaped with JSON escaping so the result can be placed
/// between double quotes as is. Numbers keep their source spelling.
fn json_to_default(json: &Value) -> Result<DefaultValue> {
    match json {
        Value::Null => Ok(DefaultValue::Null),
        Value::Bool(b) => Ok(DefaultValue::Bool(*b)),
        Value::Number(n) => Ok(DefaultValue::Num(n.to_string())),
        Value::String(s) => {
            let quoted = Value::String(s.clone()).to_string();
            Ok(DefaultValue::Str(quoted[1..quoted.len() - 1].to_string()))
        }
        Value::Object(obj) if obj.is_empty() => Ok(DefaultValue::EmptyMap),
        Value::Array(arr) if arr.is_empty() => Ok(DefaultValue::EmptyArray),
        other => Err(miette::miette!(
            "unsupported default value {other} \
             (only null, strings, numbers, booleans, {{}} and [] are supported)"
        )),
    }
}
