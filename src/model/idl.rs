// ==============================================================================
// Avro IDL Rendering
// ==============================================================================
//
// Turns a `Schema` into `.avdl` text: one protocol named after the top-level
// record, containing that record followed by a declaration for every nested
// record and enum, in discovery order (see `resolve.rs`).
//
// The layout is a compatibility contract with previously generated files and
// must be reproduced byte for byte. In particular, indentation for level `L`
// is `L + 1` groups of four spaces: declarations at level 0 are already
// indented once inside the protocol body.

use crate::error::DuplicateNamedTypeError;
use crate::model::schema::{EnumType, Field, RecordType, Schema, TypeDef};
use crate::resolve::{Declaration, DeclarationPolicy, DeclarationRegistry, SubDeclarations};

const INDENT: &str = "    ";

fn indent(level: usize) -> String {
    INDENT.repeat(level + 1)
}

/// Render a schema, declaring every inline record and enum each time it is
/// reached. This never fails.
pub fn render_avdl(schema: &Schema) -> String {
    let declarations: Vec<_> =
        SubDeclarations::redeclare(schema.fields.iter().map(|f| &f.schema))
            .filter_map(Result::ok)
            .collect();
    write_protocol(schema, &declarations)
}

/// Render a schema under the given declaration policy.
///
/// With [`DeclarationPolicy::Deduplicate`] the top-level record counts as
/// already declared, so an inline copy of it is not declared a second time.
pub fn render_avdl_with(
    schema: &Schema,
    policy: DeclarationPolicy,
) -> Result<String, DuplicateNamedTypeError> {
    match policy {
        DeclarationPolicy::Redeclare => Ok(render_avdl(schema)),
        DeclarationPolicy::Deduplicate => {
            let top = schema.as_record();
            let mut registry = DeclarationRegistry::new();
            registry.register(Declaration::Record(&top))?;
            let declarations = SubDeclarations::deduplicate(
                schema.fields.iter().map(|f| &f.schema),
                registry,
            )
            .collect::<Result<Vec<_>, _>>()?;
            Ok(write_protocol(schema, &declarations))
        }
    }
}

fn write_protocol(schema: &Schema, declarations: &[Declaration<'_>]) -> String {
    tracing::debug!(
        protocol = %schema.name,
        fields = schema.fields.len(),
        declarations = declarations.len(),
        "rendering protocol"
    );

    let mut out = String::new();
    if let Some(namespace) = &schema.namespace {
        out.push_str(&format!("@namespace(\"{namespace}\")\n"));
    }
    out.push_str(&format!("protocol {} {{\n", schema.name));
    out.push_str(&doc_comment(schema.doc.as_deref(), 0));
    out.push_str(&record_body(&schema.name, &schema.fields, 0));

    if !declarations.is_empty() {
        let blocks: Vec<String> = declarations
            .iter()
            .map(|decl| declaration_to_idl(decl, 0))
            .collect();
        out.push_str("\n\n");
        out.push_str(&blocks.join("\n\n"));
    }

    out.push_str("\n}\n");
    out
}

/// Render one record or enum declaration block, including its doc comment.
pub fn declaration_to_idl(decl: &Declaration<'_>, level: usize) -> String {
    match decl {
        Declaration::Record(RecordType { name, doc, fields }) => format!(
            "{}{}",
            doc_comment(doc.as_deref(), level),
            record_body(name, fields, level)
        ),
        Declaration::Enum(EnumType { name, doc, symbols }) => {
            let symbols: Vec<String> = symbols
                .iter()
                .map(|symbol| format!("{}{symbol}", indent(level + 1)))
                .collect();
            format!(
                "{}{pad}enum {name} {{\n{}\n{pad}}}",
                doc_comment(doc.as_deref(), level),
                symbols.join(",\n"),
                pad = indent(level),
            )
        }
    }
}

fn record_body(name: &str, fields: &[Field], level: usize) -> String {
    let fields: Vec<String> = fields.iter().map(|f| field_to_idl(f, level + 1)).collect();
    format!(
        "{pad}record {name} {{\n{}\n{pad}}}",
        fields.join("\n"),
        pad = indent(level)
    )
}

fn doc_comment(doc: Option<&str>, level: usize) -> String {
    match doc {
        Some(doc) => format!("{}/** {doc} */\n", indent(level)),
        None => String::new(),
    }
}

/// Render a field declaration line (with its doc comment, if any).
pub fn field_to_idl(field: &Field, level: usize) -> String {
    let user_data_type = field
        .user_data_type
        .as_deref()
        .map(|udt| format!(" @userDataType(\"{udt}\")"))
        .unwrap_or_default();
    let default = field
        .default
        .as_ref()
        .map(|value| format!(" = {}", value.to_literal()))
        .unwrap_or_default();
    format!(
        "{}{}{}{user_data_type} {}{default};",
        doc_comment(field.doc.as_deref(), level),
        indent(level),
        type_name(&field.schema),
        field.name,
    )
}

/// Render the IDL spelling of a type as used in a field, union member, map
/// value, or array item.
pub fn type_name(schema: &TypeDef) -> String {
    let name = match schema {
        TypeDef::Null => "null".to_string(),
        TypeDef::Int { .. } => "int".to_string(),
        TypeDef::Long { .. } => "long".to_string(),
        TypeDef::String { .. } => "string".to_string(),
        TypeDef::Boolean { .. } => "boolean".to_string(),
        TypeDef::Enum(EnumType { name, .. })
        | TypeDef::Record(RecordType { name, .. })
        | TypeDef::Reference(name) => name.clone(),
        TypeDef::Union(members) => {
            let members: Vec<String> = members.iter().map(type_name).collect();
            format!("union {{ {} }}", members.join(", "))
        }
        TypeDef::Map { values, .. } => format!("map<{}>", type_name(values)),
        TypeDef::Array { items, .. } => format!("array<{}>", type_name(items)),
    };
    format!("{}{name}", java_annotations(schema))
}

/// `@java-key-class` and `@java-class` annotations, each followed by a space.
fn java_annotations(schema: &TypeDef) -> String {
    let (key_class, class) = match schema {
        TypeDef::Int { java_class }
        | TypeDef::Long { java_class }
        | TypeDef::String { java_class }
        | TypeDef::Boolean { java_class } => (None, java_class.as_deref()),
        TypeDef::Map {
            java_key_class,
            java_class,
            ..
        }
        | TypeDef::Array {
            java_key_class,
            java_class,
            ..
        } => (java_key_class.as_deref(), java_class.as_deref()),
        TypeDef::Null
        | TypeDef::Enum(_)
        | TypeDef::Record(_)
        | TypeDef::Union(_)
        | TypeDef::Reference(_) => (None, None),
    };

    let mut out = String::new();
    if let Some(key_class) = key_class {
        out.push_str(&format!("@java-key-class(\"{key_class}\") "));
    }
    if let Some(class) = class {
        out.push_str(&format!("@java-class(\"{class}\") "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::value::DefaultValue;
    use pretty_assertions::assert_eq;

    fn int() -> TypeDef {
        TypeDef::Int { java_class: None }
    }

    fn long() -> TypeDef {
        TypeDef::Long { java_class: None }
    }

    fn string() -> TypeDef {
        TypeDef::String { java_class: None }
    }

    fn boolean() -> TypeDef {
        TypeDef::Boolean { java_class: None }
    }

    fn record(name: &str, fields: Vec<Field>) -> TypeDef {
        TypeDef::Record(RecordType {
            name: name.to_string(),
            doc: None,
            fields,
        })
    }

    fn schema(name: &str, fields: Vec<Field>) -> Schema {
        Schema {
            name: name.to_string(),
            namespace: None,
            doc: None,
            fields,
        }
    }

    // =========================================================================
    // Protocol layout
    // =========================================================================

    #[test]
    fn minimal_schema() {
        let s = schema("A", vec![Field::new("x", int())]);
        assert_eq!(
            render_avdl(&s),
            "protocol A {\n    record A {\n        int x;\n    }\n}\n"
        );
    }

    #[test]
    fn namespace_is_the_first_line() {
        let s = Schema {
            namespace: Some("com.x".to_string()),
            ..schema("A", vec![Field::new("x", int())])
        };
        let out = render_avdl(&s);
        assert!(out.starts_with("@namespace(\"com.x\")\nprotocol A {\n"), "{out}");
    }

    #[test]
    fn no_namespace_means_no_leading_line() {
        let out = render_avdl(&schema("A", vec![Field::new("x", int())]));
        assert!(out.starts_with("protocol A {\n"), "{out}");
        assert!(out.ends_with("}\n"));
    }

    #[test]
    fn protocol_doc_goes_before_the_top_record() {
        let s = Schema {
            doc: Some("Top level.".to_string()),
            ..schema("A", vec![Field::new("x", int())])
        };
        assert_eq!(
            render_avdl(&s),
            "protocol A {\n    /** Top level. */\n    record A {\n        int x;\n    }\n}\n"
        );
    }

    #[test]
    fn record_without_fields_keeps_an_empty_line() {
        assert_eq!(
            render_avdl(&schema("Empty", vec![])),
            "protocol Empty {\n    record Empty {\n\n    }\n}\n"
        );
    }

    // =========================================================================
    // Fields
    // =========================================================================

    #[test]
    fn union_field() {
        let f = Field::new("y", TypeDef::Union(vec![TypeDef::Null, string()]));
        assert_eq!(field_to_idl(&f, 1), "        union { null, string } y;");
    }

    #[test]
    fn defaults() {
        let cases = [
            (DefaultValue::Null, " = null;"),
            (DefaultValue::Str("hi".to_string()), " = \"hi\";"),
            (DefaultValue::Num("-1.5e3".to_string()), " = -1.5e3;"),
            (DefaultValue::Bool(true), " = true;"),
            (DefaultValue::EmptyMap, " = {};"),
            (DefaultValue::EmptyArray, " = [];"),
        ];
        for (value, suffix) in cases {
            let f = Field {
                default: Some(value),
                ..Field::new("v", string())
            };
            let line = field_to_idl(&f, 1);
            assert!(line.ends_with(&format!(" v{suffix}")), "{line}");
        }
    }

    #[test]
    fn field_doc_and_user_data_type() {
        let f = Field {
            doc: Some("The id.".to_string()),
            user_data_type: Some("Identifier".to_string()),
            default: Some(DefaultValue::Str("none".to_string())),
            ..Field::new("id", string())
        };
        assert_eq!(
            field_to_idl(&f, 1),
            "        /** The id. */\n        string @userDataType(\"Identifier\") id = \"none\";"
        );
    }

    // =========================================================================
    // Type names
    // =========================================================================

    #[test]
    fn primitive_and_named_type_names() {
        assert_eq!(type_name(&TypeDef::Null), "null");
        assert_eq!(type_name(&int()), "int");
        assert_eq!(type_name(&long()), "long");
        assert_eq!(type_name(&string()), "string");
        assert_eq!(type_name(&boolean()), "boolean");
        assert_eq!(type_name(&record("Inner", vec![])), "Inner");
        assert_eq!(
            type_name(&TypeDef::Reference("org.example.Other".to_string())),
            "org.example.Other"
        );
    }

    #[test]
    fn nested_collections() {
        let ty = TypeDef::Map {
            values: Box::new(TypeDef::Array {
                items: Box::new(TypeDef::Union(vec![TypeDef::Null, long()])),
                java_key_class: None,
                java_class: None,
            }),
            java_key_class: None,
            java_class: None,
        };
        assert_eq!(type_name(&ty), "map<array<union { null, long }>>");
    }

    #[test]
    fn java_class_annotations() {
        let s = TypeDef::String {
            java_class: Some("java.math.BigDecimal".to_string()),
        };
        assert_eq!(type_name(&s), "@java-class(\"java.math.BigDecimal\") string");

        let m = TypeDef::Map {
            values: Box::new(int()),
            java_key_class: Some("java.io.File".to_string()),
            java_class: Some("java.util.TreeMap".to_string()),
        };
        assert_eq!(
            type_name(&m),
            "@java-key-class(\"java.io.File\") @java-class(\"java.util.TreeMap\") map<int>"
        );

        let a = TypeDef::Array {
            items: Box::new(s),
            java_key_class: None,
            java_class: Some("java.util.LinkedList".to_string()),
        };
        assert_eq!(
            type_name(&a),
            "@java-class(\"java.util.LinkedList\") array<@java-class(\"java.math.BigDecimal\") string>"
        );
    }

    // =========================================================================
    // Nested declarations
    // =========================================================================

    #[test]
    fn three_level_nesting_order_and_spacing() {
        let b_inner = record("BInner", vec![Field::new("flag", boolean())]);
        let b = record("B", vec![Field::new("inner", b_inner)]);
        let d = record("D", vec![Field::new("n", long())]);
        let c = record("C", vec![Field::new("d", d)]);
        let s = schema("A", vec![Field::new("b", b), Field::new("c", c)]);

        let expected = "\
protocol A {
    record A {
        B b;
        C c;
    }

    record B {
        BInner inner;
    }

    record BInner {
        boolean flag;
    }

    record C {
        D d;
    }

    record D {
        long n;
    }
}
";
        assert_eq!(render_avdl(&s), expected);
    }

    #[test]
    fn enum_declaration() {
        let suit = TypeDef::Enum(EnumType {
            name: "Suit".to_string(),
            doc: Some("Card suit.".to_string()),
            symbols: vec!["HEARTS".to_string(), "SPADES".to_string()],
        });
        let s = schema("Card", vec![Field::new("suit", suit)]);
        let expected = "\
protocol Card {
    record Card {
        Suit suit;
    }

    /** Card suit. */
    enum Suit {
        HEARTS,
        SPADES
    }
}
";
        assert_eq!(render_avdl(&s), expected);
    }

    #[test]
    fn references_do_not_declare() {
        let s = schema(
            "Node",
            vec![Field::new(
                "next",
                TypeDef::Union(vec![TypeDef::Null, TypeDef::Reference("Node".to_string())]),
            )],
        );
        assert_eq!(
            render_avdl(&s),
            "protocol Node {\n    record Node {\n        union { null, Node } next;\n    }\n}\n"
        );
    }

    // =========================================================================
    // Declaration policies
    // =========================================================================

    fn repeated_inner() -> Schema {
        let inner = record("Inner", vec![Field::new("i", int())]);
        schema(
            "Outer",
            vec![Field::new("first", inner.clone()), Field::new("second", inner)],
        )
    }

    #[test]
    fn redeclare_repeats_identical_records() {
        let out = render_avdl_with(&repeated_inner(), DeclarationPolicy::Redeclare)
            .expect("redeclare never fails");
        assert_eq!(out.matches("record Inner {").count(), 2);
        assert_eq!(out, render_avdl(&repeated_inner()));
    }

    #[test]
    fn deduplicate_declares_once() {
        let out = render_avdl_with(&repeated_inner(), DeclarationPolicy::Deduplicate)
            .expect("identical repeat is allowed");
        let expected = "\
protocol Outer {
    record Outer {
        Inner first;
        Inner second;
    }

    record Inner {
        int i;
    }
}
";
        assert_eq!(out, expected);
    }

    #[test]
    fn deduplicate_rejects_conflicting_records() {
        let s = schema(
            "Outer",
            vec![
                Field::new("first", record("Inner", vec![Field::new("i", int())])),
                Field::new("second", record("Inner", vec![Field::new("j", int())])),
            ],
        );
        let err = render_avdl_with(&s, DeclarationPolicy::Deduplicate)
            .expect_err("conflicting definitions");
        assert_eq!(err.name, "Inner");
    }

    #[test]
    fn deduplicate_treats_top_level_as_declared() {
        // The inline `Outer` has no fields, unlike the top-level one.
        let s = schema(
            "Outer",
            vec![Field::new("self_copy", record("Outer", vec![]))],
        );
        let err = render_avdl_with(&s, DeclarationPolicy::Deduplicate)
            .expect_err("inline record differs from the top-level one");
        assert_eq!(err.name, "Outer");
    }

    #[test]
    fn rendering_is_deterministic() {
        let s = repeated_inner();
        assert_eq!(render_avdl(&s), render_avdl(&s.clone()));
    }
}
