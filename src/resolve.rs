// ==============================================================================
// Sub-declaration Discovery: Which Named Types a Field Type Requires
// ==============================================================================
//
// An `.avsc` schema defines records and enums inline, at the point of first
// use. Avro IDL instead wants every named type declared once, at protocol
// level, and referenced by bare name from field types. This module walks a
// type tree and yields the record/enum definitions it contains, in the order
// they must be declared: depth-first, parent before children, fields and union
// members in source order.
//
// Whether a second inline definition of an already-declared name is emitted
// again is governed by `DeclarationPolicy`.

use indexmap::IndexMap;

use crate::error::DuplicateNamedTypeError;
use crate::model::schema::{EnumType, RecordType, TypeDef};

/// How repeated inline definitions of the same named type are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeclarationPolicy {
    /// Declare a record or enum every time it is reached inline, even when an
    /// identical definition was already declared.
    Redeclare,
    /// Declare each name once. A later identical definition is treated as a
    /// reference (neither it nor its children are declared again). A later
    /// definition with the same name but a different body is an error.
    #[default]
    Deduplicate,
}

/// A record or enum that needs its own declaration block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration<'a> {
    Record(&'a RecordType),
    Enum(&'a EnumType),
}

impl<'a> Declaration<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Declaration::Record(r) => &r.name,
            Declaration::Enum(e) => &e.name,
        }
    }
}

/// Names declared so far in one rendering, with the definition each was
/// declared with.
#[derive(Debug, Default)]
pub struct DeclarationRegistry<'a> {
    declared: IndexMap<&'a str, Declaration<'a>>,
}

/// Outcome of offering a declaration to the registry.
#[derive(Debug, PartialEq, Eq)]
pub enum Registration {
    /// First time this name is seen.
    New,
    /// Seen before with an identical definition.
    Repeat,
}

impl<'a> DeclarationRegistry<'a> {
    pub fn new() -> Self {
        DeclarationRegistry {
            declared: IndexMap::new(),
        }
    }

    /// Record a declaration. Returns an error if the name is already declared
    /// with a different definition.
    pub fn register(
        &mut self,
        decl: Declaration<'a>,
    ) -> Result<Registration, DuplicateNamedTypeError> {
        match self.declared.get(decl.name()) {
            Some(existing) if *existing == decl => Ok(Registration::Repeat),
            Some(_) => Err(DuplicateNamedTypeError {
                name: decl.name().to_string(),
            }),
            None => {
                self.declared.insert(decl.name(), decl);
                Ok(Registration::New)
            }
        }
    }

    /// Declared names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.declared.keys().copied()
    }
}

/// Lazy depth-first walk over the declarations required by a type tree.
///
/// Uses an explicit stack, so deeply nested schemas do not grow the call
/// stack. Children are pushed in reverse so they pop in source order.
pub struct SubDeclarations<'a> {
    stack: Vec<&'a TypeDef>,
    registry: Option<DeclarationRegistry<'a>>,
    failed: bool,
}

impl<'a> SubDeclarations<'a> {
    /// Walk `roots` in order, declaring every inline definition.
    pub fn redeclare(roots: impl IntoIterator<Item = &'a TypeDef>) -> Self {
        Self::with_registry(roots, None)
    }

    /// Walk `roots` in order, consulting `registry` so that each name is
    /// declared at most once. Names already in `registry` count as declared.
    pub fn deduplicate(
        roots: impl IntoIterator<Item = &'a TypeDef>,
        registry: DeclarationRegistry<'a>,
    ) -> Self {
        Self::with_registry(roots, Some(registry))
    }

    fn with_registry(
        roots: impl IntoIterator<Item = &'a TypeDef>,
        registry: Option<DeclarationRegistry<'a>>,
    ) -> Self {
        let mut stack: Vec<&'a TypeDef> = roots.into_iter().collect();
        stack.reverse();
        SubDeclarations {
            stack,
            registry,
            failed: false,
        }
    }

    /// The registry of declared names, when deduplicating.
    pub fn registry(&self) -> Option<&DeclarationRegistry<'a>> {
        self.registry.as_ref()
    }

    /// Returns false if this declaration was already made and must be skipped.
    fn admit(&mut self, decl: Declaration<'a>) -> Result<bool, DuplicateNamedTypeError> {
        match self.registry.as_mut() {
            None => Ok(true),
            Some(registry) => Ok(registry.register(decl)? == Registration::New),
        }
    }
}

impl<'a> Iterator for SubDeclarations<'a> {
    type Item = Result<Declaration<'a>, DuplicateNamedTypeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        while let Some(schema) = self.stack.pop() {
            match schema {
                TypeDef::Record(record) => {
                    let decl = Declaration::Record(record);
                    match self.admit(decl) {
                        Ok(true) => {
                            self.stack
                                .extend(record.fields.iter().rev().map(|f| &f.schema));
                            return Some(Ok(decl));
                        }
                        Ok(false) => continue,
                        Err(e) => {
                            self.failed = true;
                            return Some(Err(e));
                        }
                    }
                }
                TypeDef::Enum(enumeration) => {
                    let decl = Declaration::Enum(enumeration);
                    match self.admit(decl) {
                        Ok(true) => return Some(Ok(decl)),
                        Ok(false) => continue,
                        Err(e) => {
                            self.failed = true;
                            return Some(Err(e));
                        }
                    }
                }
                TypeDef::Union(members) => self.stack.extend(members.iter().rev()),
                TypeDef::Map { values, .. } => self.stack.push(values),
                TypeDef::Array { items, .. } => self.stack.push(items),
                TypeDef::Null
                | TypeDef::Int { .. }
                | TypeDef::Long { .. }
                | TypeDef::String { .. }
                | TypeDef::Boolean { .. }
                | TypeDef::Reference(_) => {}
            }
        }
        None
    }
}

/// The declarations a single type requires, re-declaring repeated
/// definitions. Never fails.
pub fn sub_declarations(schema: &TypeDef) -> impl Iterator<Item = Declaration<'_>> {
    SubDeclarations::redeclare(std::iter::once(schema)).filter_map(Result::ok)
}
