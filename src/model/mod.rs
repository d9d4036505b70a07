pub mod idl;
pub mod schema;
pub mod value;

pub use schema::{EnumType, Field, RecordType, Schema, TypeDef};
pub use value::DefaultValue;
