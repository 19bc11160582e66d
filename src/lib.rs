//! aeroschema - schema-validated records with JSON and text-format serialization
//!
//! Records are declared by a [`schema::Schema`]: an ordered set of fields,
//! each with a composable [`schema::Validator`]. Every construction and
//! every assignment is validated, and records move to and from JSON (or an
//! alternate text format) through a JSON-shaped value tree.

pub mod codec;
pub mod config;
pub mod format;
pub mod record;
pub mod schema;

pub use config::{CodecConfig, JsonFormat};
pub use format::FormatAdapter;
pub use record::{Record, Schemed};
pub use schema::{Schema, SchemaError, SchemaResult, Validator, Value};
