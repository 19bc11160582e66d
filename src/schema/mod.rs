//! Schema subsystem
//!
//! Validators, schemas and the runtime value model.
//!
//! # Design Principles
//!
//! - A validator is a value; validators compose by nesting
//! - Validation returns the validated value, which may differ from the input
//! - Schemas are immutable once built and shared behind `Arc`
//! - Field order is declaration order, for validation and for output
//! - The first failure aborts, carrying the path to the bad value

mod errors;
mod library;
mod timestamp;
mod types;
mod validator;
mod value;

pub use errors::{PathSegment, SchemaError, SchemaErrorCode, SchemaResult};
pub use library::{EnumType, LibraryType, TimestampType, UuidType};
pub use timestamp::{format_instant, parse_timestamp, Timestamp, TimestampError, TimestampFormat};
pub use types::{Field, Schema, SchemaBuilder};
pub use validator::{Kind, MapEntry, Pattern, Target, UseFn, Validator};
pub use value::{map_of, Map, Value};
