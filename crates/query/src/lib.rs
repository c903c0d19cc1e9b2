//! Raw query mini-language for the Inkwell blogging backend.
//!
//! Clients express filters, sorts and projections as URL tokens:
//!
//! - `field__symbol__value` filters, with symbol one of `==`, `!=`, `>`, `<`,
//!   `>=`, `<=`
//! - `field__asc` / `field__desc` sorts
//! - comma-separated projection lists
//!
//! The parser turns those tokens into a [`QueryOptions`] value that the
//! document-store and relational query builders both consume. Filter values
//! are coerced into a closed [`Value`] sum type at parse time, guided by
//! per-entity [`FieldTypes`].

pub mod error;
pub mod filter;
pub mod options;
pub mod parser;
pub mod patch;
pub mod value;

pub use error::ParseError;
pub use filter::{Filter, Operator, Sort};
pub use options::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Pagination, QueryOptions};
pub use parser::{parse_fields, parse_filters, parse_filters_with, parse_sorts, validate_field};
pub use patch::Patch;
pub use value::{FieldKind, FieldTypes, Value};
