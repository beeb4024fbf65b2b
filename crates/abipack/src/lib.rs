//! Schema-directed coercion of loosely-typed call arguments.
//!
//! A caller hands over one [`DynamicValue`] (maps, records, hex strings, native
//! numbers, ...) and a method descriptor; [`to_args`] walks the method's
//! parameters and produces the exact [`TypedValue`]s a binary encoder expects.

pub mod abi_json;
pub mod args;
pub mod coerce;
pub mod error;
pub mod numeric;
pub mod resolve;
pub mod selector;
pub mod typed;
pub mod types;
pub mod value;

pub use abi_json::Abi;
pub use args::{coerce_positional, to_args, ArgPacker, Encoder, SchemaProvider};
pub use coerce::coerce;
pub use error::{Error, ErrorKind, PackError};
pub use resolve::{resolve, Field};
pub use selector::{function_ref, method_selector};
pub use typed::TypedValue;
pub use types::{Method, Param, ParamType, TupleField};
pub use value::{Address, DynamicValue};
