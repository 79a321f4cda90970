//! String validators used by the reader when decoding `s`, `o`, and `g`
//! values: UTF-8 body well-formedness, object-path grammar, and (via
//! [`crate::type_system`]) signature grammar.

pub mod path;
pub mod utf8;

pub use path::is_valid as is_path;
pub use utf8::is_valid as is_string;
