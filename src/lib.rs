//! D-Bus variant type-system.
//!
//! This crate implements the D-Bus wire type system as a small variant
//! engine: marshalling ([`writer::Writer`]) and demarshalling
//! ([`reader::Reader`]) of signatures compiled by [`type_system`]. It
//! strictly follows the D-Bus specification, including its size and
//! depth limits, and is not meant for general-purpose use outside
//! D-Bus IPC.

pub mod config;
pub mod endian;
pub mod error;
mod frame;
pub mod reader;
pub mod strings;
pub mod type_system;
pub mod value;
pub mod writer;

pub use error::{Error, Result};
pub use reader::Reader;
pub use type_system::{Descriptor, TypeSignature};
pub use value::{ReadValue, WriteValue};
pub use writer::Writer;

/// Longest signature this crate's type compiler accepts. Equivalent to
/// `C_DVAR_TYPE_LENGTH_MAX`.
pub use config::TYPE_LENGTH_MAX;

/// Deepest container nesting this crate's type compiler accepts.
/// Equivalent to `C_DVAR_TYPE_DEPTH_MAX`.
pub use config::TYPE_DEPTH_MAX;
