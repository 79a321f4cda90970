// config.rs — compile-time configuration constants.
//
// Collected here so the limits the wire format imposes are visible in one
// place rather than scattered as magic numbers through the compiler,
// reader, and writer.

/// Longest signature the type compiler will accept, in characters.
pub const TYPE_LENGTH_MAX: usize = 255;

/// Maximum total container nesting depth (arrays, tuples, and dict-entries
/// combined).
pub const TYPE_DEPTH_MAX: usize = 64;

/// Maximum nesting depth contributed by tuples and dict-entries alone.
pub const TUPLE_DEPTH_MAX: usize = TYPE_DEPTH_MAX / 2;

/// Maximum nesting depth contributed by arrays alone.
pub const ARRAY_DEPTH_MAX: usize = TYPE_DEPTH_MAX / 2;

/// Below this size, a write-mode buffer grows straight to a single page;
/// above it, growth doubles to the next power of two.
pub const WRITE_BUFFER_BASE: usize = 4096;
