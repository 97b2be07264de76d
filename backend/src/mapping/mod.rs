//! Header-mapping and row-normalization engine.
//!
//! This is the heart of the server: it takes an arbitrary, possibly legacy
//! sheet layout and deterministically maps every row into the canonical
//! 42-field contact record. Everything in here is pure, so it is safe to run
//! in parallel across requests.

pub mod header;
pub mod normalize;

pub use header::{build_header_map, is_legacy_format, HeaderMap, MappingEntry};
pub use normalize::{
    build_full_address, has_identity, is_complete, map_row, normalize_rows, split_name,
};
