//! Format-agnostic plumbing: byte cursors, the box walker, the declarative
//! schema engine and the TIFF/EXIF IFD decoder.

pub mod boxwalker;
pub mod context;
pub mod cursor;
pub mod endian;
pub mod registry;
pub mod schema;
pub mod tiff;
