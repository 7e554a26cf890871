//! Top-level vendor metadata payload decoders (SPEC_FULL.md §4.7).
//!
//! Each module here decodes one vendor's top-level box payload — as opposed
//! to [`crate::maker`], which decodes the narrower in-TIFF MakerNote tag.

pub mod canon_cntd;
pub mod fujifilm_mvtg;
pub mod nikon_nctg;
pub mod panasonic_clipmain;
pub mod sony_nrtmd;
pub mod sony_videoprofile;
