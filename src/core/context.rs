//! Cross-box decode state threaded through one walk of a file.
//!
//! The original's box tree carries ambient state sideways between siblings
//! (manufacturer inferred from `ftyp`, the QuickTime `keys` entry count that
//! `ilst` needs to pair indices back to names). `Context` is the explicit Rust
//! stand-in SPEC_FULL.md §4.1 calls for in place of that implicit global state.

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Manufacturer {
    Sony,
    Panasonic,
    Nikon,
    Canon,
    Fujifilm,
    Unknown,
}

#[derive(Debug, Default)]
pub struct Context {
    pub manufacturer: Option<Manufacturer>,
    /// Entry count declared by a QuickTime `keys` box, consumed by a sibling `ilst`.
    pub quicktime_keys_entry_count: Option<u32>,
    /// Ordered key names declared by a QuickTime `keys` box, indexed 0-based by `ilst`.
    pub quicktime_keys: Vec<String>,
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    pub fn set_manufacturer_if_unset(&mut self, m: Manufacturer) {
        if self.manufacturer.is_none() {
            self.manufacturer = Some(m);
        }
    }
}
