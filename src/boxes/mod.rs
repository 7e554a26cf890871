//! Concrete box-type registrations (SPEC_FULL.md §4.3/§4.8).

pub mod payloads;
