//! Major/compatible brand to manufacturer inference (SPEC_FULL.md §4.8).
//!
//! Grounded in `mp4/box_types.go`'s `Mdat.getMeta`, which gates RTMD
//! decoding on `ctx.MajorBrand == media.SONYXAVC`: the brand in `ftyp`
//! decides which manufacturer-specific decoders downstream boxes dispatch
//! to, before any vendor-specific box has even been seen.

use crate::core::context::Manufacturer;

pub fn manufacturer_for_brand(brand: &str) -> Manufacturer {
    if brand.eq_ignore_ascii_case("XAVC") {
        return Manufacturer::Sony;
    }
    let lower = brand.to_ascii_lowercase();
    if lower.starts_with("pana") {
        Manufacturer::Panasonic
    } else if lower.starts_with("nik") {
        Manufacturer::Nikon
    } else if lower.starts_with("cano") || lower == "crx " {
        Manufacturer::Canon
    } else if lower.starts_with("fuji") {
        Manufacturer::Fujifilm
    } else {
        Manufacturer::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sony_xavc_brand_maps_to_sony() {
        assert_eq!(manufacturer_for_brand("XAVC"), Manufacturer::Sony);
    }

    #[test]
    fn unknown_brand_is_unknown() {
        assert_eq!(manufacturer_for_brand("isom"), Manufacturer::Unknown);
    }
}
