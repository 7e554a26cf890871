//! Per-tag value conversions and the fixed SMPTE-label lookup tables for the
//! Lens Unit, Camera Unit and User-Defined Acquisition Metadata KLV sets.
//!
//! Tag codes and conversions grounded in `manufacturer/sony/rtmd/tags.go`'s
//! `rtmdMap` and `process*` functions; the string lookup tables grounded in
//! `manufacturer/sony/rtmd/constants.go`. One deliberate deviation:
//! `master_gain_adjustment` below does the widening division in floating
//! point; the original computes `int16(raw) / 100` as an integer division
//! before converting to `float64`, silently truncating sub-integer dB
//! values. See DESIGN.md for the full note.

use indexmap::IndexMap;

// Lens Unit Metadata
pub const TAG_IRIS_FNUMBER: u16 = 0x8000;
pub const TAG_FOCUS_POSITION_IMAGE_PLANE: u16 = 0x8001;
pub const TAG_LENS_ZOOM_35MM: u16 = 0x8004;
pub const TAG_LENS_ZOOM: u16 = 0x8005;
pub const TAG_FOCUS_RING_POSITION: u16 = 0x800a;
pub const TAG_ZOOM_RING_POSITION: u16 = 0x800b;

// Camera Unit Metadata
pub const TAG_CAPTURE_GAMMA_EQUATION: u16 = 0x3210;
pub const TAG_COLOR_PRIMARIES: u16 = 0x3219;
pub const TAG_CODING_EQUATIONS: u16 = 0x321a;
pub const TAG_AUTO_EXPOSURE_MODE: u16 = 0x8100;
pub const TAG_AUTO_FOCUS_SENSING_AREA: u16 = 0x8101;
pub const TAG_IMAGER_DIMENSION_WIDTH: u16 = 0x8104;
pub const TAG_IMAGER_DIMENSION_HEIGHT: u16 = 0x8105;
pub const TAG_CAPTURE_FRAME_RATE: u16 = 0x8106;
pub const TAG_SHUTTER_SPEED_ANGLE: u16 = 0x8108;
pub const TAG_SHUTTER_SPEED_TIME: u16 = 0x8109;
pub const TAG_CAMERA_MASTER_GAIN_ADJUSTMENT: u16 = 0x810a;
pub const TAG_ISO_SENSITIVITY: u16 = 0x810b;
pub const TAG_ELECTRICAL_EXTENDER_MAGNIFICATION: u16 = 0x810c;
pub const TAG_AUTO_WHITE_BALANCE_MODE: u16 = 0x810d;
pub const TAG_EXPOSURE_INDEX_OF_PHOTO_METER: u16 = 0x8115;
pub const TAG_LIGHTING_PRESET: u16 = 0xe303;

// User Defined Acquisition Metadata
pub const TAG_USER_DEFINED_ITEM: u16 = 0xe000;

/// `16 * (1 - data/0x10000)` power-of-two F-number mapping used by
/// `IrisFNumber`.
pub fn iris_fnumber(raw: u16) -> f64 {
    2f64.powf((1.0 - raw as f64 / 65536.0) * 8.0)
}

/// SMPTE "common distance format": a base-10 exponent packed into the high
/// nibble of the high byte, and a mantissa in the low 12 bits.
pub fn common_distance_format(raw: u16) -> f64 {
    let exponent = ((raw >> 8) & 0xf0) as i8 >> 4;
    let mantissa = (raw & 0x0fff) as f64;
    mantissa * 10f64.powi(exponent as i32)
}

/// Shutter speed expressed as an angle in degrees; stored as a 32-bit
/// big-endian fixed-point value scaled by 60.
pub fn shutter_speed_angle(raw: u32) -> f64 {
    raw as f64 / 60.0
}

/// Correct (non-truncating) widening of the master gain adjustment. The
/// original implementation performs `int16(raw) / 100` as an integer
/// division before converting to a float, discarding anything below a whole
/// dB; this crate keeps sub-integer precision instead (see DESIGN.md).
pub fn master_gain_adjustment(raw: u16) -> f64 {
    raw as i16 as f64 / 100.0
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// `AutoExposureMode` is keyed by a full 16-byte SMPTE UL, not a small
/// integer code.
pub fn auto_exposure_mode(ul: &[u8]) -> &'static str {
    match hex_encode(ul).as_str() {
        "060e2b340401010b0510010101010000" => "Manual",
        "060e2b340401010b0510010101020000" => "Auto",
        "060e2b340401010b0510010101030000" => "GAIN",
        "060e2b340401010b0510010101040000" => "A Mode",
        "060e2b340401010b0510010101050000" => "S Mode",
        _ => "Camera specific control",
    }
}

pub fn af_mode(code: u8) -> &'static str {
    match code {
        0x00 => "MF",
        0x01 => "AF Center",
        0x02 => "AF Whole",
        0x03 => "AF Multi",
        0x04 => "AF Spot",
        0xff => "Undefined",
        _ => "Reserved",
    }
}

pub fn auto_white_balance_mode(code: u8) -> &'static str {
    match code {
        0x00 => "Preset",
        0x01 => "Auto",
        0x02 => "Hold",
        0x03 => "One Push",
        0xff => "Undefined",
        _ => "Reserved",
    }
}

pub fn lighting_preset(code: u8) -> &'static str {
    match code {
        0x01 => "Incandescent",
        0x02 => "Fluorescent",
        0x04 => "SunLight",
        0x05 => "Cloudy",
        0x06 => "Other",
        0x21 => "Custom",
        _ => "Reserved",
    }
}

/// `CodingEquations` is keyed by a full 16-byte SMPTE UL.
pub fn coding_equations(ul: &[u8]) -> &'static str {
    match hex_encode(ul).as_str() {
        "060e2b34040101010401010102020000" => "Rec.709",
        "060e2b340401010d0401010102060000" => "Rec.2020ncl",
        _ => "Unknown",
    }
}

/// `GammaEquation` is keyed by a full 16-byte SMPTE UL.
pub fn gamma_equation(ul: &[u8]) -> &'static str {
    match hex_encode(ul).as_str() {
        "060e2b34040101010401010101020000" => "rec709",
        "060e2b34040101010401010101030000" => "SMPTE ST 240M",
        "060e2b340401010d0401010101080000" => "rec709-xvycc",
        "060e2b34040101060e06040101010301" => "Cine1",
        "060e2b34040101060e06040101010302" => "Cine2",
        "060e2b34040101060e06040101010303" => "Cine3",
        "060e2b34040101060e06040101010304" => "Cine4",
        "060e2b34040101060e06040101010508" => "S-Log2",
        "060e2b34040101060e06040101010602" => "Still",
        "060e2b34040101060e06040101010604" => "S-Log3",
        "060e2b34040101060e06040101010605" => "S-Log3-Cine",
        "060e2b34040101060e06040101010705" => "S-Cinetone",
        "060e2b340401010d04010101010b0000" => "Rec2100-HLG",
        _ => "Gamma: Unkn/Custom",
    }
}

/// `ColorPrimaries` is keyed by a full 16-byte SMPTE UL.
pub fn color_primaries(ul: &[u8]) -> &'static str {
    match hex_encode(ul).as_str() {
        "060e2b34040101060401010103030000" => "rec709",
        "060e2b34040101060e06040101030103" => "S-Gamut",
        "060e2b34040101060e06040101030104" => "S-Gamut3",
        "060e2b34040101060e06040101030105" => "S-Gamut3.Cine",
        "060e2b340401010d0401010103040000" => "rec2020",
        _ => "ColorSpace Unkn/Custom",
    }
}

fn u16_be(data: &[u8]) -> u16 {
    u16::from_be_bytes([data[0], data[1]])
}

fn u32_be(data: &[u8]) -> u32 {
    u32::from_be_bytes([data[0], data[1], data[2], data[3]])
}

fn fraction(data: &[u8]) -> serde_json::Value {
    let num = i32::from_be_bytes([data[0], data[1], data[2], data[3]]);
    let den = i32::from_be_bytes([data[4], data[5], data[6], data[7]]);
    serde_json::json!({ "num": num, "den": den })
}

/// Convert one Lens Unit Metadata tag into its normalized `(name, value)`.
/// Unknown tags are retained under a synthetic name rather than dropped.
pub fn convert_lens_unit_tag(tag: u16, data: &[u8]) -> (String, serde_json::Value) {
    match tag {
        TAG_IRIS_FNUMBER if data.len() >= 2 => (
            "IrisFNumber".to_string(),
            serde_json::json!(iris_fnumber(u16_be(data))),
        ),
        TAG_FOCUS_POSITION_IMAGE_PLANE if data.len() >= 2 => (
            "FocusPositionFromImagePlane".to_string(),
            serde_json::json!(common_distance_format(u16_be(data))),
        ),
        TAG_LENS_ZOOM_35MM if data.len() >= 2 => (
            "LensZoom35mm".to_string(),
            serde_json::json!(common_distance_format(u16_be(data))),
        ),
        TAG_LENS_ZOOM if data.len() >= 2 => (
            "LensZoom".to_string(),
            serde_json::json!(common_distance_format(u16_be(data))),
        ),
        TAG_FOCUS_RING_POSITION if data.len() >= 2 => (
            "FocusRingPosition".to_string(),
            serde_json::json!(u16_be(data)),
        ),
        TAG_ZOOM_RING_POSITION if data.len() >= 2 => (
            "ZoomRingPosition".to_string(),
            serde_json::json!(u16_be(data)),
        ),
        other => (format!("Unknown_{other:#06x}"), serde_json::json!(data)),
    }
}

/// Convert one Camera Unit Metadata tag into its normalized `(name, value)`.
pub fn convert_camera_unit_tag(tag: u16, data: &[u8]) -> (String, serde_json::Value) {
    match tag {
        TAG_CAPTURE_GAMMA_EQUATION if !data.is_empty() => (
            "CaptureGammaEquation".to_string(),
            serde_json::json!(gamma_equation(data)),
        ),
        TAG_COLOR_PRIMARIES if !data.is_empty() => (
            "ColorPrimaries".to_string(),
            serde_json::json!(color_primaries(data)),
        ),
        TAG_CODING_EQUATIONS if !data.is_empty() => (
            "CodingEquations".to_string(),
            serde_json::json!(coding_equations(data)),
        ),
        TAG_AUTO_EXPOSURE_MODE if !data.is_empty() => (
            "AutoExposureMode".to_string(),
            serde_json::json!(auto_exposure_mode(data)),
        ),
        TAG_AUTO_FOCUS_SENSING_AREA if !data.is_empty() => (
            "AutoFocusSensingAreaSetting".to_string(),
            serde_json::json!(af_mode(data[0])),
        ),
        TAG_IMAGER_DIMENSION_WIDTH if data.len() >= 2 => (
            "ImagerDimensionWidth".to_string(),
            serde_json::json!(u16_be(data)),
        ),
        TAG_IMAGER_DIMENSION_HEIGHT if data.len() >= 2 => (
            "ImagerDimensionHeight".to_string(),
            serde_json::json!(u16_be(data)),
        ),
        TAG_CAPTURE_FRAME_RATE if data.len() >= 8 => {
            ("CaptureFrameRate".to_string(), fraction(data))
        }
        TAG_SHUTTER_SPEED_ANGLE if data.len() >= 4 => (
            "ShutterSpeedAngle".to_string(),
            serde_json::json!(shutter_speed_angle(u32_be(data))),
        ),
        TAG_SHUTTER_SPEED_TIME if data.len() >= 8 => {
            ("ShutterSpeedTime".to_string(), fraction(data))
        }
        TAG_CAMERA_MASTER_GAIN_ADJUSTMENT if data.len() >= 2 => (
            "CameraMasterGainAdjustment".to_string(),
            serde_json::json!(master_gain_adjustment(u16_be(data))),
        ),
        TAG_ISO_SENSITIVITY if data.len() >= 2 => (
            "ISOSensitivity".to_string(),
            serde_json::json!(u16_be(data)),
        ),
        TAG_ELECTRICAL_EXTENDER_MAGNIFICATION if data.len() >= 2 => (
            "ElectricalExtenderMagnification".to_string(),
            serde_json::json!(u16_be(data) as f64 / 100.0),
        ),
        TAG_AUTO_WHITE_BALANCE_MODE if !data.is_empty() => (
            "AutoWhiteBalanceMode".to_string(),
            serde_json::json!(auto_white_balance_mode(data[0])),
        ),
        TAG_EXPOSURE_INDEX_OF_PHOTO_METER if data.len() >= 2 => (
            "ExposureIndexOfPhotoMeter".to_string(),
            serde_json::json!(u16_be(data)),
        ),
        TAG_LIGHTING_PRESET if !data.is_empty() => (
            "LightingPreset".to_string(),
            serde_json::json!(lighting_preset(data[0])),
        ),
        other => (format!("Unknown_{other:#06x}"), serde_json::json!(data)),
    }
}

pub fn convert_set(
    tags: &[(u16, Vec<u8>)],
    convert: fn(u16, &[u8]) -> (String, serde_json::Value),
) -> IndexMap<String, serde_json::Value> {
    let mut out = IndexMap::new();
    for (tag, data) in tags {
        let (name, value) = convert(*tag, data);
        out.insert(name, value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn master_gain_keeps_sub_integer_precision() {
        // The original's buggy `int16(150) / 100` would truncate to 1.0.
        assert_eq!(master_gain_adjustment(150), 1.5);
    }

    #[test]
    fn common_distance_format_splits_exponent_and_mantissa() {
        // exponent 0, mantissa 100 -> 100.0
        assert_eq!(common_distance_format(100), 100.0);
    }

    #[test]
    fn lookup_tables_fall_back_to_reserved_or_custom() {
        assert_eq!(af_mode(0xff), "Undefined");
        assert_eq!(af_mode(0x10), "Reserved");
        assert_eq!(gamma_equation(&[0u8; 16]), "Gamma: Unkn/Custom");
        assert_eq!(color_primaries(&[0u8; 16]), "ColorSpace Unkn/Custom");
    }

    #[test]
    fn capture_frame_rate_decodes_as_fraction() {
        let mut data = Vec::new();
        data.extend_from_slice(&60000i32.to_be_bytes());
        data.extend_from_slice(&1001i32.to_be_bytes());
        let (name, value) = convert_camera_unit_tag(TAG_CAPTURE_FRAME_RATE, &data);
        assert_eq!(name, "CaptureFrameRate");
        assert_eq!(value, serde_json::json!({ "num": 60000, "den": 1001 }));
    }

    #[test]
    fn shutter_speed_angle_reads_full_32_bits() {
        let data = 21600u32.to_be_bytes();
        let (name, value) = convert_camera_unit_tag(TAG_SHUTTER_SPEED_ANGLE, &data);
        assert_eq!(name, "ShutterSpeedAngle");
        assert_eq!(value, serde_json::json!(360.0));
    }
}
