//! Canon MakerNote tag dictionary, including the array-indexed sub-tables
//! (`CameraSettings`, `ShotInfo`, `ProcessingInfo`, `LogInfo`) whose fields
//! are packed positionally inside one SHORT array rather than given their
//! own TIFF tag each.

use indexmap::IndexMap;

pub const TAG_CAMERA_SETTINGS: u16 = 0x0001;
pub const TAG_FOCAL_LENGTH: u16 = 0x0002;
pub const TAG_SHOT_INFO: u16 = 0x0004;
pub const TAG_PROCESSING_INFO: u16 = 0x000f;
pub const TAG_LOG_INFO: u16 = 0x0035;
pub const TAG_OWNER_NAME: u16 = 0x0009;
pub const TAG_SERIAL_NUMBER: u16 = 0x000c;
pub const TAG_MODEL_ID: u16 = 0x0010;
pub const TAG_LENS_MODEL: u16 = 0x0095;

pub fn top_level_tag_name(tag: u16) -> Option<&'static str> {
    Some(match tag {
        TAG_CAMERA_SETTINGS => "CameraSettings",
        TAG_FOCAL_LENGTH => "FocalLength",
        TAG_SHOT_INFO => "ShotInfo",
        TAG_PROCESSING_INFO => "ProcessingInfo",
        TAG_LOG_INFO => "LogInfo",
        TAG_OWNER_NAME => "OwnerName",
        TAG_SERIAL_NUMBER => "SerialNumber",
        TAG_MODEL_ID => "ModelID",
        TAG_LENS_MODEL => "LensModel",
        0x0006 => "ImageType",
        0x0007 => "FirmwareVersion",
        0x0096 => "SerialInfo",
        _ => return None,
    })
}

/// `CameraSettings` (tag `0x0001`) field names by 1-based array index.
pub fn camera_settings_field(index: usize) -> Option<&'static str> {
    Some(match index {
        1 => "MacroMode",
        2 => "SelfTimer",
        3 => "Quality",
        4 => "CanonFlashMode",
        5 => "ContinuousDrive",
        7 => "FocusMode",
        9 => "RecordMode",
        10 => "CanonImageSize",
        11 => "EasyMode",
        12 => "DigitalZoom",
        13 => "Contrast",
        14 => "Saturation",
        15 => "Sharpness",
        16 => "CameraISO",
        17 => "MeteringMode",
        18 => "FocusRange",
        20 => "CanonExposureMode",
        22 => "LensType",
        _ => return None,
    })
}

/// `ShotInfo` (tag `0x0004`) field names by 1-based array index.
pub fn shot_info_field(index: usize) -> Option<&'static str> {
    Some(match index {
        1 => "AutoISO",
        2 => "BaseISO",
        3 => "MeasuredEV",
        7 => "WhiteBalance",
        8 => "SlowShutter",
        9 => "SequenceNumber",
        14 => "AFPointUsed",
        15 => "FlashBias",
        19 => "SubjectDistance",
        21 => "ApertureValue",
        22 => "ShutterSpeedValue",
        _ => return None,
    })
}

/// `ProcessingInfo` (tag `0x000f`) field names by 1-based array index.
pub fn processing_info_field(index: usize) -> Option<&'static str> {
    Some(match index {
        1 => "ToneCurve",
        2 => "Sharpness",
        3 => "SharpnessFrequency",
        4 => "SensorRedLevel",
        5 => "SensorBlueLevel",
        6 => "WhiteBalanceRed",
        7 => "WhiteBalanceBlue",
        8 => "WhiteBalance",
        9 => "ColorTemperature",
        10 => "PictureStyle",
        _ => return None,
    })
}

/// `LogInfo` (tag `0x0035`) field names by 1-based array index — Canon Log
/// transfer characteristics for video-capable bodies.
pub fn log_info_field(index: usize) -> Option<&'static str> {
    Some(match index {
        1 => "CanonLogVersion",
        2 => "CanonLogGamma",
        3 => "CanonLogBlackLevel",
        4 => "CanonLogDynamicRangeExpansion",
        _ => return None,
    })
}

pub fn decode_indexed_array(
    values: &[u16],
    field_name: fn(usize) -> Option<&'static str>,
) -> IndexMap<String, serde_json::Value> {
    let mut out = IndexMap::new();
    for (i, value) in values.iter().enumerate() {
        let index = i + 1;
        let key = field_name(index)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Unknown{index:02}"));
        out.insert(key, serde_json::json!(value));
    }
    out
}
