//! Panasonic MakerNote tag dictionary.

pub fn tag_name(tag: u16) -> Option<&'static str> {
    Some(match tag {
        0x0001 => "ImageQuality",
        0x0002 => "FirmwareVersion",
        0x0003 => "WhiteBalance",
        0x0007 => "FocusMode",
        0x000f => "AFAreaMode",
        0x001a => "ImageStabilization",
        0x001c => "MacroMode",
        0x001f => "ShootingMode",
        0x0020 => "Audio",
        0x0022 => "DataDump",
        0x0024 => "WhiteBalanceBias",
        0x0025 => "FlashBias",
        0x0026 => "InternalSerialNumber",
        0x0027 => "PanasonicExifVersion",
        0x002a => "ColorEffect",
        0x002b => "TimeSincePowerOn",
        0x002d => "BurstMode",
        0x002e => "SequenceNumber",
        0x002f => "ContrastMode",
        0x0030 => "NoiseReduction",
        0x0031 => "SelfTimer",
        0x0033 => "Rotation",
        0x0036 => "TravelDay",
        0x003f => "WorldTimeLocation",
        0x0051 => "LensType",
        0x0052 => "LensSerialNumber",
        0x0053 => "AccessoryType",
        _ => return None,
    })
}
