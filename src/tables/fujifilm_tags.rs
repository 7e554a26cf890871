//! Fujifilm MakerNote / MVTG tag dictionary.

pub fn tag_name(tag: u16) -> Option<&'static str> {
    Some(match tag {
        0x0000 => "Version",
        0x1000 => "Quality",
        0x1001 => "Sharpness",
        0x1002 => "WhiteBalance",
        0x1003 => "Saturation",
        0x1004 => "Contrast",
        0x100a => "WhiteBalanceFineTune",
        0x1010 => "FlashMode",
        0x1011 => "FlashStrength",
        0x1020 => "Macro",
        0x1021 => "FocusMode",
        0x1030 => "SlowSync",
        0x1031 => "PictureMode",
        0x1100 => "AutoBracketing",
        0x1210 => "ColorChromeEffect",
        0x1400 => "DynamicRange",
        0x1401 => "FilmMode",
        0x1402 => "DynamicRangeSetting",
        0x3803 => "VideoRecordingMode",
        _ => return None,
    })
}
