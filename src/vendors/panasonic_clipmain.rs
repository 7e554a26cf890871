//! Panasonic `ClipMain` metadata (carried inside an `xml ` box).
//!
//! Struct shapes grounded in `manufacturer/panasonic/xml.go` of the original
//! implementation this crate's metadata model is distilled from.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Video {
    #[serde(rename = "@activeLine")]
    pub active_line: String,
    #[serde(rename = "@activePixel")]
    pub active_pixel: String,
    #[serde(rename = "@bitDepth", default)]
    pub bit_depth: Option<String>,
    #[serde(rename = "@frameRate")]
    pub frame_rate: String,
    #[serde(rename = "@startTimecode", default)]
    pub start_timecode: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EssenceList {
    #[serde(rename = "Video")]
    pub video: Video,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Device {
    #[serde(rename = "@manufacturer")]
    pub manufacturer: String,
    #[serde(rename = "@modelName")]
    pub model_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClipMetadata {
    #[serde(rename = "Device")]
    pub device: Device,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Duration {
    #[serde(rename = "@Value")]
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClipContent {
    #[serde(rename = "Duration")]
    pub duration: Duration,
    #[serde(rename = "EssenceList")]
    pub essence_list: EssenceList,
    #[serde(rename = "ClipMetadata")]
    pub clip_metadata: ClipMetadata,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Gamma {
    #[serde(rename = "@CaptureGamma")]
    pub capture_gamma: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Gamut {
    #[serde(rename = "@CaptureGamut")]
    pub capture_gamut: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CameraUnitMetadata {
    #[serde(rename = "@ISOSensitivity", default)]
    pub iso_sensitivity: Option<String>,
    #[serde(rename = "Gamma", default)]
    pub gamma: Option<Gamma>,
    #[serde(rename = "Gamut", default)]
    pub gamut: Option<Gamut>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcquisitionMetadata {
    #[serde(rename = "CameraUnitMetadata")]
    pub camera_unit_metadata: CameraUnitMetadata,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserArea {
    #[serde(rename = "AcquisitionMetadata")]
    pub acquisition_metadata: AcquisitionMetadata,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename = "ClipMain")]
pub struct ClipMain {
    #[serde(rename = "ClipContent")]
    pub clip_content: ClipContent,
    #[serde(rename = "UserArea")]
    pub user_area: UserArea,
}

impl ClipMain {
    pub fn parse(xml: &str) -> crate::error::Result<Self> {
        Ok(quick_xml::de::from_str(xml)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_document() {
        let xml = r#"<ClipMain>
            <ClipContent>
                <Duration Value="00:02:00:00"/>
                <EssenceList>
                    <Video activeLine="2160" activePixel="3840" frameRate="59.94p"/>
                </EssenceList>
                <ClipMetadata>
                    <Device manufacturer="Panasonic" modelName="AU-EVA1"/>
                </ClipMetadata>
            </ClipContent>
            <UserArea>
                <AcquisitionMetadata>
                    <CameraUnitMetadata ISOSensitivity="800">
                        <Gamma CaptureGamma="V-Log"/>
                        <Gamut CaptureGamut="V-Gamut"/>
                    </CameraUnitMetadata>
                </AcquisitionMetadata>
            </UserArea>
        </ClipMain>"#;
        let parsed = ClipMain::parse(xml).unwrap();
        assert_eq!(parsed.clip_content.clip_metadata.device.model_name, "AU-EVA1");
        assert_eq!(
            parsed
                .user_area
                .acquisition_metadata
                .camera_unit_metadata
                .gamma
                .unwrap()
                .capture_gamma,
            "V-Log"
        );
    }
}
