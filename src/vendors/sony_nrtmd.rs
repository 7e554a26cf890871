//! Sony Non-Real-Time Metadata (`NRTMD`, carried inside an `xml ` box).
//!
//! Struct shapes grounded in `manufacturer/sony/xml.go` of the original
//! implementation this crate's metadata model is distilled from; deserialized
//! here with `quick-xml`'s serde support rather than the original's
//! `encoding/xml` tags.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Duration {
    #[serde(rename = "@Value")]
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Device {
    #[serde(rename = "@manufacturer")]
    pub manufacturer: String,
    #[serde(rename = "@modelName")]
    pub model_name: String,
    #[serde(rename = "@serialNo", default)]
    pub serial_no: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoFrame {
    #[serde(rename = "@captureFps")]
    pub capture_fps: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoLayout {
    #[serde(rename = "@pixel")]
    pub pixel: String,
    #[serde(rename = "@numOfVerticalLine")]
    pub num_of_vertical_line: String,
    #[serde(rename = "@aspectRatio")]
    pub aspect_ratio: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoFormat {
    #[serde(rename = "VideoFrame")]
    pub video_frame: VideoFrame,
    #[serde(rename = "VideoLayout")]
    pub video_layout: VideoLayout,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GroupItem {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@value")]
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Group {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "Item", default)]
    pub items: Vec<GroupItem>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AcquisitionRecord {
    #[serde(rename = "Group", default)]
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename = "NonRealTimeMeta")]
pub struct NonRealTimeMeta {
    #[serde(rename = "Duration")]
    pub duration: Duration,
    #[serde(rename = "Device")]
    pub device: Device,
    #[serde(rename = "VideoFormat")]
    pub video_format: VideoFormat,
    #[serde(rename = "AcquisitionRecord", default)]
    pub acquisition_record: AcquisitionRecord,
}

impl NonRealTimeMeta {
    pub fn parse(xml: &str) -> crate::error::Result<Self> {
        Ok(quick_xml::de::from_str(xml)?)
    }

    /// Flatten `AcquisitionRecord` groups into an ordered group-name -> tags
    /// multimap, the normalized shape SPEC_FULL.md's output model uses for
    /// every vendor's free-form metadata groups.
    pub fn grouped_tags(&self) -> IndexMap<String, Vec<(String, String)>> {
        let mut out = IndexMap::new();
        for group in &self.acquisition_record.groups {
            let tags = group
                .items
                .iter()
                .map(|item| (item.name.clone(), item.value.clone()))
                .collect();
            out.insert(group.name.clone(), tags);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_document() {
        let xml = r#"<NonRealTimeMeta>
            <Duration Value="00:01:00:00"/>
            <Device manufacturer="Sony" modelName="ILME-FX6" serialNo="12345"/>
            <VideoFormat>
                <VideoFrame captureFps="59.94p"/>
                <VideoLayout pixel="3840" numOfVerticalLine="2160" aspectRatio="16:9"/>
            </VideoFormat>
            <AcquisitionRecord>
                <Group name="LensUnitMetadata">
                    <Item name="Iris" value="2.8"/>
                </Group>
            </AcquisitionRecord>
        </NonRealTimeMeta>"#;
        let parsed = NonRealTimeMeta::parse(xml).unwrap();
        assert_eq!(parsed.device.model_name, "ILME-FX6");
        let grouped = parsed.grouped_tags();
        assert_eq!(grouped["LensUnitMetadata"][0].0, "Iris");
    }
}
