use serde::{Deserialize, Serialize};
use std::fmt;

/// Power state reported by the set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerStatus {
    /// Panel on and showing content
    Active,
    /// Low-power state, still answering network requests
    Standby,
    /// Unreachable or reporting anything else
    Off,
}

impl fmt::Display for PowerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PowerStatus::Active => "active",
            PowerStatus::Standby => "standby",
            PowerStatus::Off => "off",
        };
        f.write_str(s)
    }
}

/// One entry of the remote-controller code table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteCommand {
    /// Human-readable command name, e.g. `VolumeUp`
    pub name: String,
    /// Opaque base64 IRCC code
    pub value: String,
}

/// One item of a `getContentList` page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    /// Position of the item in the full listing, assigned by the set
    #[serde(default)]
    pub index: i64,

    /// Display title
    #[serde(default)]
    pub title: Option<String>,

    /// Playable URI
    #[serde(default)]
    pub uri: Option<String>,

    /// Channel display number, tuner content only
    #[serde(default)]
    pub disp_num: Option<String>,

    /// Media type, e.g. `tv`
    #[serde(default)]
    pub program_media_type: Option<String>,
}

/// One entry of a `getSourceList` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSource {
    /// Source URI, e.g. `extInput:hdmi`
    pub source: String,
}

/// One installed app from `getApplicationList`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct App {
    /// App title as shown in the launcher
    pub title: String,
    /// Launch URI
    pub uri: String,
    /// Icon URL, empty for apps without one
    #[serde(default)]
    pub icon: Option<String>,
}

/// Now-playing snapshot from `getPlayingContentInfo`
///
/// Every field is optional; the set only reports what applies to the
/// current content (a tuner channel has a `disp_num`, an HDMI input does not).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayingInfo {
    #[serde(default)]
    pub program_title: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub program_media_type: Option<String>,
    #[serde(default)]
    pub disp_num: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub duration_sec: Option<i64>,
    #[serde(default)]
    pub start_date_time: Option<String>,
}

/// Volume record for one audio target
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    /// Audio output target, e.g. `speaker` or `headphone`
    pub target: String,

    /// Current volume in the target's own range
    pub volume: i32,

    #[serde(default)]
    pub mute: bool,

    #[serde(default)]
    pub min_volume: Option<i32>,

    #[serde(default)]
    pub max_volume: Option<i32>,
}

/// System information from `getSystemInformation`
///
/// Models differ in which fields they report, so all are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub mac_addr: Option<String>,
    #[serde(default)]
    pub generation: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub cid: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playing_info_tolerates_partial_fields() {
        let info: PlayingInfo = serde_json::from_str(
            r#"{"source":"extInput:hdmi","title":"HDMI 1","uri":"extInput:hdmi?port=1"}"#,
        )
        .unwrap();
        assert_eq!(info.title.as_deref(), Some("HDMI 1"));
        assert_eq!(info.uri.as_deref(), Some("extInput:hdmi?port=1"));
        assert!(info.program_title.is_none());
        assert!(info.duration_sec.is_none());
    }

    #[test]
    fn volume_info_reads_camel_case_limits() {
        let info: VolumeInfo = serde_json::from_str(
            r#"{"target":"speaker","volume":12,"mute":false,"minVolume":0,"maxVolume":100}"#,
        )
        .unwrap();
        assert_eq!(info.target, "speaker");
        assert_eq!(info.volume, 12);
        assert_eq!(info.max_volume, Some(100));
    }

    #[test]
    fn content_item_reads_disp_num() {
        let item: ContentItem = serde_json::from_str(
            r#"{"index":3,"title":"BBC One","uri":"tv:dvbt?trip=1","dispNum":"001"}"#,
        )
        .unwrap();
        assert_eq!(item.index, 3);
        assert_eq!(item.disp_num.as_deref(), Some("001"));
    }
}
