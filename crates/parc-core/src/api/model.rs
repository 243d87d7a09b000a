//! Platform JSON payloads. Only the fields the archiver reads are modelled.

use serde::{Deserialize, Deserializer};

/// `GET blog/{user}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    /// Query string (`?user_id=..&sign=..`) that authorizes file URLs.
    /// Absent when the platform did not accept our credentials.
    #[serde(default)]
    pub signed_query: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// One post from the listing endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPost {
    /// UUID used in the public post URL.
    pub id: String,
    #[serde(rename = "int_id")]
    pub int_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub has_access: bool,
    /// Content blocks, kept raw so a malformed block only loses itself.
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
    #[serde(default)]
    pub signed_query: Option<String>,
}

/// `GET blog/{user}/post/`.
#[derive(Debug, Clone, Deserialize)]
pub struct PostsPage {
    /// Posts kept raw so one malformed post does not sink its page.
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
    pub extra: PageExtra,
}

impl RawPost {
    /// Converts one entry of a page's `data` array.
    pub fn from_value(v: &serde_json::Value) -> Result<Self, serde_json::Error> {
        RawPost::deserialize(v)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageExtra {
    /// Cursor for the next page; the platform sends a string, sometimes a number.
    #[serde(default, deserialize_with = "cursor")]
    pub offset: Option<String>,
    #[serde(default)]
    pub is_last: bool,
}

fn cursor<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(d)? {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// A post content block, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Text(TextBlock),
    Link(LinkBlock),
    Image(ImageBlock),
    File(FileBlock),
    AudioFile(AudioBlock),
    OkVideo(VideoBlock),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextBlock {
    /// JSON-encoded `[text, style, ranges]`.
    #[serde(default)]
    pub content: String,
    /// `BLOCK_END` marks a line break.
    #[serde(default)]
    pub modificator: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkBlock {
    #[serde(default)]
    pub content: String,
    pub url: String,
}

/// Image; `width`/`height`/`size` disappear when the CDN copy was deleted.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageBlock {
    pub id: String,
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileBlock {
    #[serde(default)]
    pub id: Option<String>,
    pub url: String,
    pub title: String,
    pub size: Option<u64>,
    #[serde(default)]
    pub is_migrated: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioBlock {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    pub size: Option<u64>,
    #[serde(default)]
    pub is_migrated: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoBlock {
    pub id: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default)]
    pub player_urls: Vec<PlayerUrl>,
    #[serde(default)]
    pub failover_host: Option<String>,
}

/// One rendition; `url` is empty when the quality is not available.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerUrl {
    #[serde(rename = "type")]
    pub quality: String,
    #[serde(default)]
    pub url: String,
}
