//! Image payloads and output geometry.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use storyboard_error::ConfigError;

/// Encoded image bytes plus their MIME type.
///
/// The bytes are opaque to the pipeline; they are only passed between the
/// image model and the result store.
///
/// # Examples
///
/// ```
/// use storyboard_core::ImageData;
///
/// let image = ImageData::new("image/png", vec![0x89, 0x50, 0x4E, 0x47]);
/// assert_eq!(image.to_base64(), "iVBORw==");
/// assert!(image.to_data_url().starts_with("data:image/png;base64,"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters)]
pub struct ImageData {
    /// MIME type, e.g. "image/png"
    mime_type: String,
    /// Encoded image bytes
    bytes: Vec<u8>,
}

impl ImageData {
    /// Wrap encoded bytes.
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Decode a standard base64 payload.
    pub fn from_base64(
        mime_type: impl Into<String>,
        data: &str,
    ) -> Result<Self, base64::DecodeError> {
        let bytes = STANDARD.decode(data.trim())?;
        Ok(Self::new(mime_type, bytes))
    }

    /// Standard base64 encoding of the bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:` URL suitable for direct display.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// Size of the encoded image in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Output frame shape supported by the image model.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
pub enum AspectRatio {
    /// 1:1
    #[serde(rename = "1:1")]
    #[display("1:1")]
    Square,
    /// 4:3
    #[serde(rename = "4:3")]
    #[display("4:3")]
    Standard,
    /// 16:9
    #[default]
    #[serde(rename = "16:9")]
    #[display("16:9")]
    Widescreen,
    /// 9:16
    #[serde(rename = "9:16")]
    #[display("9:16")]
    Portrait,
}

impl AspectRatio {
    /// Wire representation ("16:9").
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Standard => "4:3",
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Portrait => "9:16",
        }
    }
}

impl std::str::FromStr for AspectRatio {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1:1" => Ok(AspectRatio::Square),
            "4:3" => Ok(AspectRatio::Standard),
            "16:9" => Ok(AspectRatio::Widescreen),
            "9:16" => Ok(AspectRatio::Portrait),
            other => Err(ConfigError::new(format!(
                "Unsupported aspect ratio: {}",
                other
            ))),
        }
    }
}
