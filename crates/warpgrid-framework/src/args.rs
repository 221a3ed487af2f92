//! Opaque plugin args and their decoding.
//!
//! The host hands every plugin factory a `RawArgs` blob taken verbatim
//! from the profile. The plugin decides what type it decodes into; the
//! framework only knows about content types.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// JSON content type. An empty content type is treated as JSON.
pub const CONTENT_TYPE_JSON: &str = "application/json";
/// TOML content type.
pub const CONTENT_TYPE_TOML: &str = "application/toml";

/// Errors decoding a plugin args blob.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("not supported content type {0}")]
    UnsupportedContentType(String),

    #[error("args are not valid utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("json decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml decode error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Serialized plugin args of a declared content type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawArgs {
    pub raw: Option<Vec<u8>>,
    pub content_type: String,
}

impl RawArgs {
    pub fn new(raw: Vec<u8>, content_type: &str) -> Self {
        Self {
            raw: Some(raw),
            content_type: content_type.to_string(),
        }
    }

    pub fn json(raw: impl Into<Vec<u8>>) -> Self {
        Self::new(raw.into(), CONTENT_TYPE_JSON)
    }

    pub fn from_json_value(value: &serde_json::Value) -> serde_json::Result<Self> {
        Ok(Self::json(serde_json::to_vec(value)?))
    }

    /// Wrap a TOML table (as found under `[plugins.args]` in a profile).
    pub fn from_toml_table(table: &toml::Table) -> Result<Self, toml::ser::Error> {
        let raw = toml::to_string(table)?;
        Ok(Self::new(raw.into_bytes(), CONTENT_TYPE_TOML))
    }
}

/// Decode `args` into `T`.
///
/// Absent args, or args without bytes, decode to `T::default()`. Unknown
/// fields are ignored.
pub fn decode_into<T>(args: Option<&RawArgs>) -> Result<T, DecodeError>
where
    T: DeserializeOwned + Default,
{
    let Some(args) = args else {
        return Ok(T::default());
    };
    let Some(raw) = args.raw.as_deref() else {
        return Ok(T::default());
    };

    match args.content_type.as_str() {
        "" | CONTENT_TYPE_JSON => Ok(serde_json::from_slice(raw)?),
        CONTENT_TYPE_TOML => {
            let text = std::str::from_utf8(raw)?;
            Ok(toml::from_str(text)?)
        }
        other => Err(DecodeError::UnsupportedContentType(other.to_string())),
    }
}
