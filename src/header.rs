use crate::codec::CodecMeta;
use crate::error::FormatError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse content category used to pick a default codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrimaryType {
    Text,
    Image,
    Audio,
    #[default]
    Binary,
}

impl PrimaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Binary => "binary",
        }
    }
}

impl fmt::Display for PrimaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the AEAD associated data covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AadScope {
    /// The serialized header with `cipher.tag` left empty
    Header,
}

/// Key derivation parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    #[serde(default, with = "b64")]
    pub salt: Vec<u8>,
}

/// AEAD parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherParams {
    #[serde(default, with = "b64")]
    pub iv: Vec<u8>,
    #[serde(default, with = "b64")]
    pub tag: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aad: Option<AadScope>,
}

/// Codec descriptor: enough to find the codec again and invert it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodecInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub meta: CodecMeta,
}

/// Container header - plaintext JSON between the fixed prefix and the payload.
/// Field order here is the serialization order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub mime: String,
    pub orig_name: String,
    #[serde(default)]
    pub created: String,
    /// Missing in version 1 headers
    #[serde(default)]
    pub ptype: PrimaryType,
    #[serde(default)]
    pub kdf: KdfParams,
    #[serde(default)]
    pub cipher: CipherParams,
    #[serde(default, alias = "comp")]
    pub codec: CodecInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orig_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comp_size: Option<u64>,
    /// Older writers put the full codec descriptor under `model`; read only
    #[serde(rename = "model", default, skip_serializing)]
    legacy_model: Option<CodecInfo>,
}

impl Header {
    pub fn new(mime: impl Into<String>, orig_name: impl Into<String>) -> Self {
        Self {
            mime: mime.into(),
            orig_name: orig_name.into(),
            created: String::new(),
            ptype: PrimaryType::default(),
            kdf: KdfParams::default(),
            cipher: CipherParams::default(),
            codec: CodecInfo::default(),
            notes: None,
            orig_size: None,
            comp_size: None,
            legacy_model: None,
        }
    }

    /// Serialize header to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
        serde_json::to_vec(self).map_err(|e| FormatError::InvalidHeader(e.to_string()))
    }

    /// Deserialize header from JSON bytes, applying defaults for older versions
    pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
        let mut header: Header =
            serde_json::from_slice(data).map_err(|e| FormatError::InvalidHeader(e.to_string()))?;
        if let Some(model) = header.legacy_model.take() {
            header.apply_legacy_model(model);
        }
        Ok(header)
    }

    /// `model` wins field by field, but only where it is filled in
    fn apply_legacy_model(&mut self, model: CodecInfo) {
        if !model.name.is_empty() {
            self.codec.name = model.name;
            if !model.version.is_empty() {
                self.codec.version = model.version;
            }
        }
        if !model.meta.is_empty() {
            self.codec.meta = model.meta;
        }
    }

    /// Associated data for sealing: magic followed by this header's JSON
    /// with an empty `cipher.tag`. Once the tag is filled in and the header
    /// written, `stored_aad` over the written bytes yields the same value.
    pub fn aad_bytes(&self) -> Result<Vec<u8>, FormatError> {
        let mut unsealed = self.clone();
        unsealed.cipher.tag.clear();
        let json = unsealed.to_bytes()?;
        Ok(with_magic(&json))
    }

    /// Associated data for verifying a stored header: magic followed by the
    /// raw header bytes with the first `"<base64 tag>"` literal replaced by
    /// `""`. Works on the bytes as stored, never on a re-serialization.
    pub fn stored_aad(raw: &[u8], tag: &[u8]) -> Result<Vec<u8>, FormatError> {
        let literal = format!("\"{}\"", STANDARD.encode(tag));
        let needle = literal.as_bytes();
        let pos = raw
            .windows(needle.len())
            .position(|w| w == needle)
            .ok_or_else(|| FormatError::InvalidHeader("cipher.tag not found in header".into()))?;

        let mut blanked = Vec::with_capacity(raw.len());
        blanked.extend_from_slice(&raw[..pos]);
        blanked.extend_from_slice(b"\"\"");
        blanked.extend_from_slice(&raw[pos + needle.len()..]);
        Ok(with_magic(&blanked))
    }

    /// Whether the header is covered by the AEAD tag
    pub fn is_bound(&self) -> bool {
        self.cipher.aad == Some(AadScope::Header)
    }
}

fn with_magic(json: &[u8]) -> Vec<u8> {
    let mut aad = Vec::with_capacity(crate::container::MAGIC.len() + json.len());
    aad.extend_from_slice(crate::container::MAGIC);
    aad.extend_from_slice(json);
    aad
}

/// Base64 (standard alphabet, padded) for binary header fields
mod b64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
