//! Maps content types and codec names to codecs.

use crate::codec::{Codec, CodecKind};
use crate::error::CodecError;
use crate::header::PrimaryType;

/// Classify a MIME string by its top-level type
pub fn detect_primary_type(mime: &str) -> PrimaryType {
    if mime.starts_with("text/") {
        PrimaryType::Text
    } else if mime.starts_with("image/") {
        PrimaryType::Image
    } else if mime.starts_with("audio/") {
        PrimaryType::Audio
    } else {
        PrimaryType::Binary
    }
}

/// Default codec for a primary type
pub fn default_codec(ptype: PrimaryType) -> CodecKind {
    match ptype {
        PrimaryType::Text => CodecKind::Huffman,
        PrimaryType::Image | PrimaryType::Audio | PrimaryType::Binary => CodecKind::Passthrough,
    }
}

/// Select a codec: an explicit name wins, otherwise the type's default
pub fn get_codec(
    ptype: PrimaryType,
    override_name: Option<&str>,
) -> Result<&'static dyn Codec, CodecError> {
    let kind = match override_name {
        Some(name) => CodecKind::from_name(name)?,
        None => default_codec(ptype),
    };
    Ok(kind.codec())
}
