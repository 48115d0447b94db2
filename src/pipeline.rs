//! End-to-end pack and unpack: codec, envelope and container in order.
//!
//! ```text
//! pack:   payload → codec.compress → seal (AES-256-GCM) → container::pack
//! unpack: container::unpack_with_raw → open (verify tag) → codec.decompress → payload
//! ```
//!
//! Every stage must succeed; on any failure nothing is returned.

use crate::codec::Codec;
use crate::container;
use crate::envelope::{self, EncryptedBlob, SealParams};
use crate::error::{CodecError, FormatError, Result};
use crate::header::{AadScope, CodecInfo, Header};
use crate::registry::{detect_primary_type, get_codec};
use chrono::{SecondsFormat, Utc};

/// Options for building a container
#[derive(Debug, Clone)]
pub struct PackOptions {
    pub mime: String,
    pub orig_name: String,
    /// Codec name; `None` picks the default for the MIME's primary type
    pub codec: Option<String>,
    pub notes: Option<String>,
    /// Authenticate the header as AEAD associated data
    pub bind_header: bool,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            mime: "application/octet-stream".to_string(),
            orig_name: String::new(),
            codec: None,
            notes: None,
            bind_header: true,
        }
    }
}

/// Compress, encrypt and serialize `payload` into a container
pub fn compress_and_encrypt(
    payload: &[u8],
    mime: &str,
    orig_name: &str,
    password: &str,
    codec_override: Option<&str>,
) -> Result<Vec<u8>> {
    let options = PackOptions {
        mime: mime.to_string(),
        orig_name: orig_name.to_string(),
        codec: codec_override.map(str::to_string),
        ..Default::default()
    };
    compress_and_encrypt_with(payload, password, &options)
}

#[tracing::instrument(skip_all, fields(mime = %options.mime, size = payload.len()))]
pub fn compress_and_encrypt_with(
    payload: &[u8],
    password: &str,
    options: &PackOptions,
) -> Result<Vec<u8>> {
    let ptype = detect_primary_type(&options.mime);
    let codec = get_codec(ptype, options.codec.as_deref())?;
    let encoded = codec.compress(payload, &options.mime)?;
    tracing::debug!(
        codec = codec.name(),
        %ptype,
        orig_size = payload.len(),
        comp_size = encoded.compressed.len(),
        "compressed payload"
    );

    let params = SealParams::random();
    let mut header = Header::new(options.mime.as_str(), options.orig_name.as_str());
    header.created = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    header.ptype = ptype;
    header.kdf.salt = params.salt().to_vec();
    header.cipher.iv = params.iv().to_vec();
    header.orig_size = Some(payload.len() as u64);
    header.comp_size = Some(encoded.compressed.len() as u64);
    header.notes = options.notes.clone();
    header.codec = CodecInfo {
        name: codec.name().to_string(),
        version: codec.version().to_string(),
        meta: encoded.meta,
    };

    let aad = if options.bind_header {
        header.cipher.aad = Some(AadScope::Header);
        header.aad_bytes()?
    } else {
        Vec::new()
    };

    let blob = envelope::seal(&encoded.compressed, password, params, &aad)?;
    header.cipher.tag = blob.tag.to_vec();

    // Readers rebuild the AAD from the stored bytes, so they must reproduce it
    if options.bind_header
        && Header::stored_aad(&header.to_bytes()?, &header.cipher.tag)? != aad
    {
        return Err(FormatError::InvalidHeader(
            "header bytes do not reproduce the bound data".into(),
        )
        .into());
    }

    let out = container::pack(&header, &blob.ciphertext)?;
    tracing::debug!(container_size = out.len(), bound = options.bind_header, "sealed container");
    Ok(out)
}

/// Parse, authenticate and decode a container, returning its header and payload
#[tracing::instrument(skip_all, fields(size = container.len()))]
pub fn open(container: &[u8], password: &str) -> Result<(Header, Vec<u8>)> {
    let (header, raw_header, ciphertext) = container::unpack_with_raw(container)?;
    let blob = EncryptedBlob::from_parts(
        ciphertext.to_vec(),
        &header.kdf.salt,
        &header.cipher.iv,
        &header.cipher.tag,
    )?;

    let aad = if header.is_bound() {
        Header::stored_aad(raw_header, &header.cipher.tag)?
    } else {
        Vec::new()
    };
    let compressed = envelope::decrypt_with_aad(&blob, password, &aad)?;

    let codec = codec_for(&header)?;
    let payload = codec.decompress(&compressed, &header.codec.meta)?;

    if let Some(expected) = header.orig_size {
        let actual = payload.len() as u64;
        if actual != expected {
            return Err(CodecError::LengthMismatch { expected, actual }.into());
        }
    }

    tracing::debug!(codec = codec.name(), size = payload.len(), "opened container");
    Ok((header, payload))
}

/// Like `open`, dropping the header
pub fn decrypt_and_decompress(container: &[u8], password: &str) -> Result<Vec<u8>> {
    open(container, password).map(|(_, payload)| payload)
}

fn codec_for(header: &Header) -> Result<&'static dyn Codec> {
    // Older writers could leave the name empty
    let name = Some(header.codec.name.as_str()).filter(|n| !n.is_empty());
    let codec = get_codec(header.ptype, name)?;

    if !header.codec.version.is_empty() && header.codec.version != codec.version() {
        tracing::warn!(
            codec = codec.name(),
            recorded = %header.codec.version,
            current = codec.version(),
            "codec version differs from the one that wrote this container"
        );
    }
    Ok(codec)
}
