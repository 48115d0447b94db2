use crate::error::{FormatError, Result};
use crate::header::Header;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

/// Magic bytes for the container format
pub const MAGIC: &[u8; 4] = b"PPC1";

/// Version written by `pack`
pub const VERSION: u8 = 2;

/// Versions `unpack` understands
pub const SUPPORTED_VERSIONS: &[u8] = &[1, 2];

/// magic + version + header length
pub const PREFIX_LEN: usize = 4 + 1 + 4;

/// Serialize a header and payload into a container
/// Layout: [magic: 4][version: 1][header_len: 4 LE][header JSON][payload...]
pub fn pack(header: &Header, payload: &[u8]) -> std::result::Result<Vec<u8>, FormatError> {
    let header_bytes = header.to_bytes()?;
    let header_len = u32::try_from(header_bytes.len()).map_err(|_| {
        FormatError::InvalidHeader(format!("header too large: {} bytes", header_bytes.len()))
    })?;

    let mut out = Vec::with_capacity(PREFIX_LEN + header_bytes.len() + payload.len());
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    out.extend_from_slice(&header_len.to_le_bytes());
    out.extend_from_slice(&header_bytes);
    out.extend_from_slice(payload);
    Ok(out)
}

/// Parse a container into its header and raw payload
pub fn unpack(blob: &[u8]) -> std::result::Result<(Header, Vec<u8>), FormatError> {
    let (header, header_end) = parse_prefix_and_header(blob)?;
    Ok((header, blob[header_end..].to_vec()))
}

/// Like `unpack`, also returning the header bytes exactly as stored
pub fn unpack_with_raw(
    blob: &[u8],
) -> std::result::Result<(Header, &[u8], &[u8]), FormatError> {
    let (header, header_end) = parse_prefix_and_header(blob)?;
    Ok((header, &blob[PREFIX_LEN..header_end], &blob[header_end..]))
}

/// Validate the fixed prefix and parse the header.
/// Returns the header and the offset where the payload starts.
fn parse_prefix_and_header(blob: &[u8]) -> std::result::Result<(Header, usize), FormatError> {
    if blob.len() < MAGIC.len() {
        return Err(FormatError::Truncated {
            need: MAGIC.len(),
            have: blob.len(),
        });
    }
    if &blob[0..4] != MAGIC {
        return Err(FormatError::BadMagic(describe_magic(&blob[0..4])));
    }

    if blob.len() < 5 {
        return Err(FormatError::Truncated { need: 5, have: blob.len() });
    }
    let version = blob[4];
    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(FormatError::UnsupportedVersion(version));
    }

    if blob.len() < PREFIX_LEN {
        return Err(FormatError::Truncated {
            need: PREFIX_LEN,
            have: blob.len(),
        });
    }
    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&blob[5..PREFIX_LEN]);
    let header_len = u32::from_le_bytes(len_bytes) as usize;

    let remaining = blob.len() - PREFIX_LEN;
    if remaining < header_len {
        return Err(FormatError::Truncated {
            need: header_len,
            have: remaining,
        });
    }

    let header_end = PREFIX_LEN + header_len;
    let header = Header::from_bytes(&blob[PREFIX_LEN..header_end])?;
    Ok((header, header_end))
}

fn describe_magic(bytes: &[u8]) -> String {
    if bytes.iter().all(|b| b.is_ascii_graphic()) {
        format!("\"{}\"", String::from_utf8_lossy(bytes))
    } else {
        format!("0x{}", hex::encode(bytes))
    }
}

/// Read a whole container file into memory
pub fn read_container_file(path: &Path) -> Result<Vec<u8>> {
    Ok(std::fs::read(path)?)
}

/// Write a container atomically
pub fn write_container_file(path: &Path, container: &[u8]) -> Result<()> {
    write_atomic(path, container)
}

/// Temp file in the target directory, then rename.
/// A failed write never leaves partial content at `path`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    stage(path, bytes)?.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Like `write_atomic`, but fails with `AlreadyExists` instead of replacing
/// an existing file
pub fn write_atomic_new(path: &Path, bytes: &[u8]) -> Result<()> {
    stage(path, bytes)?
        .persist_noclobber(path)
        .map_err(|e| e.error)?;
    Ok(())
}

fn stage(path: &Path, bytes: &[u8]) -> std::io::Result<tempfile::NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

/// Read just the header from a container file (without loading the payload)
pub fn read_container_header(path: &Path) -> Result<Header> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut prefix = Vec::with_capacity(PREFIX_LEN);
    reader.by_ref().take(PREFIX_LEN as u64).read_to_end(&mut prefix)?;
    if prefix.len() < PREFIX_LEN {
        // Let the parser pick the precise error (magic, version or truncation)
        return Ok(parse_prefix_and_header(&prefix)?.0);
    }

    let header_len = u32::from_le_bytes([prefix[5], prefix[6], prefix[7], prefix[8]]) as usize;
    let mut head = prefix;
    reader.take(header_len as u64).read_to_end(&mut head)?;
    Ok(parse_prefix_and_header(&head)?.0)
}
