//! General-purpose byte compressors exposed as codecs.
//!
//! None of them need metadata: each stream is self-describing, so `meta`
//! is always written empty.

use super::{Codec, CodecMeta, CodecResult};
use crate::error::CodecError;
use std::io::{Read, Write};

pub const DEFAULT_ZSTD_LEVEL: i32 = 7;

const BROTLI_BUFFER: usize = 4096;
const BROTLI_QUALITY: u32 = 4;
const BROTLI_LG_WINDOW: u32 = 22;

/// zstd at a fixed level
#[derive(Debug, Clone, Copy)]
pub struct ZstdCodec {
    level: i32,
}

impl ZstdCodec {
    pub const fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self::new(DEFAULT_ZSTD_LEVEL)
    }
}

impl Codec for ZstdCodec {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn version(&self) -> &'static str {
        "1.0"
    }

    fn compress(&self, data: &[u8], _mime: &str) -> Result<CodecResult, CodecError> {
        let compressed = zstd::encode_all(data, self.level).map_err(|e| CodecError::Compression {
            codec: "zstd",
            msg: e.to_string(),
        })?;
        Ok(CodecResult {
            compressed,
            meta: CodecMeta::new(),
        })
    }

    fn decompress(&self, data: &[u8], _meta: &CodecMeta) -> Result<Vec<u8>, CodecError> {
        zstd::decode_all(data).map_err(|e| CodecError::Decompression {
            codec: "zstd",
            msg: e.to_string(),
        })
    }
}

/// LZ4 block format with the uncompressed size prepended
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4Codec;

impl Codec for Lz4Codec {
    fn name(&self) -> &'static str {
        "lz4"
    }

    fn version(&self) -> &'static str {
        "1.0"
    }

    fn compress(&self, data: &[u8], _mime: &str) -> Result<CodecResult, CodecError> {
        Ok(CodecResult {
            compressed: lz4_flex::compress_prepend_size(data),
            meta: CodecMeta::new(),
        })
    }

    fn decompress(&self, data: &[u8], _meta: &CodecMeta) -> Result<Vec<u8>, CodecError> {
        lz4_flex::decompress_size_prepended(data).map_err(|e| CodecError::Decompression {
            codec: "lz4",
            msg: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BrotliCodec;

impl Codec for BrotliCodec {
    fn name(&self) -> &'static str {
        "brotli"
    }

    fn version(&self) -> &'static str {
        "1.0"
    }

    fn compress(&self, data: &[u8], _mime: &str) -> Result<CodecResult, CodecError> {
        let mut compressed = Vec::new();
        {
            let mut writer = brotli::CompressorWriter::new(
                &mut compressed,
                BROTLI_BUFFER,
                BROTLI_QUALITY,
                BROTLI_LG_WINDOW,
            );
            writer
                .write_all(data)
                .map_err(|e| CodecError::Compression {
                    codec: "brotli",
                    msg: e.to_string(),
                })?;
            // dropping the writer flushes the final block
        }
        Ok(CodecResult {
            compressed,
            meta: CodecMeta::new(),
        })
    }

    fn decompress(&self, data: &[u8], _meta: &CodecMeta) -> Result<Vec<u8>, CodecError> {
        let mut output = Vec::new();
        brotli::Decompressor::new(data, BROTLI_BUFFER)
            .read_to_end(&mut output)
            .map_err(|e| CodecError::Decompression {
                codec: "brotli",
                msg: e.to_string(),
            })?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codecs() -> [&'static dyn Codec; 3] {
        static Z: ZstdCodec = ZstdCodec::new(DEFAULT_ZSTD_LEVEL);
        [&Z, &Lz4Codec, &BrotliCodec]
    }

    fn roundtrip(codec: &dyn Codec, data: &[u8]) {
        let result = codec.compress(data, "application/octet-stream").unwrap();
        assert!(result.meta.is_empty());
        let restored = codec.decompress(&result.compressed, &result.meta).unwrap();
        assert_eq!(data, &restored[..], "codec {}", codec.name());
    }

    #[test]
    fn test_roundtrip() {
        for codec in codecs() {
            roundtrip(codec, b"Hello, World! This is a test of compression.");
        }
    }

    #[test]
    fn test_empty_data() {
        for codec in codecs() {
            roundtrip(codec, b"");
        }
    }

    #[test]
    fn test_large_data_shrinks() {
        let data: Vec<u8> = (0..100_000).map(|i| (i % 256) as u8).collect();
        for codec in codecs() {
            roundtrip(codec, &data);
            let result = codec.compress(&data, "").unwrap();
            assert!(result.compressed.len() < data.len(), "codec {}", codec.name());
        }
    }

    #[test]
    fn test_zstd_rejects_garbage() {
        let garbage = b"\xde\xad\xbe\xef not a compressed stream";
        assert!(matches!(
            ZstdCodec::default().decompress(garbage, &CodecMeta::new()),
            Err(CodecError::Decompression { codec: "zstd", .. })
        ));
    }
}
