//! Codec capability and the built-in codecs.
//!
//! A codec turns a payload into `(compressed, meta)` where `meta` holds
//! everything needed to invert it. Codecs are stateless; every call builds
//! whatever tables it needs from scratch.

pub mod general;
pub mod huffman;
pub mod passthrough;

pub use general::{BrotliCodec, Lz4Codec, ZstdCodec};
pub use huffman::HuffmanCodec;
pub use passthrough::PassthroughCodec;

use crate::error::CodecError;
use std::fmt;

/// Opaque codec metadata stored in the header (`codec.meta`)
pub type CodecMeta = serde_json::Map<String, serde_json::Value>;

/// Output of `Codec::compress`
#[derive(Debug, Clone, PartialEq)]
pub struct CodecResult {
    pub compressed: Vec<u8>,
    pub meta: CodecMeta,
}

pub trait Codec: Send + Sync {
    /// Registry name written to `codec.name`
    fn name(&self) -> &'static str;

    fn version(&self) -> &'static str;

    fn compress(&self, data: &[u8], mime: &str) -> Result<CodecResult, CodecError>;

    fn decompress(&self, data: &[u8], meta: &CodecMeta) -> Result<Vec<u8>, CodecError>;
}

/// Every codec this build knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecKind {
    Huffman,
    Passthrough,
    Zstd,
    Lz4,
    Brotli,
}

static HUFFMAN: HuffmanCodec = HuffmanCodec;
static PASSTHROUGH: PassthroughCodec = PassthroughCodec;
static ZSTD: ZstdCodec = ZstdCodec::new(general::DEFAULT_ZSTD_LEVEL);
static LZ4: Lz4Codec = Lz4Codec;
static BROTLI: BrotliCodec = BrotliCodec;

impl CodecKind {
    pub const ALL: [CodecKind; 5] = [
        CodecKind::Huffman,
        CodecKind::Passthrough,
        CodecKind::Zstd,
        CodecKind::Lz4,
        CodecKind::Brotli,
    ];

    /// Resolve a registered codec name. Names written by older tools are
    /// accepted so their containers stay readable.
    pub fn from_name(name: &str) -> Result<Self, CodecError> {
        match name {
            "huffman" | "text-huffman" => Ok(Self::Huffman),
            "none" | "audio-noop" => Ok(Self::Passthrough),
            "zstd" | "image-vae-stub" => Ok(Self::Zstd),
            "lz4" => Ok(Self::Lz4),
            "brotli" => Ok(Self::Brotli),
            other => Err(CodecError::UnknownCodec(other.to_string())),
        }
    }

    /// The shared codec instance
    pub fn codec(self) -> &'static dyn Codec {
        match self {
            Self::Huffman => &HUFFMAN,
            Self::Passthrough => &PASSTHROUGH,
            Self::Zstd => &ZSTD,
            Self::Lz4 => &LZ4,
            Self::Brotli => &BROTLI,
        }
    }

    pub fn name(self) -> &'static str {
        self.codec().name()
    }
}

impl std::str::FromStr for CodecKind {
    type Err = CodecError;
    fn from_str(s: &str) -> Result<Self, CodecError> {
        Self::from_name(s)
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
