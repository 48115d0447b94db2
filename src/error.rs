use thiserror::Error;

/// The input is not a valid container for this implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("bad magic: expected \"PPC1\", found {0}")]
    BadMagic(String),

    #[error("unsupported container version: {0}")]
    UnsupportedVersion(u8),

    #[error("truncated container: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },

    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

/// Key derivation and AEAD failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Tag verification failed. Wrong password and tampering look the same.
    #[error("invalid password or corrupted file")]
    Authentication,

    #[error("invalid {field} length: expected {expected}, got {actual}")]
    InvalidParameter {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("key derivation failed")]
    KeyDerivation,

    #[error("encryption failed")]
    Seal,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("unknown codec: {0}")]
    UnknownCodec(String),

    #[error("invalid codec metadata: {0}")]
    InvalidMeta(String),

    #[error("corrupt compressed stream: {0}")]
    CorruptStream(String),

    #[error("{codec} compression failed: {msg}")]
    Compression { codec: &'static str, msg: String },

    #[error("{codec} decompression failed: {msg}")]
    Decompression { codec: &'static str, msg: String },

    #[error("decompressed size {actual} does not match recorded size {expected}")]
    LengthMismatch { expected: u64, actual: u64 },
}

/// Crate-level error; each variant names the stage that failed.
#[derive(Error, Debug)]
pub enum PpcError {
    #[error("serializer: {0}")]
    Format(#[from] FormatError),

    #[error("envelope: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("codec: {0}")]
    Codec(#[from] CodecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PpcError {
    /// True when the AEAD tag did not verify.
    pub fn is_authentication(&self) -> bool {
        matches!(self, PpcError::Envelope(EnvelopeError::Authentication))
    }
}

pub type Result<T> = std::result::Result<T, PpcError>;
