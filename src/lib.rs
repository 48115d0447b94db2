//! PPC - password-protected compressed containers
//!
//! A single-file container that stores one payload compressed with a
//! content-aware codec and encrypted with a password.
//!
//! ## Layout
//!
//! ```text
//! "PPC1" | version (u8) | header length (u32 LE) | header JSON | ciphertext
//! ```
//!
//! The header is plaintext JSON: original name and MIME type, KDF salt,
//! AES-GCM IV and tag, and the codec name and metadata needed to invert
//! the compression. By default the header is also authenticated as AEAD
//! associated data.
//!
//! ## Pipeline
//!
//! ```text
//! Input → Codec (huffman, none, zstd, lz4, brotli) → AES-256-GCM → Container
//! ```
//!
//! - **Codec**: chosen from the MIME primary type unless named explicitly
//! - **Key**: PBKDF2-HMAC-SHA256, 100 000 iterations, fresh salt per container
//! - **Cipher**: AES-256-GCM, fresh IV per container
//!
//! ## Example
//!
//! ```no_run
//! use ppc::{compress_and_encrypt, decrypt_and_decompress};
//!
//! let container = compress_and_encrypt(
//!     b"hello hello hello",
//!     "text/plain",
//!     "hello.txt",
//!     "correct horse",
//!     None,
//! ).unwrap();
//!
//! let payload = decrypt_and_decompress(&container, "correct horse").unwrap();
//! assert_eq!(payload, b"hello hello hello");
//! ```

pub mod cli;
pub mod codec;
pub mod container;
pub mod envelope;
pub mod error;
pub mod header;
pub mod pipeline;
pub mod registry;

pub use codec::{Codec, CodecKind, CodecMeta, CodecResult};
pub use container::{pack, unpack};
pub use error::{CodecError, EnvelopeError, FormatError, PpcError, Result};
pub use header::{Header, PrimaryType};
pub use pipeline::{
    compress_and_encrypt, compress_and_encrypt_with, decrypt_and_decompress, open, PackOptions,
};
pub use registry::{detect_primary_type, get_codec};
