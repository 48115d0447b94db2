//! Password-based authenticated encryption.
//!
//! - Key: PBKDF2-HMAC-SHA256, 100 000 iterations, 32 bytes, fresh 16-byte salt
//! - Cipher: AES-256-GCM, fresh 12-byte IV, detached 16-byte tag
//! - Decryption verifies the tag before releasing any plaintext
//!
//! Nothing here logs or stores the password or the derived key.

use crate::error::EnvelopeError;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use hmac::Hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

/// PBKDF2 iteration count (fixed, part of the format)
pub const PBKDF2_ITERATIONS: u32 = 100_000;
pub const KEY_LEN: usize = 32;
/// Salt length written by this crate
pub const SALT_LEN: usize = 16;
/// Salt lengths accepted on read; older writers used 32 bytes
pub const SALT_LEN_RANGE: std::ops::RangeInclusive<usize> = 16..=64;
pub const IV_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// Output of one encryption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlob {
    pub ciphertext: Vec<u8>,
    pub salt: Vec<u8>,
    pub iv: [u8; IV_LEN],
    pub tag: [u8; TAG_LEN],
}

impl EncryptedBlob {
    /// Reassemble a blob from stored parts, checking each length.
    /// The salt may be any length in `SALT_LEN_RANGE`.
    pub fn from_parts(
        ciphertext: Vec<u8>,
        salt: &[u8],
        iv: &[u8],
        tag: &[u8],
    ) -> Result<Self, EnvelopeError> {
        Ok(Self {
            ciphertext,
            salt: salt_in_range(salt)?,
            iv: fixed::<IV_LEN>("iv", iv)?,
            tag: fixed::<TAG_LEN>("tag", tag)?,
        })
    }
}

fn fixed<const N: usize>(field: &'static str, bytes: &[u8]) -> Result<[u8; N], EnvelopeError> {
    bytes.try_into().map_err(|_| EnvelopeError::InvalidParameter {
        field,
        expected: N,
        actual: bytes.len(),
    })
}

fn salt_in_range(salt: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
    if SALT_LEN_RANGE.contains(&salt.len()) {
        Ok(salt.to_vec())
    } else {
        Err(EnvelopeError::InvalidParameter {
            field: "salt",
            expected: SALT_LEN,
            actual: salt.len(),
        })
    }
}

/// Fresh salt and IV for exactly one seal.
/// Only constructible from the OS CSPRNG and consumed by `seal`.
#[derive(Debug)]
pub struct SealParams {
    salt: [u8; SALT_LEN],
    iv: [u8; IV_LEN],
}

impl SealParams {
    pub fn random() -> Self {
        let mut rng = OsRng;
        let mut salt = [0u8; SALT_LEN];
        let mut iv = [0u8; IV_LEN];
        rng.fill_bytes(&mut salt);
        rng.fill_bytes(&mut iv);
        Self { salt, iv }
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }
}

/// Derive a 32-byte AES key from a password and salt
pub fn derive_key(password: &str, salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>, EnvelopeError> {
    derive_key_rounds(password, salt, PBKDF2_ITERATIONS)
}

fn derive_key_rounds(
    password: &str,
    salt: &[u8],
    rounds: u32,
) -> Result<Zeroizing<[u8; KEY_LEN]>, EnvelopeError> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2::<Hmac<Sha256>>(password.as_bytes(), salt, rounds, &mut key[..])
        .map_err(|_| EnvelopeError::KeyDerivation)?;
    Ok(key)
}

fn cipher_for(password: &str, salt: &[u8]) -> Result<Aes256Gcm, EnvelopeError> {
    let key = derive_key(password, salt)?;
    Aes256Gcm::new_from_slice(&key[..]).map_err(|_| EnvelopeError::KeyDerivation)
}

/// Encrypt with fresh parameters and no associated data
pub fn encrypt(plaintext: &[u8], password: &str) -> Result<EncryptedBlob, EnvelopeError> {
    seal(plaintext, password, SealParams::random(), &[])
}

/// Encrypt with caller-held fresh parameters, authenticating `aad` alongside
pub fn seal(
    plaintext: &[u8],
    password: &str,
    params: SealParams,
    aad: &[u8],
) -> Result<EncryptedBlob, EnvelopeError> {
    seal_with_salt(plaintext, password, &params.salt, params.iv, aad)
}

pub(crate) fn seal_with_salt(
    plaintext: &[u8],
    password: &str,
    salt: &[u8],
    iv: [u8; IV_LEN],
    aad: &[u8],
) -> Result<EncryptedBlob, EnvelopeError> {
    let cipher = cipher_for(password, salt)?;
    let mut sealed = cipher
        .encrypt(Nonce::from_slice(&iv), Payload { msg: plaintext, aad })
        .map_err(|_| EnvelopeError::Seal)?;

    // aes-gcm appends the tag; keep it detached
    let tag_bytes = sealed.split_off(sealed.len() - TAG_LEN);
    let tag = fixed::<TAG_LEN>("tag", &tag_bytes)?;

    Ok(EncryptedBlob {
        ciphertext: sealed,
        salt: salt.to_vec(),
        iv,
        tag,
    })
}

/// Decrypt a blob sealed without associated data
pub fn decrypt(blob: &EncryptedBlob, password: &str) -> Result<Vec<u8>, EnvelopeError> {
    decrypt_with_aad(blob, password, &[])
}

/// Verify the tag over ciphertext and `aad`, then decrypt.
/// All-or-nothing: on failure no plaintext byte is returned.
pub fn decrypt_with_aad(
    blob: &EncryptedBlob,
    password: &str,
    aad: &[u8],
) -> Result<Vec<u8>, EnvelopeError> {
    let cipher = cipher_for(password, &blob.salt)?;

    let mut combined = Vec::with_capacity(blob.ciphertext.len() + TAG_LEN);
    combined.extend_from_slice(&blob.ciphertext);
    combined.extend_from_slice(&blob.tag);

    cipher
        .decrypt(Nonce::from_slice(&blob.iv), Payload { msg: &combined, aad })
        .map_err(|_| EnvelopeError::Authentication)
}
