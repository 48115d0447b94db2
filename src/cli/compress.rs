use crate::cli::check_default_output;
use crate::container::{write_atomic_new, write_container_file};
use crate::error::Result;
use crate::pipeline::{compress_and_encrypt_with, PackOptions};
use std::fmt;
use std::path::{Path, PathBuf};

/// Options for the compress command
#[derive(Clone)]
pub struct CompressOptions {
    pub passphrase: String,
    pub mime: String,
    pub codec: Option<String>,
    pub notes: Option<String>,
    pub bind_header: bool,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            passphrase: String::new(),
            mime: "application/octet-stream".to_string(),
            codec: None,
            notes: None,
            bind_header: true,
        }
    }
}

impl fmt::Debug for CompressOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressOptions")
            .field("passphrase", &"<redacted>")
            .field("mime", &self.mime)
            .field("codec", &self.codec)
            .field("notes", &self.notes)
            .field("bind_header", &self.bind_header)
            .finish()
    }
}

/// What `compress_file` wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressReport {
    pub output: PathBuf,
    pub orig_size: u64,
    pub container_size: u64,
}

/// `input` with its extension replaced by `.ppc`
pub fn default_container_path(input: &Path) -> PathBuf {
    input.with_extension("ppc")
}

/// Compress and encrypt a file into a container.
/// The container is written atomically; on error nothing is left at the output path.
/// Without `output_path` the container goes to `default_container_path`, which
/// must not exist yet.
pub fn compress_file(
    input_path: &Path,
    output_path: Option<&Path>,
    options: &CompressOptions,
) -> Result<CompressReport> {
    let data = std::fs::read(input_path)?;
    let output = match output_path {
        Some(path) => path.to_path_buf(),
        None => {
            let path = default_container_path(input_path);
            check_default_output(&path)?;
            path
        }
    };

    let orig_name = input_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let pack = PackOptions {
        mime: options.mime.clone(),
        orig_name,
        codec: options.codec.clone(),
        notes: options.notes.clone(),
        bind_header: options.bind_header,
    };
    let container = compress_and_encrypt_with(&data, &options.passphrase, &pack)?;

    if output_path.is_some() {
        write_container_file(&output, &container)?;
    } else {
        write_atomic_new(&output, &container)?;
    }

    Ok(CompressReport {
        output,
        orig_size: data.len() as u64,
        container_size: container.len() as u64,
    })
}
