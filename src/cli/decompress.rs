use crate::cli::check_default_output;
use crate::container::{read_container_file, write_atomic, write_atomic_new};
use crate::error::Result;
use crate::header::Header;
use crate::pipeline::open;
use std::fmt;
use std::path::{Path, PathBuf};

/// Options for the decompress command
#[derive(Clone, Default)]
pub struct DecompressOptions {
    pub passphrase: String,
}

impl fmt::Debug for DecompressOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecompressOptions")
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

/// Where to restore a payload when no output is given: the file-name
/// component of `orig_name`, next to the container. Directory parts of the
/// recorded name are ignored.
pub fn default_restore_path(container_path: &Path, header: &Header) -> PathBuf {
    let dir = container_path.parent().unwrap_or_else(|| Path::new(""));
    match Path::new(&header.orig_name).file_name() {
        Some(name) => dir.join(name),
        None => container_path.with_extension("restored"),
    }
}

/// Authenticate and decode a container file, writing the original bytes
/// atomically. Without `output_path` the target is `default_restore_path`,
/// which must not exist yet. Returns the path written.
pub fn decompress_file(
    container_path: &Path,
    output_path: Option<&Path>,
    options: &DecompressOptions,
) -> Result<PathBuf> {
    let container = read_container_file(container_path)?;
    let (header, payload) = open(&container, &options.passphrase)?;

    match output_path {
        Some(path) => {
            write_atomic(path, &payload)?;
            Ok(path.to_path_buf())
        }
        None => {
            let output = default_restore_path(container_path, &header);
            check_default_output(&output)?;
            write_atomic_new(&output, &payload)?;
            Ok(output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::compress::{compress_file, CompressOptions};
    use tempfile::tempdir;

    #[test]
    fn test_decompress_roundtrip() {
        let dir = tempdir().unwrap();
        let input_path = dir.path().join("input.txt");
        let container_path = dir.path().join("test.ppc");
        let output_path = dir.path().join("output.txt");

        let original = b"Hello, World! This is a test.";
        std::fs::write(&input_path, original).unwrap();

        let options = CompressOptions {
            passphrase: "my_secret".into(),
            mime: "text/plain".into(),
            ..Default::default()
        };
        compress_file(&input_path, Some(container_path.as_path()), &options).unwrap();

        let options = DecompressOptions {
            passphrase: "my_secret".into(),
        };
        let written = decompress_file(&container_path, Some(output_path.as_path()), &options).unwrap();

        assert_eq!(written, output_path);
        assert_eq!(std::fs::read(&output_path).unwrap(), original);
    }

    #[test]
    fn test_decompress_default_output_uses_orig_name() {
        let dir = tempdir().unwrap();
        let src_dir = dir.path().join("src");
        let out_dir = dir.path().join("out");
        std::fs::create_dir_all(&src_dir).unwrap();
        std::fs::create_dir_all(&out_dir).unwrap();

        let input_path = src_dir.join("report.pdf");
        std::fs::write(&input_path, b"%PDF-1.7 fake").unwrap();

        let container_path = out_dir.join("archive.ppc");
        let options = CompressOptions {
            passphrase: "pw".into(),
            ..Default::default()
        };
        compress_file(&input_path, Some(container_path.as_path()), &options).unwrap();

        let options = DecompressOptions {
            passphrase: "pw".into(),
        };
        let written = decompress_file(&container_path, None, &options).unwrap();
        assert_eq!(written, out_dir.join("report.pdf"));
        assert_eq!(std::fs::read(&written).unwrap(), b"%PDF-1.7 fake");
    }

    #[test]
    fn test_decompress_wrong_passphrase() {
        let dir = tempdir().unwrap();
        let input_path = dir.path().join("input.txt");
        let container_path = dir.path().join("test.ppc");
        let output_path = dir.path().join("output.txt");
        std::fs::write(&input_path, b"secret data").unwrap();

        let options = CompressOptions {
            passphrase: "correct".into(),
            ..Default::default()
        };
        compress_file(&input_path, Some(container_path.as_path()), &options).unwrap();

        let options = DecompressOptions {
            passphrase: "wrong".into(),
        };
        let err = decompress_file(&container_path, Some(output_path.as_path()), &options).unwrap_err();
        assert!(err.is_authentication());
        assert!(!output_path.exists());
    }

    #[test]
    fn test_default_output_keeps_existing_file() {
        let dir = tempdir().unwrap();
        let input_path = dir.path().join("notes.txt");
        let container_path = dir.path().join("notes.ppc");
        std::fs::write(&input_path, b"original").unwrap();

        let options = CompressOptions {
            passphrase: "pw".into(),
            mime: "text/plain".into(),
            ..Default::default()
        };
        compress_file(&input_path, Some(container_path.as_path()), &options).unwrap();
        std::fs::write(&input_path, b"edited since, newer work").unwrap();

        let options = DecompressOptions {
            passphrase: "pw".into(),
        };
        let err = decompress_file(&container_path, None, &options).unwrap_err();
        assert!(matches!(
            err,
            crate::PpcError::Io(ref e) if e.kind() == std::io::ErrorKind::AlreadyExists
        ));
        assert_eq!(std::fs::read(&input_path).unwrap(), b"edited since, newer work");

        let restored = dir.path().join("restored.txt");
        decompress_file(&container_path, Some(restored.as_path()), &options).unwrap();
        assert_eq!(std::fs::read(&restored).unwrap(), b"original");
    }

    #[test]
    fn test_default_output_never_replaces_container() {
        let dir = tempdir().unwrap();
        let input_path = dir.path().join("a.bin");
        let container_path = dir.path().join("a.ppc");
        std::fs::write(&input_path, b"payload").unwrap();

        let options = CompressOptions {
            passphrase: "pw".into(),
            bind_header: false,
            ..Default::default()
        };
        compress_file(&input_path, Some(container_path.as_path()), &options).unwrap();

        // Unbound headers can be edited freely; point orig_name at the container
        let blob = std::fs::read(&container_path).unwrap();
        let (mut header, payload) = crate::container::unpack(&blob).unwrap();
        header.orig_name = "a.ppc".into();
        let edited = crate::container::pack(&header, &payload).unwrap();
        std::fs::write(&container_path, &edited).unwrap();

        let options = DecompressOptions {
            passphrase: "pw".into(),
        };
        assert!(decompress_file(&container_path, None, &options).is_err());
        assert_eq!(std::fs::read(&container_path).unwrap(), edited);
    }

    #[test]
    fn test_default_restore_path_strips_directories() {
        let mut header = Header::new("text/plain", "../../etc/passwd");
        let path = default_restore_path(Path::new("/tmp/box/x.ppc"), &header);
        assert_eq!(path, PathBuf::from("/tmp/box/passwd"));

        header.orig_name = String::new();
        let path = default_restore_path(Path::new("/tmp/box/x.ppc"), &header);
        assert_eq!(path, PathBuf::from("/tmp/box/x.restored"));
    }
}
