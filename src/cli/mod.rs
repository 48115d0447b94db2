pub mod compress;
pub mod decompress;
pub mod info;

pub use compress::*;
pub use decompress::*;
pub use info::*;

use std::io;
use std::path::Path;

/// A derived output path must not replace an existing file, the input included
pub(crate) fn check_default_output(output: &Path) -> io::Result<()> {
    if output.symlink_metadata().is_ok() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("refusing to overwrite {}; pass -o to choose the output", output.display()),
        ));
    }
    Ok(())
}
