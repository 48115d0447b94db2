use crate::container::read_container_header;
use crate::envelope::PBKDF2_ITERATIONS;
use crate::error::Result;
use std::path::Path;

/// Describe a container from its plaintext header. Never decrypts.
pub fn show_info(path: &Path) -> Result<String> {
    let header = read_container_header(path)?;
    let file_size = std::fs::metadata(path)?.len();

    let mut output = String::new();
    output.push_str("PPC Container Information\n");
    output.push_str("=========================\n\n");

    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str(&format!("Size: {}\n", format_size(file_size)));
    output.push('\n');

    output.push_str("Content:\n");
    output.push_str(&format!("  Original name: {}\n", header.orig_name));
    output.push_str(&format!("  MIME type: {}\n", header.mime));
    output.push_str(&format!("  Primary type: {}\n", header.ptype));
    output.push_str(&format!("  Created: {}\n", header.created));
    if let Some(size) = header.orig_size {
        output.push_str(&format!("  Original size: {}\n", format_size(size)));
    }
    if let Some(notes) = &header.notes {
        output.push_str(&format!("  Notes: {}\n", notes));
    }
    output.push('\n');

    output.push_str("Codec:\n");
    output.push_str(&format!("  Name: {}\n", header.codec.name));
    output.push_str(&format!("  Version: {}\n", header.codec.version));
    if let Some(size) = header.comp_size {
        output.push_str(&format!("  Compressed size: {}\n", format_size(size)));
        if let Some(orig) = header.orig_size.filter(|&o| o > 0) {
            output.push_str(&format!("  Ratio: {:.1}%\n", size as f64 * 100.0 / orig as f64));
        }
    }
    output.push('\n');

    output.push_str("Encryption:\n");
    output.push_str(&format!(
        "  KDF: PBKDF2-HMAC-SHA256 ({} iterations)\n",
        PBKDF2_ITERATIONS
    ));
    output.push_str("  Cipher: AES-256-GCM\n");
    output.push_str(&format!(
        "  Header authenticated: {}\n",
        if header.is_bound() { "yes" } else { "no" }
    ));

    Ok(output)
}

pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
