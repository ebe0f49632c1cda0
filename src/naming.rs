//! Output file naming.
//!
//! Every compressed file is named `optimized_<stem>.<ext>`:
//!
//! - `<stem>` is the original name up to its last `.` (the whole name when
//!   there is no extension).
//! - `<ext>` is `jpg` for JPEG output, the literal format tag for PNG and WebP,
//!   and for `original` the source extension lower-cased with `jpeg` → `jpg`.
//!
//! ```text
//! photo.jpeg   + webp     → optimized_photo.webp
//! photo.png    + original → optimized_photo.png
//! archive.JPG  + jpeg     → optimized_archive.jpg
//! scan.JPEG    + original → optimized_scan.jpg
//! ```

use crate::config::OutputFormat;

/// Prefix shared by every output file.
pub const OUTPUT_PREFIX: &str = "optimized_";

/// Split a file name into stem and extension at the last dot.
///
/// A leading dot alone (`.hidden`) does not count as an extension.
fn split_name(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => (&name[..pos], Some(&name[pos + 1..])),
        _ => (name, None),
    }
}

fn normalize_extension(ext: &str) -> String {
    let lower = ext.to_ascii_lowercase();
    if lower == "jpeg" { "jpg".to_string() } else { lower }
}

/// Extension for an output file, without the dot.
pub fn output_extension(format: OutputFormat, original_name: &str) -> String {
    match format {
        OutputFormat::Original => match split_name(original_name).1 {
            Some(ext) if !ext.is_empty() => normalize_extension(ext),
            _ => "jpg".to_string(),
        },
        OutputFormat::Jpeg => "jpg".to_string(),
        other => other.tag().to_string(),
    }
}

/// Full output file name for a record named `original_name`.
pub fn output_file_name(original_name: &str, format: OutputFormat) -> String {
    let (stem, _) = split_name(original_name);
    format!(
        "{OUTPUT_PREFIX}{stem}.{}",
        output_extension(format, original_name)
    )
}

/// Insert a copy number before the extension, the way browsers number
/// repeated downloads: `optimized_photo.webp` → `optimized_photo (1).webp`.
pub fn numbered_file_name(file_name: &str, copy: usize) -> String {
    match split_name(file_name) {
        (stem, Some(ext)) => format!("{stem} ({copy}).{ext}"),
        (stem, None) => format!("{stem} ({copy})"),
    }
}
