//! On-disk layout for downloaded exam documents.
//!
//! `{output_dir}/{year}/ENEM_{year}_{slug}.pdf`

use std::io;
use std::path::{Path, PathBuf};

use crate::models::{DocumentCategory, Year};

/// Deterministic filename for a year's document.
pub fn exam_filename(year: Year, category: DocumentCategory) -> String {
    format!("ENEM_{}_{}.pdf", year, category.slug())
}

/// Directory holding a year's documents.
pub fn year_dir(output_dir: &Path, year: Year) -> PathBuf {
    output_dir.join(year.to_string())
}

/// Full path where a year's document is stored.
pub fn exam_storage_path(output_dir: &Path, year: Year, category: DocumentCategory) -> PathBuf {
    year_dir(output_dir, year).join(exam_filename(year, category))
}

/// Create the year directory if needed and return it.
pub fn ensure_year_dir(output_dir: &Path, year: Year) -> io::Result<PathBuf> {
    let dir = year_dir(output_dir, year);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Sibling path used while a download is in flight.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}
