//! Extension-category grouping used by folder organization.

const DOCUMENTS: &[&str] = &["pdf", "doc", "docx", "txt", "rtf", "odt", "md"];
const SPREADSHEETS: &[&str] = &["xls", "xlsx", "csv", "ods"];
const PRESENTATIONS: &[&str] = &["ppt", "pptx", "odp"];
const IMAGES: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "svg", "webp", "heic"];
const MEDIA: &[&str] = &["mp3", "mp4", "wav", "avi", "mkv", "mov", "flac"];
const ARCHIVES: &[&str] = &["zip", "rar", "7z", "tar", "gz", "bz2"];
const EXECUTABLES: &[&str] = &["exe", "msi", "dmg", "deb", "rpm", "appimage"];

/// Category folder name for a file extension. Unknown extensions land in
/// "Other".
pub fn category_for(extension: &str) -> &'static str {
    let ext = extension.to_lowercase();
    let ext = ext.as_str();
    if DOCUMENTS.contains(&ext) {
        "Documents"
    } else if SPREADSHEETS.contains(&ext) {
        "Spreadsheets"
    } else if PRESENTATIONS.contains(&ext) {
        "Presentations"
    } else if IMAGES.contains(&ext) {
        "Images"
    } else if MEDIA.contains(&ext) {
        "Media"
    } else if ARCHIVES.contains(&ext) {
        "Archives"
    } else if EXECUTABLES.contains(&ext) {
        "Installers"
    } else {
        "Other"
    }
}
