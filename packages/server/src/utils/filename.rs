/// Longest filename kept on a receipt, in characters.
pub const MAX_FILENAME_CHARS: usize = 255;

/// Longest declared MIME type kept on a receipt, in characters.
pub const MAX_MIME_CHARS: usize = 127;

/// Normalizes a client-supplied filename into advisory receipt metadata.
///
/// Keeps only the final path component (browsers may send
/// `C:\fakepath\clip.mp4`), strips control characters and null bytes, trims
/// whitespace and caps the length. Returns `None` when nothing usable is left.
pub fn normalize_filename(raw: &str) -> Option<String> {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = last.chars().filter(|c| !c.is_control()).collect();
    let trimmed = cleaned.trim();

    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        return None;
    }

    Some(trimmed.chars().take(MAX_FILENAME_CHARS).collect())
}

/// Picks the MIME type recorded on a receipt.
///
/// A declared type wins; otherwise it is guessed from the filename's
/// extension.
pub fn resolve_mime(declared: Option<&str>, filename: Option<&str>) -> Option<String> {
    let declared = declared
        .map(str::trim)
        .filter(|m| {
            !m.is_empty() && m.len() <= MAX_MIME_CHARS && !m.chars().any(|c| c.is_control())
        });

    match declared {
        Some(m) => Some(m.to_string()),
        None => filename
            .and_then(|name| mime_guess::from_path(name).first())
            .map(|m| m.to_string()),
    }
}
