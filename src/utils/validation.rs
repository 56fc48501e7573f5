use crate::config::UploadConfig;
use crate::error::Rejection;
use crate::models::UploadCandidate;

/// Media types the uploader accepts out of the box
pub const ACCEPTED_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

/// Lowercased `type/subtype` with parameters and whitespace stripped
pub fn normalize_mime(content_type: &str) -> String {
    match content_type.trim().parse::<mime::Mime>() {
        Ok(parsed) => parsed.essence_str().to_lowercase(),
        Err(_) => content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase(),
    }
}

/// Validates the declared MIME type against the accepted list
pub fn validate_mime_type(content_type: &str, accepted: &[String]) -> Result<(), Rejection> {
    let normalized = normalize_mime(content_type);

    if accepted.iter().any(|allowed| *allowed == normalized) {
        return Ok(());
    }

    Err(Rejection::UnsupportedType {
        mime: content_type.to_string(),
    })
}

/// Validates file size against maximum limit
pub fn validate_file_size(size: usize, max_size: usize) -> Result<(), Rejection> {
    if size > max_size {
        return Err(Rejection::TooLarge {
            size,
            max: max_size,
        });
    }
    Ok(())
}

/// Single validation path for picker, camera and drag-and-drop arrivals.
///
/// Type is checked before size, so an oversized GIF reports "unsupported type".
pub fn validate_candidate(
    candidate: &UploadCandidate,
    config: &UploadConfig,
) -> Result<(), Rejection> {
    validate_mime_type(&candidate.declared_mime, &config.accepted_mime_types)?;
    validate_file_size(candidate.size, config.max_file_size)?;
    Ok(())
}

/// Reads the magic bytes to find out what the file really is
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    infer::get(bytes).map(|kind| kind.mime_type())
}

/// True when the sniffed type agrees with the declared one.
///
/// `image/jpg` is a common alias for `image/jpeg`. Unknown content counts as agreeing.
pub fn declared_type_matches(bytes: &[u8], declared: &str) -> bool {
    let Some(sniffed) = sniff_mime(bytes) else {
        return true;
    };
    let declared = match normalize_mime(declared).as_str() {
        "image/jpg" => "image/jpeg".to_string(),
        other => other.to_string(),
    };
    sniffed == declared
}
