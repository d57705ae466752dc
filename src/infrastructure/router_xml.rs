// Router XML helpers - The web API answers with flat <response>/<error> documents
use crate::application::acquisition_client::AcquisitionError;

/// Extract the text of `<tag>...</tag>`. A self-closing `<tag/>` yields an empty string.
pub fn extract_tag(body: &str, tag: &str) -> Option<String> {
    let open = format!("<{}>", tag);
    if let Some(start) = body.find(&open) {
        let start_idx = start + open.len();
        let close = format!("</{}>", tag);
        if let Some(end_idx) = body[start_idx..].find(&close) {
            return Some(unescape(body[start_idx..start_idx + end_idx].trim()));
        }
    }

    if body.contains(&format!("<{}/>", tag)) {
        return Some(String::new());
    }
    None
}

/// Fail on an `<error>` document, otherwise hand back the body.
pub fn check_response(body: &str) -> Result<&str, AcquisitionError> {
    if body.contains("<error>") {
        let code = extract_tag(body, "code").unwrap_or_else(|| "unknown".to_string());
        let message = extract_tag(body, "message").unwrap_or_default();
        return Err(AcquisitionError::Device { code, message });
    }
    if !body.contains("<response>") {
        return Err(AcquisitionError::Malformed(format!(
            "expected <response> document, got {} bytes",
            body.len()
        )));
    }
    Ok(body)
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
