//! Logo embedding.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;

const BRAND_RED: &str = "#EB1700";

/// The logo as a `data:` URI. A missing or unreadable file falls back to a
/// plain red square.
pub fn logo_data_uri(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(bytes) => {
            log::info!("embedding logo from {}", path.display());
            data_uri(mime_for(path), &bytes)
        }
        Err(err) => {
            log::info!("no logo at {} ({err}); using placeholder", path.display());
            placeholder_uri()
        }
    }
}

pub fn placeholder_uri() -> String {
    let svg = format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='40' height='40'>\
         <rect width='40' height='40' fill='{BRAND_RED}'/></svg>"
    );
    data_uri("image/svg+xml", svg.as_bytes())
}

fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        _ => "image/svg+xml",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_logo_uses_placeholder() {
        let uri = logo_data_uri(Path::new("/definitely/not/here.svg"));
        assert_eq!(uri, placeholder_uri());
        assert!(uri.starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for(Path::new("logo.PNG")), "image/png");
        assert_eq!(mime_for(Path::new("logo.svg")), "image/svg+xml");
    }
}
