//! Validation of product image references.
//!
//! A product's `imageUrl` is stored verbatim. It may point at an external
//! http(s) resource, at a server-relative asset, or carry the image inline
//! as a base64 `data:` URL.

use base64::{Engine, engine::general_purpose::STANDARD};
use url::Url;

use crate::error::{AppError, AppResult};

pub const PLACEHOLDER_IMAGE: &str = "/placeholder-product.svg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    External(Url),
    Relative(String),
    Inline { mime: String, bytes: usize },
}

/// Missing or blank references fall back to the placeholder asset.
pub fn normalize(raw: Option<String>) -> String {
    match raw {
        Some(value) if !value.trim().is_empty() => value,
        _ => PLACEHOLDER_IMAGE.to_string(),
    }
}

pub fn classify(raw: &str) -> AppResult<ImageRef> {
    if let Some(rest) = raw.strip_prefix("data:") {
        return classify_inline(rest);
    }

    if raw.starts_with('/') {
        if raw.starts_with("//") || raw.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(
                "imageUrl path must be a single-slash path without whitespace".into(),
            ));
        }
        return Ok(ImageRef::Relative(raw.to_string()));
    }

    let url = Url::parse(raw)
        .map_err(|_| AppError::Validation("imageUrl is not a valid URL".into()))?;
    match url.scheme() {
        "http" | "https" => Ok(ImageRef::External(url)),
        scheme => Err(AppError::Validation(format!(
            "imageUrl scheme {scheme} is not supported"
        ))),
    }
}

fn classify_inline(rest: &str) -> AppResult<ImageRef> {
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AppError::Validation("imageUrl data URL has no payload".into()))?;
    let mime = header.strip_suffix(";base64").ok_or_else(|| {
        AppError::Validation("imageUrl data URL must be base64 encoded".into())
    })?;
    if !mime.starts_with("image/") || mime.len() == "image/".len() {
        return Err(AppError::Validation(format!(
            "imageUrl data URL must carry an image type, got {mime:?}"
        )));
    }

    let bytes = STANDARD
        .decode(payload)
        .map_err(|_| AppError::Validation("imageUrl data URL payload is not valid base64".into()))?;

    Ok(ImageRef::Inline {
        mime: mime.to_string(),
        bytes: bytes.len(),
    })
}

/// Runs [`classify`] on the blocking pool; inline payloads can be megabytes.
pub async fn ingest(raw: String) -> AppResult<(String, ImageRef)> {
    tokio::task::spawn_blocking(move || {
        let image = classify(&raw)?;
        Ok((raw, image))
    })
    .await
    .map_err(|err| AppError::Internal(anyhow::anyhow!("image decode task failed: {err}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_three_forms() {
        assert!(matches!(
            classify("https://cdn.example.com/a.png"),
            Ok(ImageRef::External(_))
        ));
        assert_eq!(
            classify(PLACEHOLDER_IMAGE).unwrap(),
            ImageRef::Relative(PLACEHOLDER_IMAGE.into())
        );
        assert_eq!(
            classify("data:image/png;base64,iVBORw0KGgo=").unwrap(),
            ImageRef::Inline {
                mime: "image/png".into(),
                bytes: 8
            }
        );
    }

    #[test]
    fn rejects_other_schemes_and_shapes() {
        for raw in [
            "ftp://example.com/a.png",
            "javascript:alert(1)",
            "//evil.example.com/a.png",
            "/with space.png",
            "not a url",
            "data:text/plain;base64,aGVsbG8=",
            "data:image/png,raw-bytes",
            "data:image/png;base64,***",
            "data:image/;base64,AAAA",
        ] {
            assert!(classify(raw).is_err(), "accepted {raw}");
        }
    }

    #[test]
    fn blank_reference_becomes_placeholder() {
        assert_eq!(normalize(None), PLACEHOLDER_IMAGE);
        assert_eq!(normalize(Some("  ".into())), PLACEHOLDER_IMAGE);
        assert_eq!(normalize(Some("/x.png".into())), "/x.png");
    }
}
