//! Base64, data-URL and raster format helpers.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;

use crate::error::{MediaError, MediaResult};

/// Raster formats accepted from users.
const SUPPORTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::WebP,
    ImageFormat::Gif,
    ImageFormat::Bmp,
];

/// Basic facts about an encoded image, determined without a full decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub mime_type: &'static str,
}

/// Sniff the encoding of `bytes` and reject empty or unsupported payloads.
pub fn inspect_image(bytes: &[u8]) -> MediaResult<ImageInfo> {
    if bytes.is_empty() {
        return Err(MediaError::invalid_image_data("image is empty"));
    }

    let format = image::guess_format(bytes)
        .map_err(|e| MediaError::UnsupportedFormat(e.to_string()))?;

    if !SUPPORTED_FORMATS.contains(&format) {
        return Err(MediaError::UnsupportedFormat(format!("{:?}", format)));
    }

    Ok(ImageInfo {
        format,
        mime_type: mime_type(format),
    })
}

fn mime_type(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Png => "image/png",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Gif => "image/gif",
        ImageFormat::Bmp => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// Remove a `data:<mime>;base64,` prefix if present.
pub fn strip_data_url_prefix(payload: &str) -> &str {
    let payload = payload.trim();
    if payload.starts_with("data:") {
        match payload.split_once(',') {
            Some((_, data)) => data,
            None => "",
        }
    } else {
        payload
    }
}

/// Standard base64 encoding.
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a base64 payload, with or without a data-URL prefix.
pub fn decode_base64_payload(payload: &str) -> MediaResult<Vec<u8>> {
    let data = strip_data_url_prefix(payload);
    if data.is_empty() {
        return Err(MediaError::invalid_image_data("image payload is empty"));
    }

    STANDARD
        .decode(data)
        .map_err(|e| MediaError::invalid_image_data(format!("not valid base64: {}", e)))
}

/// Build a `data:` URL for the given bytes.
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, encode_base64(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 10, 10]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_strip_prefix() {
        assert_eq!(strip_data_url_prefix("data:image/jpeg;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_url_prefix("QUJD"), "QUJD");
        assert_eq!(strip_data_url_prefix("  QUJD\n"), "QUJD");
        assert_eq!(strip_data_url_prefix("data:image/jpeg;base64"), "");
    }

    #[test]
    fn test_decode_rejects_empty_payload() {
        let err = decode_base64_payload("data:image/jpeg;base64,").unwrap_err();
        assert!(matches!(err, MediaError::InvalidImageData(_)));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_base64_payload("not*base64!").unwrap_err();
        assert!(matches!(err, MediaError::InvalidImageData(_)));
    }

    #[test]
    fn test_data_url_decodes_back() {
        let url = to_data_url("image/png", b"hello");
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(decode_base64_payload(&url).unwrap(), b"hello");
    }

    #[test]
    fn test_inspect_png() {
        let info = inspect_image(&png_bytes()).unwrap();
        assert_eq!(info.format, ImageFormat::Png);
        assert_eq!(info.mime_type, "image/png");
    }

    #[test]
    fn test_inspect_rejects_empty_and_unknown() {
        assert!(matches!(
            inspect_image(&[]),
            Err(MediaError::InvalidImageData(_))
        ));
        assert!(matches!(
            inspect_image(b"plain text, not an image"),
            Err(MediaError::UnsupportedFormat(_))
        ));
    }
}
