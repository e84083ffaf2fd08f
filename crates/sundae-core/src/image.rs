//! Chart image payloads and pre-dispatch validation.
//!
//! The format is taken from the file extension, checked against the
//! configured allow-list, then confirmed by sniffing magic bytes. Size is
//! only advisory: an oversized chart produces a warning, never a rejection.

use std::path::Path;

use base64::Engine;

use crate::config::InputConfig;
use crate::error::AnalysisError;

/// Raster formats the remote model accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Webp,
}

impl ImageFormat {
    /// Format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Format from leading magic bytes.
    pub fn sniff(header: &[u8]) -> Option<Self> {
        if header.len() < 2 {
            return None;
        }

        // JPEG: FF D8 FF
        if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // PNG: 89 50 4E 47
        if header.starts_with(&[0x89, b'P', b'N', b'G']) {
            return Some(Self::Png);
        }

        // GIF: GIF8
        if header.starts_with(b"GIF8") {
            return Some(Self::Gif);
        }

        // WebP: RIFF....WEBP
        if header.len() >= 12 && header.starts_with(b"RIFF") && &header[8..12] == b"WEBP" {
            return Some(Self::Webp);
        }

        // BMP: BM
        if header.starts_with(b"BM") {
            return Some(Self::Bmp);
        }

        None
    }

    /// File extensions that name this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Png => &["png"],
            Self::Jpeg => &["jpg", "jpeg"],
            Self::Gif => &["gif"],
            Self::Bmp => &["bmp"],
            Self::Webp => &["webp"],
        }
    }

    /// Whether any of this format's extensions is in `allowed`.
    pub fn is_allowed(&self, allowed: &[String]) -> bool {
        self.extensions()
            .iter()
            .any(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
    }

    /// MIME type sent alongside the bytes.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Webp => "image/webp",
        }
    }
}

/// Warning raised for images above the advisory size ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeAdvisory {
    pub size_bytes: u64,
    pub max_bytes: u64,
}

impl std::fmt::Display for SizeAdvisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "image is {:.1} MB, above the recommended {} MB; the request may be slow or rejected",
            self.size_bytes as f64 / (1024.0 * 1024.0),
            self.max_bytes / (1024 * 1024)
        )
    }
}

/// One image ready to dispatch.
#[derive(Clone)]
pub struct ImagePayload {
    bytes: Vec<u8>,
    format: ImageFormat,
    name: String,
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("name", &self.name)
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImagePayload {
    /// Read and validate an image file.
    pub fn from_path(path: &Path, input: &InputConfig) -> Result<Self, AnalysisError> {
        if !path.is_file() {
            return Err(AnalysisError::InputInvalid {
                message: format!("file not found: {}", path.display()),
            });
        }
        let bytes = std::fs::read(path).map_err(|e| AnalysisError::InputInvalid {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(bytes, &name, input)
    }

    /// Validate raw bytes (e.g. an upload) named `name`.
    pub fn from_bytes(bytes: Vec<u8>, name: &str, input: &InputConfig) -> Result<Self, AnalysisError> {
        if bytes.is_empty() {
            return Err(AnalysisError::InputInvalid {
                message: format!("{name} is empty"),
            });
        }

        let ext = Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let allowed = input
            .supported_formats
            .iter()
            .any(|f| f.eq_ignore_ascii_case(&ext));
        let declared = ImageFormat::from_extension(&ext).filter(|_| allowed);
        let Some(declared) = declared else {
            return Err(AnalysisError::InputInvalid {
                message: format!(
                    "unsupported file type '{ext}' for {name} (allowed: {})",
                    input.supported_formats.join(", ")
                ),
            });
        };

        let header = &bytes[..bytes.len().min(12)];
        let format = match ImageFormat::sniff(header) {
            Some(sniffed) if sniffed != declared => {
                tracing::debug!(
                    "{name} has a .{ext} extension but {} content; using the content type",
                    sniffed.mime_type()
                );
                sniffed
            }
            Some(sniffed) => sniffed,
            None => {
                return Err(AnalysisError::InputInvalid {
                    message: format!("{name} is not a recognised image (invalid magic bytes)"),
                })
            }
        };

        // The detected type must pass the allow-list too, not just the extension
        if !format.is_allowed(&input.supported_formats) {
            return Err(AnalysisError::InputInvalid {
                message: format!(
                    "{name} contains {} data, which is not an allowed format (allowed: {})",
                    format.mime_type(),
                    input.supported_formats.join(", ")
                ),
            });
        }

        Ok(Self {
            bytes,
            format,
            name: name.to_string(),
        })
    }

    /// Wrap bytes with a caller-declared format, skipping validation.
    ///
    /// The dispatcher still refuses an empty payload.
    pub fn from_raw(bytes: Vec<u8>, format: ImageFormat, name: &str) -> Self {
        Self {
            bytes,
            format,
            name: name.to_string(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Base64 of the bytes, as embedded in the request body.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// The advisory raised when the image is above `max_bytes`.
    pub fn size_advisory(&self, max_bytes: u64) -> Option<SizeAdvisory> {
        let size_bytes = self.bytes.len() as u64;
        (size_bytes > max_bytes).then_some(SizeAdvisory {
            size_bytes,
            max_bytes,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Smallest byte string that passes PNG sniffing.
    pub(crate) fn png_bytes() -> Vec<u8> {
        vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D]
    }

    #[test]
    fn test_sniff_formats() {
        assert_eq!(ImageFormat::sniff(&png_bytes()), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::sniff(b"GIF89a"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WEBP"), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::sniff(b"BM\0\0"), Some(ImageFormat::Bmp));
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WAVE"), None);
        assert_eq!(ImageFormat::sniff(&[0, 0, 0, 0]), None);
    }

    #[test]
    fn test_from_bytes_png() {
        let payload =
            ImagePayload::from_bytes(png_bytes(), "chart.PNG", &InputConfig::default()).unwrap();
        assert_eq!(payload.format(), ImageFormat::Png);
        assert_eq!(payload.format().mime_type(), "image/png");
        assert_eq!(payload.name(), "chart.PNG");
    }

    #[test]
    fn test_empty_payload_rejected() {
        let err = ImagePayload::from_bytes(Vec::new(), "chart.png", &InputConfig::default())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InputInvalid { .. }));
    }

    #[test]
    fn test_extension_outside_allow_list_rejected() {
        let input = InputConfig {
            supported_formats: vec!["png".into()],
            ..InputConfig::default()
        };
        let err = ImagePayload::from_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0], "chart.jpg", &input)
            .unwrap_err();
        assert!(err.to_string().contains("unsupported file type 'jpg'"));

        let err = ImagePayload::from_bytes(png_bytes(), "chart.tiff", &InputConfig::default())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InputInvalid { .. }));
    }

    #[test]
    fn test_detected_type_outside_allow_list_rejected() {
        let input = InputConfig {
            supported_formats: vec!["png".into()],
            ..InputConfig::default()
        };
        let err = ImagePayload::from_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2], "chart.png", &input)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InputInvalid { .. }));
        assert!(err.to_string().contains("image/jpeg"));
    }

    #[test]
    fn test_jpeg_allowed_under_either_extension() {
        assert!(ImageFormat::Jpeg.is_allowed(&["JPEG".to_string()]));
        assert!(ImageFormat::Jpeg.is_allowed(&["jpg".to_string()]));
        assert!(!ImageFormat::Webp.is_allowed(&["png".to_string(), "gif".to_string()]));
    }

    #[test]
    fn test_garbage_content_rejected() {
        let err = ImagePayload::from_bytes(b"not an image".to_vec(), "chart.png", &InputConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("magic bytes"));
    }

    #[test]
    fn test_content_type_wins_over_extension() {
        let payload = ImagePayload::from_bytes(
            vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2],
            "screenshot.png",
            &InputConfig::default(),
        )
        .unwrap();
        assert_eq!(payload.format(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_size_is_advisory() {
        let payload =
            ImagePayload::from_bytes(png_bytes(), "chart.png", &InputConfig::default()).unwrap();
        assert!(payload.size_advisory(1024).is_none());
        let advisory = payload.size_advisory(4).unwrap();
        assert_eq!(advisory.size_bytes, 12);
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = ImagePayload::from_path(Path::new("/definitely/not/here.png"), &InputConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("btc_4h.png");
        std::fs::write(&path, png_bytes()).unwrap();
        let payload = ImagePayload::from_path(&path, &InputConfig::default()).unwrap();
        assert_eq!(payload.name(), "btc_4h.png");
        assert_eq!(payload.len(), 12);
        assert!(!payload.to_base64().is_empty());
    }
}
