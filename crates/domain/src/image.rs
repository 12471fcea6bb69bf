use std::fmt::{Display, Formatter};
use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

/// Stable identifier of an image for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageId(u64);

impl ImageId {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for ImageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
        }
    }
}

impl Display for ImageFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Raw file contents of an image together with what decoding learned about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub file_name: String,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    /// `data:` URL suitable for an `<img src>` attribute.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub id: ImageId,
    pub order_index: usize,
    pub payload: ImagePayload,
    pub is_root: bool,
}

pub fn detect_image_format(path: &Path) -> Option<ImageFormat> {
    let ext = path.extension().and_then(|ext| ext.to_str())?;

    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "png" => Some(ImageFormat::Png),
        "webp" => Some(ImageFormat::Webp),
        "gif" => Some(ImageFormat::Gif),
        "bmp" => Some(ImageFormat::Bmp),
        "tif" | "tiff" => Some(ImageFormat::Tiff),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_format_detection_works() {
        assert_eq!(
            detect_image_format(Path::new("a.JPG")),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            detect_image_format(Path::new("dir/b.webp")),
            Some(ImageFormat::Webp)
        );
        assert_eq!(detect_image_format(Path::new("c.nef")), None);
        assert_eq!(detect_image_format(Path::new("no_extension")), None);
    }

    #[test]
    fn data_url_carries_mime_type_and_base64_body() {
        let payload = ImagePayload {
            file_name: "a.png".to_string(),
            format: ImageFormat::Png,
            width: 1,
            height: 1,
            bytes: b"abc".to_vec(),
        };
        assert_eq!(payload.data_url(), "data:image/png;base64,YWJj");
    }
}
