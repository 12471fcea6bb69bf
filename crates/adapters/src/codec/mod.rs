use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use image_manager_application::{
    ApplicationError, CompressedImage, CompressionSettings, ImageCompressor, ImageDecoder, RawFile,
};
use image_manager_domain::{ImageFormat, ImagePayload};

/// Validates uploaded bytes by fully decoding them with the `image` crate.
#[derive(Debug, Default)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, file: RawFile) -> Result<ImagePayload, ApplicationError> {
        let reader = ImageReader::new(Cursor::new(file.bytes.as_slice()))
            .with_guessed_format()
            .map_err(|error| ApplicationError::Decode(error.to_string()))?;
        let format = reader
            .format()
            .and_then(from_image_format)
            .ok_or_else(|| {
                ApplicationError::Decode(format!("unsupported image format: {}", file.name))
            })?;
        let image = reader
            .decode()
            .map_err(|error| ApplicationError::Decode(format!("{}: {error}", file.name)))?;

        Ok(ImagePayload {
            file_name: file.name,
            format,
            width: image.width(),
            height: image.height(),
            bytes: file.bytes,
        })
    }
}

/// Re-encodes images with the `image` crate.
///
/// WebP output is lossless, so `quality` only affects JPEG.
#[derive(Debug, Default)]
pub struct ImageCrateCompressor;

impl ImageCompressor for ImageCrateCompressor {
    fn compress(
        &self,
        payload: &ImagePayload,
        settings: &CompressionSettings,
    ) -> Result<CompressedImage, ApplicationError> {
        settings.validate()?;
        let image = image::load_from_memory_with_format(&payload.bytes, to_image_format(payload.format))
            .map_err(|error| ApplicationError::Decode(error.to_string()))?;

        let (width, height) = target_dimensions(image.width(), image.height(), settings);
        let image = if (width, height) == (image.width(), image.height()) {
            image
        } else {
            image.resize_exact(width, height, FilterType::Lanczos3)
        };

        let bytes = encode(&image, settings)?;
        Ok(CompressedImage {
            format: settings.format,
            bytes,
        })
    }
}

fn encode(image: &DynamicImage, settings: &CompressionSettings) -> Result<Vec<u8>, ApplicationError> {
    let mut bytes = Vec::new();
    let result = match settings.format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8())
            .write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, settings.quality)),
        ImageFormat::Webp => DynamicImage::ImageRgba8(image.to_rgba8())
            .write_with_encoder(WebPEncoder::new_lossless(&mut bytes)),
        ImageFormat::Png => image.write_with_encoder(PngEncoder::new(&mut bytes)),
        other => DynamicImage::ImageRgba8(image.to_rgba8())
            .write_to(&mut Cursor::new(&mut bytes), to_image_format(other)),
    };
    result.map_err(|error| ApplicationError::Io(format!("{} encode failed: {error}", settings.format)))?;
    Ok(bytes)
}

/// Scales by `ratio_percent`, then shrinks to fit the optional bounds while
/// keeping the aspect ratio. Never returns a zero dimension.
pub fn target_dimensions(width: u32, height: u32, settings: &CompressionSettings) -> (u32, u32) {
    let ratio = f64::from(settings.ratio_percent.clamp(1, 100)) / 100.0;
    let mut scale = ratio;
    if let Some(max_width) = settings.max_width {
        scale = scale.min(f64::from(max_width) / f64::from(width.max(1)));
    }
    if let Some(max_height) = settings.max_height {
        scale = scale.min(f64::from(max_height) / f64::from(height.max(1)));
    }

    let scaled = |value: u32| ((f64::from(value) * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

fn from_image_format(format: image::ImageFormat) -> Option<ImageFormat> {
    match format {
        image::ImageFormat::Jpeg => Some(ImageFormat::Jpeg),
        image::ImageFormat::Png => Some(ImageFormat::Png),
        image::ImageFormat::WebP => Some(ImageFormat::Webp),
        image::ImageFormat::Gif => Some(ImageFormat::Gif),
        image::ImageFormat::Bmp => Some(ImageFormat::Bmp),
        image::ImageFormat::Tiff => Some(ImageFormat::Tiff),
        _ => None,
    }
}

fn to_image_format(format: ImageFormat) -> image::ImageFormat {
    match format {
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        ImageFormat::Png => image::ImageFormat::Png,
        ImageFormat::Webp => image::ImageFormat::WebP,
        ImageFormat::Gif => image::ImageFormat::Gif,
        ImageFormat::Bmp => image::ImageFormat::Bmp,
        ImageFormat::Tiff => image::ImageFormat::Tiff,
    }
}
