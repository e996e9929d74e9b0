//! Image variant presets and rendering.
//!
//! An upload is decoded once and rendered into one WebP buffer per preset.
//! Variants are never upscaled: the target width is
//! `min(preset.width, original width)` and the height follows the original
//! aspect ratio.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};

/// Maximum accepted upload size (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Key prefix under which every variant is stored.
pub const UPLOAD_PREFIX: &str = "uploads";

/// Content types accepted for upload, matched against the declared type.
pub const ACCEPTED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Content type of every rendered variant.
pub const VARIANT_CONTENT_TYPE: &str = "image/webp";

/// One output size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePreset {
    pub name: &'static str,
    /// Target width in pixels.
    pub width: u32,
    /// Lossy WebP quality (0-100).
    pub quality: u8,
}

/// Presets, smallest first.
pub const PRESETS: [ImagePreset; 4] = [
    ImagePreset {
        name: "thumb",
        width: 400,
        quality: 75,
    },
    ImagePreset {
        name: "mobile",
        width: 768,
        quality: 80,
    },
    ImagePreset {
        name: "desktop",
        width: 1200,
        quality: 82,
    },
    ImagePreset {
        name: "large",
        width: 1920,
        quality: 85,
    },
];

/// A rendered variant ready to upload.
#[derive(Debug, Clone)]
pub struct RenderedVariant {
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum VariantError {
    #[error("unsupported content type '{0}'")]
    UnsupportedContentType(String),

    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode {preset} variant: {message}")]
    Encode {
        preset: &'static str,
        message: String,
    },
}

/// Check a declared content type against [`ACCEPTED_CONTENT_TYPES`].
pub fn is_accepted_content_type(content_type: &str) -> bool {
    ACCEPTED_CONTENT_TYPES.contains(&content_type)
}

fn format_for(content_type: &str) -> Result<ImageFormat, VariantError> {
    match content_type {
        "image/jpeg" => Ok(ImageFormat::Jpeg),
        "image/png" => Ok(ImageFormat::Png),
        "image/webp" => Ok(ImageFormat::WebP),
        other => Err(VariantError::UnsupportedContentType(other.to_string())),
    }
}

/// Decode `bytes` as the declared `content_type`.
pub fn decode_image(bytes: &[u8], content_type: &str) -> Result<DynamicImage, VariantError> {
    let format = format_for(content_type)?;
    image::load_from_memory_with_format(bytes, format).map_err(VariantError::Decode)
}

/// Output dimensions for `preset` given the original size.
pub fn target_dimensions(original_width: u32, original_height: u32, preset: &ImagePreset) -> (u32, u32) {
    let width = preset.width.min(original_width).max(1);
    if width == original_width {
        return (original_width, original_height.max(1));
    }
    let height = (u64::from(original_height) * u64::from(width) + u64::from(original_width) / 2)
        / u64::from(original_width);
    (width, (height as u32).max(1))
}

/// Resize and encode one variant.
pub fn render_variant(
    image: &DynamicImage,
    preset: &ImagePreset,
) -> Result<RenderedVariant, VariantError> {
    let (original_width, original_height) = image.dimensions();
    let (width, height) = target_dimensions(original_width, original_height, preset);

    let resized = if (width, height) == (original_width, original_height) {
        image.clone()
    } else {
        image.resize_exact(width, height, FilterType::Lanczos3)
    };

    // libwebp only takes 8-bit RGB or RGBA buffers.
    let normalized = if resized.color().has_alpha() {
        DynamicImage::ImageRgba8(resized.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(resized.to_rgb8())
    };

    let encode_error = |message: String| VariantError::Encode {
        preset: preset.name,
        message,
    };
    let encoder = webp::Encoder::from_image(&normalized).map_err(|e| encode_error(e.to_string()))?;
    let bytes = encoder
        .encode_simple(false, f32::from(preset.quality))
        .map_err(|e| encode_error(format!("{e:?}")))?
        .to_vec();

    Ok(RenderedVariant {
        width,
        height,
        bytes,
    })
}

/// Reduce an uploaded filename to a key-safe stem.
///
/// Drops the extension and any directory part, lowercases, replaces every run
/// of characters outside `[a-z0-9_-]` with a single `-`, and falls back to
/// `image` when nothing is left.
pub fn sanitize_basename(filename: &str) -> String {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let stem = match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    };

    let mut out = String::with_capacity(stem.len());
    let mut last_dash = false;
    for ch in stem.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
            out.push(ch);
            last_dash = ch == '-';
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }

    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Storage key: `uploads/{basename}_{unix_timestamp}_{preset}.webp`.
pub fn variant_key(basename: &str, unix_timestamp: i64, preset: &ImagePreset) -> String {
    format!(
        "{UPLOAD_PREFIX}/{basename}_{unix_timestamp}_{}.webp",
        preset.name
    )
}
