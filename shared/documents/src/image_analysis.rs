//! Image description with the vision model.

use base64::Engine;
use fluxora_llm::{prompts, ChatModel, ChatRequest, Message, ModelTier};
use fluxora_utils::{FluxoraError, FluxoraResult, ImageConfig};
use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, warn};

pub const IMAGE_FALLBACK_DESCRIPTION: &str = "Image could not be analyzed for image description.";

const ANALYSIS_TEMPERATURE: f32 = 0.7;

/// Size bound and accepted input formats for images sent to the model.
#[derive(Debug, Clone)]
pub struct ImageLimits {
    pub max_width: u32,
    pub max_height: u32,
    pub formats: Vec<ImageFormat>,
}

impl ImageLimits {
    /// Unknown format names in the config are skipped with a warning.
    pub fn from_config(config: &ImageConfig) -> Self {
        let formats = config
            .supported_formats
            .iter()
            .filter_map(|name| {
                let format = ImageFormat::from_extension(name.to_lowercase());
                if format.is_none() {
                    warn!(format = %name, "Ignoring unknown image format");
                }
                format
            })
            .collect();

        Self {
            max_width: config.max_width.max(1),
            max_height: config.max_height.max(1),
            formats,
        }
    }
}

#[derive(Clone)]
pub struct ImageAnalyzer {
    model: Arc<dyn ChatModel>,
    limits: ImageLimits,
}

impl ImageAnalyzer {
    pub fn new(model: Arc<dyn ChatModel>, config: &ImageConfig) -> Self {
        Self {
            model,
            limits: ImageLimits::from_config(config),
        }
    }

    /// Description of a base64 image. Never fails: problems are logged and
    /// the fixed fallback description is returned.
    pub async fn describe(&self, image_base64: &str) -> String {
        match self.try_describe(image_base64).await {
            Ok(description) => description,
            Err(e) => {
                warn!(error = %e, "Error analyzing image with Gemini");
                IMAGE_FALLBACK_DESCRIPTION.to_string()
            }
        }
    }

    async fn try_describe(&self, image_base64: &str) -> FluxoraResult<String> {
        let jpeg = prepare_image(image_base64, &self.limits)?;
        let request = ChatRequest::new(ModelTier::Vision, ANALYSIS_TEMPERATURE)
            .system(prompts::IMAGE_ANALYSIS_SYSTEM)
            .message(Message::user_with_image(prompts::IMAGE_ANALYSIS, "image/jpeg", jpeg));

        let description = self.model.complete(request).await?;
        if description.trim().is_empty() {
            return Err(FluxoraError::llm("Vision model returned an empty description"));
        }
        Ok(description)
    }
}

/// Decode, shrink to fit the size bound if needed, and re-encode as base64 JPEG.
pub fn prepare_image(image_base64: &str, limits: &ImageLimits) -> FluxoraResult<String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(image_base64.trim())
        .map_err(|e| FluxoraError::validation("image_data", format!("Invalid base64: {}", e)))?;
    let format = image::guess_format(&bytes)
        .map_err(|e| FluxoraError::validation("image_data", format!("Unreadable image: {}", e)))?;
    if !limits.formats.contains(&format) {
        return Err(FluxoraError::validation(
            "image_data",
            format!("Unsupported image format: {:?}", format),
        ));
    }
    let image = image::load_from_memory_with_format(&bytes, format)
        .map_err(|e| FluxoraError::validation("image_data", format!("Unreadable image: {}", e)))?;

    let (max_width, max_height) = (limits.max_width, limits.max_height);

    let (width, height) = image.dimensions();
    let image = if width > max_width || height > max_height {
        debug!(width, height, max_width, max_height, "Downsizing image for analysis");
        image.resize(max_width, max_height, FilterType::Lanczos3)
    } else {
        image
    };

    let mut encoded = Vec::new();
    DynamicImage::ImageRgb8(image.to_rgb8())
        .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Jpeg)
        .map_err(|e| FluxoraError::internal(format!("JPEG encoding failed: {}", e)))?;

    Ok(base64::engine::general_purpose::STANDARD.encode(encoded))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use fluxora_llm::testing::ScriptedChatModel;
    use image::RgbaImage;

    pub(crate) fn png_base64(width: u32, height: u32) -> String {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([200, 30, 30, 255]),
        ));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    fn limits() -> ImageLimits {
        ImageLimits::from_config(&fluxora_utils::AppConfig::default().image)
    }

    fn decoded_dimensions(image_base64: &str) -> (u32, u32) {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(image_base64)
            .unwrap();
        image::load_from_memory(&bytes).unwrap().dimensions()
    }

    #[test]
    fn test_large_image_is_downsized() {
        let prepared = prepare_image(&png_base64(2048, 1024), &limits()).unwrap();
        assert_eq!(decoded_dimensions(&prepared), (1024, 512));
    }

    #[test]
    fn test_small_image_keeps_size() {
        let prepared = prepare_image(&png_base64(40, 30), &limits()).unwrap();
        assert_eq!(decoded_dimensions(&prepared), (40, 30));
    }

    #[test]
    fn test_invalid_base64_rejected() {
        assert!(prepare_image("not base64!!", &limits()).is_err());
        assert!(prepare_image("aGVsbG8=", &limits()).is_err());
    }

    #[test]
    fn test_default_formats_parsed() {
        assert_eq!(
            limits().formats,
            vec![ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::WebP, ImageFormat::Gif]
        );
    }

    #[test]
    fn test_unsupported_format_rejected() {
        let mut config = fluxora_utils::AppConfig::default().image;
        config.supported_formats = vec!["JPEG".to_string(), "bogus".to_string()];
        let jpeg_only = ImageLimits::from_config(&config);
        assert_eq!(jpeg_only.formats, vec![ImageFormat::Jpeg]);

        let err = prepare_image(&png_base64(8, 8), &jpeg_only).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("Unsupported image format: Png"));

        let jpeg = prepare_image(&png_base64(8, 8), &limits()).unwrap();
        assert!(prepare_image(&jpeg, &jpeg_only).is_ok());
    }

    #[tokio::test]
    async fn test_describe_sends_image_to_vision_model() {
        let model = Arc::new(ScriptedChatModel::always("A red square"));
        let analyzer = ImageAnalyzer::new(model.clone(), &fluxora_utils::AppConfig::default().image);

        let description = analyzer.describe(&png_base64(8, 8)).await;
        assert_eq!(description, "A red square");

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].tier, ModelTier::Vision);
        assert!(requests[0].messages[0].has_image());
        assert_eq!(requests[0].system.as_deref(), Some(prompts::IMAGE_ANALYSIS_SYSTEM));
    }

    #[tokio::test]
    async fn test_describe_falls_back_on_failure() {
        let analyzer = ImageAnalyzer::new(
            Arc::new(ScriptedChatModel::failing("quota")),
            &fluxora_utils::AppConfig::default().image,
        );
        assert_eq!(analyzer.describe(&png_base64(8, 8)).await, IMAGE_FALLBACK_DESCRIPTION);
        assert_eq!(analyzer.describe("garbage").await, IMAGE_FALLBACK_DESCRIPTION);
    }
}
