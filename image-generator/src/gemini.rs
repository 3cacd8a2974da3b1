use crate::prompts::build_image_prompt;
use base64::Engine;
use chrono::Utc;
use content_engine::{ContentFields, Pillar};
use marketeer_core::{CoreError, ImageError};
use reqwest::Client;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const MODEL_NAME: &str = "gemini-2.0-flash-exp-image-generation";

/// Where generated images land on disk.
const IMAGE_DIR: &str = "generated-images";

/// Local fallback used when generation fails.
const PLACEHOLDER_PATH: &str = "test-image.jpg";

/// Descriptors appended to every prompt unless the prompt already carries
/// them.
const QUALITY_MODIFIERS: [&str; 7] = [
    "high quality",
    "detailed",
    "professional",
    "8k resolution",
    "sharp focus",
    "well-lit",
    "photorealistic",
];

/// A generated (or fallback) image ready for upload.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub filepath: PathBuf,
    pub bytes: Vec<u8>,
    pub media_type: String,
}

/// Image generation client backed by the Gemini REST API.
pub struct ImageGenerator {
    client: Client,
    api_key: String,
    output_dir: PathBuf,
}

impl ImageGenerator {
    pub fn new(api_key: String) -> Result<Self, CoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            api_key,
            output_dir: PathBuf::from(IMAGE_DIR),
        })
    }

    /// Overrides where images are written. Used in tests.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Generates an image for a tweet, building the prompt from the
    /// pillar and its extracted fields.
    pub async fn generate_for_tweet(
        &self,
        pillar: Pillar,
        content: &ContentFields,
    ) -> Result<GeneratedImage, CoreError> {
        let prompt = build_image_prompt(pillar, content);
        debug!("Image prompt for {}: {}", pillar.key(), prompt);
        self.generate(&prompt).await
    }

    /// Generates an image from a free-form prompt and writes it under the
    /// output directory with a timestamped name.
    pub async fn generate(&self, prompt: &str) -> Result<GeneratedImage, CoreError> {
        let enhanced = enhance_prompt(prompt);
        info!("Generating image ({} char prompt)", enhanced.len());

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_API_BASE, MODEL_NAME, self.api_key
        );
        let body = json!({
            "contents": [{
                "parts": [{ "text": enhanced }]
            }],
            "generationConfig": {
                "responseModalities": ["Image", "Text"]
            }
        });

        let response = match self.client.post(&url).json(&body).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Err(CoreError::Image(ImageError::RequestTimeout));
            }
            Err(e) => return Err(CoreError::Network(e)),
        };

        let status = response.status();
        if !status.is_success() {
            error!("Gemini returned status {}", status);
            if status.is_server_error() {
                return Err(CoreError::Image(ImageError::ServerError {
                    status_code: status.as_u16(),
                }));
            }
            return Err(CoreError::Image(ImageError::GenerationFailed {
                details: format!("status {}", status),
            }));
        }

        let body: Value = response.json().await.map_err(|e| {
            CoreError::Image(ImageError::GenerationFailed {
                details: format!("unparseable response: {}", e),
            })
        })?;

        let bytes = extract_inline_image(&body)
            .ok_or(CoreError::Image(ImageError::NoImageData))?;
        let filepath = self
            .write_image(&bytes, "gemini_image", "png")
            .map_err(CoreError::Io)?;
        info!("Image saved to {}", filepath.display());

        Ok(GeneratedImage {
            filepath,
            bytes,
            media_type: "image/png".to_string(),
        })
    }

    /// Copies the bundled placeholder into the output directory. Used when
    /// generation fails but the post should still carry media.
    pub fn placeholder_image(&self) -> Result<GeneratedImage, CoreError> {
        warn!("Falling back to the placeholder image");
        let placeholder = Path::new(PLACEHOLDER_PATH);
        if !placeholder.exists() {
            return Err(CoreError::Image(ImageError::PlaceholderMissing {
                path: PLACEHOLDER_PATH.to_string(),
            }));
        }

        let bytes = std::fs::read(placeholder)?;
        let filepath = self.write_image(&bytes, "test_image", "jpg")?;
        Ok(GeneratedImage {
            filepath,
            bytes,
            media_type: "image/jpeg".to_string(),
        })
    }

    fn write_image(&self, bytes: &[u8], stem: &str, ext: &str) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        let filename = format!("{}_{}.{}", stem, Utc::now().timestamp_millis(), ext);
        let filepath = self.output_dir.join(filename);
        std::fs::write(&filepath, bytes)?;
        Ok(filepath)
    }
}

/// Appends quality modifiers the prompt does not already mention.
pub fn enhance_prompt(prompt: &str) -> String {
    let mut enhanced = prompt.to_string();
    for modifier in QUALITY_MODIFIERS {
        if !enhanced.to_lowercase().contains(modifier) {
            enhanced.push_str(", ");
            enhanced.push_str(modifier);
        }
    }
    enhanced
}

/// Finds the first inline image payload in a generation response and
/// decodes it.
fn extract_inline_image(response: &Value) -> Option<Vec<u8>> {
    let parts = response
        .pointer("/candidates/0/content/parts")?
        .as_array()?;
    for part in parts {
        if let Some(data) = part.pointer("/inlineData/data").and_then(|d| d.as_str()) {
            match base64::engine::general_purpose::STANDARD.decode(data) {
                Ok(bytes) => return Some(bytes),
                Err(e) => {
                    warn!("Inline image data is not valid base64: {}", e);
                    continue;
                }
            }
        }
        if let Some(text) = part.get("text").and_then(|t| t.as_str()) {
            debug!("Model returned text alongside the image: {}", text);
        }
    }
    None
}
