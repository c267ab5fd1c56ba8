use anyhow::Result;
use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};

use crate::models::ImagePayload;

const CHAT_COMPLETIONS_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default vision model when OPENROUTER_MODEL is not set.
pub const DEFAULT_MODEL: &str = "google/gemini-flash-1.5";

/// Fixed instruction prompt sent with every food image.
const ANALYSIS_PROMPT: &str = "\
You are an expert nutritionist. Based on the food image, identify the items and estimate total calories.
Format:
1. Item 1 - No. of calories
2. Item 2 - No. of calories
...

Finally, mention if the food is healthy or not, and provide the percentage split of carbohydrates, fats, fibers, sugar, and other important nutrients.";

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        #[serde(rename = "type")]
        content_type: String,
        text: String,
    },
    ImageUrl {
        #[serde(rename = "type")]
        content_type: String,
        image_url: ImageData,
    },
}

#[derive(Debug, Serialize)]
struct ImageData {
    url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: String,
}

/// Trait seam for the remote vision model so handlers can be tested
/// against a mock.
#[async_trait::async_trait]
pub trait AdvisoryService: Send + Sync {
    /// Returns the model's text response verbatim.
    async fn analyze_food_image(&self, payload: &ImagePayload) -> Result<String>;
}

pub struct AdvisoryClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl AdvisoryClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }

    fn data_url(payload: &ImagePayload) -> String {
        let encoded = general_purpose::STANDARD.encode(&payload.data);
        format!("data:{};base64,{}", payload.media_type, encoded)
    }

    fn build_request(&self, payload: &ImagePayload) -> ChatRequest {
        let messages = vec![ChatMessage {
            role: "user".to_string(),
            content: vec![
                ContentPart::Text {
                    content_type: "text".to_string(),
                    text: ANALYSIS_PROMPT.to_string(),
                },
                ContentPart::ImageUrl {
                    content_type: "image_url".to_string(),
                    image_url: ImageData {
                        url: Self::data_url(payload),
                    },
                },
            ],
        }];

        ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: 1000,
        }
    }
}

#[async_trait::async_trait]
impl AdvisoryService for AdvisoryClient {
    async fn analyze_food_image(&self, payload: &ImagePayload) -> Result<String> {
        log::debug!(
            "📸 Starting image analysis ({} bytes, {})",
            payload.data.len(),
            payload.media_type
        );

        let request = self.build_request(payload);

        log::info!("🤖 Sending request to OpenRouter with model: {}", self.model);

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", "https://github.com/calorie-advisor")
            .header("X-Title", "Calorie Advisor")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 OpenRouter response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await?;
            log::error!("❌ OpenRouter API error response: {}", error_text);
            anyhow::bail!("OpenRouter API error ({}): {}", status, error_text);
        }

        let chat_response: ChatResponse = response.json().await?;
        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow::anyhow!("OpenRouter response contained no choices"))?;

        log::info!("💬 OpenRouter returned {} chars of advice", content.len());

        Ok(content)
    }
}
