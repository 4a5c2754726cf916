//! Wire types for the detection service and the rating relay.

use serde::{Deserialize, Serialize};

/// Request body for the detection workflow.
#[derive(Debug, Clone, Serialize)]
pub struct DetectRequest<'a> {
    pub inputs: DetectInputs<'a>,
    pub api_key: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectInputs<'a> {
    /// Base64 image without any data-URL prefix
    pub image: &'a str,
}

/// Request body forwarded by the relay to the rating service.
#[derive(Debug, Clone, Serialize)]
pub struct RatingRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Image { source: ImageSource },
    Text { text: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub media_type: String,
    pub data: String,
}

impl RatingRequest {
    /// Single user turn carrying one inline image followed by the prompt.
    pub fn for_image(
        model: impl Into<String>,
        max_tokens: u32,
        media_type: impl Into<String>,
        base64_data: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![
                    ContentBlock::Image {
                        source: ImageSource {
                            source_type: "base64".to_string(),
                            media_type: media_type.into(),
                            data: base64_data.into(),
                        },
                    },
                    ContentBlock::Text {
                        text: prompt.into(),
                    },
                ],
            }],
        }
    }
}

/// Score and feedback for one crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingVerdict {
    pub score: f64,
    pub feedback: String,
}
