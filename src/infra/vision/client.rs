// Responsible for all communication with the OpenAI-compatible vision endpoint.

use crate::domain::{Exercise, ExerciseType};
use crate::infra::config::VisionConfig;
use crate::infra::vision::{GatewayError, Judgement, ValidationGateway};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, instrument, warn};

/// Points awarded for a frame the model judges correct.
pub const POINTS_PER_CORRECT_FRAME: f64 = 10.0;
const MAX_COMPLETION_TOKENS: u32 = 500;

// Shape of the JSON object the prompt asks the model to answer with. Fields stay
// loosely typed: models sometimes quote booleans or return numbers.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ModelVerdict {
    #[serde(default)]
    is_correct: Option<JsonValue>,
    #[serde(default)]
    feedback: Option<JsonValue>,
    #[serde(default)]
    encouragement: Option<JsonValue>,
}

/// `true`, `"true"`/`"yes"`/`"1"` (any case) and non-zero numbers count as correct.
fn truthy(value: Option<&JsonValue>) -> bool {
    match value {
        Some(JsonValue::Bool(b)) => *b,
        Some(JsonValue::String(s)) => {
            matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1")
        }
        Some(JsonValue::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

fn text(value: Option<JsonValue>) -> Option<String> {
    match value {
        Some(JsonValue::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Builds the coaching prompt for one exercise from the static catalog.
pub fn build_prompt(exercise: &Exercise) -> String {
    format!(
        r#"You are a fun, encouraging AI coach helping children with brain exercises.

Analyze this image to see if the child is performing the "{name}" exercise correctly.

Exercise Description: {description}
Instructions: {instructions}

Determine:
1. Is the child performing this exercise correctly? (yes/no)
2. Provide specific, child-friendly feedback about their form
3. Give an encouraging message

Respond with JSON in this exact format:
{{
  "isCorrect": true or false,
  "feedback": "specific feedback about their form",
  "encouragement": "short encouraging phrase like 'Amazing!', 'Great job!', 'Keep it up!', or 'Try again, you've got this!'"
}}

Remember: Always be positive and encouraging, even if they need to adjust their form!"#,
        name = exercise.name,
        description = exercise.description,
        instructions = exercise.instructions.join(" "),
    )
}

/// Turns the model's message content into a `Judgement`.
///
/// An empty message is treated as `{}` (an incorrect attempt with default texts).
pub fn parse_verdict(content: Option<&str>) -> Result<Judgement, GatewayError> {
    let raw = content.map(str::trim).filter(|c| !c.is_empty()).unwrap_or("{}");
    let verdict: ModelVerdict = serde_json::from_str(raw)
        .map_err(|e| GatewayError::InvalidResponse(format!("{} (content: {:.120})", e, raw)))?;

    let is_correct = truthy(verdict.is_correct.as_ref());
    let default_encouragement = if is_correct { "Great job!" } else { "Keep trying!" };

    Ok(Judgement {
        is_correct,
        feedback: text(verdict.feedback).unwrap_or_else(|| "Keep practicing!".to_string()),
        encouragement: text(verdict.encouragement)
            .unwrap_or_else(|| default_encouragement.to_string()),
        points_earned: if is_correct { POINTS_PER_CORRECT_FRAME } else { 0.0 },
    })
}

/// Gateway backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiVisionGateway {
    http: reqwest::Client,
    config: VisionConfig,
}

impl OpenAiVisionGateway {
    pub fn new(config: VisionConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }
}

fn map_send_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Transport(e.to_string())
    }
}

#[async_trait]
impl ValidationGateway for OpenAiVisionGateway {
    #[instrument(skip(self, image_base64), fields(model = %self.config.model, image_len = image_base64.len()))]
    async fn judge(
        &self,
        exercise: ExerciseType,
        image_base64: &str,
    ) -> Result<Judgement, GatewayError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| GatewayError::NotConfigured("OPENAI_API_KEY is not set".to_string()))?;

        let body = json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": build_prompt(exercise.info()) },
                        {
                            "type": "image_url",
                            "image_url": { "url": format!("data:image/jpeg;base64,{}", image_base64) }
                        }
                    ]
                }
            ],
            "response_format": { "type": "json_object" },
            "max_completion_tokens": MAX_COMPLETION_TOKENS
        });

        debug!("sending frame to vision model");
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_send_error)?;
        if !status.is_success() {
            warn!(status = %status, "vision model returned an error status");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let completion: ChatCompletion = serde_json::from_str(&text)
            .map_err(|e| GatewayError::InvalidResponse(format!("completion envelope: {}", e)))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);

        parse_verdict(content.as_deref())
    }
}
