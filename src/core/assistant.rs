use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    config::AppConfig,
    core::model::GenerativeModel,
    error::Result,
    services::{
        extractor::extract,
        gemini_client::GeminiClient,
        prompts::{assistant_prompt, image_prompt, wrap_travel_prompt},
    },
    types::ExtractionResult,
};

/// Travel assistant: prompts the model and turns its reply into narrative plus tasks
#[derive(Debug, Clone)]
pub struct TravelAssistant {
    model: Arc<dyn GenerativeModel>,
    context: Option<String>,
}

impl TravelAssistant {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            context: None,
        }
    }

    /// Build an assistant backed by Gemini using the loaded configuration
    pub fn from_config(config: &AppConfig) -> Self {
        let client = GeminiClient::new(config.gemini_api_key.clone())
            .with_base_url(config.gemini_base_url.clone())
            .with_model(config.gemini_model.clone())
            .with_timeout(config.request_timeout);
        Self::new(Arc::new(client))
    }

    /// Extra background passed to the model with every question
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Answer a travel question.
    ///
    /// A failing model call is not an error here: the extractor runs on an
    /// empty reply and the rule-based narrative and tasks are returned.
    pub async fn ask(&self, query: &str) -> ExtractionResult {
        let prompt = wrap_travel_prompt(&assistant_prompt(query), self.context.as_deref());

        let raw = match self.model.generate(&prompt).await {
            Ok(raw) => {
                debug!(target: "travel::model", model = self.model.name(), raw = %raw, "raw model reply");
                raw
            }
            Err(err) => {
                warn!(
                    target: "travel::model",
                    model = self.model.name(),
                    error = %err,
                    "model call failed, answering from fallback rules"
                );
                String::new()
            }
        };

        let result = extract(&raw, query);
        info!(
            target: "travel::extract",
            tasks = result.tasks.len(),
            narrative_chars = result.narrative.len(),
            "answered travel query"
        );
        result
    }

    /// Analyze an uploaded image, optionally answering a question about it
    pub async fn analyze_image(
        &self,
        image: &[u8],
        mime_type: &str,
        message: Option<&str>,
    ) -> Result<ExtractionResult> {
        let prompt = image_prompt(message);
        let raw = self
            .model
            .generate_from_image(image, mime_type, &prompt)
            .await?;
        debug!(target: "travel::model", model = self.model.name(), raw = %raw, "raw image analysis");

        Ok(extract(&raw, message.unwrap_or_default()))
    }
}
