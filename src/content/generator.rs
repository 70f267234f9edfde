use std::time::Duration;

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
};
use async_openai::Client;
use chrono::Local;
use tracing::{info, warn};

use super::prompt::{self, Style};
use super::script::VideoScript;
use crate::config::OpenAiConfig;
use crate::error::{Error, Result};

const SUMMARY_MAX_TOKENS: u32 = 200;
const SUMMARY_TEMPERATURE: f32 = 0.3;

/// Language-model client producing video prompts and caption summaries.
pub struct ContentGenerator {
    client: Client<OpenAIConfig>,
    config: OpenAiConfig,
}

impl ContentGenerator {
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::CredentialMissing("OPENAI_API_KEY".into()))?;
        if !api_key.starts_with("sk-") {
            return Err(Error::Config("malformed OpenAI API key".into()));
        }

        let mut openai = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = &config.api_base {
            openai = openai.with_api_base(base);
        }
        Ok(Self {
            client: Client::with_config(openai),
            config: config.clone(),
        })
    }

    /// Ask the model for a JSON video prompt on `keyword` and tag it with
    /// generation metadata and a caption summary.
    pub async fn generate_script(&self, keyword: &str, style: Style) -> Result<VideoScript> {
        let brand = &self.config.brand;
        let content = self
            .complete(
                &self.config.model,
                prompt::system_prompt(brand),
                prompt::user_prompt(brand, keyword, style),
                self.config.temperature,
                self.config.max_tokens,
                true,
            )
            .await?;

        let mut script = VideoScript::from_json(&content)?;
        script.set("service", brand.as_str());
        script.set("keyword", keyword);
        script.set("generated_at", Local::now().to_rfc3339());
        script.set("style", style.as_str());
        script.set("duration", "8 seconds");
        let summary = self.summarize(&script).await;
        script.set("summary", summary);

        info!(
            name = script.prompt_name().unwrap_or("-"),
            %keyword,
            %style,
            "video prompt generated"
        );
        Ok(script)
    }

    /// One script per style, at most three; failed styles are skipped.
    pub async fn generate_variations(&self, keyword: &str, count: usize) -> Vec<VideoScript> {
        let mut variations = Vec::new();
        for style in Style::ALL.into_iter().take(count) {
            match self.generate_script(keyword, style).await {
                Ok(script) => variations.push(script),
                Err(e) => warn!(%style, "variation failed: {e}"),
            }
        }
        variations
    }

    /// Short caption summary of the script. Never fails: any problem yields
    /// a fixed placeholder.
    pub async fn summarize(&self, script: &VideoScript) -> String {
        let Some(concept) = script.core_concept() else {
            return self.placeholder_summary();
        };

        let summary = self
            .complete(
                &self.config.summary_model,
                prompt::summary_system_prompt(&self.config.summary_language),
                prompt::summary_user_prompt(concept),
                SUMMARY_TEMPERATURE,
                SUMMARY_MAX_TOKENS,
                false,
            )
            .await;
        match summary {
            Ok(text) if !text.trim().is_empty() => text.trim().to_owned(),
            Ok(_) => self.placeholder_summary(),
            Err(e) => {
                warn!("summary generation failed, using placeholder: {e}");
                self.placeholder_summary()
            }
        }
    }

    pub fn placeholder_summary(&self) -> String {
        format!(
            "A premium ad showcasing {}'s innovative education service",
            self.config.brand
        )
    }

    /// Number of models visible to the key.
    pub async fn check_connection(&self) -> Result<usize> {
        let models = tokio::time::timeout(
            Duration::from_secs(self.config.timeout_secs),
            self.client.models().list(),
        )
        .await
        .map_err(|_| Error::Generation("model listing timed out".into()))??;
        Ok(models.data.len())
    }

    async fn complete(
        &self,
        model: &str,
        system: String,
        user: String,
        temperature: f32,
        max_tokens: u32,
        json: bool,
    ) -> Result<String> {
        let messages: [ChatCompletionRequestMessage; 2] = [
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()?
                .into(),
        ];

        let mut request = CreateChatCompletionRequestArgs::default();
        request
            .model(model)
            .temperature(temperature)
            .max_tokens(max_tokens)
            .messages(messages);
        if json {
            request.response_format(ResponseFormat::JsonObject);
        }
        let request = request.build()?;

        let response = tokio::time::timeout(
            Duration::from_secs(self.config.timeout_secs),
            self.client.chat().create(request),
        )
        .await
        .map_err(|_| Error::Generation("completion timed out".into()))??;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::Generation("no content in response".into()))
    }
}
