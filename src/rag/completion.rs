//! Completion service that phrases grounded answers.

use super::RunId;
use crate::config::{CompletionSettings, Language, Prompts};
use crate::error::{AulaError, Result};
use crate::openai::create_client_with_timeout;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

/// Input to a completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub query: String,
    /// Texts of the confident chunks, closest first.
    pub context_chunks: Vec<String>,
    pub language: Language,
    pub run_id: RunId,
}

/// Generated answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub result_text: String,
}

/// Produces an answer from a question and its supporting context.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn answer(&self, request: CompletionRequest) -> Result<Completion>;
}

/// OpenAI chat-completions implementation.
pub struct OpenAICompletion {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    prompts: Prompts,
}

impl OpenAICompletion {
    pub fn new(settings: &CompletionSettings, prompts: Prompts) -> Result<Self> {
        Ok(Self {
            client: create_client_with_timeout(Duration::from_secs(settings.timeout_seconds))?,
            model: settings.model.clone(),
            temperature: settings.temperature,
            prompts,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Render the system and user prompts for `request`.
    fn render_prompts(&self, request: &CompletionRequest) -> (String, String) {
        let mut vars = HashMap::new();
        vars.insert("language".to_string(), request.language.to_string());
        vars.insert("question".to_string(), request.query.clone());
        vars.insert("context".to_string(), request.context_chunks.join("\n\n"));

        (
            self.prompts.render_with_custom(&self.prompts.rag.system, &vars),
            self.prompts.render_with_custom(&self.prompts.rag.user, &vars),
        )
    }
}

#[async_trait]
impl CompletionService for OpenAICompletion {
    #[instrument(skip(self, request), fields(run_id = %request.run_id, context = request.context_chunks.len()))]
    async fn answer(&self, request: CompletionRequest) -> Result<Completion> {
        let (system_prompt, user_prompt) = self.render_prompts(&request);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .map_err(|e| AulaError::Completion(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| AulaError::Completion(e.to_string()))?
                .into(),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .user(request.run_id.to_string())
            .build()
            .map_err(|e| AulaError::Completion(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| AulaError::OpenAI(format!("Failed to generate response: {}", e)))?;

        let result_text = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| AulaError::Completion("Empty response from LLM".to_string()))?
            .clone();

        debug!("Generated answer of {} chars", result_text.len());
        Ok(Completion { result_text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            query: "Where did the cat sit?".to_string(),
            context_chunks: vec!["The cat sat on the mat.".to_string(), "Dogs run.".to_string()],
            language: Language::Portuguese,
            run_id: RunId::new(),
        }
    }

    #[test]
    fn test_render_prompts() {
        let completion =
            OpenAICompletion::new(&CompletionSettings::default(), Prompts::default()).unwrap();
        let (system, user) = completion.render_prompts(&request());

        assert!(system.contains("portuguese"));
        assert!(!system.contains("{{"));
        assert!(user.contains("The cat sat on the mat.\n\nDogs run."));
        assert!(user.contains("Question: Where did the cat sit?"));
    }

    #[test]
    fn test_custom_prompt_variables() {
        let mut prompts = Prompts::default();
        prompts.rag.system = "Course {{course}} in {{language}}".to_string();
        prompts.variables.insert("course".to_string(), "Biology".to_string());

        let completion = OpenAICompletion::new(&CompletionSettings::default(), prompts).unwrap();
        let (system, _) = completion.render_prompts(&request());
        assert_eq!(system, "Course Biology in portuguese");
    }
}
