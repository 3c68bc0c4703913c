use async_trait::async_trait;
use prep_common::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response to the given prompt with optional system prompt
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse>;

    /// Check if the LLM service is available
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used
    fn model_name(&self) -> &str;

    /// Generate an interview preparation guide for a company and role.
    async fn prep_guide(&self, company: &str, role: &str) -> Result<String> {
        let prompt = format!(
            "Please write me an interview prep guide for company \"{}\" tailored to a \"{}\" role.",
            company, role
        );

        let response = self.generate(&prompt, None, None, Some(0.7)).await?;
        Ok(response.text.trim().to_string())
    }

    /// Answer a follow-up question grounded in a previously generated guide.
    async fn followup_answer(&self, guide: &str, question: &str) -> Result<String> {
        let prompt = format!(
            "You are an interview prep assistant. The following is the original prep guide:\n\n{}\n\nNow answer the follow-up question: '{}'",
            guide, question
        );

        let response = self.generate(&prompt, None, None, Some(0.7)).await?;
        Ok(response.text.trim().to_string())
    }

    /// Produce a challenging practice interview question grounded in the guide.
    async fn practice_question(&self, role: &str, guide: &str) -> Result<String> {
        let prompt = format!(
            "Create a challenging interview question for a {} role based on this guide:\n\n{}",
            role, guide
        );

        let response = self.generate(&prompt, None, None, Some(0.7)).await?;
        Ok(response.text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prep_common::PrepError;
    use std::sync::Mutex;

    /// Records the prompt it is handed and echoes a canned reply.
    struct EchoClient {
        last_prompt: Mutex<String>,
    }

    #[async_trait]
    impl LlmClient for EchoClient {
        async fn generate(
            &self,
            prompt: &str,
            _system_prompt: Option<&str>,
            _max_tokens: Option<u32>,
            temperature: Option<f32>,
        ) -> Result<LlmResponse> {
            if temperature != Some(0.7) {
                return Err(PrepError::Llm("unexpected temperature".into()));
            }
            *self.last_prompt.lock().unwrap() = prompt.to_string();
            Ok(LlmResponse {
                text: "  generated text  ".to_string(),
                model: Some("echo".to_string()),
                tokens_used: None,
            })
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    fn echo() -> EchoClient {
        EchoClient {
            last_prompt: Mutex::new(String::new()),
        }
    }

    #[tokio::test]
    async fn prep_guide_prompt_names_company_and_role() {
        let client = echo();
        let out = client.prep_guide("Volkswagen", "Data Analyst").await.unwrap();
        assert_eq!(out, "generated text");

        let prompt = client.last_prompt.lock().unwrap().clone();
        assert!(prompt.contains("\"Volkswagen\""));
        assert!(prompt.contains("\"Data Analyst\""));
    }

    #[tokio::test]
    async fn followup_prompt_embeds_guide_and_question() {
        let client = echo();
        client
            .followup_answer("the original guide body", "What about benefits?")
            .await
            .unwrap();

        let prompt = client.last_prompt.lock().unwrap().clone();
        assert!(prompt.contains("the original guide body"));
        assert!(prompt.contains("'What about benefits?'"));
    }

    #[tokio::test]
    async fn practice_question_prompt_is_grounded_in_guide() {
        let client = echo();
        client
            .practice_question("Product Manager", "guide contents")
            .await
            .unwrap();

        let prompt = client.last_prompt.lock().unwrap().clone();
        assert!(prompt.contains("Product Manager role"));
        assert!(prompt.contains("guide contents"));
    }
}
