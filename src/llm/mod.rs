//! Generative-text providers and prompt construction.

pub mod prompt;
pub mod provider;

pub use prompt::{AI_PLACEHOLDER, DEFAULT_SYSTEM_PROMPT, build_user_prompt};
pub use provider::{ContentGenerator, HttpGenerator, Provider};

use tracing::warn;

/// Run one generation, degrading any provider failure to `None`.
pub async fn generate_content(
    generator: &dyn ContentGenerator,
    system_prompt: &str,
    user_prompt: &str,
) -> Option<String> {
    match generator.generate(system_prompt, user_prompt).await {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("AI generation failed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::llm::provider::MockContentGenerator;

    #[tokio::test]
    async fn test_generate_content_returns_text() {
        let mut generator = MockContentGenerator::new();
        generator
            .expect_generate()
            .withf(|system, user| system == "sys" && user == "usr")
            .times(1)
            .returning(|_, _| Ok("## Summary\nDone".to_string()));

        let text = generate_content(&generator, "sys", "usr").await;
        assert_eq!(text.as_deref(), Some("## Summary\nDone"));
    }

    #[tokio::test]
    async fn test_generate_content_swallows_provider_error() {
        let mut generator = MockContentGenerator::new();
        generator.expect_generate().times(1).returning(|_, _| {
            Err(ProviderError::Api {
                provider: "Claude",
                status: 500,
                body: "overloaded".to_string(),
            })
        });

        assert!(generate_content(&generator, "sys", "usr").await.is_none());
    }
}
