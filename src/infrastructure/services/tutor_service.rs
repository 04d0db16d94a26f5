use std::sync::Arc;

use crate::domain::{ChatMessage, CompletionRequest, DomainError, PromptContext};
use crate::infrastructure::llm::LlmRuntime;

/// Conversational tutoring over the default provider
#[derive(Debug)]
pub struct TutorService {
    runtime: Arc<LlmRuntime>,
}

impl TutorService {
    pub fn new(runtime: Arc<LlmRuntime>) -> Self {
        Self { runtime }
    }

    /// Answer a student's message, carrying the prior conversation along.
    ///
    /// With both a subject and a grade the model is framed as a tutor for
    /// that subject at that level; otherwise it answers as the platform's
    /// general assistant.
    pub async fn reply(
        &self,
        message: &str,
        subject: Option<&str>,
        grade: Option<&str>,
        history: &[ChatMessage],
    ) -> Result<ChatMessage, DomainError> {
        let handle = self.runtime.handle()?;

        let persona = match (subject, grade) {
            (Some(subject), Some(grade)) => format!(
                "You are an expert {} tutor for grade {} students. Explain \
                 concepts step by step, use age-appropriate language, and \
                 encourage the student to reason through problems themselves \
                 before giving away the answer.",
                subject, grade
            ),
            _ => "You are the assistant for an exam preparation platform. Help \
                  students with study questions and guide them to the platform's \
                  exam and practice features when relevant."
                .to_string(),
        };

        let mut builder = CompletionRequest::builder().system(persona);
        for turn in history {
            builder = builder.message(turn.clone());
        }
        let request = builder
            .user(message)
            .context(PromptContext::Tutoring)
            .build();

        let completion = handle.complete(request).await?;
        if completion.content.trim().is_empty() {
            return Err(DomainError::validation(
                "Tutoring failed: the model returned no content",
            ));
        }

        Ok(ChatMessage::assistant(completion.content))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::runtime_with;
    use super::*;
    use crate::domain::llm::MockLlmProvider;
    use crate::domain::MessageRole;

    #[tokio::test]
    async fn test_subject_tutor_persona() {
        let provider = Arc::new(
            MockLlmProvider::new().with_response("Inertia is resistance to change in motion."),
        );
        let service = TutorService::new(runtime_with(provider.clone()).await);

        let reply = service
            .reply("What is inertia?", Some("Physics"), Some("9"), &[])
            .await
            .unwrap();

        assert_eq!(reply.role, MessageRole::Assistant);
        assert_eq!(
            reply.content_text(),
            Some("Inertia is resistance to change in motion.")
        );

        let sent = &provider.captured_requests()[0];
        let system = sent.messages[0].content_text().unwrap();
        assert!(system.contains("Physics tutor"));
        assert!(system.contains("grade 9"));
    }

    #[tokio::test]
    async fn test_general_persona_without_subject_and_grade() {
        let provider = Arc::new(MockLlmProvider::new().with_response("Sure, I can help."));
        let service = TutorService::new(runtime_with(provider.clone()).await);

        service
            .reply("How do I create an exam?", Some("Physics"), None, &[])
            .await
            .unwrap();

        let sent = &provider.captured_requests()[0];
        let system = sent.messages[0].content_text().unwrap();
        assert!(system.contains("exam preparation platform"));
        assert!(!system.contains("Physics"));
    }

    #[tokio::test]
    async fn test_history_precedes_the_new_message_in_order() {
        let provider = Arc::new(MockLlmProvider::new().with_response("Next, balance the charge."));
        let service = TutorService::new(runtime_with(provider.clone()).await);

        let history = vec![
            ChatMessage::user("How do I balance redox equations?"),
            ChatMessage::assistant("Start by splitting them into half-reactions."),
        ];
        service
            .reply("And then?", Some("Chemistry"), Some("11"), &history)
            .await
            .unwrap();

        let sent = &provider.captured_requests()[0];
        assert_eq!(sent.messages.len(), 4);
        assert_eq!(sent.messages[0].role, MessageRole::System);
        assert_eq!(
            sent.messages[1].content_text(),
            Some("How do I balance redox equations?")
        );
        assert_eq!(sent.messages[2].role, MessageRole::Assistant);
        assert_eq!(sent.messages[3].content_text(), Some("And then?"));
    }

    #[tokio::test]
    async fn test_empty_reply_is_an_error() {
        let provider = Arc::new(MockLlmProvider::new().with_response("  "));
        let service = TutorService::new(runtime_with(provider).await);

        let error = service
            .reply("Hello?", None, None, &[])
            .await
            .unwrap_err();
        assert!(error.to_string().contains("no content"));
    }
}
