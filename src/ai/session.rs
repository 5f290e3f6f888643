//! Chat session
//!
//! Owns the transcript and the pending attachment. One request at a time:
//! a second `send` while one is in flight is rejected, and the attachment
//! taken by a request is gone once that request finishes, whatever the result.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::attachment::Attachment;
use super::client::TextGenerator;
use super::error::AssistantError;
use super::prompts::build_user_prompt;
use crate::materialize::HostKind;

/// Prefix on replies that carry an error instead of model output
pub const ERROR_GLYPH: &str = "❌";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub is_error: bool,
    pub timestamp: DateTime<Utc>,
}

/// What the panel shows (and may insert) after a send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub request_id: Uuid,
    pub text: String,
    pub is_error: bool,
}

/// Everything one request needs, owned for its lifetime
#[derive(Debug)]
pub struct RequestContext {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub prompt: String,
    pub document_context: Option<String>,
    pub attachment: Option<Attachment>,
}

/// Render an error the way the transcript shows it
pub fn render_error(error: &AssistantError) -> String {
    format!(
        "{} **Error**: {}\n\nPlease check your internet connection or API Key.",
        ERROR_GLYPH, error
    )
}

/// Clears the in-flight flag when the request ends, including on early return
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ChatSession<G: TextGenerator> {
    generator: G,
    host: HostKind,
    max_context_chars: usize,
    in_flight: AtomicBool,
    pending_attachment: Mutex<Option<Attachment>>,
    history: Mutex<Vec<ChatMessage>>,
}

impl<G: TextGenerator> ChatSession<G> {
    pub fn new(generator: G, host: HostKind, max_context_chars: usize) -> Self {
        Self {
            generator,
            host,
            max_context_chars,
            in_flight: AtomicBool::new(false),
            pending_attachment: Mutex::new(None),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn host(&self) -> HostKind {
        self.host
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Attach a file to the next message, replacing any previous one
    pub async fn attach(&self, attachment: Attachment) {
        tracing::debug!("[Session] Attached {}", attachment.file_name);
        *self.pending_attachment.lock().await = Some(attachment);
    }

    pub async fn pending_attachment(&self) -> Option<String> {
        self.pending_attachment
            .lock()
            .await
            .as_ref()
            .map(|a| a.file_name.clone())
    }

    pub async fn history(&self) -> Vec<ChatMessage> {
        self.history.lock().await.clone()
    }

    /// Send a message to the model
    ///
    /// Returns `Ok(None)` for a blank prompt. Model and network failures come
    /// back as an error reply (`is_error`), not as `Err`; only a concurrent
    /// send is an `Err`.
    pub async fn send(
        &self,
        prompt: &str,
        document_context: Option<&str>,
    ) -> Result<Option<ChatReply>, AssistantError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Ok(None);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AssistantError::RequestInFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let context = self.begin_request(prompt, document_context).await;
        self.push_message(ChatRole::User, prompt, false).await;

        let full_prompt = build_user_prompt(
            self.host,
            &context.prompt,
            context.document_context.as_deref(),
            self.max_context_chars,
        );

        let result = self
            .generator
            .generate(&full_prompt, context.attachment.as_ref())
            .await;

        let reply = match result {
            Ok(text) => ChatReply {
                request_id: context.id,
                text,
                is_error: false,
            },
            Err(e) => {
                tracing::warn!("[Session] Request {} failed: {}", context.id, e);
                ChatReply {
                    request_id: context.id,
                    text: render_error(&e),
                    is_error: true,
                }
            }
        };

        // The attachment lived in `context` and is dropped with it here
        drop(context);

        self.push_message(ChatRole::Assistant, &reply.text, reply.is_error)
            .await;
        Ok(Some(reply))
    }

    /// Move the pending attachment into a fresh request context
    async fn begin_request(&self, prompt: &str, document_context: Option<&str>) -> RequestContext {
        let attachment = self.pending_attachment.lock().await.take();
        let document_context = document_context
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        let context = RequestContext {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            prompt: prompt.to_string(),
            document_context,
            attachment,
        };

        tracing::info!(
            "[Session] Request {} started at {} (host: {}, attachment: {})",
            context.id,
            context.started_at.format("%H:%M:%S"),
            self.host.as_str(),
            context.attachment.is_some()
        );
        context
    }

    async fn push_message(&self, role: ChatRole, text: &str, is_error: bool) {
        self.history.lock().await.push(ChatMessage {
            role,
            text: text.to_string(),
            is_error,
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// Generator that records what it saw and answers from a script
    struct ScriptedGenerator {
        reply: Result<String, u16>,
        seen: std::sync::Mutex<Vec<(String, Option<String>)>>,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedGenerator {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                seen: std::sync::Mutex::new(Vec::new()),
                gate: None,
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                seen: std::sync::Mutex::new(Vec::new()),
                gate: None,
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            prompt: &str,
            attachment: Option<&Attachment>,
        ) -> Result<String, AssistantError> {
            self.seen
                .lock()
                .unwrap()
                .push((prompt.to_string(), attachment.map(|a| a.file_name.clone())));
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(AssistantError::Api {
                    status: *status,
                    message: "Forbidden".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_send_returns_reply_and_records_history() {
        let session = ChatSession::new(ScriptedGenerator::ok("=SUM(A1:A3)"), HostKind::Spreadsheet, 100);

        let reply = session.send("sum column A", Some("A1: 1")).await.unwrap().unwrap();
        assert_eq!(reply.text, "=SUM(A1:A3)");
        assert!(!reply.is_error);

        let history = session.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, ChatRole::User);
        assert_eq!(history[1].role, ChatRole::Assistant);

        let seen = session.generator.seen.lock().unwrap().clone();
        assert!(seen[0].0.contains("Microsoft Excel"));
        assert!(seen[0].0.contains("A1: 1"));
        assert!(seen[0].0.ends_with("User Question: sum column A"));
    }

    #[tokio::test]
    async fn test_long_context_is_truncated() {
        let session = ChatSession::new(ScriptedGenerator::ok("ok"), HostKind::TextEditor, 10);
        let context = "x".repeat(50);
        session.send("summarize", Some(&context)).await.unwrap();

        let seen = session.generator.seen.lock().unwrap().clone();
        assert!(seen[0].0.contains(&"x".repeat(10)));
        assert!(!seen[0].0.contains(&"x".repeat(11)));
        assert!(seen[0].0.contains("(context truncated)"));
    }

    #[tokio::test]
    async fn test_blank_prompt_is_ignored() {
        let session = ChatSession::new(ScriptedGenerator::ok("x"), HostKind::TextEditor, 100);
        assert!(session.send("   ", None).await.unwrap().is_none());
        assert!(session.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_error_reply_carries_glyph() {
        let session = ChatSession::new(ScriptedGenerator::failing(403), HostKind::TextEditor, 100);
        let reply = session.send("hello", None).await.unwrap().unwrap();

        assert!(reply.is_error);
        assert!(reply.text.starts_with(ERROR_GLYPH));
        assert!(reply.text.contains("API Error (403): Forbidden"));
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_attachment_used_once_and_cleared() {
        let session = ChatSession::new(ScriptedGenerator::failing(500), HostKind::TextEditor, 100);
        session
            .attach(Attachment::new("data.csv", "text/csv", b"a,b".to_vec()))
            .await;
        assert_eq!(session.pending_attachment().await.as_deref(), Some("data.csv"));

        session.send("first", None).await.unwrap();
        assert!(session.pending_attachment().await.is_none());

        session.send("second", None).await.unwrap();
        let seen = session.generator.seen.lock().unwrap().clone();
        assert_eq!(seen[0].1.as_deref(), Some("data.csv"));
        assert_eq!(seen[1].1, None);
    }

    #[tokio::test]
    async fn test_second_send_while_busy_is_rejected() {
        let gate = Arc::new(Notify::new());
        let generator = ScriptedGenerator {
            gate: Some(gate.clone()),
            ..ScriptedGenerator::ok("done")
        };
        let session = Arc::new(ChatSession::new(generator, HostKind::TextEditor, 100));

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.send("slow", None).await })
        };

        while !session.is_busy() {
            tokio::task::yield_now().await;
        }
        let second = session.send("fast", None).await;
        assert!(matches!(second, Err(AssistantError::RequestInFlight)));

        gate.notify_one();
        let reply = first.await.unwrap().unwrap().unwrap();
        assert_eq!(reply.text, "done");
        assert!(!session.is_busy());
    }
}
