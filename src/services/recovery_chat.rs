// Recovery chat
//
// Guided follow-up conversation for users who interacted with a flagged
// message. Sessions are in-memory only; each one is seeded with the case
// context from a completed analysis.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use crate::agents::LlmClient;

#[derive(Error, Debug)]
pub enum RecoveryChatError {
    #[error("unknown recovery session: {0}")]
    SessionNotFound(String),
}

struct RecoverySession {
    context: Value,
    // (role, text) pairs, roles "user" and "assistant".
    history: Vec<(String, String)>,
}

pub struct RecoveryChatService {
    client: Option<Arc<LlmClient>>,
    sessions: RwLock<HashMap<String, RecoverySession>>,
}

impl RecoveryChatService {
    pub fn new(client: Option<Arc<LlmClient>>) -> Self {
        Self {
            client,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Opens a session around the given case context and returns its id.
    pub async fn start_session(&self, case_context: Value) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions.write().await.insert(
            id.clone(),
            RecoverySession {
                context: case_context,
                history: Vec::new(),
            },
        );
        id
    }

    /// Opening message shown when a session starts.
    pub fn greeting(&self) -> String {
        "I'm here to help you recover from this incident. \
         Tell me what you did after receiving the message, for example \
         whether you clicked a link or entered any information."
            .to_string()
    }

    pub async fn send_message(
        &self,
        session_id: &str,
        user_message: &str,
    ) -> Result<String, RecoveryChatError> {
        let (context, transcript) = {
            let mut sessions = self.sessions.write().await;
            let session = sessions
                .get_mut(session_id)
                .ok_or_else(|| RecoveryChatError::SessionNotFound(session_id.to_string()))?;
            session
                .history
                .push(("user".to_string(), user_message.to_string()));
            (session.context.clone(), render_transcript(&session.history))
        };

        let reply = match &self.client {
            Some(client) => {
                let prompt = build_prompt(&context, &transcript);
                match client.generate(&prompt).await {
                    Ok(reply) => reply,
                    Err(e) => {
                        warn!("recovery chat generation failed: {}", e);
                        fallback_reply(&context)
                    },
                }
            },
            None => fallback_reply(&context),
        };

        if let Some(session) = self.sessions.write().await.get_mut(session_id) {
            session
                .history
                .push(("assistant".to_string(), reply.clone()));
        }
        Ok(reply)
    }
}

fn render_transcript(history: &[(String, String)]) -> String {
    history
        .iter()
        .map(|(role, text)| format!("{}: {}", role, text))
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_prompt(context: &Value, transcript: &str) -> String {
    let score = context.get("risk_score").and_then(Value::as_u64).unwrap_or(0);
    let severity = context
        .get("severity")
        .and_then(Value::as_str)
        .unwrap_or("Unknown");
    let scam_type = context
        .get("scam_type")
        .and_then(Value::as_str)
        .unwrap_or("Unknown");
    let brand = context
        .get("brand_impersonated")
        .and_then(Value::as_str)
        .unwrap_or("none");

    format!(
        "You are a calm, supportive security recovery assistant helping a \
         non-technical user after a suspected scam.\n\n\
         Case context:\n\
         - Risk score: {score}/100 ({severity})\n\
         - Scam type: {scam_type}\n\
         - Brand impersonated: {brand}\n\n\
         Conversation so far:\n{transcript}\n\n\
         Respond to the user's last message. Give concrete, prioritized next \
         steps (password changes from a trusted device, enabling two-factor \
         authentication, contacting their bank, monitoring statements). Keep \
         it short and reassuring. Never ask the user to share passwords or \
         codes."
    )
}

/// Deterministic guidance used when no model is configured or the call
/// fails mid-session. Prefers recovery steps supplied in the case
/// context, falling back to a generic checklist.
fn fallback_reply(context: &Value) -> String {
    let mut reply = String::from("Here is what to do next:\n");

    let provided_steps: Vec<&str> = context
        .get("recovery_steps")
        .and_then(Value::as_array)
        .map(|steps| steps.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut step = 1;
    if provided_steps.is_empty() {
        for text in [
            "If you entered a password anywhere, change it now from a device you trust.",
            "Turn on two-factor authentication for that account.",
            "If you shared payment details, contact your bank and watch your statements.",
        ] {
            reply.push_str(&format!("{}. {}\n", step, text));
            step += 1;
        }
    } else {
        for text in provided_steps {
            reply.push_str(&format!("{}. {}\n", step, text));
            step += 1;
        }
    }

    let brand = context
        .get("brand_impersonated")
        .and_then(Value::as_str)
        .filter(|b| !b.is_empty() && *b != "None");
    if let Some(brand) = brand {
        reply.push_str(&format!(
            "{}. Reach {} only through its official app or website, never through links in the message.\n",
            step, brand
        ));
    }
    reply.push_str("Take these one at a time; you don't need to do everything at once.");
    reply
}
