use super::history;
use super::state::{ChatSession, ConversationUpdate, SessionState};
use crate::api::logging::emit_transport_failure;
use crate::api::stream::EventStream;
use crate::types::{AgentId, ChatMessage, ChatRequest, StreamEvent};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const NETWORK_ERROR_TEXT: &str = "Network error. Please try again.";

/// Fixed code -> user-facing message table; unrecognized codes fall back
/// to the server's own message.
fn resolve_error_text(code: Option<&str>, fallback: &str) -> String {
    match code {
        Some("UNKNOWN_AGENT") => "Unknown agent type. Please try again.".to_string(),
        Some("STREAM_ERROR") => "Error generating response. Please try again.".to_string(),
        Some("NETWORK_ERROR") => "Network error. Please check your connection.".to_string(),
        _ => fallback.to_string(),
    }
}

impl ChatSession {
    /// Run one turn: append the user message and a streaming assistant
    /// placeholder, then fold the turn's event stream into the log in
    /// arrival order.
    ///
    /// Blank input and sends while another turn is in flight are ignored.
    /// Every failure settles into session error state instead of
    /// propagating; the turn always ends with the loading flag clear, the
    /// cancellation handle dropped, and no message left streaming.
    pub async fn send_message(
        &self,
        content: &str,
        agent: AgentId,
        updates: Option<&mpsc::UnboundedSender<ConversationUpdate>>,
    ) {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return;
        }

        let cancel = CancellationToken::new();
        let (request, assistant_id) = {
            let mut state = self.lock();
            // The in-flight check and every preparatory mutation happen
            // under one lock acquisition: two racing sends cannot both
            // pass the check.
            if state.loading {
                return;
            }
            state.loading = true;
            state.error = None;
            state.current_agent = agent;
            state.cancel = Some(cancel.clone());

            let snapshot = history::snapshot(&state.messages);

            let user = ChatMessage::user(trimmed, agent);
            let assistant = ChatMessage::assistant_placeholder(agent);
            let assistant_id = assistant.id.clone();
            emit(
                updates,
                ConversationUpdate::MessageStarted {
                    message: user.clone(),
                },
            );
            emit(
                updates,
                ConversationUpdate::MessageStarted {
                    message: assistant.clone(),
                },
            );
            state.messages.push(user);
            state.messages.push(assistant);

            (
                ChatRequest {
                    message: trimmed.to_string(),
                    history: snapshot,
                    agent,
                },
                assistant_id,
            )
        };

        if let Err(error) = self
            .stream_turn(&request, &assistant_id, &cancel, updates)
            .await
        {
            emit_transport_failure(&error);
            let mut state = self.lock();
            state.error = Some(NETWORK_ERROR_TEXT.to_string());
            settle_streaming(&mut state, &assistant_id, Some(NETWORK_ERROR_TEXT), updates);
            emit(
                updates,
                ConversationUpdate::ErrorSurfaced {
                    message: NETWORK_ERROR_TEXT.to_string(),
                },
            );
        }

        let mut state = self.lock();
        // A stream that ended without a done event (including cancellation)
        // still settles its assistant message.
        settle_streaming(&mut state, &assistant_id, None, updates);
        state.loading = false;
        state.cancel = None;
    }

    async fn stream_turn(
        &self,
        request: &ChatRequest,
        assistant_id: &str,
        cancel: &CancellationToken,
        updates: Option<&mpsc::UnboundedSender<ConversationUpdate>>,
    ) -> Result<()> {
        let client = Arc::clone(&self.client);
        let bytes = client.chat_stream(request).await?;
        let mut events = EventStream::new(bytes);

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => {
                    events.close();
                    return Ok(());
                }
                next = events.next_event() => next?,
            };
            let Some(event) = next else {
                return Ok(());
            };
            self.apply_event(assistant_id, event, updates);
        }
    }

    fn apply_event(
        &self,
        assistant_id: &str,
        event: StreamEvent,
        updates: Option<&mpsc::UnboundedSender<ConversationUpdate>>,
    ) {
        let mut state = self.lock();
        match event {
            StreamEvent::Token { text } => {
                if let Some(message) = streaming_message_mut(&mut state, assistant_id) {
                    message.content.push_str(&text);
                    emit(
                        updates,
                        ConversationUpdate::Delta {
                            id: assistant_id.to_string(),
                            text,
                        },
                    );
                }
            }
            StreamEvent::AgentSelected { agent, .. } => {
                state.current_agent = agent;
                if let Some(message) = message_mut(&mut state, assistant_id) {
                    message.agent = Some(agent);
                }
                emit(updates, ConversationUpdate::AgentSelected { agent });
            }
            StreamEvent::Done { .. } => {
                settle_streaming(&mut state, assistant_id, None, updates);
            }
            StreamEvent::Error { message, code } => {
                let text = resolve_error_text(code.as_deref(), &message);
                state.error = Some(text.clone());
                settle_streaming(&mut state, assistant_id, Some(&text), updates);
                emit(updates, ConversationUpdate::ErrorSurfaced { message: text });
            }
        }
    }
}

/// Freeze the turn's assistant message if it is still streaming,
/// optionally replacing its content with an error text first.
fn settle_streaming(
    state: &mut SessionState,
    assistant_id: &str,
    replacement: Option<&str>,
    updates: Option<&mpsc::UnboundedSender<ConversationUpdate>>,
) {
    let Some(message) = streaming_message_mut(state, assistant_id) else {
        return;
    };
    if let Some(text) = replacement {
        message.content = text.to_string();
    }
    message.streaming = false;
    emit(
        updates,
        ConversationUpdate::MessageSettled {
            id: assistant_id.to_string(),
        },
    );
}

fn message_mut<'a>(state: &'a mut SessionState, id: &str) -> Option<&'a mut ChatMessage> {
    state.messages.iter_mut().find(|m| m.id == id)
}

fn streaming_message_mut<'a>(
    state: &'a mut SessionState,
    id: &str,
) -> Option<&'a mut ChatMessage> {
    message_mut(state, id).filter(|m| m.streaming)
}

fn emit(
    updates: Option<&mpsc::UnboundedSender<ConversationUpdate>>,
    update: ConversationUpdate,
) {
    if let Some(tx) = updates {
        let _ = tx.send(update);
    }
}
