use crate::api::ApiClient;
use crate::types::{AgentId, ChatMessage};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

/// Observer feed for renderers. Every mutation of the log is mirrored here
/// so a consumer can paint incrementally instead of diffing snapshots.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationUpdate {
    MessageStarted { message: ChatMessage },
    Delta { id: String, text: String },
    AgentSelected { agent: AgentId },
    MessageSettled { id: String },
    ErrorSurfaced { message: String },
}

pub(super) struct SessionState {
    pub(super) messages: Vec<ChatMessage>,
    pub(super) loading: bool,
    pub(super) error: Option<String>,
    pub(super) current_agent: AgentId,
    pub(super) cancel: Option<CancellationToken>,
}

/// The conversation state machine. One instance owns one message log plus
/// the error/loading/current-agent fields; renderers only read snapshots
/// and the update feed, never mutate.
///
/// Cloning shares the same underlying conversation, so lifecycle controls
/// stay available while a turn is being driven elsewhere.
#[derive(Clone)]
pub struct ChatSession {
    pub(super) client: Arc<ApiClient>,
    pub(super) state: Arc<Mutex<SessionState>>,
}

impl ChatSession {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client: Arc::new(client),
            state: Arc::new(Mutex::new(SessionState {
                messages: Vec::new(),
                loading: false,
                error: None,
                current_agent: AgentId::Default,
                cancel: None,
            })),
        }
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().messages.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn current_agent(&self) -> AgentId {
        self.lock().current_agent
    }

    /// Clears only the surfaced error, independent of turn state.
    pub fn clear_error(&self) {
        self.lock().error = None;
    }

    /// Abort the in-flight turn, if any. The partial assistant message
    /// settles with whatever content already arrived.
    pub fn cancel(&self) {
        if let Some(token) = self.lock().cancel.take() {
            token.cancel();
        }
    }

    /// Reset the conversation: empty log, no error, default agent. Also
    /// cancels an in-flight turn, so a message that just became invisible
    /// cannot keep consuming the transport.
    pub fn clear(&self) {
        let mut state = self.lock();
        if let Some(token) = state.cancel.take() {
            token.cancel();
        }
        state.messages.clear();
        state.error = None;
        state.current_agent = AgentId::Default;
    }

    pub(super) fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().expect("session state lock poisoned")
    }
}
