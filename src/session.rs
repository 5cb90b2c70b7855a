//! The chat session: conversation, credential and the send flow.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::core::{ChatError, CompletionProvider, Message, SendState};
use crate::store::{Conversation, Credential, CredentialStore, KeyValueStore};

/// Owns everything one chat session needs.
///
/// A session is `Send + Sync`; share it behind an `Arc` when the front-end
/// needs to submit from more than one task. Only one send runs at a time.
pub struct ChatSession {
    conversation: Mutex<Conversation>,
    credentials: CredentialStore,
    provider: Box<dyn CompletionProvider>,
    sending: AtomicBool,
}

impl ChatSession {
    /// Start a session, reading the stored credential once.
    pub fn new<P>(provider: P, store: Arc<dyn KeyValueStore>) -> Result<Self, ChatError>
    where
        P: CompletionProvider + 'static,
    {
        let credentials = CredentialStore::load(store)?;
        debug!(
            authenticated = !credentials.get().is_empty(),
            "Session started"
        );

        Ok(Self {
            conversation: Mutex::new(Conversation::new()),
            credentials,
            provider: Box::new(provider),
            sending: AtomicBool::new(false),
        })
    }

    /// Submit user text and wait for the assistant's reply.
    ///
    /// Blank text and a missing credential are rejected before anything
    /// changes. Otherwise the user message is appended and exactly one
    /// completion is requested; the reply is appended only on success.
    #[tracing::instrument(name = "send_message", skip(self, content), err)]
    pub async fn send(&self, content: &str) -> Result<Message, ChatError> {
        if content.trim().is_empty() {
            return Err(ChatError::EmptyInput);
        }

        let credential = self.credentials.get();
        if credential.is_empty() {
            return Err(ChatError::Unauthenticated);
        }

        let _sending = SendingGuard::enter(&self.sending)?;

        let history = {
            let mut conversation = self.lock_conversation();
            conversation.append(Message::user(content))?;
            conversation.snapshot()
        };

        match self.provider.complete(&history, credential.expose()).await {
            Ok(text) => {
                let reply = Message::assistant(text);
                self.lock_conversation().append(reply.clone())?;
                info!(turns = history.len() + 1, "Completion succeeded");
                Ok(reply)
            }
            Err(err) => {
                warn!(error = %err, "Completion failed");
                Err(err)
            }
        }
    }

    pub fn state(&self) -> SendState {
        if self.sending.load(Ordering::Acquire) {
            SendState::Sending
        } else {
            SendState::Idle
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock_conversation().snapshot()
    }

    pub fn message_count(&self) -> usize {
        self.lock_conversation().len()
    }

    pub fn credential(&self) -> Credential {
        self.credentials.get()
    }

    pub fn is_authenticated(&self) -> bool {
        !self.credentials.get().is_empty()
    }

    pub fn save_credential(&self, token: &str) -> Result<(), ChatError> {
        self.credentials.set(token)
    }

    pub fn clear_credential(&self) -> Result<(), ChatError> {
        self.credentials.clear()
    }

    fn lock_conversation(&self) -> MutexGuard<'_, Conversation> {
        self.conversation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds the session in `Sending` until dropped, including when the send
/// future is cancelled.
struct SendingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> SendingGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Result<Self, ChatError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ChatError::Busy)?;
        Ok(Self { flag })
    }
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
