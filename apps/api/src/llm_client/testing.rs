//! In-memory provider for tests: replays a fixed script and records every
//! conversation it was sent.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::llm_client::{ChatMessage, CompletionProvider, CompletionRequest, LlmError};

pub enum Scripted {
    Reply(String),
    Status(u16),
    /// Sleeps before replying; used to trip the attempt timeout.
    Stall(Duration),
}

impl Scripted {
    pub fn reply(text: impl Into<String>) -> Self {
        Scripted::Reply(text.into())
    }

    pub fn status(status: u16) -> Self {
        Scripted::Status(status)
    }

    pub fn stall(duration: Duration) -> Self {
        Scripted::Stall(duration)
    }
}

pub struct ScriptedProvider {
    script: Mutex<VecDeque<Scripted>>,
    calls: AtomicU32,
    conversations: Mutex<Vec<Vec<ChatMessage>>>,
    schemas: Mutex<Vec<(String, Value)>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: AtomicU32::new(0),
            conversations: Mutex::new(Vec::new()),
            schemas: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn conversations(&self) -> Vec<Vec<ChatMessage>> {
        self.conversations.lock().unwrap().clone()
    }

    /// Schema name and document sent with each call.
    pub fn schemas(&self) -> Vec<(String, Value)> {
        self.schemas.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.conversations
            .lock()
            .unwrap()
            .push(request.messages.to_vec());
        self.schemas
            .lock()
            .unwrap()
            .push((request.schema_name.to_string(), request.schema.clone()));

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Status(status)) => Err(LlmError::Api {
                status,
                message: format!("scripted status {status}"),
            }),
            Some(Scripted::Stall(duration)) => {
                tokio::time::sleep(duration).await;
                Ok("{}".to_string())
            }
            None => Err(LlmError::Api {
                status: 500,
                message: "script exhausted".to_string(),
            }),
        }
    }
}
