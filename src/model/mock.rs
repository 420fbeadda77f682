use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Model, ModelReply, ModelRequest};

/// A scripted model for tests. Returns pre-defined replies in order and
/// records every request it receives, so tests can assert that rejected
/// input never reached the model.
pub struct MockModel {
    replies: Vec<Result<ModelReply, String>>,
    index: AtomicUsize,
    requests: Mutex<Vec<ModelRequest>>,
}

impl MockModel {
    pub fn new(replies: Vec<Result<ModelReply, String>>) -> Self {
        Self {
            replies,
            index: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Convenience: a mock that replies with the given texts, no usage.
    pub fn replying(texts: &[&str]) -> Self {
        Self::new(
            texts
                .iter()
                .map(|t| {
                    Ok(ModelReply {
                        text: t.to_string(),
                        usage: None,
                    })
                })
                .collect(),
        )
    }

    /// Convenience: a mock whose single call fails with the given message.
    pub fn failing(message: &str) -> Self {
        Self::new(vec![Err(message.to_string())])
    }

    /// How many times the model was actually called.
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The requests received so far.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Model for MockModel {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply> {
        self.requests.lock().unwrap().push(request.clone());
        let i = self.index.fetch_add(1, Ordering::SeqCst);
        match self.replies.get(i) {
            Some(Ok(reply)) => Ok(reply.clone()),
            Some(Err(message)) => Err(anyhow::anyhow!("{}", message)),
            None => Err(anyhow::anyhow!(
                "MockModel: no more replies (called {} times)",
                i + 1
            )),
        }
    }
}
