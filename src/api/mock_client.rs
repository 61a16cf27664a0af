use crate::api::client::{ByteStream, MockStreamProducer};
use crate::types::ChatRequest;
use anyhow::Result;
use bytes::Bytes;
use futures::stream;
use std::sync::{Arc, Mutex};

/// Replays canned byte-chunk lists, one list per chat request, and records
/// every request it serves. Chunks are delivered exactly as given so tests
/// control where network-read boundaries fall.
#[derive(Clone)]
pub struct MockApiClient {
    responses: Arc<Mutex<Vec<Vec<String>>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockApiClient {
    pub fn new(responses: Vec<Vec<String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl MockStreamProducer for MockApiClient {
    fn create_mock_stream(&self, request: &ChatRequest) -> Result<ByteStream> {
        self.requests.lock().unwrap().push(request.clone());

        let mut responses_guard = self.responses.lock().unwrap();
        if responses_guard.is_empty() {
            return Err(anyhow::anyhow!(
                "MockApiClient: no more responses configured"
            ));
        }
        let chunks = responses_guard.remove(0);

        let byte_chunks: Vec<Result<Bytes>> =
            chunks.into_iter().map(|s| Ok(Bytes::from(s))).collect();
        Ok(Box::pin(stream::iter(byte_chunks)))
    }
}
