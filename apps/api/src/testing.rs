//! Deterministic doubles for the two provider gateways.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::embedding::EmbeddingGateway;
use crate::errors::CoreError;
use crate::llm_client::{GenerationGateway, PromptContext};

const STUB_DIMS: usize = 32;

/// Vocabulary-indexed embeddings.
///
/// Each registered term owns one axis, so distinct terms are orthogonal and
/// identical strings map to the same unit vector. `blend` places a term at an
/// exact cosine similarity to an existing one. Unregistered text embeds to
/// the zero vector, which is similar to nothing.
pub struct StubEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    next_axis: usize,
    fail: bool,
    calls: AtomicUsize,
}

impl StubEmbedder {
    pub fn new() -> Self {
        Self {
            vectors: HashMap::new(),
            next_axis: 0,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn take_axis(&mut self) -> Vec<f32> {
        assert!(self.next_axis < STUB_DIMS, "stub embedder out of axes");
        let mut v = vec![0.0; STUB_DIMS];
        v[self.next_axis] = 1.0;
        self.next_axis += 1;
        v
    }

    pub fn term(mut self, text: &str) -> Self {
        let v = self.take_axis();
        self.vectors.insert(text.to_string(), v);
        self
    }

    /// Registers `text` with cosine similarity `similarity` to `base`.
    pub fn blend(mut self, text: &str, base: &str, similarity: f32) -> Self {
        let base_vec = self
            .vectors
            .get(base)
            .cloned()
            .unwrap_or_else(|| panic!("blend base '{base}' is not registered"));
        let own = self.take_axis();
        let rest = (1.0 - similarity * similarity).max(0.0).sqrt();
        let v = base_vec
            .iter()
            .zip(own.iter())
            .map(|(b, o)| similarity * b + rest * o)
            .collect();
        self.vectors.insert(text.to_string(), v);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn vector(&self, text: &str) -> Vec<f32> {
        self.vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| vec![0.0; STUB_DIMS])
    }

    pub fn batch_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingGateway for StubEmbedder {
    fn model_name(&self) -> &str {
        "stub"
    }

    fn dims(&self) -> usize {
        STUB_DIMS
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CoreError::provider("stub embedder is offline"));
        }
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }
}

/// Replays canned replies in order (repeating the last one) and records every
/// prompt it was given.
pub struct RecordingGenerator {
    replies: Mutex<VecDeque<Result<String, String>>>,
    last: Mutex<Option<Result<String, String>>>,
    prompts: Mutex<Vec<PromptContext>>,
}

impl RecordingGenerator {
    pub fn replying(text: &str) -> Self {
        Self::scripted(vec![Ok(text.to_string())])
    }

    pub fn failing() -> Self {
        Self::scripted(vec![Err("generation backend down".to_string())])
    }

    pub fn scripted(replies: Vec<Result<String, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<PromptContext> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationGateway for RecordingGenerator {
    async fn generate(&self, prompt: &PromptContext) -> Result<String, CoreError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        let next = self.replies.lock().unwrap().pop_front();
        let reply = match next {
            Some(reply) => {
                *self.last.lock().unwrap() = Some(reply.clone());
                reply
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Ok(String::new())),
        };
        match reply {
            Ok(text) if text.trim().is_empty() => Err(CoreError::EmptyGeneration),
            Ok(text) => Ok(text),
            Err(message) => Err(CoreError::provider(message)),
        }
    }
}
