//! Career guidance assistant: intent routing, semantic skill matching and
//! retrieval-augmented answers over a career knowledge base.

pub mod assistant;
pub mod config;
pub mod embedding;
pub mod errors;
pub mod intent;
pub mod knowledge;
pub mod llm_client;
pub mod matching;
pub mod models;
pub mod rag;
pub mod routes;
pub mod sanitize;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
