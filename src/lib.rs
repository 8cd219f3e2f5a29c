#![deny(missing_docs)]

//! Maintenance tooling for the student management system.
//!
//! The main tool indexes the project's source tree into a Pinecone vector index for
//! retrieval-augmented assistants. Two smaller tools export the help-desk FAQ for the chat
//! widget and derive the teachers list template from the students one.

/// Line-based chunking of source files.
pub mod chunking;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// Codebase indexing pipeline.
pub mod indexing;
/// FAQ markdown to chat-widget export.
pub mod knowledge_base;
/// Structured logging and tracing setup.
pub mod logging;
/// Indexing run counters.
pub mod metrics;
/// Pinecone vector index integration.
pub mod pinecone;
/// Vector records and their metadata.
pub mod record;
/// Source file selection.
pub mod selector;
/// Teachers template derivation.
pub mod template;
