//! Model-call capability backed by a local Ollama server.

pub mod ollama;

pub use ollama::OllamaProvider;
