//! Gemini integration: model resolution and request dispatch.
//!
//! `ModelService` abstracts the remote service; `GeminiClient` is the REST
//! implementation. The resolver walks the fallback list and the dispatcher
//! sends one image + instruction to the resolved model.

pub(crate) mod client;
pub(crate) mod dispatcher;
pub(crate) mod resolver;
pub(crate) mod service;

pub use client::GeminiClient;
pub use dispatcher::Dispatcher;
pub use resolver::ModelResolver;
pub use service::ModelService;
