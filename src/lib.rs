//! # pagebrief
//!
//! An interactive tool for summarising webpages with LLMs.
//!
//! ## Features
//!
//! - **Visible text extraction**: fetches a page and keeps only the text a reader would see
//! - **Provider Agnostic**: a local Ollama runner, the HuggingFace inference API or any
//!   OpenRouter-style chat-completion endpoint, picked from the config file
//! - **Email delivery**: sends the summary over SMTP with STARTTLS

pub mod agent;
pub mod config;
pub mod logging;
pub mod mail;
pub mod prompt;
pub mod provider;
pub mod scraper;
pub mod selector;
pub mod session;
pub mod summary;
pub mod ui;
pub mod util;

pub use agent::Summarizer;
pub use config::Config;
pub use scraper::Scraper;
pub use session::Session;
pub use summary::Summary;
