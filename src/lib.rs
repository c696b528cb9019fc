//! # strprop
//!
//! A small HTTP service that computes and stores textual properties of
//! strings. Each stored string is keyed by the SHA-256 of its bytes, so
//! the same value always maps to the same record and duplicates are
//! rejected at create time.
//!
//! ## What it computes
//!
//! Length (in characters), palindrome status (case-folded, whitespace
//! kept), distinct-character count, word count, and a per-character
//! frequency map. See [`properties::compute`].
//!
//! ## The HTTP surface
//!
//! | Method | Path | Purpose |
//! |---|---|---|
//! | `POST` | `/strings` | analyze and store a value |
//! | `GET` | `/strings/{value}` | fetch a stored value |
//! | `GET` | `/strings` | list with explicit query-parameter filters |
//! | `DELETE` | `/strings/{value}` | remove a stored value |
//! | `GET` | `/strings/filter-by-natural-language` | list via a free-text query |
//! | `GET` | `/healthz`, `/readyz` | liveness / readiness probes |
//!
//! The natural-language endpoint runs an ordered list of pattern rules
//! over the query ("single word", "longer than 5", "palindromic",
//! "containing the letter x") and applies the result exactly like the
//! explicit filters. See [`filter::StringFilter::parse_query`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use strprop::{App, Server, Store, StringService};
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = StringService::new(Arc::new(Store::new()));
//!     Server::bind("0.0.0.0:3000")
//!         .serve(App::new(service))
//!         .await
//!         .unwrap();
//! }
//! ```

mod app;
mod error;
pub mod filter;
pub mod properties;
mod server;
mod service;
mod store;

pub use app::App;
pub use error::{ApiError, Error};
pub use filter::StringFilter;
pub use server::Server;
pub use service::StringService;
pub use store::{AnalyzedString, Store};
