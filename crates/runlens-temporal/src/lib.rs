// Temporal HTTP API Client
//
// Talks to the engine's HTTP JSON API: paginated history retrieval for one
// execution and pass-through visibility search. Implements the fetcher and
// searcher traits from runlens-core.

pub mod client;
pub mod config;

pub use client::TemporalClient;
pub use config::TemporalConfig;
