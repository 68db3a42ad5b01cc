pub mod adapters;
pub mod chat;
pub mod config;
pub mod credentials;
pub mod error;
pub mod ingest;
pub mod web;
