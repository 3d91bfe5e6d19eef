pub mod app;
pub mod client;
pub mod config;
pub mod domain;
pub mod download;
pub mod error;
pub mod filter;
pub mod lifecycle;
pub mod listeners;
pub mod output;
pub mod panel;
pub mod query;
pub mod session;
pub mod suggest;
pub mod tui;
pub mod worker;
