//! Scoreboard server: HTTP, SSE and WebSocket surfaces over the mutation engine.

pub mod app;
pub mod config;
