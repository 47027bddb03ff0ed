//! Async HTTP client for the funnelboard backend.
//!
//! [`FunnelClient`] covers every REST endpoint the dashboard uses and
//! implements [`fb_core::board::BoardApi`] so a board controller can run on
//! top of it.

mod auth;
mod board_api;
mod client;
mod collaborators;
mod dashboard;
mod funnels;

pub use client::FunnelClient;
pub use fb_core::error::ApiError;
