//! HTTP/JSON gateway for the ITAM record service.
//!
//! Exposes assets, contracts with versioned file attachments, system
//! interfaces and dashboard statistics over a permissive-CORS JSON API, and
//! raises alerts when assets come and go.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod extract;
pub mod notify;
pub mod routes;
pub mod state;
pub mod storage;
