// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod game;
pub mod stat;
pub mod token;

pub use game::ScrimGame;
pub use stat::{parse_ingest_payload, IngestPayload, IngestResponse, StatInput, StatRecord};
pub use token::ApiToken;
