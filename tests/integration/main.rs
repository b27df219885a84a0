//! Integration tests using WireMock.
//!
//! These tests drive the full client stack (facade, circuit breaker, retry
//! executor, request pipeline and the reqwest transport) against a mock
//! HTTP server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod classification;
mod endpoints;
mod scenarios;
mod support;
