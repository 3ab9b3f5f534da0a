//! HTTP API: routing, session wiring, and request/response mapping for the
//! registration wizard front-end.

pub mod app;
