//! HTTP transport layer — `EmtHttp` and the response classification gate.

pub(crate) mod client;

pub(crate) use client::{ApiBody, EmtHttp};
