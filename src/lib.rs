//! IP Location Service - answers "where is this IP address"
//!
//! This library provides the core functionality for the IP location service:
//! a bounded connection pool in front of the PostgreSQL range table, a
//! per-client sliding-window rate limiter and a Redis cache-aside layer.
//!
//! # Architecture
//! - `storage`: connection pool and the PostgreSQL range-lookup backend
//! - `cache`: external lookup cache (Redis, with a null fallback)
//! - `ratelimit`: per-client sliding-window admission control
//! - `services`: cache-aside lookup orchestration
//! - `api`: HTTP handlers (lookup pipeline, health, metrics)
//! - `config`: environment-derived configuration
//! - `system`: logging initialization
//! - `utils`: IP validation and client identity extraction

pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod ratelimit;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
