//! Travel-Planner Chat API Library
//!
//! This library provides the core functionality for the travel-planner chat
//! API: a three-stage pipeline (extract → enrich → synthesize) that turns a
//! free-text travel request into a Markdown itinerary using a language-model
//! service and a mapping service, with per-user chat history behind
//! token-based authentication.
//!
//! # Modules
//!
//! - `auth`: Password hashing and session token helpers.
//! - `config`: Configuration management.
//! - `db`: Database connection, pool management, and schema.
//! - `db_storage`: User, session, and chat-history storage.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and router.
//! - `json_extract`: Balanced-JSON scanner for model replies.
//! - `models`: Core data models.
//! - `planner`: The per-request planning pipeline.
//! - `services`: External service clients (Gemini, Maps).

pub mod auth;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod handlers;
pub mod json_extract;
pub mod models;
pub mod planner;
pub mod services;
