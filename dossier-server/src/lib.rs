//! HTTP surface for the dossier record engine.
//!
//! Exposes the record store over a small REST API. Each directory gets
//! CRUD plus listing and batch delete:
//!
//! ```text
//! GET    /healthz
//! GET    /{dir}?page&limit&search&sort&order&filter
//! POST   /{dir}
//! GET    /{dir}/{id}
//! PATCH  /{dir}/{id}
//! DELETE /{dir}/{id}
//! DELETE /{dir}/batch
//! ```
//!
//! `{dir}` is a directory slug or id; the acting user arrives in the
//! `x-user-id` header. See [`app::build_router`] for wiring and
//! [`config::ServerConfig`] for the environment variables the binary
//! reads.

pub mod api;
pub mod app;
pub mod config;
