//! Adapters - Implementations of port interfaces.
//!
//! - `http` - axum REST API
//! - `memory` - in-process store for tests and local runs
//! - `postgres` - sqlx store, commit in one transaction
//! - `supabase` - PostgREST store, commit in one RPC call

pub mod http;
pub mod memory;
pub mod postgres;
pub mod supabase;
