//! Supabase adapter.
//!
//! Talks to a Supabase project's PostgREST API with the service-role key.
//! Expects the schema and the `commit_redemption` function from
//! `migrations/0001_entitlements.sql`.

mod client;
mod store;

pub use client::SupabaseClient;
pub use store::SupabaseEntitlementStore;
