//! HTTP-level tests driving the router with in-memory infrastructure.

mod auth_test;
mod helpers;
mod oauth_test;
