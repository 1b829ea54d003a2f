//! Integration tests for the gateway

mod config_integration;
mod context_store;
mod graphql_client;
