//! Integration tests for Story-Harvest
//!
//! Each test starts a wiremock server standing in for the catalog and runs
//! the coordinator against it end-to-end.

mod api_tests;
mod crawl_tests;
