//! Integration tests for site-sift

mod crawl_tests;
mod webhook_tests;
