//! Integration tests for tickerscope

mod cli_test;
mod news_test;
mod pipeline_test;
mod session_test;
mod support;
