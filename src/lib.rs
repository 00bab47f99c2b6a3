pub mod config;
pub mod course_list_fetcher;
pub mod fetch_error;
pub mod fetcher;
pub mod report;
pub mod runner;
pub mod semester;
pub mod series;
pub mod stats;
pub mod utils;
