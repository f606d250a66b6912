pub mod config;
pub mod export;
pub mod humanize;
pub mod observability;
pub mod storage;
