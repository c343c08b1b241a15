pub mod calendar;
pub mod capacity;
pub mod config;
pub mod effort;
pub mod engine;
pub mod error;
pub mod insights;
pub mod member;
pub mod member_capacity;
pub mod outlook;
pub mod scheduler;
pub mod size_catalog;
pub mod store;
pub mod timeline;
pub mod types;
