pub mod aggregate;
pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod task_api;
