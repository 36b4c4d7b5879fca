// Library for tests to access modules

pub mod assembler;
pub mod config;
pub mod core_history;
pub mod error;
pub mod metric_repo;
pub mod metric_writer;
pub mod models;
pub mod process_ranker;
pub mod routes;
pub mod sysinfo_repo;
pub mod units;
