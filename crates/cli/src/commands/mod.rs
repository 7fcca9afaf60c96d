pub mod config_cmd;
pub mod models;
pub mod plan;
pub mod serve;
