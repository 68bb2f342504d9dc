pub mod config;
pub mod env_collect;
pub mod errors;
pub mod logging;
pub mod replicate;
