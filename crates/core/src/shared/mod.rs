pub mod clock;
pub mod constants;
pub mod run_config;
