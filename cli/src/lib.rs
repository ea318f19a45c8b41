pub mod cli;
pub mod logger;
