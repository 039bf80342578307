pub mod config;
pub mod prebuild;
