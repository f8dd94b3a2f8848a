pub mod cache;
pub mod services;
pub mod utils;
