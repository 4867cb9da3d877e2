pub mod config;
pub mod http;
pub mod mu_plugin;
pub mod paths;
pub mod render;
pub mod wp_config;
