pub mod chat_options;
pub mod default_config;
