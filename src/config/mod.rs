// src/config/mod.rs
pub mod relay;

pub use relay::{
    EndpointTable, IntlMetalsConfig, RelayConfig, ServerConfig, UpstreamSettings,
    DEFAULT_CONFIG_PATH, ENV_CONFIG_PATH,
};
