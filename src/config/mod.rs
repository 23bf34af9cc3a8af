//! Configuration module for vidseek.
//!
//! Settings come from a TOML file and are then overridden by environment variables.

mod settings;

pub use settings::{
    AuthMethod, AuthSettings, FacetSpecSettings, SearchSettings, ServerSettings, Settings,
    StorageSettings,
};
