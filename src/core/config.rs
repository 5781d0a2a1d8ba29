mod parsing;
mod settings;
mod types;

pub use types::{
    ApiSettings, ConfigError, Environment, IdentitySettings, RuntimeSettings, SessionSettings,
    Settings, TelemetrySettings, UiSettings,
};
