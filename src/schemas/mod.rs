use serde::{Deserialize, Deserializer};

pub mod admin;
pub mod assignment;
pub mod class;
pub mod fee;
pub mod session;
pub mod student;
pub mod teacher;
pub mod types;

/// Reads an explicit `null` as the field's default. Pair with
/// `#[serde(default)]` so a missing key behaves the same.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `GET /api/health`. Served without authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Body of write endpoints whose payload the dashboards never read beyond the
/// status code. An empty 2xx body decodes to the default value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}
