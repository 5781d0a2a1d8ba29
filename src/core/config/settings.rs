use super::parsing::{
    env_optional, env_or_default, normalize_path_prefix, parse_base_url, parse_bool,
    parse_environment, parse_i64, parse_u64,
};
use super::types::{
    ApiSettings, ConfigError, IdentitySettings, RuntimeSettings, SessionSettings, Settings,
    TelemetrySettings, UiSettings,
};

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            parse_environment(env_optional("ACADEMY_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("ACADEMY_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let base_url =
            parse_base_url("API_BASE_URL", env_or_default("API_BASE_URL", "http://localhost:3001"))?;
        let connect_timeout_seconds = parse_u64(
            "API_CONNECT_TIMEOUT_SECONDS",
            env_or_default("API_CONNECT_TIMEOUT_SECONDS", "10"),
        )?;
        let request_timeout_seconds = parse_u64(
            "API_REQUEST_TIMEOUT_SECONDS",
            env_or_default("API_REQUEST_TIMEOUT_SECONDS", "30"),
        )?;

        let identity_url = env_or_default("SUPABASE_URL", "");
        let anon_key = env_or_default("SUPABASE_ANON_KEY", "");
        let access_token = env_optional("ACCESS_TOKEN");
        let access_token_expires_at = env_optional("ACCESS_TOKEN_EXPIRES_AT")
            .map(|value| parse_i64("ACCESS_TOKEN_EXPIRES_AT", value))
            .transpose()?;

        let search_debounce_ms =
            parse_u64("SEARCH_DEBOUNCE_MS", env_or_default("SEARCH_DEBOUNCE_MS", "300"))?;
        let video_call_path = normalize_path_prefix(&env_or_default("VIDEO_CALL_PATH", "/video-call"));
        let login_url = env_or_default("LOGIN_URL", "/admin-login");

        let check_interval_seconds = parse_u64(
            "SESSION_CHECK_INTERVAL_SECONDS",
            env_or_default("SESSION_CHECK_INTERVAL_SECONDS", "60"),
        )?;
        let expiry_warning_minutes = parse_u64(
            "SESSION_EXPIRY_WARNING_MINUTES",
            env_or_default("SESSION_EXPIRY_WARNING_MINUTES", "5"),
        )?;

        let log_level = env_or_default("ACADEMY_LOG_LEVEL", "info");
        let json = env_optional("ACADEMY_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { base_url, connect_timeout_seconds, request_timeout_seconds },
            identity: IdentitySettings {
                url: identity_url,
                anon_key,
                access_token,
                access_token_expires_at,
            },
            ui: UiSettings { search_debounce_ms, video_call_path, login_url },
            session: SessionSettings { check_interval_seconds, expiry_warning_minutes },
            telemetry: TelemetrySettings { log_level, json },
        };

        settings.validate()?;

        Ok(settings)
    }

    pub fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub fn identity(&self) -> &IdentitySettings {
        &self.identity
    }

    pub fn ui(&self) -> &UiSettings {
        &self.ui
    }

    pub fn session(&self) -> &SessionSettings {
        &self.session
    }

    pub fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.session.check_interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "SESSION_CHECK_INTERVAL_SECONDS",
                value: "0".to_string(),
            });
        }
        if self.api.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "API_REQUEST_TIMEOUT_SECONDS",
                value: "0".to_string(),
            });
        }

        let identity_missing = self.identity.url.is_empty() || self.identity.anon_key.is_empty();
        if !identity_missing {
            return Ok(());
        }

        if self.runtime.strict_config {
            return Err(ConfigError::MissingSecret("SUPABASE_URL/SUPABASE_ANON_KEY"));
        }

        tracing::warn!(
            environment = self.runtime.environment.as_str(),
            "Missing identity provider settings; some features may not work properly"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::core::config::{ConfigError, Environment, Settings};
    use crate::test_support;

    #[tokio::test]
    async fn load_uses_defaults() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::remove_var("API_BASE_URL");

        let settings = Settings::load().expect("settings");
        assert_eq!(settings.api().base_url, "http://localhost:3001");
        assert_eq!(settings.ui().search_debounce_ms, 300);
        assert_eq!(settings.ui().video_call_path, "/video-call");
        assert_eq!(settings.session().check_interval_seconds, 60);
        assert_eq!(settings.session().expiry_warning_minutes, 5);
        assert_eq!(settings.runtime().environment, Environment::Test);
    }

    #[tokio::test]
    async fn strict_config_requires_identity_settings() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("ACADEMY_STRICT_CONFIG", "1");
        std::env::remove_var("SUPABASE_URL");

        let err = Settings::load().expect_err("identity settings required");
        assert!(matches!(err, ConfigError::MissingSecret(_)));
    }

    #[tokio::test]
    async fn invalid_number_is_reported_with_field() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("SEARCH_DEBOUNCE_MS", "soon");

        let err = Settings::load().expect_err("invalid debounce");
        assert!(matches!(err, ConfigError::InvalidValue { field: "SEARCH_DEBOUNCE_MS", .. }));
    }
}
