use super::error::{RestDaoError, RestResult};

/// Runtime configuration describing how to reach the upstream REST backend.
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Root URL; collections live under `{base_url}/{collection}`.
    pub base_url: String,
    /// Basic auth user, if the backend wants one.
    pub username: Option<String>,
    /// Basic auth password.
    pub password: Option<String>,
}

impl RestConfig {
    /// Construct a configuration from an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: None,
            password: None,
        }
    }

    /// Attach basic-auth credentials to the configuration.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> RestResult<Self> {
        let base_url = std::env::var("UPSTREAM_BASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or(RestDaoError::MissingEnvVar {
                var: "UPSTREAM_BASE_URL",
            })?;

        let mut config = Self::new(base_url);

        if let (Some(username), Some(password)) = (
            std::env::var("UPSTREAM_USERNAME").ok(),
            std::env::var("UPSTREAM_PASSWORD").ok(),
        ) {
            config = config.with_credentials(username, password);
        }

        Ok(config)
    }
}
