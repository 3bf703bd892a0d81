use std::env;

/// Process configuration loaded from environment variables, once, at startup.
///
/// Everything is optional except `database_path`: absence of the LLM key
/// disables extraction (the pipeline still runs and serves articles);
/// absence of SMTP disables the weekly send.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,

    pub anthropic_api_key: Option<String>,

    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub digest_recipients: Vec<String>,

    pub admin_token: Option<String>,
    pub server_port: u16,
}

impl Config {
    /// Load configuration from environment variables. Panics with a clear
    /// message if a required var is missing.
    pub fn from_env() -> Self {
        let digest_recipients: Vec<String> = env::var("DIGEST_RECIPIENTS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "hornsignal.db".to_string()),
            anthropic_api_key: env::var("ANTHROPIC_API_KEY").ok().filter(|s| !s.is_empty()),
            smtp_host: env::var("SMTP_HOST").ok().filter(|s| !s.is_empty()),
            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(587),
            smtp_user: env::var("SMTP_USER").ok().filter(|s| !s.is_empty()),
            smtp_password: env::var("SMTP_PASSWORD").ok().filter(|s| !s.is_empty()),
            digest_recipients,
            admin_token: env::var("ADMIN_TOKEN").ok().filter(|s| !s.is_empty()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
        }
    }

    pub fn extraction_enabled(&self) -> bool {
        self.anthropic_api_key.is_some()
    }

    pub fn digest_send_enabled(&self) -> bool {
        self.smtp_host.is_some() && !self.digest_recipients.is_empty()
    }

    /// Log presence (not value) of sensitive config for debugging.
    pub fn log_redacted(&self) {
        let flags = [
            ("ANTHROPIC_API_KEY", self.anthropic_api_key.is_some()),
            ("SMTP_HOST", self.smtp_host.is_some()),
            ("SMTP_USER", self.smtp_user.is_some()),
            ("ADMIN_TOKEN", self.admin_token.is_some()),
        ];
        for (name, present) in flags {
            tracing::info!(name, present, "config");
        }
    }
}
