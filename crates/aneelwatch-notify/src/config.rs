/// SMTP settings sourced from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub sender: String,
    pub password: String,
    pub recipient: String,
    pub host: String,
    pub port: u16,
}

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

impl MailConfig {
    /// Read `EMAIL_SENDER`, `EMAIL_APP_PASSWORD`, `EMAIL_RECIPIENT`, and optionally
    /// `SMTP_HOST` / `SMTP_PORT`. `None` if any required variable is missing or blank.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Some(Self {
            sender: get("EMAIL_SENDER")?,
            password: get("EMAIL_APP_PASSWORD")?,
            recipient: get("EMAIL_RECIPIENT")?,
            host: get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            port: get("SMTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
        })
    }
}
