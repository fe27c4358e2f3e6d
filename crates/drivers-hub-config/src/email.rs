//! Outgoing email configuration.
//!
//! The transport is chosen once at startup:
//!
//! 1. `SMTP_HOST`, `SMTP_USERNAME` and `SMTP_PASSWORD` set: real SMTP relay.
//! 2. Otherwise `ETHEREAL_USERNAME` and `ETHEREAL_PASSWORD` set: Ethereal preview inbox.
//! 3. Otherwise: log-only transport that records what would have been sent.

use crate::{non_empty_var, parse_var};

pub const ETHEREAL_HOST: &str = "smtp.ethereal.email";
pub const ETHEREAL_PORT: u16 = 587;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MailTransportKind {
    Smtp(SmtpSettings),
    Ethereal(SmtpSettings),
    Log,
}

impl MailTransportKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Smtp(_) => "smtp",
            Self::Ethereal(_) => "ethereal",
            Self::Log => "log",
        }
    }
}

#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub transport: MailTransportKind,
    pub from_email: String,
    pub from_name: String,
    /// Base URL of the web client, used for links inside emails.
    pub frontend_url: String,
}

/// Raw credential values as read from the environment.
#[derive(Clone, Debug, Default)]
pub struct TransportEnv {
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub ethereal_username: Option<String>,
    pub ethereal_password: Option<String>,
}

impl TransportEnv {
    fn from_env() -> Self {
        Self {
            smtp_host: non_empty_var("SMTP_HOST"),
            smtp_port: non_empty_var("SMTP_PORT").and_then(|p| p.parse().ok()),
            smtp_username: non_empty_var("SMTP_USERNAME"),
            smtp_password: non_empty_var("SMTP_PASSWORD"),
            ethereal_username: non_empty_var("ETHEREAL_USERNAME"),
            ethereal_password: non_empty_var("ETHEREAL_PASSWORD"),
        }
    }

    pub fn select(self) -> MailTransportKind {
        if let (Some(host), Some(username), Some(password)) =
            (self.smtp_host, self.smtp_username, self.smtp_password)
        {
            return MailTransportKind::Smtp(SmtpSettings {
                host,
                port: self.smtp_port.unwrap_or(587),
                username,
                password,
            });
        }

        if let (Some(username), Some(password)) = (self.ethereal_username, self.ethereal_password) {
            return MailTransportKind::Ethereal(SmtpSettings {
                host: ETHEREAL_HOST.to_string(),
                port: ETHEREAL_PORT,
                username,
                password,
            });
        }

        MailTransportKind::Log
    }
}

impl EmailConfig {
    pub fn from_env() -> Self {
        Self {
            transport: TransportEnv::from_env().select(),
            from_email: non_empty_var("FROM_EMAIL")
                .unwrap_or_else(|| "noreply@drivershub.local".to_string()),
            from_name: non_empty_var("FROM_NAME").unwrap_or_else(|| "Drivers Hub".to_string()),
            frontend_url: parse_var("FRONTEND_URL", "http://localhost:5173".to_string()),
        }
    }

    /// Configuration that never talks to a mail server.
    pub fn log_only() -> Self {
        Self {
            transport: MailTransportKind::Log,
            from_email: "noreply@drivershub.local".to_string(),
            from_name: "Drivers Hub".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_smtp_wins_when_fully_configured() {
        let env = TransportEnv {
            smtp_host: some("smtp.mailgun.org"),
            smtp_port: Some(465),
            smtp_username: some("postmaster"),
            smtp_password: some("secret"),
            ethereal_username: some("ethereal"),
            ethereal_password: some("ethereal"),
        };
        match env.select() {
            MailTransportKind::Smtp(settings) => {
                assert_eq!(settings.host, "smtp.mailgun.org");
                assert_eq!(settings.port, 465);
            }
            other => panic!("expected smtp transport, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_smtp_falls_back_to_ethereal() {
        let env = TransportEnv {
            smtp_host: some("smtp.mailgun.org"),
            ethereal_username: some("nora@ethereal.email"),
            ethereal_password: some("pw"),
            ..Default::default()
        };
        let transport = env.select();
        assert_eq!(transport.name(), "ethereal");
        if let MailTransportKind::Ethereal(settings) = transport {
            assert_eq!(settings.host, ETHEREAL_HOST);
            assert_eq!(settings.port, ETHEREAL_PORT);
        }
    }

    #[test]
    fn test_nothing_configured_logs_only() {
        assert_eq!(TransportEnv::default().select(), MailTransportKind::Log);
    }
}
