//! Outgoing mail transports.
//!
//! The transport is built once at startup from [`EmailConfig`] and shared as
//! `Arc<dyn Mailer>`. Failures are classified for logging only; there is no
//! retry, a failed send is final for that call.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use drivers_hub_config::{EmailConfig, MailTransportKind, SmtpSettings};
use drivers_hub_core::AppError;
use lettre::message::{Mailbox, MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use uuid::Uuid;

pub type MailFuture<'a> = Pin<Box<dyn Future<Output = Result<SentEmail, EmailError>> + Send + 'a>>;

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("SMTP authentication failed: {0}")]
    Auth(String),
    #[error("could not reach the mail server: {0}")]
    Connection(String),
    #[error("mail server timed out: {0}")]
    Timeout(String),
    #[error("invalid email address '{0}'")]
    InvalidAddress(String),
    #[error("failed to build email: {0}")]
    Build(String),
    #[error("cannot send email: {0} is missing")]
    MissingField(&'static str),
    #[error("email delivery failed: {0}")]
    Other(String),
}

impl EmailError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::Connection(_) => "connection",
            Self::Timeout(_) => "timeout",
            Self::InvalidAddress(_) => "invalid_address",
            Self::Build(_) => "build",
            Self::MissingField(_) => "missing_field",
            Self::Other(_) => "other",
        }
    }

    /// Missing data and bad addresses are the caller's fault; everything else is ours.
    pub fn into_app_error(self) -> AppError {
        match self {
            Self::MissingField(_) | Self::InvalidAddress(_) => AppError::bad_request(self),
            other => AppError::internal(other),
        }
    }
}

/// Map an SMTP failure onto [`EmailError`].
///
/// `status` is the three-digit reply code when the server answered at all.
pub fn classify_smtp_failure(timed_out: bool, status: Option<u16>, detail: String) -> EmailError {
    if timed_out {
        return EmailError::Timeout(detail);
    }
    match status {
        Some(code) if (530..540).contains(&code) => EmailError::Auth(detail),
        Some(_) => EmailError::Other(detail),
        None => EmailError::Connection(detail),
    }
}

fn classify_lettre_error(e: lettre::transport::smtp::Error) -> EmailError {
    let status = e.status().and_then(|code| code.to_string().parse::<u16>().ok());
    classify_smtp_failure(e.is_timeout(), status, e.to_string())
}

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub message_id: String,
    pub transport: &'static str,
}

pub trait Mailer: Send + Sync {
    fn send<'a>(&'a self, email: OutgoingEmail) -> MailFuture<'a>;

    fn transport_name(&self) -> &'static str;
}

fn parse_mailbox(name: &str, address: &str) -> Result<Mailbox, EmailError> {
    let address = address
        .parse()
        .map_err(|_| EmailError::InvalidAddress(address.to_string()))?;
    let name = name.trim();
    Ok(Mailbox::new(
        (!name.is_empty()).then(|| name.to_string()),
        address,
    ))
}

pub fn build_message(from: &Mailbox, email: &OutgoingEmail, message_id: &str) -> Result<Message, EmailError> {
    let to = parse_mailbox(&email.to_name, &email.to_email)?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(email.subject.clone())
        .message_id(Some(message_id.to_string()))
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(header::ContentType::TEXT_PLAIN)
                        .body(email.text_body.clone()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(header::ContentType::TEXT_HTML)
                        .body(email.html_body.clone()),
                ),
        )
        .map_err(|e| EmailError::Build(e.to_string()))
}

fn new_message_id() -> String {
    format!("<{}@drivershub>", Uuid::new_v4())
}

/// SMTP relay; also used for the Ethereal preview inbox.
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
    name: &'static str,
}

impl SmtpMailer {
    pub fn new(
        settings: &SmtpSettings,
        from: Mailbox,
        name: &'static str,
    ) -> Result<Self, EmailError> {
        let builder = if settings.port == 465 {
            SmtpTransport::relay(&settings.host)
        } else {
            SmtpTransport::starttls_relay(&settings.host)
        }
        .map_err(classify_lettre_error)?;

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from,
            name,
        })
    }
}

impl Mailer for SmtpMailer {
    fn send<'a>(&'a self, email: OutgoingEmail) -> MailFuture<'a> {
        Box::pin(async move {
            let message_id = new_message_id();
            let message = build_message(&self.from, &email, &message_id)?;
            let transport = self.transport.clone();

            tokio::task::spawn_blocking(move || transport.send(&message))
                .await
                .map_err(|e| EmailError::Other(format!("mail task failed: {}", e)))?
                .map_err(classify_lettre_error)?;

            Ok(SentEmail {
                message_id,
                transport: self.name,
            })
        })
    }

    fn transport_name(&self) -> &'static str {
        self.name
    }
}

/// Records what would have been sent without contacting any server.
pub struct LogMailer {
    from: Mailbox,
}

impl LogMailer {
    pub fn new(from: Mailbox) -> Self {
        Self { from }
    }
}

impl Mailer for LogMailer {
    fn send<'a>(&'a self, email: OutgoingEmail) -> MailFuture<'a> {
        Box::pin(async move {
            let message_id = new_message_id();
            // Same validation as a real send, so bad data fails identically.
            build_message(&self.from, &email, &message_id)?;

            tracing::info!(
                to = %email.to_email,
                subject = %email.subject,
                message_id = %message_id,
                "No mail transport configured; email logged instead of sent"
            );

            Ok(SentEmail {
                message_id,
                transport: "log",
            })
        })
    }

    fn transport_name(&self) -> &'static str {
        "log"
    }
}

/// Build the transport selected by configuration.
pub fn build_mailer(config: &EmailConfig) -> Result<Arc<dyn Mailer>, EmailError> {
    let from = parse_mailbox(&config.from_name, &config.from_email)?;

    let mailer: Arc<dyn Mailer> = match &config.transport {
        MailTransportKind::Smtp(settings) => Arc::new(SmtpMailer::new(settings, from, "smtp")?),
        MailTransportKind::Ethereal(settings) => {
            Arc::new(SmtpMailer::new(settings, from, "ethereal")?)
        }
        MailTransportKind::Log => Arc::new(LogMailer::new(from)),
    };

    tracing::info!(transport = mailer.transport_name(), "Mail transport ready");
    Ok(mailer)
}
