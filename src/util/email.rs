use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{header::ContentType, Mailbox},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};
use tracing::{error, info, instrument};

use crate::config::{ConfigError, EmailConfig};
use crate::model::quote_request::{Address, QuoteRequest};

/// Email service errors
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("SMTP error: {0}")]
    SmtpError(String),

    #[error("Message building error: {0}")]
    MessageError(String),

    #[error("Address error: {0}")]
    AddressError(String),
}

impl From<ConfigError> for EmailError {
    fn from(err: ConfigError) -> Self {
        EmailError::ConfigError(err.to_string())
    }
}

/// Email message builder
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: Option<String>,
    pub html_body: Option<String>,
}

impl EmailMessage {
    pub fn new(to: String, subject: String) -> Self {
        Self {
            to,
            subject,
            text_body: None,
            html_body: None,
        }
    }

    pub fn with_text_body(mut self, body: String) -> Self {
        self.text_body = Some(body);
        self
    }

    pub fn with_html_body(mut self, body: String) -> Self {
        self.html_body = Some(body);
        self
    }
}

/// Sends the customer-facing mail for submitted requests.
#[async_trait]
pub trait QuoteNotifier: Send + Sync {
    async fn send_quote_confirmation(&self, request: &QuoteRequest) -> Result<(), EmailError>;
}

fn one_line(address: &Address) -> String {
    [address.line1.as_str(), address.city.as_str(), address.postcode.as_str()]
        .iter()
        .filter(|p| !p.trim().is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

/// SMTP email service implementation
pub struct SmtpEmailService {
    pub config: EmailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailService {
    /// Create a new SMTP email service
    #[instrument(skip(config), fields(host = %config.smtp_host, port = config.smtp_port))]
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        info!("Initializing SMTP email service");

        config.validate().map_err(EmailError::from)?;

        let mut transport_builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            .port(config.smtp_port)
            .timeout(Some(std::time::Duration::from_secs(config.connection_timeout_secs)));

        // Configure TLS settings
        if config.use_tls {
            let tls_parameters = TlsParameters::new(config.smtp_host.clone())
                .map_err(|e| EmailError::ConfigError(format!("TLS configuration error: {}", e)))?;

            if config.use_starttls {
                transport_builder = transport_builder.tls(Tls::Required(tls_parameters));
            } else {
                transport_builder = transport_builder.tls(Tls::Wrapper(tls_parameters));
            }
        } else {
            transport_builder = transport_builder.tls(Tls::None);
        }

        // Configure authentication if credentials are provided
        if !config.smtp_username.is_empty() && !config.smtp_password.is_empty() {
            let credentials = Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            );
            transport_builder = transport_builder.credentials(credentials);
        }

        let transport = transport_builder.build();

        info!("SMTP email service initialized successfully");
        Ok(Self { config, transport })
    }

    /// Send an email message
    #[instrument(skip(self, message), fields(to = %message.to, subject = %message.subject))]
    pub async fn send_email(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!("Sending email to: {}", message.to);

        self.validate_email_address(&message.to)?;

        let email_message = self.build_message(message)?;

        self.transport
            .send(email_message)
            .await
            .map_err(|e| {
                error!("Failed to send email: {}", e);
                EmailError::SmtpError(format!("Failed to send email: {}", e))
            })?;

        info!("Email sent successfully");
        Ok(())
    }

    /// Plain text and HTML bodies for a quote confirmation.
    pub fn quote_confirmation_bodies(request: &QuoteRequest) -> (String, String) {
        let reference = request.id.to_hex();
        let move_date = request.property.move_date.format("%d %B %Y").to_string();
        let text = format!(
            r#"Hello {name},

Thank you for requesting a moving quote. Your reference is {reference}.

From: {from}
To: {to}
Moving date: {move_date}
Photos and videos attached: {media}

Verified moving companies will review your request and contact you at {email}.

The Movequote Team"#,
            name = request.contact.full_name,
            reference = reference,
            from = one_line(&request.pickup),
            to = one_line(&request.delivery),
            move_date = move_date,
            media = request.media.len(),
            email = request.contact.email,
        );

        let html = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Your moving quote request</title></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto;">
    <h2>Thanks, {name}</h2>
    <p>Your quote request has been received. Reference: <strong>{reference}</strong></p>
    <table>
        <tr><td>From</td><td>{from}</td></tr>
        <tr><td>To</td><td>{to}</td></tr>
        <tr><td>Moving date</td><td>{move_date}</td></tr>
        <tr><td>Media attached</td><td>{media}</td></tr>
    </table>
    <p>Verified moving companies will contact you at {email}.</p>
    <p style="font-size: 12px; color: #6c757d;">This is an automated message. Please do not reply.</p>
</body>
</html>"#,
            name = html_escape::encode_text(&request.contact.full_name),
            reference = reference,
            from = html_escape::encode_text(&one_line(&request.pickup)),
            to = html_escape::encode_text(&one_line(&request.delivery)),
            move_date = move_date,
            media = request.media.len(),
            email = html_escape::encode_text(&request.contact.email),
        );
        (text, html)
    }

    /// Build a lettre Message from EmailMessage
    fn build_message(&self, email_message: EmailMessage) -> Result<Message, EmailError> {
        let from_mailbox: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| EmailError::AddressError(format!("Invalid from address: {}", e)))?;

        let to_mailbox: Mailbox = email_message.to
            .parse()
            .map_err(|e| EmailError::AddressError(format!("Invalid to address: {}", e)))?;

        let message_builder = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(&email_message.subject);

        match (email_message.text_body, email_message.html_body) {
            (Some(text), Some(html)) => {
                // Multipart message with both text and HTML
                let message = message_builder
                    .multipart(
                        lettre::message::MultiPart::alternative()
                            .singlepart(
                                lettre::message::SinglePart::builder()
                                    .header(ContentType::TEXT_PLAIN)
                                    .body(text),
                            )
                            .singlepart(
                                lettre::message::SinglePart::builder()
                                    .header(ContentType::TEXT_HTML)
                                    .body(html),
                            ),
                    )
                    .map_err(|e| EmailError::MessageError(format!("Failed to build multipart message: {}", e)))?;
                return Ok(message);
            }
            (Some(text), None) => {
                // Text-only message
                let message = message_builder
                    .body(text)
                    .map_err(|e| EmailError::MessageError(format!("Failed to build text message: {}", e)))?;
                return Ok(message);
            }
            (None, Some(html)) => {
                // HTML-only message
                let message = message_builder
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html),
                    )
                    .map_err(|e| EmailError::MessageError(format!("Failed to build HTML message: {}", e)))?;
                return Ok(message);
            }
            (None, None) => {
                Err(EmailError::MessageError("No message body provided".to_string()))
            }
        }
    }

    /// Validate email address format
    fn validate_email_address(&self, email: &str) -> Result<(), EmailError> {
        if email.is_empty() {
            return Err(EmailError::AddressError("Email address cannot be empty".to_string()));
        }

        if !email.contains('@') {
            return Err(EmailError::AddressError("Invalid email format".to_string()));
        }

        // Basic email validation
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            return Err(EmailError::AddressError("Invalid email format".to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl QuoteNotifier for SmtpEmailService {
    #[instrument(skip(self, request), fields(request_id = %request.id))]
    async fn send_quote_confirmation(&self, request: &QuoteRequest) -> Result<(), EmailError> {
        let (text_body, html_body) = Self::quote_confirmation_bodies(request);
        let message = EmailMessage::new(
            request.contact.email.clone(),
            format!("Your moving quote request {}", request.id.to_hex()),
        )
        .with_text_body(text_body)
        .with_html_body(html_body);
        self.send_email(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::quote_request::*;
    use bson::oid::ObjectId;
    use chrono::NaiveDate;

    fn request(name: &str) -> QuoteRequest {
        let address = Address {
            line1: "1 Park Row".into(),
            city: "Leeds".into(),
            postcode: "LS1 4AP".into(),
            ..Address::default()
        };
        QuoteRequest {
            id: ObjectId::new(),
            service_type: ServiceType::HomeRemoval,
            pickup: address.clone(),
            delivery: address,
            property: PropertyDetails {
                property_type: PropertyType::House,
                bedrooms: Some(3),
                move_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
                flexible_dates: false,
            },
            packing: PackingOption::SelfPack,
            dismantling: DismantlingOption::NotNeeded,
            survey_method: SurveyMethod::NoSurvey,
            contact: ContactDetails { full_name: name.into(), email: "ada@example.com".into(), phone: "07700900123".into() },
            notes: None,
            media: vec![],
            created_at: crate::model::now_timestamp(),
        }
    }

    #[test]
    fn test_confirmation_mentions_reference_and_route() {
        let req = request("Ada");
        let (text, html) = SmtpEmailService::quote_confirmation_bodies(&req);
        assert!(text.contains(&req.id.to_hex()));
        assert!(text.contains("1 Park Row, Leeds, LS1 4AP"));
        assert!(html.contains("01 December 2026"));
    }

    #[test]
    fn test_confirmation_html_escapes_names() {
        let (_, html) = SmtpEmailService::quote_confirmation_bodies(&request("<b>Eve</b>"));
        assert!(html.contains("&lt;b&gt;Eve&lt;/b&gt;"));
        assert!(!html.contains("<b>Eve</b>"));
    }
}
