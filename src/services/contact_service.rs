use serde::Deserialize;

use crate::database::models::{ApplicationReceipt, NewApplication};
use crate::database::{ApplicationStore, DatabaseError};
use crate::mail::{MailError, Mailer, OutgoingEmail};

/// Body of `POST /api/apply`. Fields are optional so a missing one is a 400, not a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("Missing fields (name/email/message)")]
    MissingFields,

    #[error("DB insert failed")]
    Insert(#[source] DatabaseError),

    #[error("Saved, but failed to send email")]
    Notify {
        receipt: ApplicationReceipt,
        #[source]
        source: MailError,
    },
}

impl ContactForm {
    /// Trimmed submission, or `MissingFields` when any part is blank.
    pub fn validate(&self) -> Result<NewApplication, ContactError> {
        let field = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        match (field(&self.name), field(&self.email), field(&self.message)) {
            (Some(name), Some(email), Some(message)) => Ok(NewApplication { name, email, message }),
            _ => Err(ContactError::MissingFields),
        }
    }
}

/// Record a contact submission and notify the admin inbox.
///
/// The row is written first; a mail failure is reported but does not undo it.
pub async fn submit(
    applications: &dyn ApplicationStore,
    mailer: &dyn Mailer,
    admin_address: &str,
    form: &ContactForm,
) -> Result<ApplicationReceipt, ContactError> {
    let application = form.validate()?;

    let receipt = applications.insert(&application).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to store application");
        ContactError::Insert(e)
    })?;
    tracing::info!(id = receipt.id, "Application stored");

    let email = notification(&application, &receipt, admin_address);
    if let Err(source) = mailer.send(&email).await {
        tracing::error!(id = receipt.id, error = %source, "Application notification failed");
        return Err(ContactError::Notify { receipt, source });
    }

    Ok(receipt)
}

pub fn notification(
    application: &NewApplication,
    receipt: &ApplicationReceipt,
    admin_address: &str,
) -> OutgoingEmail {
    let body = format!(
        "New Apply/Contact submission\n\n\
         Name: {}\n\
         Email: {}\n\n\
         Message:\n{}\n\n\
         ---\n\
         ID: {}\n\
         Created: {}\n",
        application.name,
        application.email,
        application.message,
        receipt.id,
        receipt.created_at.to_rfc3339(),
    );

    OutgoingEmail {
        to: admin_address.to_string(),
        reply_to: Some(application.email.clone()),
        subject: format!("[SKYRIDERS] New Apply/Contact from {}", application.name),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn form(name: &str, email: &str, message: &str) -> ContactForm {
        ContactForm {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            message: Some(message.to_string()),
        }
    }

    #[test]
    fn trims_fields() {
        let app = form("  Ana ", " ana@example.com", "Hi\n").validate().unwrap();
        assert_eq!(app.name, "Ana");
        assert_eq!(app.email, "ana@example.com");
        assert_eq!(app.message, "Hi");
    }

    #[test]
    fn blank_or_missing_is_rejected() {
        assert!(matches!(form("Ana", "   ", "Hi").validate(), Err(ContactError::MissingFields)));
        assert!(matches!(ContactForm::default().validate(), Err(ContactError::MissingFields)));
        assert_eq!(
            ContactError::MissingFields.to_string(),
            "Missing fields (name/email/message)"
        );
    }

    #[test]
    fn notification_shape() {
        let app = form("Ana", "ana@example.com", "I want to fly").validate().unwrap();
        let receipt = ApplicationReceipt {
            id: 42,
            created_at: Utc::now(),
        };
        let email = notification(&app, &receipt, "admin@skyriders.org");

        assert_eq!(email.to, "admin@skyriders.org");
        assert_eq!(email.reply_to.as_deref(), Some("ana@example.com"));
        assert_eq!(email.subject, "[SKYRIDERS] New Apply/Contact from Ana");
        assert!(email.body.contains("I want to fly"));
        assert!(email.body.contains("ID: 42"));
    }
}
