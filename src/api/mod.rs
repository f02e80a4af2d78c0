pub mod chat;
pub mod checkout_webhook;

/// Outbound automation endpoints. Either may be left unset.
#[derive(Debug, Clone, Default)]
pub struct ApiUrls {
    pub checkout_webhook_url: Option<String>,
    pub chat_webhook_url: Option<String>,
}
