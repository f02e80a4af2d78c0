//! Best-effort checkout notifications to the automation webhook.
//!
//! Delivery runs on its own task. Checkout never waits on it and its failures
//! only reach the logs.

use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::WebhookPolicy;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationItem {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutNotification {
    pub order_id: Uuid,
    pub customer: NotificationCustomer,
    pub items: Vec<NotificationItem>,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Side channel told about every completed checkout.
///
/// Implementations must return immediately; any I/O happens elsewhere.
pub trait OrderNotifier: Send + Sync {
    fn notify(&self, notification: CheckoutNotification);
}

#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: Option<String>,
    policy: WebhookPolicy,
}

impl WebhookNotifier {
    pub fn new(client: Client, url: Option<String>, policy: WebhookPolicy) -> Self {
        Self {
            client,
            url,
            policy,
        }
    }
}

impl OrderNotifier for WebhookNotifier {
    fn notify(&self, notification: CheckoutNotification) {
        let Some(url) = self.url.clone() else {
            debug!(order_id = %notification.order_id, "No checkout webhook configured, skipping");
            return;
        };

        let client = self.client.clone();
        let policy = self.policy.clone();
        tokio::spawn(async move {
            deliver(&client, &url, &policy, &notification).await;
        });
    }
}

/// Posts `notification`, retrying up to the policy's attempt budget, then drops it.
pub async fn deliver(
    client: &Client,
    url: &str,
    policy: &WebhookPolicy,
    notification: &CheckoutNotification,
) -> bool {
    let order_id = notification.order_id;
    for attempt in 1..=policy.max_attempts {
        let result = client
            .post(url)
            .json(notification)
            .send()
            .await
            .and_then(|res| res.error_for_status());

        match result {
            Ok(_) => {
                info!(%order_id, attempt, "Checkout webhook delivered");
                return true;
            }
            Err(err) => {
                warn!(%order_id, attempt, error = %err, "Checkout webhook attempt failed");
                if attempt < policy.max_attempts {
                    tokio::time::sleep(policy.retry_backoff * attempt).await;
                }
            }
        }
    }

    error!(
        %order_id,
        attempts = policy.max_attempts,
        "Dropping checkout webhook notification"
    );
    false
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicU32, Ordering},
        },
        time::Duration,
    };

    use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
    use serde_json::Value;
    use testresult::TestResult;
    use tokio::sync::Mutex;

    use super::*;

    #[derive(Clone, Default)]
    struct Hook {
        calls: Arc<AtomicU32>,
        failures_left: Arc<AtomicU32>,
        received: Arc<Mutex<Vec<Value>>>,
    }

    async fn receive(State(hook): State<Hook>, Json(body): Json<Value>) -> StatusCode {
        hook.calls.fetch_add(1, Ordering::SeqCst);
        if hook
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return StatusCode::BAD_GATEWAY;
        }
        hook.received.lock().await.push(body);
        StatusCode::OK
    }

    async fn spawn_hook(hook: Hook) -> TestResult<String> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = Router::new().route("/hook", post(receive)).with_state(hook);
        tokio::spawn(async move { axum::serve(listener, app).await });
        Ok(format!("http://{addr}/hook"))
    }

    fn notification() -> CheckoutNotification {
        CheckoutNotification {
            order_id: Uuid::new_v4(),
            customer: NotificationCustomer {
                name: "Maria Silva".into(),
                email: "maria@example.com".into(),
                phone: "11987654321".into(),
                address: "Rua Augusta, 100".into(),
                city: "São Paulo".into(),
                state: "SP".into(),
                zip_code: "01305-000".into(),
            },
            items: vec![NotificationItem {
                id: "1".into(),
                name: "Anel Solitário".into(),
                price: Decimal::from(4890),
                quantity: 1,
                size: Some("14".into()),
            }],
            total: Decimal::from(4890),
            created_at: Utc::now(),
        }
    }

    fn fast_policy(max_attempts: u32) -> WebhookPolicy {
        WebhookPolicy {
            max_attempts,
            retry_backoff: Duration::from_millis(5),
        }
    }

    #[test]
    fn payload_matches_automation_contract() -> TestResult {
        let value = serde_json::to_value(notification())?;

        for key in ["order_id", "customer", "items", "total", "created_at"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["customer"]["zip_code"], "01305-000");
        assert_eq!(value["items"][0]["size"], "14");
        assert_eq!(value["total"], 4890.0);
        Ok(())
    }

    #[tokio::test]
    async fn retries_until_delivered() -> TestResult {
        let hook = Hook::default();
        hook.failures_left.store(2, Ordering::SeqCst);
        let url = spawn_hook(hook.clone()).await?;

        let delivered = deliver(&Client::new(), &url, &fast_policy(3), &notification()).await;

        assert!(delivered);
        assert_eq!(hook.calls.load(Ordering::SeqCst), 3);
        assert_eq!(hook.received.lock().await.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn gives_up_after_attempt_budget() -> TestResult {
        let hook = Hook::default();
        hook.failures_left.store(10, Ordering::SeqCst);
        let url = spawn_hook(hook.clone()).await?;

        let delivered = deliver(&Client::new(), &url, &fast_policy(2), &notification()).await;

        assert!(!delivered);
        assert_eq!(hook.calls.load(Ordering::SeqCst), 2);
        Ok(())
    }

    #[tokio::test]
    async fn notify_returns_before_delivery() -> TestResult {
        let hook = Hook::default();
        let url = spawn_hook(hook.clone()).await?;
        let notifier = WebhookNotifier::new(Client::new(), Some(url), fast_policy(1));

        notifier.notify(notification());

        for _ in 0..100 {
            if !hook.received.lock().await.is_empty() {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("webhook never received the notification");
    }

    #[tokio::test]
    async fn unconfigured_notifier_is_a_no_op() {
        let notifier = WebhookNotifier::new(Client::new(), None, fast_policy(1));
        notifier.notify(notification());
    }
}
