//! Alert delivery for asset lifecycle events.
//!
//! An enabled notifier fans each alert out to an IM webhook and an SMS
//! provider. Delivery runs in a spawned task; failures are logged and never
//! reach the HTTP client.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use itam_core::{Asset, Contract, SystemInterface};
use serde_json::{json, Value};

use crate::config::{NotifyConfig, SmsProvider};

/// Timeout for a single webhook delivery.
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// One alert: a short title and a human-readable body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub content: String,
}

impl Alert {
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self { title: title.into(), content: content.into() }
    }
}

/// Errors raised while delivering an alert.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum NotifyError {
    /// The webhook request could not be sent or built.
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The webhook answered with something other than 200.
    #[error("webhook returned status {0}")]
    Status(u16),

    /// Some channels of a fan-out failed.
    #[error("{failed} of {attempted} alert channels failed")]
    Partial { failed: usize, attempted: usize },
}

/// A destination for alerts.
///
/// Implementations must be `Send + Sync` to be shared by all handlers.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one alert.
    ///
    /// # Errors
    /// Returns [`NotifyError`] if the channel rejected or never received it.
    async fn send(&self, alert: &Alert) -> Result<(), NotifyError>;
}

/// Drops every alert. Used when notifications are switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        tracing::debug!(title = %alert.title, "notifications disabled, skipping alert");
        Ok(())
    }
}

/// Posts alerts to a Feishu custom-bot webhook.
#[derive(Debug, Clone)]
pub struct FeishuNotifier {
    client: reqwest::Client,
    webhook: String,
}

impl FeishuNotifier {
    /// # Errors
    /// Returns [`NotifyError::Http`] if the HTTP client cannot be built.
    pub fn new(webhook: impl Into<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;
        Ok(Self { client, webhook: webhook.into() })
    }
}

/// The Feishu text message body for `alert`.
#[must_use]
pub fn feishu_payload(alert: &Alert) -> Value {
    json!({
        "msg_type": "text",
        "content": {
            "text": format!("【ITAM Alert】{}\n{}", alert.title, alert.content),
        },
    })
}

#[async_trait]
impl Notifier for FeishuNotifier {
    async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        let response = self.client.post(&self.webhook).json(&feishu_payload(alert)).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(NotifyError::Status(status.as_u16()));
        }
        Ok(())
    }
}

/// SMS channel. Provider SDKs are not wired in; messages are logged.
#[derive(Debug, Clone)]
pub struct SmsNotifier {
    provider: SmsProvider,
    template_code: String,
}

impl SmsNotifier {
    #[must_use]
    pub fn new(provider: SmsProvider, template_code: impl Into<String>) -> Self {
        Self { provider, template_code: template_code.into() }
    }
}

#[async_trait]
impl Notifier for SmsNotifier {
    async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        match self.provider {
            SmsProvider::Aliyun => {
                tracing::info!(
                    provider = "aliyun",
                    template = %self.template_code,
                    content = %alert.content,
                    "mock sms sent to admin"
                );
            }
            SmsProvider::Tencent => {
                tracing::info!(provider = "tencent", content = %alert.content, "mock sms sent");
            }
        }
        Ok(())
    }
}

/// Sends each alert to every channel, continuing past failures.
#[derive(Clone, Default)]
pub struct FanOut {
    channels: Vec<Arc<dyn Notifier>>,
}

impl FanOut {
    #[must_use]
    pub fn new(channels: Vec<Arc<dyn Notifier>>) -> Self {
        Self { channels }
    }
}

#[async_trait]
impl Notifier for FanOut {
    async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        let mut failed = 0;
        for channel in &self.channels {
            if let Err(e) = channel.send(alert).await {
                tracing::warn!(title = %alert.title, error = %e, "alert channel failed");
                failed += 1;
            }
        }
        if failed > 0 {
            return Err(NotifyError::Partial { failed, attempted: self.channels.len() });
        }
        Ok(())
    }
}

/// Build the notifier described by `config`.
///
/// A disabled config yields [`DisabledNotifier`]. Otherwise every configured
/// channel joins a [`FanOut`]; a webhook whose client cannot be built is
/// logged and left out.
#[must_use]
pub fn from_config(config: &NotifyConfig) -> Arc<dyn Notifier> {
    if !config.enable {
        return Arc::new(DisabledNotifier);
    }
    let mut channels: Vec<Arc<dyn Notifier>> = Vec::new();
    if let Some(webhook) = &config.feishu_webhook {
        match FeishuNotifier::new(webhook.clone()) {
            Ok(feishu) => channels.push(Arc::new(feishu)),
            Err(e) => tracing::error!(error = %e, "feishu channel unavailable"),
        }
    }
    if let Some(provider) = config.sms_provider {
        channels.push(Arc::new(SmsNotifier::new(provider, config.sms_template_code.clone())));
    }
    Arc::new(FanOut::new(channels))
}

/// Deliver `alert` in the background. The caller never waits on or sees the
/// outcome.
pub fn dispatch(notifier: &Arc<dyn Notifier>, alert: Alert) {
    let notifier = Arc::clone(notifier);
    tokio::spawn(async move {
        if let Err(e) = notifier.send(&alert).await {
            tracing::warn!(title = %alert.title, error = %e, "alert delivery failed");
        }
    });
}

/// Alerts a record kind raises on creation and deletion. Kinds without
/// alerts keep the default `None`.
pub trait Announce {
    fn created_alert(&self) -> Option<Alert> {
        None
    }

    fn deleted_alert(&self) -> Option<Alert> {
        None
    }
}

impl Announce for Asset {
    fn created_alert(&self) -> Option<Alert> {
        Some(Alert::new(
            "New Asset Created",
            format!("Asset {} ({}) has been added by {}.", self.name, self.ip, self.owner),
        ))
    }

    fn deleted_alert(&self) -> Option<Alert> {
        Some(Alert::new(
            "Asset Deleted",
            format!("Asset {} ({}) has been removed.", self.name, self.ip),
        ))
    }
}

impl Announce for Contract {}

impl Announce for SystemInterface {}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use itam_core::{NewAsset, RecordId, Resource};

    use super::*;

    type Captured = Arc<Mutex<Vec<Value>>>;

    /// Serve a webhook on an ephemeral port that records bodies and answers
    /// with `status`.
    async fn webhook(status: StatusCode) -> (String, Captured) {
        let captured: Captured = Arc::default();
        let app = Router::new()
            .route(
                "/hook",
                post(move |State(seen): State<Captured>, Json(body): Json<Value>| async move {
                    if let Ok(mut seen) = seen.lock() {
                        seen.push(body);
                    }
                    status
                }),
            )
            .with_state(Arc::clone(&captured));
        let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
            Ok(l) => l,
            Err(e) => panic!("failed to bind webhook: {e}"),
        };
        let addr = match listener.local_addr() {
            Ok(a) => a,
            Err(e) => panic!("no local addr: {e}"),
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (format!("http://{addr}/hook"), captured)
    }

    fn feishu(url: String) -> FeishuNotifier {
        match FeishuNotifier::new(url) {
            Ok(n) => n,
            Err(e) => panic!("client build failed: {e}"),
        }
    }

    struct Failing;

    #[async_trait]
    impl Notifier for Failing {
        async fn send(&self, _alert: &Alert) -> Result<(), NotifyError> {
            Err(NotifyError::Status(500))
        }
    }

    #[test]
    fn feishu_payload_is_a_prefixed_text_message() {
        let alert = Alert::new("Asset Deleted", "Asset db (10.0.0.1) has been removed.");
        let payload = feishu_payload(&alert);
        assert_eq!(
            payload,
            json!({
                "msg_type": "text",
                "content": {"text": "【ITAM Alert】Asset Deleted\nAsset db (10.0.0.1) has been removed."},
            })
        );
    }

    #[tokio::test]
    async fn feishu_posts_payload_to_webhook() {
        let (url, captured) = webhook(StatusCode::OK).await;
        let alert = Alert::new("New Asset Created", "Asset X (1.2.3.4) has been added by ops.");
        if let Err(e) = feishu(url).send(&alert).await {
            panic!("delivery failed: {e}");
        }
        let seen = captured.lock().map(|s| s.clone()).unwrap_or_default();
        assert_eq!(seen, vec![feishu_payload(&alert)]);
    }

    #[tokio::test]
    async fn feishu_non_ok_status_is_an_error() {
        let (url, _) = webhook(StatusCode::BAD_GATEWAY).await;
        match feishu(url).send(&Alert::new("t", "c")).await {
            Err(NotifyError::Status(502)) => {}
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fan_out_reaches_every_channel_and_counts_failures() {
        let (url, captured) = webhook(StatusCode::OK).await;
        let fan_out = FanOut::new(vec![
            Arc::new(Failing),
            Arc::new(feishu(url)),
            Arc::new(SmsNotifier::new(SmsProvider::Tencent, "")),
        ]);
        match fan_out.send(&Alert::new("t", "c")).await {
            Err(NotifyError::Partial { failed: 1, attempted: 3 }) => {}
            other => panic!("expected one failure of three, got {other:?}"),
        }
        assert_eq!(captured.lock().map(|s| s.len()).unwrap_or_default(), 1);
    }

    #[tokio::test]
    async fn disabled_config_builds_a_silent_notifier() {
        let notifier = from_config(&NotifyConfig {
            enable: false,
            feishu_webhook: Some("http://127.0.0.1:1/unreachable".to_owned()),
            ..NotifyConfig::default()
        });
        assert!(notifier.send(&Alert::new("t", "c")).await.is_ok());
    }

    #[test]
    fn only_assets_announce_lifecycle_events() {
        let asset = Asset::from_draft(
            RecordId(1),
            NewAsset {
                name: "Prod-DB-01".to_owned(),
                ip: "10.0.1.5".to_owned(),
                owner: "DBA Team".to_owned(),
                ..NewAsset::default()
            },
            chrono::Utc::now(),
        );
        assert_eq!(
            asset.created_alert(),
            Some(Alert::new(
                "New Asset Created",
                "Asset Prod-DB-01 (10.0.1.5) has been added by DBA Team."
            ))
        );
        assert_eq!(
            asset.deleted_alert().map(|a| a.content),
            Some("Asset Prod-DB-01 (10.0.1.5) has been removed.".to_owned())
        );

        let contract = Contract::from_draft(RecordId(1), Default::default(), chrono::Utc::now());
        assert_eq!(contract.created_alert(), None);
        assert_eq!(contract.deleted_alert(), None);
    }
}
