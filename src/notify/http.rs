//! HTTP notifier.
//!
//! Publishes messages by POSTing JSON to a configured pub/sub endpoint,
//! authenticated by the configured key set. One request per publish, with
//! a per-request timeout; delivery guarantees belong to the service.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::schema::NotifierConfig;
use crate::notify::{Notifier, NotifyError};

pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: String,
    publish_key: String,
    subscribe_key: String,
    secret_key: String,
}

impl HttpNotifier {
    pub fn new(config: &NotifierConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| NotifyError::Backend(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            publish_key: config.publish_key.clone(),
            subscribe_key: config.subscribe_key.clone(),
            secret_key: config.secret_key.clone(),
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn publish(&self, topic: &str, message: Value) -> Result<(), NotifyError> {
        let url = format!("{}/publish/{}/{}", self.endpoint, self.publish_key, topic);
        let response = self
            .client
            .post(&url)
            .header("x-subscribe-key", &self.subscribe_key)
            .header("x-secret-key", &self.secret_key)
            .json(&message)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    NotifyError::Timeout
                } else {
                    NotifyError::Backend(err.to_string())
                }
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(NotifyError::Backend(format!(
                "publish returned {}",
                response.status()
            )))
        }
    }
}
