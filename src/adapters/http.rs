use crate::config::toml_config::RepositoryConfig;
use crate::core::{Lead, LeadRepository, LeadType, NewLead, Result};
use crate::utils::error::LeadError;
use crate::utils::validation::validate_required_field;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// 建立 lead 時，部分後端回傳物件，部分回傳只有一筆的陣列
#[derive(Deserialize)]
#[serde(untagged)]
enum CreatedLead {
    One(Lead),
    Many(Vec<Lead>),
}

/// 透過 REST 端點存取外部資料庫的 lead 表
pub struct HttpLeadRepository {
    client: Client,
    endpoint: String,
    headers: HashMap<String, String>,
    timeout: Duration,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl HttpLeadRepository {
    pub fn new(config: &RepositoryConfig) -> Result<Self> {
        let endpoint = validate_required_field("repository.endpoint", &config.endpoint)?;

        Ok(Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            headers: config.headers.clone().unwrap_or_default(),
            timeout: config.timeout(),
            retry_attempts: config.retry_attempts(),
            retry_delay: config.retry_delay(),
        })
    }

    fn leads_url(&self) -> String {
        format!("{}/leads", self.endpoint)
    }

    /// 5xx 與連線失敗以指數退避重試；4xx 直接失敗，訊息取自回應內容。
    ///
    /// 逾時時請求可能已送達伺服器，只有 `retry_on_timeout` 的冪等請求才重送。
    async fn send_with_retry<F>(&self, retry_on_timeout: bool, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        let mut attempt: u32 = 0;

        loop {
            let mut request = build().timeout(self.timeout);
            // 添加自定義標頭（API key 等）
            for (key, value) in &self.headers {
                request = request.header(key, value);
            }

            match request.send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) if response.status().is_server_error() && attempt < self.retry_attempts => {
                    tracing::warn!(
                        "🔁 Lead API returned {} (attempt {}/{}), retrying",
                        response.status(),
                        attempt + 1,
                        self.retry_attempts + 1
                    );
                }
                Ok(response) => return Err(error_from_response(response).await),
                Err(e) if is_retryable(&e, retry_on_timeout) && attempt < self.retry_attempts => {
                    tracing::warn!(
                        "🔁 Lead API request failed (attempt {}/{}): {}",
                        attempt + 1,
                        self.retry_attempts + 1,
                        e
                    );
                }
                Err(e) => return Err(e.into()),
            }

            let delay = self
                .retry_delay
                .saturating_mul(2u32.saturating_pow(attempt));
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

fn is_retryable(error: &reqwest::Error, retry_on_timeout: bool) -> bool {
    error.is_connect() || (retry_on_timeout && error.is_timeout())
}

async fn error_from_response(response: Response) -> LeadError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    LeadError::persistence(extract_error_message(&body).unwrap_or_else(|| format!("HTTP {}", status)))
}

/// 優先使用 JSON 錯誤內容中的 `message`，否則使用原始內容
fn extract_error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        });

    Some(message.unwrap_or_else(|| body.to_string()))
}

#[async_trait]
impl LeadRepository for HttpLeadRepository {
    async fn create(&self, lead: NewLead) -> Result<Lead> {
        let url = self.leads_url();
        tracing::debug!("POST {}", url);

        let response = self
            .send_with_retry(false, || self.client.post(&url).json(&lead))
            .await?;

        match response.json::<CreatedLead>().await? {
            CreatedLead::One(created) => Ok(created),
            CreatedLead::Many(created) => created
                .into_iter()
                .next()
                .ok_or_else(|| LeadError::persistence("lead API returned an empty list")),
        }
    }

    async fn list(&self, lead_type: Option<LeadType>) -> Result<Vec<Lead>> {
        let url = self.leads_url();
        tracing::debug!("GET {} (lead_type: {:?})", url, lead_type);

        let response = self
            .send_with_retry(true, || {
                let request = self.client.get(&url);
                match lead_type {
                    Some(t) => request.query(&[("lead_type", t.as_str())]),
                    None => request,
                }
            })
            .await?;

        Ok(response.json::<Vec<Lead>>().await?)
    }
}
