// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

use crate::config::settings::StoreSettings;
use crate::logging::error_report;
use crate::woocommerce::models::{OrderEntry, OrderQuery, ProductBatch, RemoteOrder};
use crate::woocommerce::traits::RemoteStore;

/// Response header carrying the number of result pages.
pub const TOTAL_PAGES_HEADER: &str = "X-WP-TotalPages";

const API_PATH: &str = "wp-json/wc/v3/";

#[derive(Debug, thiserror::Error)]
pub enum WooCommerceError {
    #[error("HTTP {status}: {body}")]
    RemoteHttp { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },

    #[error("invalid store URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("storefront URL is not configured")]
    NotConfigured,
}

impl WooCommerceError {
    /// Raw response body of a non-2xx reply.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            WooCommerceError::RemoteHttp { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// HTTP verbs of the storefront REST surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl ApiMethod {
    fn as_method(self) -> Method {
        match self {
            ApiMethod::Get => Method::GET,
            ApiMethod::Post => Method::POST,
            ApiMethod::Put => Method::PUT,
            ApiMethod::Delete => Method::DELETE,
        }
    }
}

/// Storefront REST API base, e.g. `https://shop.example.com/wp-json/wc/v3/`.
pub fn api_base_url(store_url: &str) -> Result<Url, url::ParseError> {
    let base = Url::parse(&format!("{}/", store_url.trim().trim_end_matches('/')))?;
    base.join(API_PATH)
}

#[derive(Debug, Clone)]
pub struct WooCommerceClient {
    client: Client,
    api_base: Option<Url>,
    consumer_key: String,
    consumer_secret: String,
}

impl WooCommerceClient {
    pub fn new(settings: &StoreSettings, timeout: Duration) -> Result<Self, WooCommerceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("woo-sync-daemon/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(!settings.verify_ssl)
            .build()?;

        let api_base = if settings.store_url.trim().is_empty() {
            None
        } else {
            Some(api_base_url(&settings.store_url)?)
        };

        Ok(Self {
            client,
            api_base,
            consumer_key: settings.consumer_key.clone(),
            consumer_secret: settings.consumer_secret.clone(),
        })
    }

    /// Issue one authenticated call. Non-2xx replies are logged and returned as errors.
    pub async fn request(
        &self,
        method: ApiMethod,
        endpoint: &str,
        body: Option<&Value>,
        params: &[(String, String)],
    ) -> Result<Response, WooCommerceError> {
        let base = self.api_base.as_ref().ok_or(WooCommerceError::NotConfigured)?;
        let url = base.join(endpoint)?;

        let mut request = self
            .client
            .request(method.as_method(), url)
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret));

        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(
                status = %status,
                method = ?method,
                endpoint = %endpoint,
                report = %error_report(Some(&text)),
                "WooCommerce request failed"
            );
            return Err(WooCommerceError::RemoteHttp { status, body: text });
        }

        Ok(response)
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: ApiMethod,
        endpoint: &str,
        body: Option<&Value>,
        params: &[(String, String)],
    ) -> Result<T, WooCommerceError> {
        let response = self.request(method, endpoint, body, params).await?;
        decode(response, endpoint).await
    }

    async fn fetch_order_page(
        &self,
        params: &[(String, String)],
        page: u32,
    ) -> Result<(Vec<OrderEntry>, u32), WooCommerceError> {
        let mut params = params.to_vec();
        if page > 1 {
            params.push(("page".to_string(), page.to_string()));
        }

        let response = self.request(ApiMethod::Get, "orders", None, &params).await?;
        let total_pages = response
            .headers()
            .get(TOTAL_PAGES_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(1);

        let raw: Vec<Value> = decode(response, "orders").await?;
        let orders: Vec<OrderEntry> = raw.into_iter().map(OrderEntry::from_value).collect();
        debug!(page, total_pages, count = orders.len(), "Fetched order page");

        Ok((orders, total_pages))
    }
}

async fn decode<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T, WooCommerceError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|source| WooCommerceError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

/// Paging state of one `get_orders` call.
struct OrderPager {
    params: Vec<(String, String)>,
    next_page: u32,
    total_pages: Option<u32>,
    buffered: VecDeque<OrderEntry>,
}

#[async_trait]
impl RemoteStore for WooCommerceClient {
    async fn get_products(&self, params: &[(String, String)]) -> Result<Vec<Value>, WooCommerceError> {
        self.request_json(ApiMethod::Get, "products", None, params).await
    }

    async fn get_product(&self, id: u64) -> Result<Value, WooCommerceError> {
        self.request_json(ApiMethod::Get, &format!("products/{id}"), None, &[]).await
    }

    async fn create_product(&self, product: &Value) -> Result<Value, WooCommerceError> {
        self.request_json(ApiMethod::Post, "products", Some(product), &[]).await
    }

    async fn update_product(&self, id: u64, product: &Value) -> Result<Value, WooCommerceError> {
        self.request_json(ApiMethod::Put, &format!("products/{id}"), Some(product), &[]).await
    }

    async fn batch_update_products(&self, batch: &ProductBatch) -> Result<Value, WooCommerceError> {
        info!(count = batch.len(), "Submitting product batch update");
        let body = serde_json::to_value(batch).map_err(|source| WooCommerceError::Decode {
            endpoint: "products/batch".to_string(),
            source,
        })?;
        self.request_json(ApiMethod::Post, "products/batch", Some(&body), &[]).await
    }

    async fn delete_product(&self, id: u64, force: bool) -> Result<Value, WooCommerceError> {
        let params = if force {
            vec![("force".to_string(), "true".to_string())]
        } else {
            Vec::new()
        };
        self.request_json(ApiMethod::Delete, &format!("products/{id}"), None, &params).await
    }

    fn get_orders(&self, query: OrderQuery) -> BoxStream<'_, Result<OrderEntry, WooCommerceError>> {
        let pager = OrderPager {
            params: query.to_params(),
            next_page: 1,
            total_pages: None,
            buffered: VecDeque::new(),
        };

        stream::try_unfold(pager, move |mut pager| async move {
            loop {
                if let Some(order) = pager.buffered.pop_front() {
                    return Ok::<_, WooCommerceError>(Some((order, pager)));
                }
                if pager.total_pages.is_some_and(|total| pager.next_page > total) {
                    return Ok::<_, WooCommerceError>(None);
                }

                let (orders, total_pages) = self.fetch_order_page(&pager.params, pager.next_page).await?;
                pager.total_pages.get_or_insert(total_pages);
                pager.next_page += 1;
                pager.buffered.extend(orders);
            }
        })
        .boxed()
    }

    async fn get_order(&self, id: u64) -> Result<RemoteOrder, WooCommerceError> {
        self.request_json(ApiMethod::Get, &format!("orders/{id}"), None, &[]).await
    }
}
