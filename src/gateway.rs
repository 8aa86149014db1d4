//! Order and payment gateway.
//!
//! Explicit request/response schemas for the two store API calls a
//! checkout makes, and the client that issues them. Semantic validation
//! of the responses (order id present, status ok) belongs to
//! [`crate::checkout`]; this layer only deals with transport and shape.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{cart::CartLine, config::StoreConfig};

/// How the citizen intends to pay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card payment through the portal's gateway.
    #[default]
    Card,

    /// Direct bank transfer.
    BankTransfer,

    /// Cash on delivery, where the product offers it.
    CashOnDelivery,
}

/// One cart line as submitted to the order service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Product identifier.
    pub id: String,

    /// Product name at add time.
    pub name: String,

    /// Unit price at add time, in whole currency units.
    pub price: u64,

    /// Number of units ordered.
    pub quantity: u32,
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.product_id.clone(),
            name: line.name.clone(),
            price: line.unit_price,
            quantity: line.quantity,
        }
    }
}

/// Order-creation request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    /// Profile reference of the purchasing user.
    pub user_id: String,

    /// Snapshot of the cart lines being ordered.
    pub items: Vec<OrderLine>,

    /// Sum of price times quantity over `items`.
    pub total_amount: u64,

    /// Chosen payment method.
    pub payment_method: PaymentMethod,
}

/// Order-creation response body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderResponse {
    /// `"ok"` on success.
    pub status: String,

    /// Identifier assigned to the order by the remote service.
    #[serde(default)]
    pub order_id: Option<String>,

    /// Human-readable failure reason, when present.
    #[serde(default)]
    pub error: Option<String>,
}

impl OrderResponse {
    /// Whether the order service accepted the request.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Payment submission request body.
///
/// The amount and items are pinned from order-creation time rather than
/// recomputed from the live cart, so the two calls can never diverge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRequest {
    /// Identifier returned by order creation.
    pub order_id: String,

    /// Profile reference of the purchasing user.
    pub user_id: String,

    /// The amount recorded at order-creation time.
    pub amount: u64,

    /// Chosen payment method.
    pub method: PaymentMethod,

    /// The lines recorded at order-creation time.
    pub items: Vec<OrderLine>,
}

/// Payment submission response body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentResponse {
    /// `"ok"` on success.
    pub status: String,

    /// Human-readable failure reason, when present.
    #[serde(default)]
    pub error: Option<String>,
}

impl PaymentResponse {
    /// Whether the payment was accepted.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Errors that can occur while communicating with the order service.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// An HTTP transport, timeout or deserialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The order service returned a non-2xx response.
    #[error("unexpected response from order service: {0}")]
    UnexpectedResponse(String),
}

/// The two remote calls a checkout makes, in order.
#[automock]
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Submit an order-creation request.
    async fn create_order(&self, request: OrderRequest) -> Result<OrderResponse, GatewayError>;

    /// Submit a payment for a created order.
    async fn submit_payment(&self, request: PaymentRequest)
    -> Result<PaymentResponse, GatewayError>;
}

/// HTTP client for the store order and payment endpoints.
#[derive(Debug, Clone)]
pub struct HttpOrderGateway {
    config: StoreConfig,
    http: Client,
}

impl HttpOrderGateway {
    /// Create a new gateway from the given configuration.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    async fn post<Req, Resp>(&self, path: &str, request: &Req) -> Result<Resp, GatewayError>
    where
        Req: Serialize + Sync,
        Resp: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{path}", self.config.api_base);

        let response = self
            .http
            .post(&url)
            .timeout(self.config.request_timeout)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(GatewayError::UnexpectedResponse(format!(
                "{path} request failed with status {status}: {text}"
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl OrderGateway for HttpOrderGateway {
    async fn create_order(&self, request: OrderRequest) -> Result<OrderResponse, GatewayError> {
        self.post("/api/store/order", &request).await
    }

    async fn submit_payment(
        &self,
        request: PaymentRequest,
    ) -> Result<PaymentResponse, GatewayError> {
        self.post("/api/store/payment", &request).await
    }
}
