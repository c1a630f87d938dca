use crate::domain::ports::{PaymentAuthorization, PaymentGateway, PaymentRequest};
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};

/// Card payments through the Stripe REST API, one manually-confirmed PaymentIntent per booking.
pub struct StripeGateway {
    client: Client,
    api_base: String,
    secret_key: String,
    return_url: String,
}

impl StripeGateway {
    pub fn new(client: Client, api_base: String, secret_key: String, return_url: String) -> Self {
        Self { client, api_base: api_base.trim_end_matches('/').to_string(), secret_key, return_url }
    }

    async fn post_form(&self, path: &str, params: &[(&str, String)]) -> Result<reqwest::Response, AppError> {
        self.client
            .post(format!("{}{}", self.api_base, path))
            .bearer_auth(&self.secret_key)
            .form(params)
            .send()
            .await
            .map_err(|e| AppError::Payment(format!("Stripe connection error: {}", e)))
    }
}

#[derive(Deserialize)]
struct PaymentIntentResponse {
    id: String,
    status: String,
}

#[derive(Deserialize)]
struct StripeErrorEnvelope {
    error: StripeError,
}

#[derive(Deserialize)]
struct StripeError {
    message: Option<String>,
    code: Option<String>,
}

async fn describe_failure(res: reqwest::Response) -> String {
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    match serde_json::from_str::<StripeErrorEnvelope>(&body) {
        Ok(envelope) => format!(
            "Stripe returned {} ({}): {}",
            status,
            envelope.error.code.unwrap_or_default(),
            envelope.error.message.unwrap_or_default()
        ),
        Err(_) => format!("Stripe returned {}: {}", status, body),
    }
}

/// Statuses after a confirm attempt where the funds are actually secured. Anything else,
/// including `requires_action` for an unfinished 3-D Secure challenge, collected nothing.
fn is_authorized(status: &str) -> bool {
    matches!(status, "succeeded" | "requires_capture" | "processing")
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn authorize(&self, request: &PaymentRequest) -> Result<PaymentAuthorization, AppError> {
        let params = [
            ("amount", request.amount_minor.to_string()),
            ("currency", request.currency.clone()),
            ("payment_method", request.payment_method_id.clone()),
            ("confirmation_method", "manual".to_string()),
            ("confirm", "true".to_string()),
            ("return_url", self.return_url.clone()),
            ("description", request.description.clone()),
        ];

        let res = self.post_form("/v1/payment_intents", &params).await?;
        if !res.status().is_success() {
            let msg = describe_failure(res).await;
            error!("Payment intent creation failed: {}", msg);
            return Err(AppError::Payment(msg));
        }

        let intent: PaymentIntentResponse = res.json().await
            .map_err(|e| AppError::Payment(format!("Unreadable Stripe response: {}", e)))?;

        if !is_authorized(&intent.status) {
            return Err(AppError::Payment(format!("Payment intent {} ended in status {}", intent.id, intent.status)));
        }

        info!("Payment intent {} created with status {}", intent.id, intent.status);
        Ok(PaymentAuthorization { payment_intent_id: intent.id, status: intent.status })
    }

    async fn void(&self, payment_intent_id: &str) -> Result<(), AppError> {
        let params = [("payment_intent", payment_intent_id.to_string())];

        let res = self.post_form("/v1/refunds", &params).await?;
        if !res.status().is_success() {
            let msg = describe_failure(res).await;
            return Err(AppError::Payment(msg));
        }
        Ok(())
    }
}
