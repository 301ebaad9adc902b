use serde::Deserialize;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::user::mask_phone;
use crate::models::{Payment, Property, User};
use crate::utils::validators::validate_phone;

/// Delivers rent reminders by SMS. With SMS disabled the reminder is only logged.
pub struct SmsService {
    config: Config,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GatewayResponse {
    code: i32,
    message: String,
}

pub fn reminder_text(tenant: &User, property: Option<&Property>, payment: &Payment) -> String {
    match property {
        Some(property) => format!(
            "Dear {}, rent of Rs {} for {} ({}) is due. Please pay at the earliest.",
            tenant.name, payment.amount, payment.month, property.name
        ),
        None => format!(
            "Dear {}, rent of Rs {} for {} is due. Please pay at the earliest.",
            tenant.name, payment.amount, payment.month
        ),
    }
}

impl SmsService {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub async fn send_rent_reminder(
        &self,
        tenant: &User,
        property: Option<&Property>,
        payment: &Payment,
    ) -> AppResult<()> {
        if !self.config.sms_enabled {
            tracing::info!(
                "SMS disabled. Rent reminder for {} ({})",
                mask_phone(&tenant.phone),
                payment.month
            );
            return Ok(());
        }

        if !validate_phone(&tenant.phone) {
            return Err(AppError::Sms(format!(
                "Cannot text {}: not a 10-digit number",
                mask_phone(&tenant.phone)
            )));
        }

        let text = reminder_text(tenant, property, payment);
        self.send_sms(&tenant.phone, &text).await
    }

    async fn send_sms(&self, phone: &str, text: &str) -> AppResult<()> {
        if self.config.sms_api_url.is_empty() {
            return Err(AppError::Sms("SMS_API_URL is not configured".to_string()));
        }

        let params = [
            ("apiKey", self.config.sms_api_key.as_str()),
            ("recipient", phone),
            ("text", text),
            ("from", self.config.sms_sender.as_str()),
        ];

        let response = self
            .client
            .post(&self.config.sms_api_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::Sms(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Sms(e.to_string()))?;

        if !status.is_success() {
            tracing::error!("SMS API error: {} - {}", status, body);
            return Err(AppError::Sms(format!("SMS API error: {}", status)));
        }

        // Gateways that answer with a JSON status code report failures in the body.
        if let Ok(result) = serde_json::from_str::<GatewayResponse>(&body) {
            if result.code != 0 {
                tracing::error!("SMS send failed: {}", result.message);
                return Err(AppError::Sms(result.message));
            }
        }

        tracing::info!("SMS sent to {}", mask_phone(phone));
        Ok(())
    }
}
