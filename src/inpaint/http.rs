// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! Blocking HTTP implementation of [`Inpainter`].

use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::time::Duration;

use super::{InpaintError, InpaintRequest, InpaintResponse, Inpainter};

/// Talks to `POST {base_url}/inpaint`.
#[derive(Debug, Clone)]
pub struct HttpInpainter {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpInpainter {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, InpaintError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InpaintError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint_url(base_url),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Inpainter for HttpInpainter {
    fn inpaint(&self, request: &InpaintRequest) -> Result<String, InpaintError> {
        tracing::info!("Sending inpaint request to {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .map_err(classify_transport)?;

        let status = response.status();
        let body = response.text().map_err(classify_transport)?;
        tracing::debug!("Inpaint response: {} ({} bytes)", status, body.len());

        interpret_response(status, &body)
    }
}

/// `{base}/inpaint`, tolerating a trailing slash on `base`.
fn endpoint_url(base_url: &str) -> String {
    format!("{}/inpaint", base_url.trim_end_matches('/'))
}

fn classify_transport(err: reqwest::Error) -> InpaintError {
    if err.is_timeout() {
        tracing::warn!("Inpaint request timed out");
        InpaintError::Timeout
    } else {
        tracing::error!("Inpaint transport error: {}", err);
        InpaintError::Transport(err.to_string())
    }
}

/// Turn a status and raw body into a data URL or a classified error.
fn interpret_response(status: StatusCode, body: &str) -> Result<String, InpaintError> {
    let parsed = serde_json::from_str::<InpaintResponse>(body);

    if status == StatusCode::TOO_MANY_REQUESTS {
        let message = match parsed {
            Ok(InpaintResponse::Failed { error }) | Ok(InpaintResponse::Detail { detail: error }) => error,
            _ => body.to_string(),
        };
        return Err(InpaintError::RateLimited(message));
    }

    match parsed {
        Ok(response) if status.is_success() => response.into_data_url(),
        Ok(InpaintResponse::Failed { error }) | Ok(InpaintResponse::Detail { detail: error }) => {
            Err(InpaintError::from_service_message(error))
        }
        Ok(_) => Err(InpaintError::Service(format!("HTTP {status}"))),
        Err(_) if !status.is_success() => Err(InpaintError::from_service_message(format!(
            "HTTP {status}: {}",
            body.trim()
        ))),
        Err(e) => Err(InpaintError::InvalidResponse(e.to_string())),
    }
}
