//! REST backend client.
//!
//! `GET /pixels` and `GET /leaderboard` hydrate the board; `POST /users` and
//! `POST /users/stats` report wallet activity. Pixels with malformed fields are
//! dropped with a warning instead of failing the whole snapshot.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use canvas::doc::{GridPos, Pixel};
use frames::{RecordPaint, RegisterUser, UserStats, WirePixel};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::wallet::Address;

/// Operations the client needs from the backend.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Every painted pixel.
    async fn fetch_pixels(&self) -> Result<Vec<WirePixel>, AppError>;

    async fn fetch_leaderboard(&self) -> Result<Vec<UserStats>, AppError>;

    /// Stats for one wallet, or `None` if the backend does not know it.
    async fn fetch_user(&self, address: &Address) -> Result<Option<UserStats>, AppError>;

    /// Register (or touch) a wallet.
    async fn register_user(&self, address: &Address) -> Result<(), AppError>;

    /// Credit a confirmed paint to a wallet.
    async fn record_paint(&self, record: &RecordPaint) -> Result<(), AppError>;
}

/// [`Backend`] over HTTP with `reqwest`.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Returns [`AppError::Backend`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let response = self.client.get(self.url(path)).send().await?;
        let response = check_status(response, path)?;
        Ok(response.json().await?)
    }

    async fn post_json<B: serde::Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), AppError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        check_status(response, path)?;
        Ok(())
    }
}

fn check_status(response: reqwest::Response, path: &str) -> Result<reqwest::Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(AppError::BackendStatus { status: status.as_u16(), path: path.to_owned() })
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn fetch_pixels(&self) -> Result<Vec<WirePixel>, AppError> {
        let pixels: Vec<WirePixel> = self.get_json("/pixels").await?;
        debug!(count = pixels.len(), "fetched pixel snapshot");
        Ok(retain_valid(pixels))
    }

    async fn fetch_leaderboard(&self) -> Result<Vec<UserStats>, AppError> {
        self.get_json("/leaderboard").await
    }

    async fn fetch_user(&self, address: &Address) -> Result<Option<UserStats>, AppError> {
        let path = format!("/user/{address}");
        match self.get_json(&path).await {
            Ok(stats) => Ok(Some(stats)),
            Err(AppError::BackendStatus { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn register_user(&self, address: &Address) -> Result<(), AppError> {
        self.post_json("/users", &RegisterUser { wallet_address: address.to_string() }).await
    }

    async fn record_paint(&self, record: &RecordPaint) -> Result<(), AppError> {
        self.post_json("/users/stats", record).await
    }
}

/// Drop pixels that fail validation, logging each one.
#[must_use]
pub fn retain_valid(pixels: Vec<WirePixel>) -> Vec<WirePixel> {
    pixels
        .into_iter()
        .filter(|pixel| match frames::validate_pixel(pixel) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "dropping malformed pixel");
                false
            }
        })
        .collect()
}

/// Convert a wire pixel into the canvas store's representation.
#[must_use]
pub fn into_pixel(wire: WirePixel) -> Pixel {
    Pixel { id: wire.id, position: GridPos::new(wire.position.x, wire.position.y), color: wire.color }
}
