// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! REST client for the log review session endpoints
//!
//! The websocket carries the conversation; these calls inspect or cancel the
//! server-side session for a project.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result, ReviewError};
use crate::protocol::{join_segments, ProjectName};

/// Server-side view of a project's review session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub project_name: String,
    pub is_active: bool,
    pub is_complete: bool,
    pub message_count: usize,
}

/// Result of cancelling a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelResponse {
    pub success: bool,
    pub message: String,
}

/// Error body returned by the server
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Log review REST API client
pub struct ReviewApi {
    client: Client,
    base_url: Url,
}

impl ReviewApi {
    /// Create a client for the server at `base_url`
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("logreview/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn session_url(&self, project: &ProjectName) -> Result<Url> {
        join_segments(
            &self.base_url,
            &["api", "log-review", "sessions", project.as_str()],
        )
    }

    /// Fetch the status of the active session for `project`.
    pub async fn session_status(&self, project: &ProjectName) -> Result<SessionStatus> {
        let url = self.session_url(project)?;
        tracing::debug!(url = %url, "fetching session status");
        let response = self.client.get(url).send().await?;
        Self::decode(project, response).await
    }

    /// Cancel the active session for `project`.
    pub async fn cancel_session(&self, project: &ProjectName) -> Result<CancelResponse> {
        let url = self.session_url(project)?;
        tracing::debug!(url = %url, "cancelling session");
        let response = self.client.delete(url).send().await?;
        Self::decode(project, response).await
    }

    async fn decode<T: for<'de> Deserialize<'de>>(
        project: &ProjectName,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::SessionNotFound(project.to_string()).into());
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            ReviewError::Api(ApiError::InvalidResponse(format!(
                "unexpected response body: {}",
                e
            )))
        })
    }
}

fn parse_error(status: u16, body: &str) -> ReviewError {
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(error) => error.detail,
        Err(_) if body.trim().is_empty() => "no details".to_string(),
        Err(_) => body.trim().to_string(),
    };
    ReviewError::Api(ApiError::ServerError { status, message })
}
