// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use reqwest::Url;

use crate::error::{Result, ReviewError};

use super::Settings;

impl Settings {
    /// Get the server base URL.
    pub fn get_server_url(&self) -> String {
        // Priority: command line > env var > config file.
        if let Some(url) = &self.server.override_url {
            return url.clone();
        }
        std::env::var("LOGREVIEW_SERVER_URL")
            .ok()
            .unwrap_or_else(|| self.server.base_url.clone())
    }

    /// Parse the effective server base URL.
    pub fn server_url(&self) -> Result<Url> {
        let raw = self.get_server_url();
        let url = Url::parse(&raw)
            .map_err(|e| ReviewError::Config(format!("invalid server URL '{}': {}", raw, e)))?;
        match url.scheme() {
            "http" | "https" | "ws" | "wss" => Ok(url),
            other => Err(ReviewError::Config(format!(
                "unsupported server URL scheme '{}'",
                other
            ))),
        }
    }

    /// Reject settings the connection lifecycle cannot run with.
    pub fn validate(&self) -> Result<()> {
        let connection = &self.connection;

        if connection.keepalive_interval_secs == 0 {
            return Err(ReviewError::Config(
                "connection.keepalive_interval_secs must be greater than 0".to_string(),
            ));
        }
        if connection.base_delay_ms == 0 {
            return Err(ReviewError::Config(
                "connection.base_delay_ms must be greater than 0".to_string(),
            ));
        }
        if connection.max_delay_ms < connection.base_delay_ms {
            return Err(ReviewError::Config(format!(
                "connection.max_delay_ms ({}) is below base_delay_ms ({})",
                connection.max_delay_ms, connection.base_delay_ms
            )));
        }
        if !(0.0..=1.0).contains(&connection.jitter) {
            return Err(ReviewError::Config(format!(
                "connection.jitter must be within 0.0..=1.0, got {}",
                connection.jitter
            )));
        }
        if connection.open_timeout_ms == 0 {
            return Err(ReviewError::Config(
                "connection.open_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if connection.request_timeout_secs == 0 {
            return Err(ReviewError::Config(
                "connection.request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        self.server_url()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_server_url_parses_configured_value() {
        let mut settings = Settings::default();
        settings.server.base_url = "https://review.example.com/base/".to_string();
        let url = settings.server_url().unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("review.example.com"));
    }

    #[test]
    fn test_override_url_wins() {
        let mut settings = Settings::default();
        settings.server.base_url = "http://config.example.com".to_string();
        settings.server.override_url = Some("https://cli.example.com".to_string());
        assert_eq!(settings.get_server_url(), "https://cli.example.com");
        assert_eq!(
            settings.server_url().unwrap().host_str(),
            Some("cli.example.com")
        );
    }

    #[test]
    fn test_rejects_unparseable_server_url() {
        let mut settings = Settings::default();
        settings.server.base_url = "not a url".to_string();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("invalid server URL"));
    }

    #[test]
    fn test_rejects_unsupported_scheme() {
        let mut settings = Settings::default();
        settings.server.base_url = "ftp://example.com".to_string();
        let err = settings.server_url().unwrap_err();
        assert!(err.to_string().contains("unsupported"));
    }

    #[test]
    fn test_rejects_zero_keepalive() {
        let mut settings = Settings::default();
        settings.connection.keepalive_interval_secs = 0;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("keepalive_interval_secs"));
    }

    #[test]
    fn test_rejects_inverted_backoff_bounds() {
        let mut settings = Settings::default();
        settings.connection.base_delay_ms = 5000;
        settings.connection.max_delay_ms = 1000;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("max_delay_ms"));
    }

    #[test]
    fn test_rejects_out_of_range_jitter() {
        let mut settings = Settings::default();
        settings.connection.jitter = 1.5;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("jitter"));
    }

    #[test]
    fn test_rejects_zero_open_timeout() {
        let mut settings = Settings::default();
        settings.connection.open_timeout_ms = 0;
        assert!(settings.validate().is_err());
    }
}
