// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Tarifa.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Where the CSV text comes from

use crate::config::FeedConfig;
use crate::error::FetchError;
use reqwest::blocking::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub trait FeedSource {
    /// Complete feed text. No retries.
    fn fetch(&self) -> Result<String, FetchError>;

    /// Human-readable origin for logs
    fn describe(&self) -> String;
}

/// Published spreadsheet export over HTTP(S)
#[derive(Debug)]
pub struct HttpFeedSource {
    client: Client,
    url: String,
}

impl HttpFeedSource {
    pub fn new(config: &FeedConfig) -> Result<Self, FetchError> {
        Self::with_url(config, &config.url)
    }

    /// Same client settings as `config`, different URL
    pub fn with_url(config: &FeedConfig, url: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url: url.to_owned(),
        })
    }
}

impl FeedSource for HttpFeedSource {
    fn fetch(&self) -> Result<String, FetchError> {
        info!("Downloading price feed from: {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| FetchError::Transport {
                url: self.url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let text = response
            .text()
            .map_err(|e| FetchError::Body(e.to_string()))?;
        info!("Downloaded {} bytes of price feed", text.len());
        Ok(text)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Feed saved to disk, e.g. a manual CSV export
#[derive(Debug)]
pub struct FileFeedSource {
    path: PathBuf,
}

impl FileFeedSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FeedSource for FileFeedSource {
    fn fetch(&self) -> Result<String, FetchError> {
        info!("Reading price feed from {}", self.path.display());
        Ok(std::fs::read_to_string(&self.path)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
