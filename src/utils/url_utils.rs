// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;
use url::Url;

/// 扫描URL规范化错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UrlNormalizeError {
    #[error("URL is empty")]
    Empty,
    #[error("Invalid URL: {0}")]
    Invalid(String),
}

/// 规范化用户输入的扫描目标
///
/// 去除首尾空白，缺少协议时补全 `https://`，只接受带主机名的 http/https URL。
/// 片段标识被移除。
pub fn normalize_scan_url(input: &str) -> Result<Url, UrlNormalizeError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlNormalizeError::Empty);
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let mut url =
        Url::parse(&candidate).map_err(|e| UrlNormalizeError::Invalid(format!("{trimmed}: {e}")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlNormalizeError::Invalid(format!(
            "unsupported scheme {}",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlNormalizeError::Invalid(format!("{trimmed}: missing host")));
    }

    url.set_fragment(None);
    Ok(url)
}
