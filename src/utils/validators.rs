// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use thiserror::Error;
use url::Url;

/// 扫描目标校验错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TargetError {
    #[error("unsupported scheme {0}")]
    UnsupportedScheme(String),
    #[error("missing host")]
    MissingHost,
    #[error("host {0} could not be resolved")]
    Unresolvable(String),
    /// 主机解析到内网、回环等不可公开访问的地址
    #[error("host {host} resolves to non-public address {ip}")]
    NonPublicAddress { host: String, ip: IpAddr },
}

fn is_public_v4(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    // 100.64.0.0/10 carrier-grade NAT
    let shared = a == 100 && (b & 0xc0) == 64;
    !(ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_documentation()
        || ip.is_unspecified()
        || ip.is_multicast()
        || shared)
}

fn is_public_v6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_public_v4(v4);
    }
    let first = ip.segments()[0];
    let unique_local = (first & 0xfe00) == 0xfc00;
    let link_local = (first & 0xffc0) == 0xfe80;
    !(ip.is_loopback() || ip.is_unspecified() || ip.is_multicast() || unique_local || link_local)
}

/// 地址是否可公开访问
pub fn is_public_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_public_v4(v4),
        IpAddr::V6(v6) => is_public_v6(v6),
    }
}

/// 确认扫描目标只解析到公网地址
///
/// 主机的所有解析结果都必须是公网地址，防止通过扫描访问内部服务（SSRF）。
pub async fn ensure_public_host(url: &Url) -> Result<(), TargetError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(TargetError::UnsupportedScheme(url.scheme().to_string()));
    }
    let host = url.host_str().ok_or(TargetError::MissingHost)?;
    let port = url.port_or_known_default().unwrap_or(80);

    // Bracketed IPv6 literals resolve without the brackets.
    let lookup_host = host.trim_start_matches('[').trim_end_matches(']');
    let addrs: Vec<_> = tokio::net::lookup_host((lookup_host, port))
        .await
        .map_err(|_| TargetError::Unresolvable(host.to_string()))?
        .collect();
    if addrs.is_empty() {
        return Err(TargetError::Unresolvable(host.to_string()));
    }

    match addrs.iter().map(|a| a.ip()).find(|ip| !is_public_ip(*ip)) {
        Some(ip) => Err(TargetError::NonPublicAddress {
            host: host.to_string(),
            ip,
        }),
        None => Ok(()),
    }
}
