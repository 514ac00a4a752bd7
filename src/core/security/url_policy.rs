use std::net::IpAddr;

use url::{Host, Url};

use crate::core::config::SecurityConfig;

/// Most redirect hops the shared HTTP client follows.
pub const MAX_REDIRECTS: usize = 10;

/// Errors that can occur during URL validation
#[derive(Debug, thiserror::Error)]
pub enum UrlPolicyError {
    #[error("Invalid URL '{url}': {reason}")]
    Malformed { url: String, reason: String },

    #[error("Unsupported URL scheme '{scheme}' (only http and https are allowed)")]
    UnsupportedScheme { scheme: String },

    #[error("URL '{url}' has no host")]
    MissingHost { url: String },

    #[error("Host '{host}' is a local or private address")]
    Blocked { host: String },

    #[error("Too many redirects (more than {limit})")]
    TooManyRedirects { limit: usize },
}

/// Validates that a user-supplied URL may be fetched.
///
/// This function performs the following checks:
/// 1. Parses the input as an absolute URL
/// 2. Requires the `http` or `https` scheme and a host
/// 3. Unless private hosts are allowed, rejects `localhost` and loopback,
///    private, link-local and unspecified IP literals
///
/// Hostnames are not resolved, so a public name pointing at a private
/// address passes.
///
/// # Examples
///
/// ```rust,ignore
/// let config = Config::from_env(ServerKind::Web)?;
/// let url = validate_remote_url("https://example.com/page", &config.security)?;
/// ```
pub fn validate_remote_url(input: &str, policy: &SecurityConfig) -> Result<Url, UrlPolicyError> {
    let url = Url::parse(input.trim()).map_err(|e| UrlPolicyError::Malformed {
        url: input.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlPolicyError::UnsupportedScheme {
            scheme: url.scheme().to_string(),
        });
    }

    let Some(host) = url.host() else {
        return Err(UrlPolicyError::MissingHost {
            url: input.to_string(),
        });
    };

    if !policy.allow_private_hosts && is_private_host(&host) {
        return Err(UrlPolicyError::Blocked {
            host: host.to_string(),
        });
    }

    Ok(url)
}

/// Validates one redirect hop: `hops` is the number of URLs already visited.
pub fn validate_redirect(
    target: &Url,
    hops: usize,
    policy: &SecurityConfig,
) -> Result<(), UrlPolicyError> {
    if hops > MAX_REDIRECTS {
        return Err(UrlPolicyError::TooManyRedirects {
            limit: MAX_REDIRECTS,
        });
    }
    validate_remote_url(target.as_str(), policy).map(|_| ())
}

/// Redirect policy applying the URL policy to every hop.
pub fn redirect_policy(policy: SecurityConfig) -> reqwest::redirect::Policy {
    reqwest::redirect::Policy::custom(move |attempt| {
        match validate_redirect(attempt.url(), attempt.previous().len(), &policy) {
            Ok(()) => attempt.follow(),
            Err(err) => attempt.error(err),
        }
    })
}

/// Checks whether a host names the local machine or a private network.
fn is_private_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(name) => {
            let name = name.to_ascii_lowercase();
            name == "localhost" || name.ends_with(".localhost")
        }
        Host::Ipv4(ip) => is_private_ip(IpAddr::V4(*ip)),
        Host::Ipv6(ip) => is_private_ip(IpAddr::V6(*ip)),
    }
}

fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
        }
        IpAddr::V6(v6) => {
            if let Some(mapped) = v6.to_ipv4_mapped() {
                return is_private_ip(IpAddr::V4(mapped));
            }
            let first = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                // fc00::/7 unique local, fe80::/10 link-local
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(allow_private_hosts: bool) -> SecurityConfig {
        SecurityConfig {
            allow_private_hosts,
        }
    }

    #[test]
    fn test_public_https_url_allowed() {
        let url = validate_remote_url("https://example.com/a?b=1", &policy(false)).unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_scheme_must_be_http() {
        let result = validate_remote_url("ftp://example.com/file", &policy(true));
        assert!(matches!(
            result,
            Err(UrlPolicyError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn test_relative_url_is_malformed() {
        let result = validate_remote_url("/just/a/path", &policy(true));
        assert!(matches!(result, Err(UrlPolicyError::Malformed { .. })));
    }

    #[test]
    fn test_loopback_blocked_by_default() {
        for target in [
            "http://127.0.0.1:8080/",
            "http://localhost/admin",
            "http://10.0.0.5/",
            "http://[::1]/",
            "http://169.254.169.254/latest/meta-data",
        ] {
            let result = validate_remote_url(target, &policy(false));
            assert!(
                matches!(result, Err(UrlPolicyError::Blocked { .. })),
                "{} should be blocked",
                target
            );
        }
    }

    #[test]
    fn test_redirect_to_metadata_address_refused() {
        let target = Url::parse("http://169.254.169.254/latest/meta-data").unwrap();
        let result = validate_redirect(&target, 1, &policy(false));
        assert!(matches!(result, Err(UrlPolicyError::Blocked { .. })));
    }

    #[test]
    fn test_redirect_hop_limit() {
        let target = Url::parse("https://example.com/next").unwrap();
        assert!(validate_redirect(&target, MAX_REDIRECTS, &policy(false)).is_ok());
        assert!(matches!(
            validate_redirect(&target, MAX_REDIRECTS + 1, &policy(false)),
            Err(UrlPolicyError::TooManyRedirects { limit: 10 })
        ));
    }

    #[test]
    fn test_redirect_scheme_change_refused() {
        let target = Url::parse("file:///etc/passwd").unwrap();
        assert!(matches!(
            validate_redirect(&target, 1, &policy(true)),
            Err(UrlPolicyError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn test_private_hosts_allowed_when_configured() {
        assert!(validate_remote_url("http://127.0.0.1:9000/", &policy(true)).is_ok());
    }
}
