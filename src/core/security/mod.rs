// Security module for outbound URL validation
//
// This module ensures that URLs supplied by tool callers are fetchable web
// addresses and, unless explicitly allowed, do not target the local machine
// or private networks. The same check runs on every redirect hop.

pub mod url_policy;

pub use url_policy::{
    MAX_REDIRECTS, UrlPolicyError, redirect_policy, validate_redirect, validate_remote_url,
};
