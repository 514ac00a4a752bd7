//! Email, URL and phone number format validators.
//!
//! These are format checks only: nothing is resolved or dialled.

use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domains::tools::{ToolContext, ToolDefinition, ToolResult};

pub(crate) static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid regex")
});

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^https?://[^\s<>"{}|\\^`\[\]]+"#).expect("valid regex"));

static PHONE_SEPARATORS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-().]+").expect("valid regex"));

static US_PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?1?\d{10}$").expect("valid regex"));

static GENERIC_PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?\d{7,15}$").expect("valid regex"));

// ============================================================================
// validate_email
// ============================================================================

/// Parameters for the email validator.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ValidateEmailParams {
    /// The email address to validate.
    #[serde(alias = "value")]
    #[schemars(description = "The email address to validate")]
    pub email: String,
}

/// Result of an email format check.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmailValidation {
    pub valid: bool,
    pub email: String,
    pub message: String,
}

/// Check an email address against the simplified address pattern.
pub fn validate_email(email: &str) -> EmailValidation {
    let valid = EMAIL_RE.is_match(email);
    EmailValidation {
        valid,
        email: email.to_string(),
        message: if valid {
            "Valid email format"
        } else {
            "Invalid email format"
        }
        .to_string(),
    }
}

/// Email format validation tool.
pub struct ValidateEmailTool;

#[async_trait::async_trait]
impl ToolDefinition for ValidateEmailTool {
    type Params = ValidateEmailParams;
    type Output = EmailValidation;

    const NAME: &'static str = "validate_email";
    const DESCRIPTION: &'static str = "Validate if an email address is properly formatted. \
         Use this to check email validity before sending messages or storing contact info. \
         Returns 'valid' and a message explaining the result.";

    async fn execute(params: Self::Params, _ctx: &ToolContext) -> ToolResult<Self::Output> {
        Ok(validate_email(&params.email))
    }
}

// ============================================================================
// validate_url
// ============================================================================

/// Parameters for the URL validator.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ValidateUrlParams {
    /// The URL to validate.
    #[serde(alias = "value")]
    #[schemars(description = "The URL to validate")]
    pub url: String,
}

/// Result of a URL format check.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UrlValidation {
    pub valid: bool,
    pub url: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// Check a URL against the http(s) URL pattern.
pub fn validate_url(url: &str) -> UrlValidation {
    let valid = URL_RE.is_match(url);
    let (protocol, domain) = if valid {
        let protocol = if url.starts_with("https") { "https" } else { "http" };
        let domain = url.split('/').nth(2).unwrap_or_default();
        (Some(protocol.to_string()), Some(domain.to_string()))
    } else {
        (None, None)
    };

    UrlValidation {
        valid,
        url: url.to_string(),
        message: if valid {
            "Valid URL format"
        } else {
            "Invalid URL format"
        }
        .to_string(),
        protocol,
        domain,
    }
}

/// URL format validation tool.
pub struct ValidateUrlTool;

#[async_trait::async_trait]
impl ToolDefinition for ValidateUrlTool {
    type Params = ValidateUrlParams;
    type Output = UrlValidation;

    const NAME: &'static str = "validate_url";
    const DESCRIPTION: &'static str = "Validate if a URL is properly formatted. \
         Use this to check URL validity before making requests or storing links. \
         Returns 'valid', the protocol and domain of valid URLs, and a message.";

    async fn execute(params: Self::Params, _ctx: &ToolContext) -> ToolResult<Self::Output> {
        Ok(validate_url(&params.url))
    }
}

// ============================================================================
// validate_phone
// ============================================================================

fn default_country_code() -> String {
    "US".to_string()
}

/// Parameters for the phone validator.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ValidatePhoneParams {
    /// The phone number to validate.
    #[serde(alias = "value")]
    #[schemars(description = "The phone number to validate")]
    pub phone: String,

    /// Country code used to pick the rule set.
    #[serde(default = "default_country_code")]
    #[schemars(description = "Country code for validation (default: \"US\")")]
    pub country_code: String,
}

/// Result of a phone number format check.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PhoneValidation {
    pub valid: bool,
    pub phone: String,
    pub cleaned: String,
    pub message: String,
}

/// Check a phone number.
///
/// US numbers need ten digits with an optional `+1`/`1` prefix; any other
/// country accepts 7 to 15 digits with an optional `+`. The country code is
/// compared exactly, so `"us"` gets the generic rule.
pub fn validate_phone(phone: &str, country_code: &str) -> PhoneValidation {
    let cleaned = PHONE_SEPARATORS_RE.replace_all(phone, "").into_owned();
    let is_us = country_code == "US";
    debug!(country_code, is_us, "Validating phone number");

    let (valid, message) = if is_us {
        let valid = US_PHONE_RE.is_match(&cleaned);
        let message = if valid {
            "Valid US phone number"
        } else {
            "Invalid US phone number (need 10 digits)"
        };
        (valid, message)
    } else {
        let valid = GENERIC_PHONE_RE.is_match(&cleaned);
        let message = if valid {
            "Valid phone format"
        } else {
            "Invalid phone format"
        };
        (valid, message)
    };

    PhoneValidation {
        valid,
        phone: phone.to_string(),
        cleaned,
        message: message.to_string(),
    }
}

/// Phone number format validation tool.
pub struct ValidatePhoneTool;

#[async_trait::async_trait]
impl ToolDefinition for ValidatePhoneTool {
    type Params = ValidatePhoneParams;
    type Output = PhoneValidation;

    const NAME: &'static str = "validate_phone";
    const DESCRIPTION: &'static str = "Validate if a phone number is properly formatted. \
         Use this to check phone number validity before storing or processing contact info. \
         US numbers need 10 digits; other countries accept 7-15 digits.";

    async fn execute(params: Self::Params, _ctx: &ToolContext) -> ToolResult<Self::Output> {
        Ok(validate_phone(&params.phone, &params.country_code))
    }
}
