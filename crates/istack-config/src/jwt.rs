use std::env;

/// JWT configuration shared by token issuance and verification.
///
/// # Environment Variables
///
/// - `JWT_SECRET`: HMAC secret (default is a development-only value)
/// - `JWT_ACCESS_EXPIRY`: Access token lifetime in seconds (default 3600)
/// - `JWT_LEEWAY`: Clock skew tolerated on `exp` in seconds (default 0)
/// - `JWT_EXEMPT_METHODS`: Comma separated HTTP methods that skip token
///   verification and proceed anonymously (default `OPTIONS`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry: i64,
    pub leeway: u64,
    pub exempt_methods: Vec<String>,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "your-secret-key-change-in-production".to_string(),
            access_token_expiry: 3600, // 1 hour
            leeway: 0,
            exempt_methods: vec!["OPTIONS".to_string()],
        }
    }
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            secret: env::var("JWT_SECRET").unwrap_or(defaults.secret),
            access_token_expiry: env::var("JWT_ACCESS_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.access_token_expiry),
            leeway: env::var("JWT_LEEWAY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.leeway),
            exempt_methods: env::var("JWT_EXEMPT_METHODS")
                .map(|v| parse_methods(&v))
                .unwrap_or(defaults.exempt_methods),
        }
    }

    /// Whether requests with this method skip token verification.
    pub fn is_exempt(&self, method: &str) -> bool {
        self.exempt_methods
            .iter()
            .any(|m| m.eq_ignore_ascii_case(method))
    }
}

fn parse_methods(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
