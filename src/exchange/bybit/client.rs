//! Signed HTTP client for the Bybit v5 API.

use std::collections::HashMap;
use std::time::Duration;

use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as HttpClient, Method, StatusCode};
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, warn};

/// Receive window for signed requests in milliseconds. Bybit rejects
/// requests whose timestamp drifts further than this from server time.
const RECV_WINDOW: i64 = 5000;

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Bybit deployment the client talks to. Each variant maps to a fixed
/// base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Testnet,
    Demo,
    Mainnet,
    MainnetAlt,
}

impl Environment {
    /// Parses an environment identifier.
    ///
    /// Unrecognized identifiers fall back to testnet: failing open lands on
    /// the safest environment, never on mainnet.
    pub fn parse(value: &str) -> Self {
        match value {
            "testnet" => Environment::Testnet,
            "demo" => Environment::Demo,
            "mainnet" => Environment::Mainnet,
            "mainnet-alt" => Environment::MainnetAlt,
            other => {
                warn!(environment = %other, "unknown environment, defaulting to testnet");
                Environment::Testnet
            }
        }
    }

    /// Returns the base URL for this environment.
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Testnet => "https://api-testnet.bybit.com",
            Environment::Demo => "https://api-demo.bybit.com",
            Environment::Mainnet => "https://api.bybit.com",
            Environment::MainnetAlt => "https://api.bytick.com",
        }
    }

    /// Returns the identifier string for this environment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Testnet => "testnet",
            Environment::Demo => "demo",
            Environment::Mainnet => "mainnet",
            Environment::MainnetAlt => "mainnet-alt",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The network call itself failed (DNS, timeout, connection refused).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A response arrived but with a non-success HTTP status.
    #[error("http error {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Configuration for creating a new Client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub api_secret: String,
    pub environment: Environment,
}

impl ClientConfig {
    pub fn new(api_key: String, api_secret: String, environment: Environment) -> Self {
        Self {
            api_key,
            api_secret,
            environment,
        }
    }
}

/// Signed HTTP client for the Bybit v5 API.
///
/// Holds only the immutable credentials and environment; every request is a
/// single attempt with no retry and no shared mutable state. Retry policy
/// belongs to the caller.
pub struct Client {
    config: ClientConfig,
    http_client: HttpClient,
}

impl Client {
    /// Creates a new Bybit API client.
    pub fn new(config: ClientConfig) -> Self {
        let http_client = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build http client");

        Self {
            config,
            http_client,
        }
    }

    /// Creates the hex-encoded HMAC-SHA256 signature for a request.
    ///
    /// Signature payload: `{timestamp}{api_key}{recv_window}{params}`, where
    /// params is the sorted query string for GET or the JSON body for POST.
    fn sign(&self, timestamp: i64, params: &str) -> String {
        let payload = format!(
            "{}{}{}{}",
            timestamp, self.config.api_key, RECV_WINDOW, params
        );

        let mut mac = Hmac::<Sha256>::new_from_slice(self.config.api_secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());

        hex::encode(mac.finalize().into_bytes())
    }

    fn auth_headers(&self, timestamp: i64, signature: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-BAPI-API-KEY",
            HeaderValue::from_str(&self.config.api_key).map_err(invalid_header)?,
        );
        headers.insert(
            "X-BAPI-SIGN",
            HeaderValue::from_str(signature).map_err(invalid_header)?,
        );
        headers.insert(
            "X-BAPI-TIMESTAMP",
            HeaderValue::from_str(&timestamp.to_string()).map_err(invalid_header)?,
        );
        headers.insert(
            "X-BAPI-RECV-WINDOW",
            HeaderValue::from_str(&RECV_WINDOW.to_string()).map_err(invalid_header)?,
        );
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Sends a signed HTTP request to the Bybit API and returns the raw
    /// response body.
    ///
    /// GET parameters are sorted lexicographically by key and joined as
    /// `key=value` pairs; POST parameters become a JSON body. Exactly one of
    /// the two is non-empty per call, and that string is what gets signed.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        params: Option<HashMap<String, String>>,
    ) -> Result<Vec<u8>> {
        let timestamp = chrono::Utc::now().timestamp_millis();

        let (url, body, payload) = if method == Method::GET {
            let query = canonical_query(params.as_ref());
            let url = if query.is_empty() {
                format!("{}{}", self.config.environment.base_url(), endpoint)
            } else {
                format!("{}{}?{}", self.config.environment.base_url(), endpoint, query)
            };
            (url, None, query)
        } else {
            let json_body = match params {
                Some(ref p) => serde_json::to_string(p)?,
                None => String::new(),
            };
            let url = format!("{}{}", self.config.environment.base_url(), endpoint);
            (url, Some(json_body.clone()), json_body)
        };

        let signature = self.sign(timestamp, &payload);
        let headers = self.auth_headers(timestamp, &signature)?;

        let mut request = self.http_client.request(method.clone(), &url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        debug!(
            method = %method,
            endpoint = %endpoint,
            environment = %self.config.environment,
            "sending request"
        );

        let response = request.send().await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            warn!(status = %status, endpoint = %endpoint, "http error");
            return Err(ClientError::Http {
                status,
                body: String::from_utf8_lossy(&body).to_string(),
            });
        }

        Ok(body.to_vec())
    }

    /// Fetches the position list for a category.
    ///
    /// Adds `symbol` when given; otherwise `settle_coin`, which defaults to
    /// USDT for the linear category.
    pub async fn get_positions(
        &self,
        category: &str,
        symbol: Option<&str>,
        settle_coin: Option<&str>,
    ) -> Result<Vec<u8>> {
        let mut params = HashMap::new();
        params.insert("category".to_string(), category.to_string());

        if let Some(symbol) = symbol {
            params.insert("symbol".to_string(), symbol.to_string());
        } else if let Some(coin) = settle_coin {
            params.insert("settleCoin".to_string(), coin.to_string());
        } else if category == "linear" {
            params.insert("settleCoin".to_string(), "USDT".to_string());
        }

        self.request(Method::GET, "/v5/position/list", Some(params))
            .await
    }

    /// Fetches account information.
    pub async fn get_account_info(&self) -> Result<Vec<u8>> {
        self.request(Method::GET, "/v5/account/info", None).await
    }

    /// Fetches wallet balance for an account type (defaults to UNIFIED).
    pub async fn get_wallet_balance(&self, account_type: Option<&str>) -> Result<Vec<u8>> {
        let mut params = HashMap::new();
        params.insert(
            "accountType".to_string(),
            account_type.unwrap_or("UNIFIED").to_string(),
        );

        self.request(Method::GET, "/v5/account/wallet-balance", Some(params))
            .await
    }
}

/// Builds the canonical query string: params sorted lexicographically by key,
/// joined as `key=value` with `&`. Values go in verbatim, matching what the
/// exchange signs against.
fn canonical_query(params: Option<&HashMap<String, String>>) -> String {
    let Some(params) = params else {
        return String::new();
    };

    let mut sorted: Vec<_> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

fn invalid_header(e: reqwest::header::InvalidHeaderValue) -> ClientError {
    ClientError::Http {
        status: StatusCode::BAD_REQUEST,
        body: format!("invalid header value: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(environment: Environment) -> Client {
        Client::new(ClientConfig::new(
            "K".to_string(),
            "test_secret".to_string(),
            environment,
        ))
    }

    #[test]
    fn test_signature_golden_value() {
        // HMAC-SHA256("1700000000000K5000", "test_secret"), hex-encoded.
        let client = client(Environment::Testnet);
        let signature = client.sign(1_700_000_000_000, "");
        assert_eq!(
            signature,
            "4f0875004744053541c98fa18aca045198c02c38177d647233651701e5c398c0"
        );
    }

    #[test]
    fn test_signature_is_deterministic() {
        let client = client(Environment::Testnet);
        let a = client.sign(1_700_000_000_000, "category=linear");
        let b = client.sign(1_700_000_000_000, "category=linear");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_canonical_query_sorts_keys() {
        let mut params = HashMap::new();
        params.insert("b".to_string(), "2".to_string());
        params.insert("a".to_string(), "1".to_string());

        assert_eq!(canonical_query(Some(&params)), "a=1&b=2");
    }

    #[test]
    fn test_canonical_query_empty() {
        assert_eq!(canonical_query(None), "");
        assert_eq!(canonical_query(Some(&HashMap::new())), "");
    }

    #[test]
    fn test_environment_base_urls() {
        assert_eq!(
            Environment::Testnet.base_url(),
            "https://api-testnet.bybit.com"
        );
        assert_eq!(Environment::Demo.base_url(), "https://api-demo.bybit.com");
        assert_eq!(Environment::Mainnet.base_url(), "https://api.bybit.com");
        assert_eq!(Environment::MainnetAlt.base_url(), "https://api.bytick.com");
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("testnet"), Environment::Testnet);
        assert_eq!(Environment::parse("demo"), Environment::Demo);
        assert_eq!(Environment::parse("mainnet"), Environment::Mainnet);
        assert_eq!(Environment::parse("mainnet-alt"), Environment::MainnetAlt);
    }

    #[test]
    fn test_unknown_environment_defaults_to_testnet() {
        assert_eq!(Environment::parse("production"), Environment::Testnet);
        assert_eq!(Environment::parse(""), Environment::Testnet);
    }
}
