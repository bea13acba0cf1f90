use std::cell::OnceCell;
use std::collections::BTreeMap;

use tracing::debug;

use crate::error::HeaderError;
use crate::GatewayEnv;

/// The meta-variable prefix marking protocol headers in a CGI-style
/// environment (RFC 3875 §4.1.18).
const HEADER_PREFIX: &str = "HTTP_";

/// Meta-variables that carry header values without the `HTTP_` prefix.
/// When one of these is present, it wins over its prefixed duplicate.
const COPY_VARS: [(&str, &str); 3] = [
    ("CONTENT_TYPE", "Content-Type"),
    ("CONTENT_LENGTH", "Content-Length"),
    ("CONTENT_MD5", "Content-Md5"),
];

/// The inbound request headers, parsed once from a [`GatewayEnv`].
///
/// Keys in the primary map are normalized to `Title-Case-With-Hyphens`; a
/// second all-lowercase map backs the case-insensitive accessors and is
/// built on first use.
#[derive(Debug, Clone)]
pub struct RequestHeaders {
    headers: BTreeMap<String, String>,
    lower: OnceCell<BTreeMap<String, String>>,
}

impl RequestHeaders {
    /// Parses the gateway environment.
    ///
    /// Every `HTTP_`-prefixed variable becomes a header with its name
    /// title-cased (`HTTP_X_HELLO` → `X-Hello`), except when the stripped
    /// name is a content variable that is also present unprefixed, in which
    /// case the unprefixed value is taken instead. If no `Authorization`
    /// header came through, one is synthesized from the gateway's auth
    /// variables: a redirect-carried raw value, then basic-auth credentials,
    /// then a digest-auth raw value; first available source wins.
    pub fn from_env(env: &GatewayEnv) -> Self {
        let mut headers = BTreeMap::new();
        for (key, value) in env.vars() {
            if let Some(stripped) = key.strip_prefix(HEADER_PREFIX) {
                let copied = COPY_VARS.iter().any(|(var, _)| *var == stripped);
                if !(copied && env.var(stripped).is_some()) {
                    headers.insert(title_case(stripped), value.to_owned());
                }
            } else if let Some((_, name)) = COPY_VARS.iter().find(|(var, _)| *var == key) {
                headers.insert((*name).to_owned(), value.to_owned());
            }
        }
        if !headers.contains_key("Authorization") {
            if let Some(value) = synthesize_authorization(env) {
                headers.insert("Authorization".to_owned(), value);
            }
        }
        RequestHeaders {
            headers,
            lower: OnceCell::new(),
        }
    }

    /// All headers, keyed `Title-Case-With-Hyphens`.
    pub fn all(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Same as [`RequestHeaders::all`] but with all-lowercase keys.
    pub fn all_lowercase(&self) -> &BTreeMap<String, String> {
        self.lower.get_or_init(|| {
            self.headers
                .iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
                .collect()
        })
    }

    /// Whether the header exists. Case-insensitive.
    pub fn has(&self, key: &str) -> bool {
        self.all_lowercase().contains_key(&key.to_ascii_lowercase())
    }

    /// The header value, if present. Case-insensitive.
    pub fn opt(&self, key: &str) -> Option<&str> {
        self.all_lowercase()
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The header value; absence is a caller error. Case-insensitive.
    pub fn get(&self, key: &str) -> Result<&str, HeaderError> {
        self.opt(key)
            .ok_or_else(|| HeaderError::NotFound(key.to_owned()))
    }
}

impl TryFrom<&RequestHeaders> for http::HeaderMap {
    type Error = HeaderError;

    fn try_from(headers: &RequestHeaders) -> Result<Self, Self::Error> {
        let mut map = http::HeaderMap::with_capacity(headers.all().len());
        for (name, value) in headers.all() {
            let name = name
                .parse::<http::header::HeaderName>()
                .map_err(|e| HeaderError::Invalid(e.to_string()))?;
            let value = value
                .parse::<http::header::HeaderValue>()
                .map_err(|e| HeaderError::Invalid(e.to_string()))?;
            map.insert(name, value);
        }
        Ok(map)
    }
}

/// `LIKE_THIS` → `Like-This`.
fn title_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

fn synthesize_authorization(env: &GatewayEnv) -> Option<String> {
    if let Some(raw) = env.var("REDIRECT_HTTP_AUTHORIZATION") {
        debug!("synthesized Authorization from redirect variable");
        Some(raw.to_owned())
    } else if let Some(user) = env.var("AUTH_USER") {
        let password = env.var("AUTH_PASSWORD").unwrap_or("");
        debug!("synthesized Authorization from basic-auth variables");
        Some(format!(
            "Basic {}",
            base64_encode(format!("{user}:{password}").as_bytes())
        ))
    } else if let Some(digest) = env.var("AUTH_DIGEST") {
        debug!("synthesized Authorization from digest-auth variable");
        Some(digest.to_owned())
    } else {
        None
    }
}

const BASE64_CHARS: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Minimal padded base64 encoder for the basic-auth credential pair.
fn base64_encode(data: &[u8]) -> String {
    let mut result = String::with_capacity(data.len().div_ceil(3) * 4);
    for chunk in data.chunks(3) {
        let b0 = u32::from(chunk[0]);
        let b1 = if chunk.len() > 1 { u32::from(chunk[1]) } else { 0 };
        let b2 = if chunk.len() > 2 { u32::from(chunk[2]) } else { 0 };
        let triple = (b0 << 16) | (b1 << 8) | b2;

        result.push(BASE64_CHARS[((triple >> 18) & 0x3F) as usize] as char);
        result.push(BASE64_CHARS[((triple >> 12) & 0x3F) as usize] as char);

        if chunk.len() > 1 {
            result.push(BASE64_CHARS[((triple >> 6) & 0x3F) as usize] as char);
        } else {
            result.push('=');
        }

        if chunk.len() > 2 {
            result.push(BASE64_CHARS[(triple & 0x3F) as usize] as char);
        } else {
            result.push('=');
        }
    }
    result
}
