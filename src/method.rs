use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The request methods defined by RFC 7231 and RFC 5789, together with the
/// per-method properties published there (and summarized on MDN).
///
/// The set is closed: exactly these nine methods exist and their properties
/// are fixed data, so everything here is a plain lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
}

/// The six boolean properties attached to every method.
struct MethodProps {
    request_can_have_body: bool,
    response_can_have_body: bool,
    safe: bool,
    idempotent: bool,
    cacheable: bool,
    allowed_in_html_forms: bool,
}

const ALL_METHODS: [Method; 9] = [
    Method::Get,
    Method::Head,
    Method::Post,
    Method::Put,
    Method::Delete,
    Method::Connect,
    Method::Options,
    Method::Trace,
    Method::Patch,
];

impl Method {
    /// Every method, in declaration order.
    pub fn values() -> &'static [Method] {
        &ALL_METHODS
    }

    /// Single source for the property table. Column order matches the doc
    /// table in the module: request body, response body, safe, idempotent,
    /// cacheable, allowed in HTML forms.
    fn props(self) -> MethodProps {
        let (rq, rs, safe, idem, cache, forms) = match self {
            Method::Get => (false, true, true, true, true, true),
            Method::Head => (false, false, true, true, true, false),
            Method::Post => (true, true, false, false, false, true),
            Method::Put => (true, false, false, true, false, false),
            Method::Delete => (true, true, false, true, false, false),
            Method::Connect => (false, true, false, false, false, false),
            Method::Options => (false, true, true, true, false, false),
            Method::Trace => (false, false, false, true, false, false),
            Method::Patch => (true, true, false, false, false, false),
        };
        MethodProps {
            request_can_have_body: rq,
            response_can_have_body: rs,
            safe,
            idempotent: idem,
            cacheable: cache,
            allowed_in_html_forms: forms,
        }
    }

    /// Whether a request with this method can carry a body.
    pub fn request_can_have_body(self) -> bool {
        self.props().request_can_have_body
    }

    /// Whether a successful response to this method can carry a body.
    pub fn response_can_have_body(self) -> bool {
        self.props().response_can_have_body
    }

    /// Whether the method does not alter server state.
    pub fn is_safe(self) -> bool {
        self.props().safe
    }

    /// Whether repeating the request leaves the server in the same state.
    pub fn is_idempotent(self) -> bool {
        self.props().idempotent
    }

    /// Whether responses to this method may be stored and reused.
    pub fn is_cacheable(self) -> bool {
        self.props().cacheable
    }

    /// Whether HTML forms may submit with this method.
    pub fn is_allowed_in_html_forms(self) -> bool {
        self.props().allowed_in_html_forms
    }

    /// The canonical upper-case token, e.g. `"GET"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Connect => "CONNECT",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unrecognized method token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown HTTP method '{0}'")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    /// Parses the canonical upper-case token. Methods are case-sensitive on
    /// the wire, so no folding happens here.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::values()
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMethod(s.to_owned()))
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => http::Method::GET,
            Method::Head => http::Method::HEAD,
            Method::Post => http::Method::POST,
            Method::Put => http::Method::PUT,
            Method::Delete => http::Method::DELETE,
            Method::Connect => http::Method::CONNECT,
            Method::Options => http::Method::OPTIONS,
            Method::Trace => http::Method::TRACE,
            Method::Patch => http::Method::PATCH,
        }
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = UnknownMethod;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body() {
        assert!(!Method::Get.request_can_have_body());
        assert!(Method::Post.request_can_have_body());
    }

    #[test]
    fn response_body() {
        assert!(Method::Get.response_can_have_body());
        assert!(!Method::Head.response_can_have_body());
    }

    #[test]
    fn safe() {
        assert!(Method::Get.is_safe());
        assert!(!Method::Post.is_safe());
    }

    #[test]
    fn idempotent() {
        assert!(Method::Get.is_idempotent());
        assert!(Method::Put.is_idempotent());
        assert!(!Method::Post.is_idempotent());
    }

    #[test]
    fn cacheable() {
        assert!(Method::Get.is_cacheable());
        assert!(Method::Head.is_cacheable());
        assert!(!Method::Delete.is_cacheable());
    }

    #[test]
    fn html_forms() {
        assert!(Method::Get.is_allowed_in_html_forms());
        assert!(Method::Post.is_allowed_in_html_forms());
        assert!(!Method::Put.is_allowed_in_html_forms());
    }

    #[test]
    fn values_in_declaration_order() {
        let names: Vec<&str> = Method::values().iter().map(|m| m.as_str()).collect();
        assert_eq!(
            names,
            [
                "GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH"
            ]
        );
    }

    #[test]
    fn parse_round_trip() {
        for method in Method::values() {
            assert_eq!(method.as_str().parse::<Method>().unwrap(), *method);
        }
        assert!("get".parse::<Method>().is_err());
        assert!("BREW".parse::<Method>().is_err());
    }

    #[test]
    fn http_crate_conversion() {
        assert_eq!(http::Method::from(Method::Patch), http::Method::PATCH);
        assert_eq!(Method::try_from(&http::Method::DELETE).unwrap(), Method::Delete);
    }
}
