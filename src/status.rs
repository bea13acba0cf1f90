use std::fmt;

use thiserror::Error;

use crate::error::HttpError;

/// The response status codes defined by RFC 2616 / RFC 7231 and friends,
/// as a closed registry. Each code carries its reason phrase and belongs to
/// exactly one [`StatusClass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    // 1xx
    Continue,
    SwitchingProtocols,
    Processing,
    // 2xx
    Ok,
    Created,
    Accepted,
    NonAuthoritativeInformation,
    NoContent,
    ResetContent,
    PartialContent,
    MultiStatus,
    AlreadyReported,
    ImUsed,
    // 3xx
    MultipleChoices,
    MovedPermanently,
    Found,
    SeeOther,
    NotModified,
    UseProxy,
    TemporaryRedirect,
    PermanentRedirect,
    // 4xx
    BadRequest,
    Unauthorized,
    PaymentRequired,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    NotAcceptable,
    ProxyAuthenticationRequired,
    RequestTimeout,
    Conflict,
    Gone,
    LengthRequired,
    PreconditionFailed,
    PayloadTooLarge,
    UriTooLong,
    UnsupportedMediaType,
    RangeNotSatisfiable,
    ExpectationFailed,
    ImATeapot,
    MisdirectedRequest,
    UnprocessableEntity,
    Locked,
    FailedDependency,
    UpgradeRequired,
    PreconditionRequired,
    TooManyRequests,
    RequestHeaderFieldsTooLarge,
    UnavailableForLegalReasons,
    // 5xx
    InternalServerError,
    NotImplemented,
    BadGateway,
    ServiceUnavailable,
    GatewayTimeout,
    VersionNotSupported,
    VariantAlsoNegotiates,
    InsufficientStorage,
    LoopDetected,
    NotExtended,
    NetworkAuthenticationRequired,
}

const ALL_CODES: [StatusCode; 60] = [
    StatusCode::Continue,
    StatusCode::SwitchingProtocols,
    StatusCode::Processing,
    StatusCode::Ok,
    StatusCode::Created,
    StatusCode::Accepted,
    StatusCode::NonAuthoritativeInformation,
    StatusCode::NoContent,
    StatusCode::ResetContent,
    StatusCode::PartialContent,
    StatusCode::MultiStatus,
    StatusCode::AlreadyReported,
    StatusCode::ImUsed,
    StatusCode::MultipleChoices,
    StatusCode::MovedPermanently,
    StatusCode::Found,
    StatusCode::SeeOther,
    StatusCode::NotModified,
    StatusCode::UseProxy,
    StatusCode::TemporaryRedirect,
    StatusCode::PermanentRedirect,
    StatusCode::BadRequest,
    StatusCode::Unauthorized,
    StatusCode::PaymentRequired,
    StatusCode::Forbidden,
    StatusCode::NotFound,
    StatusCode::MethodNotAllowed,
    StatusCode::NotAcceptable,
    StatusCode::ProxyAuthenticationRequired,
    StatusCode::RequestTimeout,
    StatusCode::Conflict,
    StatusCode::Gone,
    StatusCode::LengthRequired,
    StatusCode::PreconditionFailed,
    StatusCode::PayloadTooLarge,
    StatusCode::UriTooLong,
    StatusCode::UnsupportedMediaType,
    StatusCode::RangeNotSatisfiable,
    StatusCode::ExpectationFailed,
    StatusCode::ImATeapot,
    StatusCode::MisdirectedRequest,
    StatusCode::UnprocessableEntity,
    StatusCode::Locked,
    StatusCode::FailedDependency,
    StatusCode::UpgradeRequired,
    StatusCode::PreconditionRequired,
    StatusCode::TooManyRequests,
    StatusCode::RequestHeaderFieldsTooLarge,
    StatusCode::UnavailableForLegalReasons,
    StatusCode::InternalServerError,
    StatusCode::NotImplemented,
    StatusCode::BadGateway,
    StatusCode::ServiceUnavailable,
    StatusCode::GatewayTimeout,
    StatusCode::VersionNotSupported,
    StatusCode::VariantAlsoNegotiates,
    StatusCode::InsufficientStorage,
    StatusCode::LoopDetected,
    StatusCode::NotExtended,
    StatusCode::NetworkAuthenticationRequired,
];

/// A numeric code with no entry in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid HTTP response code {0}")]
pub struct UnknownStatusCode(pub u16);

impl StatusCode {
    /// Every registry code, in declaration order.
    pub fn values() -> &'static [StatusCode] {
        &ALL_CODES
    }

    /// Looks up the registry entry for a numeric code. Codes are unique, so
    /// at most one entry matches.
    pub fn from_code(code: u16) -> Result<StatusCode, UnknownStatusCode> {
        Self::values()
            .iter()
            .copied()
            .find(|c| c.code() == code)
            .ok_or(UnknownStatusCode(code))
    }

    /// The numeric code, e.g. `404`.
    pub fn code(self) -> u16 {
        match self {
            StatusCode::Continue => 100,
            StatusCode::SwitchingProtocols => 101,
            StatusCode::Processing => 102,
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::Accepted => 202,
            StatusCode::NonAuthoritativeInformation => 203,
            StatusCode::NoContent => 204,
            StatusCode::ResetContent => 205,
            StatusCode::PartialContent => 206,
            StatusCode::MultiStatus => 207,
            StatusCode::AlreadyReported => 208,
            StatusCode::ImUsed => 226,
            StatusCode::MultipleChoices => 300,
            StatusCode::MovedPermanently => 301,
            StatusCode::Found => 302,
            StatusCode::SeeOther => 303,
            StatusCode::NotModified => 304,
            StatusCode::UseProxy => 305,
            StatusCode::TemporaryRedirect => 307,
            StatusCode::PermanentRedirect => 308,
            StatusCode::BadRequest => 400,
            StatusCode::Unauthorized => 401,
            StatusCode::PaymentRequired => 402,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::NotAcceptable => 406,
            StatusCode::ProxyAuthenticationRequired => 407,
            StatusCode::RequestTimeout => 408,
            StatusCode::Conflict => 409,
            StatusCode::Gone => 410,
            StatusCode::LengthRequired => 411,
            StatusCode::PreconditionFailed => 412,
            StatusCode::PayloadTooLarge => 413,
            StatusCode::UriTooLong => 414,
            StatusCode::UnsupportedMediaType => 415,
            StatusCode::RangeNotSatisfiable => 416,
            StatusCode::ExpectationFailed => 417,
            StatusCode::ImATeapot => 418,
            StatusCode::MisdirectedRequest => 421,
            StatusCode::UnprocessableEntity => 422,
            StatusCode::Locked => 423,
            StatusCode::FailedDependency => 424,
            StatusCode::UpgradeRequired => 426,
            StatusCode::PreconditionRequired => 428,
            StatusCode::TooManyRequests => 429,
            StatusCode::RequestHeaderFieldsTooLarge => 431,
            StatusCode::UnavailableForLegalReasons => 451,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
            StatusCode::BadGateway => 502,
            StatusCode::ServiceUnavailable => 503,
            StatusCode::GatewayTimeout => 504,
            StatusCode::VersionNotSupported => 505,
            StatusCode::VariantAlsoNegotiates => 506,
            StatusCode::InsufficientStorage => 507,
            StatusCode::LoopDetected => 508,
            StatusCode::NotExtended => 510,
            StatusCode::NetworkAuthenticationRequired => 511,
        }
    }

    /// The reason phrase that usually accompanies the code.
    pub fn reason(self) -> &'static str {
        match self {
            StatusCode::Continue => "Continue",
            StatusCode::SwitchingProtocols => "Switching Protocols",
            StatusCode::Processing => "Processing",
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::Accepted => "Accepted",
            StatusCode::NonAuthoritativeInformation => "Non Authoritative Information",
            StatusCode::NoContent => "No content",
            StatusCode::ResetContent => "Reset Content",
            StatusCode::PartialContent => "Partial Content",
            StatusCode::MultiStatus => "Multi Status",
            StatusCode::AlreadyReported => "Already Reported",
            StatusCode::ImUsed => "I'm Used",
            StatusCode::MultipleChoices => "Multiple Choices",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::Found => "Found",
            StatusCode::SeeOther => "See Other",
            StatusCode::NotModified => "Not Modified",
            StatusCode::UseProxy => "Use Proxy",
            StatusCode::TemporaryRedirect => "Temporary Redirect",
            StatusCode::PermanentRedirect => "Permanent Redirect",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::PaymentRequired => "Payment Required",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::NotAcceptable => "Not Acceptable",
            StatusCode::ProxyAuthenticationRequired => "Proxy Authentication Required",
            StatusCode::RequestTimeout => "Request Timeout",
            StatusCode::Conflict => "Conflict",
            StatusCode::Gone => "Gone",
            StatusCode::LengthRequired => "Length Required",
            StatusCode::PreconditionFailed => "Precondition Failed",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::UriTooLong => "URI Too Long",
            StatusCode::UnsupportedMediaType => "Unsupported Media Type",
            StatusCode::RangeNotSatisfiable => "Range Not Satisfiable",
            StatusCode::ExpectationFailed => "Expectation Failed",
            StatusCode::ImATeapot => "I'm a Teapot",
            StatusCode::MisdirectedRequest => "Misdirected Request",
            StatusCode::UnprocessableEntity => "Unprocessable Entity",
            StatusCode::Locked => "Locked",
            StatusCode::FailedDependency => "Failed Dependency",
            StatusCode::UpgradeRequired => "Upgrade Required",
            StatusCode::PreconditionRequired => "Precondition Required",
            StatusCode::TooManyRequests => "Too Many Requests",
            StatusCode::RequestHeaderFieldsTooLarge => "Request Header Fields Too Large",
            StatusCode::UnavailableForLegalReasons => "Unavailable For Legal Reasons",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::BadGateway => "Bad Gateway",
            StatusCode::ServiceUnavailable => "Service Unavailable",
            StatusCode::GatewayTimeout => "Gateway Timeout",
            StatusCode::VersionNotSupported => "Version Not Supported",
            StatusCode::VariantAlsoNegotiates => "Variant Also Negotiates",
            StatusCode::InsufficientStorage => "Insufficient Storage",
            StatusCode::LoopDetected => "Loop Detected",
            StatusCode::NotExtended => "Not Extended",
            StatusCode::NetworkAuthenticationRequired => "Network Authentication Required",
        }
    }

    /// The class this code belongs to, derived from its hundreds digit.
    pub fn class(self) -> StatusClass {
        match self.code() {
            100..=199 => StatusClass::Informational,
            200..=299 => StatusClass::Successful,
            300..=399 => StatusClass::Redirection,
            400..=499 => StatusClass::ClientError,
            _ => StatusClass::ServerError,
        }
    }

    /// Builds an [`HttpError`] for this code, with the reason phrase as the
    /// default message. Refine with the builder methods on [`HttpError`].
    pub fn http_error(self) -> HttpError {
        HttpError::new(self)
    }
}

/// Formats as `"404 Not Found"`.
impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

impl From<StatusCode> for http::StatusCode {
    fn from(code: StatusCode) -> Self {
        // Every registry code is inside the range http::StatusCode accepts.
        http::StatusCode::from_u16(code.code()).unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// The five classes of status codes (1xx through 5xx).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    Informational,
    Successful,
    Redirection,
    ClientError,
    ServerError,
}

const ALL_CLASSES: [StatusClass; 5] = [
    StatusClass::Informational,
    StatusClass::Successful,
    StatusClass::Redirection,
    StatusClass::ClientError,
    StatusClass::ServerError,
];

impl StatusClass {
    /// Every class, in declaration order.
    pub fn values() -> &'static [StatusClass] {
        &ALL_CLASSES
    }

    /// The hundreds digit identifying the class (1 for 1xx, etc.).
    pub fn hundreds(self) -> u16 {
        match self {
            StatusClass::Informational => 1,
            StatusClass::Successful => 2,
            StatusClass::Redirection => 3,
            StatusClass::ClientError => 4,
            StatusClass::ServerError => 5,
        }
    }

    /// Whether the given registry code is of this class.
    pub fn accepts(self, code: StatusCode) -> bool {
        self.accepts_code(code.code())
    }

    /// Whether the given numeric code is of this class.
    pub fn accepts_code(self, code: u16) -> bool {
        code / 100 == self.hundreds()
    }

    /// All registry codes belonging to this class.
    pub fn codes(self) -> Vec<StatusCode> {
        StatusCode::values()
            .iter()
            .copied()
            .filter(|c| self.accepts(*c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_code_round_trip() {
        for code in StatusCode::values() {
            assert_eq!(StatusCode::from_code(code.code()).unwrap(), *code);
        }
        assert_eq!(StatusCode::from_code(404).unwrap(), StatusCode::NotFound);
        assert_eq!(StatusCode::from_code(306), Err(UnknownStatusCode(306)));
        assert_eq!(StatusCode::from_code(600), Err(UnknownStatusCode(600)));
    }

    #[test]
    fn registry_lists_every_code() {
        assert_eq!(StatusCode::values().len(), 60);
        // Spot-check the first and last entries of each class block.
        assert_eq!(StatusCode::values()[0], StatusCode::Continue);
        assert_eq!(
            StatusCode::values()[59],
            StatusCode::NetworkAuthenticationRequired
        );
    }

    #[test]
    fn no_duplicate_codes() {
        let mut codes: Vec<u16> = StatusCode::values().iter().map(|c| c.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), StatusCode::values().len());
    }

    #[test]
    fn classes() {
        assert_eq!(StatusCode::Continue.class(), StatusClass::Informational);
        assert_eq!(StatusCode::Ok.class(), StatusClass::Successful);
        assert_eq!(StatusCode::Created.class(), StatusClass::Successful);
        assert_eq!(StatusCode::Found.class(), StatusClass::Redirection);
        assert_eq!(StatusCode::MovedPermanently.class(), StatusClass::Redirection);
        assert_eq!(StatusCode::BadRequest.class(), StatusClass::ClientError);
        assert_eq!(StatusCode::NotFound.class(), StatusClass::ClientError);
        assert_eq!(StatusCode::InternalServerError.class(), StatusClass::ServerError);
        assert_eq!(StatusCode::BadGateway.class(), StatusClass::ServerError);
    }

    #[test]
    fn exactly_one_class_accepts_each_code() {
        for code in StatusCode::values() {
            let accepting: Vec<_> = StatusClass::values()
                .iter()
                .filter(|class| class.accepts(*code))
                .collect();
            assert_eq!(accepting.len(), 1, "{code}");
            assert!(code.class().accepts(*code));
        }
    }

    #[test]
    fn accepts_code() {
        assert!(StatusClass::ClientError.accepts_code(404));
        assert!(!StatusClass::ClientError.accepts_code(500));
    }

    #[test]
    fn class_codes() {
        let class = StatusClass::Redirection;
        let codes = class.codes();
        assert!(!codes.is_empty());
        for code in &codes {
            assert!(class.accepts(*code));
        }
        for code in StatusCode::values() {
            if !codes.contains(code) {
                assert!(!class.accepts(*code));
            }
        }
    }

    #[test]
    fn display_and_info() {
        assert_eq!(StatusCode::Ok.code(), 200);
        assert_eq!(StatusCode::Ok.reason(), "OK");
        assert_eq!(StatusCode::Ok.to_string(), "200 OK");
        assert_eq!(StatusCode::NotFound.to_string(), "404 Not Found");
        assert_eq!(StatusCode::BadGateway.to_string(), "502 Bad Gateway");
    }

    #[test]
    fn http_crate_conversion() {
        assert_eq!(
            http::StatusCode::from(StatusCode::ImATeapot),
            http::StatusCode::IM_A_TEAPOT
        );
    }
}
