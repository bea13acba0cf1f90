//! Header utilities: a one-time snapshot of the inbound request headers
//! parsed from gateway meta-variables, and a live read/write view over the
//! outbound header buffer.

pub mod request;
pub mod response;

pub use request::RequestHeaders;
pub use response::{HeaderBuffer, HeaderSink, ResponseHeaderUtils};
