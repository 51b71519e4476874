//! Response envelope and action result conversion.

use crate::error::BoxError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The response envelope handed back to the transport layer.
///
/// The body is an opaque JSON value; choosing a wire format for it is outside
/// the routing core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    status: u16,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<String, String>,
    body: Value,
}

impl Response {
    /// A `200` response wrapping `body`.
    pub fn new(body: impl Into<Value>) -> Self {
        Self {
            status: 200,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// An empty `200` response.
    pub fn empty() -> Self {
        Self::new(Value::Null)
    }

    /// Set the status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replace the status code in place.
    pub fn set_status(&mut self, status: u16) -> &mut Self {
        self.status = status;
        self
    }

    /// Insert a header in place.
    pub fn insert_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// The status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Look up a header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// All headers.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// The body.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Consume the response, returning the body.
    pub fn into_body(self) -> Value {
        self.body
    }

    /// True when the body is empty (`null`).
    pub fn is_empty(&self) -> bool {
        self.body.is_null()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::empty()
    }
}

/// What an action produced: a finished response or a payload to wrap.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Already satisfies the response contract; used as-is.
    Response(Response),
    /// A raw payload; wrapped in a default [`Response`] envelope.
    Payload(Value),
}

impl Reply {
    /// Turn the reply into a response, wrapping payloads in a `200` envelope.
    pub fn into_response(self) -> Response {
        match self {
            Reply::Response(response) => response,
            Reply::Payload(payload) => Response::new(payload),
        }
    }

    /// True if the action returned a finished response.
    pub fn is_response(&self) -> bool {
        matches!(self, Reply::Response(_))
    }
}

/// Serializes `T` into the reply payload.
///
/// ```rust,ignore
/// router.get("/me", |_: &Params| Json(User { id: 7 }));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

/// Trait for converting an action's output into a [`Reply`].
///
/// # Default Implementations
///
/// - [`Response`] / [`Reply`] → As is
/// - `Value`, `String`, `&'static str`, [`Json<T>`] → Payload
/// - `()` → Empty payload
/// - `Option<T>` → Delegates to inner `T`, `None` is an empty payload
/// - `Result<T, E>` → Delegates to inner `T` or propagates error
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be turned into a reply",
    label = "missing `IntoReply` implementation",
    note = "Actions must return a `Response`, a payload, or a `Result` of one."
)]
pub trait IntoReply {
    /// Convert the output into a reply.
    fn into_reply(self) -> Result<Reply, BoxError>;
}

impl IntoReply for Reply {
    fn into_reply(self) -> Result<Reply, BoxError> {
        Ok(self)
    }
}

impl IntoReply for Response {
    fn into_reply(self) -> Result<Reply, BoxError> {
        Ok(Reply::Response(self))
    }
}

impl IntoReply for Value {
    fn into_reply(self) -> Result<Reply, BoxError> {
        Ok(Reply::Payload(self))
    }
}

impl IntoReply for String {
    fn into_reply(self) -> Result<Reply, BoxError> {
        Ok(Reply::Payload(Value::String(self)))
    }
}

impl IntoReply for &'static str {
    fn into_reply(self) -> Result<Reply, BoxError> {
        Ok(Reply::Payload(Value::from(self)))
    }
}

impl IntoReply for () {
    fn into_reply(self) -> Result<Reply, BoxError> {
        Ok(Reply::Payload(Value::Null))
    }
}

impl<T: Serialize> IntoReply for Json<T> {
    fn into_reply(self) -> Result<Reply, BoxError> {
        Ok(Reply::Payload(serde_json::to_value(self.0)?))
    }
}

impl<T: IntoReply> IntoReply for Option<T> {
    fn into_reply(self) -> Result<Reply, BoxError> {
        match self {
            Some(t) => t.into_reply(),
            None => Ok(Reply::Payload(Value::Null)),
        }
    }
}

impl<T, E> IntoReply for Result<T, E>
where
    T: IntoReply,
    E: Into<BoxError>,
{
    fn into_reply(self) -> Result<Reply, BoxError> {
        match self {
            Ok(t) => t.into_reply(),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_is_wrapped() {
        let response = "hello".into_reply().unwrap().into_response();
        assert_eq!(response.status(), 200);
        assert_eq!(response.body(), &json!("hello"));
    }

    #[test]
    fn test_response_is_kept() {
        let reply = Response::new("created").with_status(201).into_reply().unwrap();
        assert!(reply.is_response());
        assert_eq!(reply.into_response().status(), 201);
    }

    #[test]
    fn test_json_payload() {
        #[derive(Serialize)]
        struct User {
            id: u32,
        }

        let response = Json(User { id: 7 }).into_reply().unwrap().into_response();
        assert_eq!(response.body(), &json!({ "id": 7 }));
    }

    #[test]
    fn test_result_error_propagates() {
        let result: Result<String, std::io::Error> = Err(std::io::Error::other("nope"));
        let err = result.into_reply().unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn test_unit_is_empty() {
        assert!(().into_reply().unwrap().into_response().is_empty());
    }
}
