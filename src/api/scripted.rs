//! An in-memory transport that replays scripted responses.
//!
//! This is the offline transport shipped with the crate. It drives the
//! client and the song controller without a server, for demos, front-end
//! prototyping and the test suites. Each expected request is matched in
//! order by method and path; anything else fails with a [`TransportError`].
//! Production embedders implement [`HttpTransport`] over their HTTP stack.

use std::collections::VecDeque;

use super::transport::{HttpTransport, Method, Request, Response, TransportError};

#[derive(Debug)]
struct Expectation {
    method: Method,
    path: String,
    reply: Result<Response, TransportError>,
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    expectations: VecDeque<Expectation>,
    requests: Vec<Request>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next request to `method path`
    pub fn expect(&mut self, method: Method, path: impl Into<String>, response: Response) -> &mut Self {
        self.expectations.push_back(Expectation {
            method,
            path: path.into(),
            reply: Ok(response),
        });
        self
    }

    /// Queue a connection failure
    pub fn fail(&mut self, method: Method, path: impl Into<String>, message: &str) -> &mut Self {
        self.expectations.push_back(Expectation {
            method,
            path: path.into(),
            reply: Err(TransportError(message.to_string())),
        });
        self
    }

    /// Every request sent so far, in order
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn last_request(&self) -> Option<&Request> {
        self.requests.last()
    }

    /// True once every scripted response has been consumed
    pub fn is_done(&self) -> bool {
        self.expectations.is_empty()
    }
}

impl HttpTransport for ScriptedTransport {
    fn send(&mut self, request: &Request) -> Result<Response, TransportError> {
        self.requests.push(request.clone());
        let expectation = self.expectations.pop_front().ok_or_else(|| {
            TransportError(format!("unexpected request {} {}", request.method, request.path))
        })?;

        if expectation.method != request.method || expectation.path != request.path {
            return Err(TransportError(format!(
                "expected {} {}, got {} {}",
                expectation.method, expectation.path, request.method, request.path
            )));
        }
        expectation.reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replays_in_order() {
        let mut transport = ScriptedTransport::new();
        transport
            .expect(Method::Get, "/a", Response::new(200, "1"))
            .fail(Method::Get, "/b", "connection reset");

        assert_eq!(transport.send(&Request::new(Method::Get, "/a")).unwrap().body, "1");
        assert!(transport.send(&Request::new(Method::Get, "/b")).is_err());
        assert!(transport.is_done());
        assert_eq!(transport.requests().len(), 2);
    }

    #[test]
    fn test_mismatch_is_an_error() {
        let mut transport = ScriptedTransport::new();
        transport.expect(Method::Put, "/a", Response::new(200, ""));
        let err = transport.send(&Request::new(Method::Get, "/a")).unwrap_err();
        assert_eq!(err, TransportError("expected PUT /a, got GET /a".to_string()));
        assert!(transport.send(&Request::new(Method::Get, "/z")).is_err());
    }
}
