//! # jsondispatch
//!
//! Expose methods of registered service objects as JSON-RPC procedures over HTTP.
//!
//! A request names its target as `"Service.Method"` and passes positional
//! parameters; the response carries the request's `id` and either a `result`
//! or an `error` string. All failures are reported inside the JSON body.
//!
//! ```
//! use jsondispatch::{BufferedResponse, Object, Server, ServiceBuilder};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Repeat {
//!     x: String,
//!     y: usize,
//! }
//!
//! struct Text;
//! impl Text {
//!     fn repeat(&self, r: Object<Repeat>) -> Result<String, String> {
//!         Ok(r.x.repeat(r.y))
//!     }
//! }
//!
//! let server = Server::new();
//! server
//!     .register(ServiceBuilder::new(Text).method("Repeat", Text::repeat))
//!     .unwrap();
//!
//! let mut response = BufferedResponse::new();
//! let request = br#"{"id":1,"method":"Text.Repeat","params":[{"x":"ab","y":3}]}"#;
//! server.handle_bytes(request, &mut response).unwrap();
//! assert_eq!(response.body, br#"{"id":1,"result":"ababab"}"#);
//! ```

use std::io::{self, Read};

use derive_ex::derive_ex;
use tokio::io::AsyncRead;
use tracing::{debug, warn};

mod error;
mod message;
mod message_read;
mod message_write;
mod method;
mod params;
mod registry;
mod shape;
mod utils;

pub use error::*;
pub use message::*;
pub use message_write::*;
pub use method::*;
pub use params::*;
pub use registry::*;
pub use shape::*;

use message_read::{read_body, read_body_async};
use message_write::{encode_response, write_body};

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

pub const DEFAULT_MAX_REQUEST_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone)]
#[derive_ex(Default)]
pub struct ServerOptions {
    /// Requests with a larger body are rejected as invalid. `None` disables the limit.
    #[default(Some(DEFAULT_MAX_REQUEST_SIZE))]
    pub max_request_size: Option<usize>,
}

/// Owns the service registry and dispatches requests to it.
#[derive(Debug, Default)]
pub struct Server {
    registry: Registry,
    options: ServerOptions,
}

impl Server {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_options(options: ServerOptions) -> Self {
        Self {
            registry: Registry::new(),
            options,
        }
    }

    pub fn register<S>(&self, service: ServiceBuilder<S>) -> Result<(), ConfigurationError>
    where
        S: Send + Sync + 'static,
    {
        self.registry.register(service)
    }
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
    pub fn options(&self) -> &ServerOptions {
        &self.options
    }

    /// Reads a request from `body` and writes its response to `sink`.
    ///
    /// RPC failures are written as error responses; only failures of the sink
    /// itself are returned.
    pub fn handle(&self, body: impl Read, sink: &mut impl ResponseSink) -> io::Result<()> {
        match read_body(body, self.options.max_request_size) {
            Ok(body) => self.handle_bytes(&body, sink),
            Err(e) => self.reject(e, sink),
        }
    }

    pub async fn handle_async(
        &self,
        body: impl AsyncRead + Unpin,
        sink: &mut impl ResponseSink,
    ) -> io::Result<()> {
        match read_body_async(body, self.options.max_request_size).await {
            Ok(body) => self.handle_bytes(&body, sink),
            Err(e) => self.reject(e, sink),
        }
    }

    pub fn handle_bytes(&self, body: &[u8], sink: &mut impl ResponseSink) -> io::Result<()> {
        let request = match RequestMessage::parse(body) {
            Ok(request) => request,
            Err(e) => {
                warn!(target: DISPATCH_TARGET, "{e}");
                return send(sink, INVALID_REQUEST_BODY.as_bytes());
            }
        };
        let result = self.dispatch(&request);
        let body = encode_response(&ResponseMessage::from_result(request.id, result));
        send(sink, &body)
    }

    fn reject(&self, e: io::Error, sink: &mut impl ResponseSink) -> io::Result<()> {
        warn!(target: DISPATCH_TARGET, "failed to read request body: {e}");
        send(sink, INVALID_REQUEST_BODY.as_bytes())
    }

    fn dispatch(&self, request: &RequestMessage) -> Result<serde_json::Value> {
        let Some((service_name, method_name)) = request.service_method() else {
            debug!(target: DISPATCH_TARGET, method = %request.method, "no service in method name");
            return Err(DispatchError::ServiceNotFound);
        };
        let service = self.registry.lookup(service_name);
        let method = service.as_ref().and_then(|s| s.method(method_name));
        let Some(method) = method else {
            let e = if service.is_none() {
                DispatchError::ServiceNotFound
            } else {
                DispatchError::MethodNotFound
            };
            debug!(
                target: DISPATCH_TARGET,
                service = service_name,
                method = method_name,
                "{e}"
            );
            return Err(e);
        };
        debug!(
            target: DISPATCH_TARGET,
            service = service_name,
            method = method_name,
            params = request.params().len(),
            "dispatch"
        );
        method.call(request.params()).inspect_err(|e| {
            if !matches!(e, DispatchError::Application(_)) {
                debug!(target: DISPATCH_TARGET, service = service_name, method = method_name, "{e}");
            }
        })
    }
}

fn send(sink: &mut impl ResponseSink, body: &[u8]) -> io::Result<()> {
    write_body(sink, body)
        .inspect_err(|e| warn!(target: DISPATCH_TARGET, "failed to write response: {e}"))
}
