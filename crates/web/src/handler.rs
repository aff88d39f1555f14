use reactor_http::protocol::{Request, Response};

use crate::router::Params;

/// A route handler.
///
/// Handlers run on worker threads and populate the response in place. They
/// must always produce one — returning with the response untouched serves an
/// empty 200, and panicking is not an option across the task boundary.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, request: &Request, params: &Params, response: &mut Response);
}

/// Adapts a closure into a [`Handler`].
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&Request, &Params, &mut Response) + Send + Sync + 'static,
{
    HandlerFn { f }
}

pub struct HandlerFn<F> {
    f: F,
}

impl<F> std::fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HandlerFn")
    }
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&Request, &Params, &mut Response) + Send + Sync + 'static,
{
    fn handle(&self, request: &Request, params: &Params, response: &mut Response) {
        (self.f)(request, params, response);
    }
}
