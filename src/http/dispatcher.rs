//! Connection-level glue between the framing layer and the core.
//!
//! The framing layer reports [`FrameEvent`]s; an [`Assembly`] buffers them
//! into a complete request (`Idle -> AwaitingBody -> Complete`), and the
//! [`Dispatcher`] routes it, runs the reducer against the shared store and
//! hands back one [`Response`]. Requests on one connection never interleave.

use bytes::{Bytes, BytesMut};
use http::{header::LOCATION, request::Parts, HeaderMap, HeaderValue, StatusCode};

use crate::application::reducer::Reducer;
use crate::config::DEFAULT_BODY_LIMIT;
use crate::http::routing::{BufferedRequest, Router};
use crate::http::types::Response;
use crate::infrastructure::store::Store;

#[derive(Debug)]
pub enum FrameEvent {
    Head(Parts),
    Body(Bytes),
    End,
}

impl FrameEvent {
    fn name(&self) -> &'static str {
        match self {
            FrameEvent::Head(_) => "head",
            FrameEvent::Body(_) => "body",
            FrameEvent::End => "end",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("unexpected {event} event while {phase}")]
    OutOfOrder { event: &'static str, phase: &'static str },
    #[error("request abandoned: {0}")]
    Abandoned(String),
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

/// Per-connection request assembly.
#[derive(Debug, Default)]
pub enum Assembly {
    #[default]
    Idle,
    AwaitingBody { head: Parts, body: BytesMut },
    Complete(BufferedRequest),
}

impl Assembly {
    pub fn phase(&self) -> &'static str {
        match self {
            Assembly::Idle => "idle",
            Assembly::AwaitingBody { .. } => "awaiting body",
            Assembly::Complete(_) => "complete",
        }
    }

    /// Advances the state machine. An out-of-order event resets to `Idle`.
    pub fn feed(&mut self, event: FrameEvent) -> Result<(), DispatchError> {
        match (std::mem::take(self), event) {
            (Assembly::Idle, FrameEvent::Head(head)) => {
                *self = Assembly::AwaitingBody { head, body: BytesMut::new() };
            }
            (Assembly::AwaitingBody { head, mut body }, FrameEvent::Body(chunk)) => {
                body.extend_from_slice(&chunk);
                *self = Assembly::AwaitingBody { head, body };
            }
            (Assembly::AwaitingBody { head, body }, FrameEvent::End) => {
                *self = Assembly::Complete(http::Request::from_parts(head, body.freeze()));
            }
            (previous, event) => {
                return Err(DispatchError::OutOfOrder { event: event.name(), phase: previous.phase() });
            }
        }
        Ok(())
    }

    /// Takes the finished request, leaving the assembly `Idle` for the next message.
    pub fn take_request(&mut self) -> Option<BufferedRequest> {
        match std::mem::take(self) {
            Assembly::Complete(request) => Some(request),
            other => {
                *self = other;
                None
            }
        }
    }

    /// Drops whatever was in flight, e.g. when the client disconnects mid-body.
    pub fn abandon(&mut self) { *self = Assembly::Idle; }
}

/// Routes assembled requests and runs them through the reducer.
pub struct Dispatcher<R, M>
where
    M: Reducer,
{
    router: R,
    reducer: M,
    store: Store<M::State>,
    environment: M::Environment,
    location: Option<HeaderValue>,
    body_limit: usize,
}

impl<R, M> Dispatcher<R, M>
where
    R: Router<Action = M::Action>,
    M: Reducer,
{
    pub fn new(router: R, reducer: M, state: M::State, environment: M::Environment) -> Self {
        Self { router, reducer, store: Store::new(state), environment, location: None, body_limit: DEFAULT_BODY_LIMIT }
    }

    /// Advertised in the `location` header of unroutable responses.
    pub fn with_location(mut self, location: HeaderValue) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    /// Bodies longer than this are refused before they reach the router.
    pub fn body_limit(&self) -> usize { self.body_limit }

    pub fn store(&self) -> &Store<M::State> { &self.store }

    /// Feeds one framing event; yields a response once the request is complete.
    pub fn handle(&self, assembly: &mut Assembly, event: FrameEvent) -> Result<Option<Response>, DispatchError> {
        assembly.feed(event)?;
        Ok(assembly.take_request().map(|request| self.dispatch(&request)))
    }

    pub fn dispatch(&self, request: &BufferedRequest) -> Response {
        let Some(action) = self.router.route(request) else {
            tracing::warn!(method = %request.method(), uri = %request.uri(), "no route for request");
            return self.unroutable();
        };
        let response = self.store.with(|state| self.reducer.run(state, action, &self.environment));
        tracing::debug!(method = %request.method(), uri = %request.uri(), status = %response.status, "dispatched");
        response
    }

    fn unroutable(&self) -> Response {
        let mut headers = HeaderMap::new();
        if let Some(location) = &self.location {
            headers.insert(LOCATION, location.clone());
        }
        Response::new(StatusCode::INTERNAL_SERVER_ERROR, headers, Bytes::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::reducer::reducer_fn;
    use crate::http::routing::router_fn;

    fn head(method: &str, path: &str) -> Parts {
        let (parts, ()) = http::Request::builder().method(method).uri(path).body(()).unwrap().into_parts();
        parts
    }

    /// Echoes the request body length into state and status.
    fn echo_dispatcher() -> Dispatcher<impl Router<Action = usize>, impl Reducer<State = Vec<usize>, Action = usize, Environment = ()>> {
        let router = router_fn(|req: &BufferedRequest| (req.uri().path() == "/echo").then(|| req.body().len()));
        let reducer = reducer_fn(|state: &mut Vec<usize>, len: usize, _: &()| {
            state.push(len);
            Response::new(StatusCode::OK, HeaderMap::new(), len.to_string())
        });
        Dispatcher::new(router, reducer, Vec::new(), ()).with_location(HeaderValue::from_static("http://127.0.0.1:5566"))
    }

    #[test]
    fn assembles_chunks_then_dispatches() {
        let dispatcher = echo_dispatcher();
        let mut assembly = Assembly::default();

        assert!(dispatcher.handle(&mut assembly, FrameEvent::Head(head("POST", "/echo"))).unwrap().is_none());
        assert_eq!(assembly.phase(), "awaiting body");
        assert!(dispatcher.handle(&mut assembly, FrameEvent::Body(Bytes::from_static(b"abc"))).unwrap().is_none());
        assert!(dispatcher.handle(&mut assembly, FrameEvent::Body(Bytes::from_static(b"de"))).unwrap().is_none());
        let res = dispatcher.handle(&mut assembly, FrameEvent::End).unwrap().unwrap();

        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body, Bytes::from_static(b"5"));
        assert_eq!(assembly.phase(), "idle");
        assert_eq!(dispatcher.store().snapshot(), vec![5]);
    }

    #[test]
    fn assembly_is_reusable_for_the_next_message() {
        let dispatcher = echo_dispatcher();
        let mut assembly = Assembly::default();
        for _ in 0..2 {
            dispatcher.handle(&mut assembly, FrameEvent::Head(head("GET", "/echo"))).unwrap();
            assert!(dispatcher.handle(&mut assembly, FrameEvent::End).unwrap().is_some());
        }
        assert_eq!(dispatcher.store().snapshot(), vec![0, 0]);
    }

    #[test]
    fn unroutable_is_500_with_location() {
        let dispatcher = echo_dispatcher();
        let mut assembly = Assembly::default();
        dispatcher.handle(&mut assembly, FrameEvent::Head(head("GET", "/nope"))).unwrap();
        let res = dispatcher.handle(&mut assembly, FrameEvent::End).unwrap().unwrap();
        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.headers.get(LOCATION).unwrap(), "http://127.0.0.1:5566");
        assert!(res.body.is_empty());
        assert!(dispatcher.store().snapshot().is_empty());
    }

    #[test]
    fn body_limit_defaults_and_overrides() {
        assert_eq!(echo_dispatcher().body_limit(), DEFAULT_BODY_LIMIT);
        assert_eq!(echo_dispatcher().with_body_limit(16).body_limit(), 16);
    }

    #[test]
    fn out_of_order_events_reset() {
        let mut assembly = Assembly::default();
        let err = assembly.feed(FrameEvent::Body(Bytes::from_static(b"x"))).unwrap_err();
        assert!(matches!(err, DispatchError::OutOfOrder { event: "body", phase: "idle" }));

        assembly.feed(FrameEvent::Head(head("GET", "/echo"))).unwrap();
        let err = assembly.feed(FrameEvent::Head(head("GET", "/echo"))).unwrap_err();
        assert!(matches!(err, DispatchError::OutOfOrder { event: "head", phase: "awaiting body" }));
        assert_eq!(assembly.phase(), "idle");
    }

    #[test]
    fn abandon_drops_partial_request() {
        let mut assembly = Assembly::default();
        assembly.feed(FrameEvent::Head(head("POST", "/echo"))).unwrap();
        assembly.feed(FrameEvent::Body(Bytes::from_static(b"partial"))).unwrap();
        assembly.abandon();
        assert_eq!(assembly.phase(), "idle");
        assert!(assembly.take_request().is_none());
    }
}
