//! Request routers: buffered request in, typed action (or nothing) out.
//!
//! Routers compose two ways. [`combine`] tries an ordered list and keeps the
//! first match; [`RouterExt::map`] lifts a feature router onto the
//! application's wider action type.

use bytes::Bytes;

/// A fully assembled request: head plus the whole body.
pub type BufferedRequest = http::Request<Bytes>;

pub trait Router: Send + Sync + 'static {
    type Action;

    /// `None` means "not mine"; it is never an error.
    fn route(&self, request: &BufferedRequest) -> Option<Self::Action>;
}

impl<R: Router + ?Sized> Router for Box<R> {
    type Action = R::Action;

    fn route(&self, request: &BufferedRequest) -> Option<Self::Action> { (**self).route(request) }
}

pub type BoxRouter<A> = Box<dyn Router<Action = A>>;

/// Tries each router in order; the first `Some` wins.
pub struct Combined<A> {
    routers: Vec<BoxRouter<A>>,
}

pub fn combine<A: 'static>(routers: Vec<BoxRouter<A>>) -> Combined<A> { Combined { routers } }

impl<A: 'static> Router for Combined<A> {
    type Action = A;

    fn route(&self, request: &BufferedRequest) -> Option<A> { self.routers.iter().find_map(|r| r.route(request)) }
}

pub struct Mapped<R, F> {
    router: R,
    f: F,
}

impl<R, F, B> Router for Mapped<R, F>
where
    R: Router,
    F: Fn(R::Action) -> B + Send + Sync + 'static,
    B: 'static,
{
    type Action = B;

    fn route(&self, request: &BufferedRequest) -> Option<B> { self.router.route(request).map(&self.f) }
}

/// A router backed by a plain function or closure.
pub struct FnRouter<F> {
    f: F,
}

pub fn router_fn<A, F>(f: F) -> FnRouter<F>
where
    F: Fn(&BufferedRequest) -> Option<A> + Send + Sync + 'static,
{
    FnRouter { f }
}

impl<A, F> Router for FnRouter<F>
where
    F: Fn(&BufferedRequest) -> Option<A> + Send + Sync + 'static,
    A: 'static,
{
    type Action = A;

    fn route(&self, request: &BufferedRequest) -> Option<A> { (self.f)(request) }
}

pub trait RouterExt: Router + Sized {
    /// Wraps every matched action with `f`, typically an enum constructor.
    fn map<B, F>(self, f: F) -> Mapped<Self, F>
    where
        F: Fn(Self::Action) -> B + Send + Sync + 'static,
    {
        Mapped { router: self, f }
    }

    fn boxed(self) -> BoxRouter<Self::Action> { Box::new(self) }
}

impl<R: Router> RouterExt for R {}

/// Non-empty path segments, without percent-decoding.
pub fn path_segments(request: &BufferedRequest) -> Vec<&str> {
    request.uri().path().split('/').filter(|s| !s.is_empty()).collect()
}
