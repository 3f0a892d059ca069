use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get};
use http::StatusCode;
use http_body_util::{BodyExt, LengthLimitError, Limited};

use crate::application::reducer::Reducer;
use crate::http::dispatcher::{Assembly, DispatchError, Dispatcher, FrameEvent};
use crate::http::routing::Router;
use crate::http::types::Response;

/// The host application: a liveness probe plus the dispatcher for everything else.
pub fn app<R, M>(dispatcher: Arc<Dispatcher<R, M>>) -> axum::Router
where
    R: Router<Action = M::Action>,
    M: Reducer,
    M::State: Send + 'static,
    M::Environment: Send + Sync + 'static,
{
    axum::Router::new()
        .route("/health", get(|| async { "ok" }))
        .fallback(dispatch::<R, M>)
        .with_state(dispatcher)
}

async fn dispatch<R, M>(State(dispatcher): State<Arc<Dispatcher<R, M>>>, request: axum::extract::Request) -> axum::response::Response
where
    R: Router<Action = M::Action>,
    M: Reducer,
    M::State: Send + 'static,
    M::Environment: Send + Sync + 'static,
{
    match drive(&dispatcher, request).await {
        Ok(response) => response.into_response(),
        Err(e @ DispatchError::TooLarge { .. }) => {
            tracing::warn!(error = %e, "request body refused");
            StatusCode::PAYLOAD_TOO_LARGE.into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "request assembly abandoned");
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}

/// Replays the hyper request as framing events: head, one event per data frame, end.
/// The body is read through a [`Limited`] wrapper; crossing the limit abandons the request.
async fn drive<R, M>(dispatcher: &Dispatcher<R, M>, request: axum::extract::Request) -> Result<Response, DispatchError>
where
    R: Router<Action = M::Action>,
    M: Reducer,
{
    let limit = dispatcher.body_limit();
    let (parts, body) = request.into_parts();
    let mut body = Limited::new(body, limit);
    let mut assembly = Assembly::default();
    dispatcher.handle(&mut assembly, FrameEvent::Head(parts))?;

    while let Some(frame) = body.frame().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                assembly.abandon();
                if e.downcast_ref::<LengthLimitError>().is_some() {
                    return Err(DispatchError::TooLarge { limit });
                }
                return Err(DispatchError::Abandoned(e.to_string()));
            }
        };
        // Trailers carry nothing the core needs.
        if let Ok(chunk) = frame.into_data() {
            dispatcher.handle(&mut assembly, FrameEvent::Body(chunk))?;
        }
    }

    dispatcher
        .handle(&mut assembly, FrameEvent::End)?
        .ok_or_else(|| DispatchError::Abandoned(format!("request incomplete while {}", assembly.phase())))
}
