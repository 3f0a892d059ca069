use std::sync::Arc;

use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::Serialize;

use crate::application::reducer::Reducer;
use crate::domain::environment::{Clock, EncodeError, Encoder, IdGenerator};
use crate::domain::todo::{ToDoItem, TodoAction, TodoId, TodoState};
use crate::http::types::{ApiError, Response};

/// Effects the to-do reducer is allowed to perform.
#[derive(Clone)]
pub struct TodoEnvironment {
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<dyn IdGenerator>,
    pub encoder: Arc<dyn Encoder>,
}

impl TodoEnvironment {
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>, encoder: Arc<dyn Encoder>) -> Self {
        Self { clock, ids, encoder }
    }

    pub fn now(&self) -> DateTime<Utc> { self.clock.now() }

    pub fn new_id(&self) -> TodoId { TodoId(self.ids.next_id()) }

    pub fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, EncodeError> {
        let value = serde_json::to_value(value)?;
        self.encoder.encode(&value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TodoReducer;

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn run(&self, state: &mut TodoState, action: TodoAction, env: &TodoEnvironment) -> Response {
        match action {
            TodoAction::Get(id) => match state.get(&id) {
                Some(item) => respond(StatusCode::OK, item, env),
                None => not_found(id),
            },
            TodoAction::GetAll => respond(StatusCode::OK, &state.todos, env),
            TodoAction::Create(input) => {
                let item = ToDoItem::new(env.new_id(), input, env.now());
                state.todos.push(item.clone());
                respond(StatusCode::CREATED, &item, env)
            }
            TodoAction::Update(id, input) => {
                let Some(index) = state.position(&id) else { return not_found(id) };
                let item = &mut state.todos[index];
                item.apply(input, env.now());
                let item = item.clone();
                respond(StatusCode::OK, &item, env)
            }
            TodoAction::Delete(id) => {
                let Some(index) = state.position(&id) else { return not_found(id) };
                let removed = state.todos.remove(index);
                respond(StatusCode::NO_CONTENT, &removed, env)
            }
        }
    }
}

fn respond<T: Serialize>(status: StatusCode, value: &T, env: &TodoEnvironment) -> Response {
    match env.encode(value) {
        Ok(body) => Response::json(status, body),
        // State changes already applied stay applied.
        Err(e) => {
            tracing::error!(error = %e, "failed to encode response body");
            Response::from_error(&ApiError::Encoding(e))
        }
    }
}

fn not_found(id: TodoId) -> Response {
    tracing::debug!(%id, "to-do item not found");
    Response::from_error(&ApiError::TodoNotFound { id })
}
