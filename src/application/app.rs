use std::sync::Arc;

use crate::application::reducer::{Reducer, ReducerExt};
use crate::application::todo_reducer::{TodoEnvironment, TodoReducer};
use crate::domain::environment::{Clock, EncodeError, Encoder, IdGenerator};
use crate::domain::todo::{TodoAction, TodoState};
use crate::http::routes::todos::TodoRouter;
use crate::http::routing::{combine, Router, RouterExt};
use crate::infrastructure::effects::{JsonEncoder, SystemClock, UuidGenerator};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub todo: TodoState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Todo(TodoAction),
}

impl AppAction {
    pub fn todo(self) -> Option<TodoAction> {
        match self {
            AppAction::Todo(action) => Some(action),
        }
    }
}

#[derive(Clone)]
pub struct AppEnvironment {
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<dyn IdGenerator>,
    pub encoder: Arc<dyn Encoder>,
}

impl AppEnvironment {
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>, encoder: Arc<dyn Encoder>) -> Self {
        Self { clock, ids, encoder }
    }

    /// Wall clock, random UUIDs and JSON output.
    pub fn live(encoder: JsonEncoder) -> Self { Self::new(Arc::new(SystemClock), Arc::new(UuidGenerator), Arc::new(encoder)) }

    pub fn todo(&self) -> TodoEnvironment {
        TodoEnvironment::new(self.clock.clone(), self.ids.clone(), self.encoder.clone())
    }

    /// Encodes a trivial payload once so a broken encoder fails startup, not requests.
    pub fn verify_encoder(&self) -> Result<(), EncodeError> {
        self.encoder.encode(&serde_json::Value::Array(Vec::new())).map(|_| ())
    }
}

pub fn app_reducer() -> impl Reducer<State = AppState, Action = AppAction, Environment = AppEnvironment> {
    TodoReducer.pullback(|s: &mut AppState| &mut s.todo, AppAction::todo, AppEnvironment::todo)
}

pub fn app_router() -> impl Router<Action = AppAction> {
    combine(vec![TodoRouter.map(AppAction::Todo).boxed()])
}
