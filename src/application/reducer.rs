//! Reducers and their composition.
//!
//! A [`Reducer`] turns `(state, action, environment)` into exactly one
//! [`Response`], mutating state in place. [`Pullback`] embeds a reducer over a
//! narrow `(SubState, SubAction, SubEnvironment)` triple into a reducer over a
//! wider one, so features can be wired into an application without knowing
//! its types.
//!
//! ```
//! use http::StatusCode;
//! use todo_api::application::reducer::{reducer_fn, Reducer, ReducerExt};
//! use todo_api::http::types::Response;
//!
//! #[derive(Default)]
//! struct Counter { count: i32 }
//! struct App { counter: Counter, name: String }
//! enum AppAction { Counter(i32), Rename(String) }
//!
//! let counter = reducer_fn(|state: &mut Counter, by: i32, _env: &()| {
//!     state.count += by;
//!     Response::empty(StatusCode::OK)
//! });
//! let app = counter.pullback(
//!     |app: &mut App| &mut app.counter,
//!     |action: AppAction| match action { AppAction::Counter(n) => Some(n), _ => None },
//!     |_env: &()| (),
//! );
//!
//! let mut state = App { counter: Counter::default(), name: "a".into() };
//! assert_eq!(app.run(&mut state, AppAction::Counter(2), &()).status, StatusCode::OK);
//! assert_eq!(state.counter.count, 2);
//! assert_eq!(app.run(&mut state, AppAction::Rename("b".into()), &()).status, StatusCode::NOT_FOUND);
//! assert_eq!(state.name, "a");
//! ```

use std::marker::PhantomData;

use crate::http::types::{ApiError, Response};

pub trait Reducer: Send + Sync + 'static {
    type State;
    type Action;
    type Environment;

    /// Applies `action` to `state`. Never blocks, never retries.
    fn run(&self, state: &mut Self::State, action: Self::Action, env: &Self::Environment) -> Response;
}

impl<R: Reducer + ?Sized> Reducer for Box<R> {
    type State = R::State;
    type Action = R::Action;
    type Environment = R::Environment;

    fn run(&self, state: &mut Self::State, action: Self::Action, env: &Self::Environment) -> Response {
        (**self).run(state, action, env)
    }
}

/// A reducer backed by a plain function or closure.
pub struct FnReducer<S, A, E, F> {
    f: F,
    _marker: PhantomData<fn(&mut S, A, &E)>,
}

pub fn reducer_fn<S, A, E, F>(f: F) -> FnReducer<S, A, E, F>
where
    F: Fn(&mut S, A, &E) -> Response + Send + Sync + 'static,
{
    FnReducer { f, _marker: PhantomData }
}

impl<S, A, E, F> Reducer for FnReducer<S, A, E, F>
where
    S: 'static,
    A: 'static,
    E: 'static,
    F: Fn(&mut S, A, &E) -> Response + Send + Sync + 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn run(&self, state: &mut S, action: A, env: &E) -> Response { (self.f)(state, action, env) }
}

/// A reducer lifted onto a wider state/action/environment triple.
///
/// Created by [`pullback`] or [`ReducerExt::pullback`].
pub struct Pullback<R: Reducer, S, A, E> {
    reducer: R,
    to_state: fn(&mut S) -> &mut R::State,
    to_action: fn(A) -> Option<R::Action>,
    to_environment: fn(&E) -> R::Environment,
}

pub fn pullback<R, S, A, E>(
    reducer: R,
    to_state: fn(&mut S) -> &mut R::State,
    to_action: fn(A) -> Option<R::Action>,
    to_environment: fn(&E) -> R::Environment,
) -> Pullback<R, S, A, E>
where
    R: Reducer,
{
    Pullback { reducer, to_state, to_action, to_environment }
}

impl<R, S, A, E> Reducer for Pullback<R, S, A, E>
where
    R: Reducer,
    S: 'static,
    A: 'static,
    E: 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn run(&self, state: &mut S, action: A, env: &E) -> Response {
        // An action outside this feature leaves the wider state untouched.
        let Some(sub_action) = (self.to_action)(action) else {
            return Response::from_error(&ApiError::RouteNotFound);
        };
        let sub_env = (self.to_environment)(env);
        self.reducer.run((self.to_state)(state), sub_action, &sub_env)
    }
}

pub trait ReducerExt: Reducer + Sized {
    fn pullback<S, A, E>(
        self,
        to_state: fn(&mut S) -> &mut Self::State,
        to_action: fn(A) -> Option<Self::Action>,
        to_environment: fn(&E) -> Self::Environment,
    ) -> Pullback<Self, S, A, E> {
        pullback(self, to_state, to_action, to_environment)
    }

    fn boxed(self) -> Box<dyn Reducer<State = Self::State, Action = Self::Action, Environment = Self::Environment>> {
        Box::new(self)
    }
}

impl<R: Reducer> ReducerExt for R {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::types::ErrorBody;
    use http::StatusCode;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Tally { total: i64 }

    #[derive(Debug, Clone, PartialEq)]
    struct Parent { tally: Tally, label: String }

    enum ParentAction { Add(i64), Relabel(String) }

    struct ParentEnv { factor: i64 }

    fn tally_reducer() -> impl Reducer<State = Tally, Action = i64, Environment = i64> {
        reducer_fn(|state: &mut Tally, n: i64, factor: &i64| {
            state.total += n * factor;
            Response::empty(StatusCode::ACCEPTED)
        })
    }

    fn parent_reducer() -> impl Reducer<State = Parent, Action = ParentAction, Environment = ParentEnv> {
        tally_reducer().pullback(
            |p: &mut Parent| &mut p.tally,
            |a: ParentAction| match a { ParentAction::Add(n) => Some(n), ParentAction::Relabel(_) => None },
            |e: &ParentEnv| e.factor,
        )
    }

    #[test]
    fn pullback_runs_inner_and_writes_back() {
        let reducer = parent_reducer();
        let mut state = Parent { tally: Tally::default(), label: "x".into() };
        let res = reducer.run(&mut state, ParentAction::Add(3), &ParentEnv { factor: 2 });
        assert_eq!(res.status, StatusCode::ACCEPTED);
        assert_eq!(state.tally.total, 6);
        assert_eq!(state.label, "x");
    }

    #[test]
    fn unmapped_action_is_404_and_leaves_state_alone() {
        let reducer = parent_reducer();
        let mut state = Parent { tally: Tally { total: 5 }, label: "x".into() };
        let before = state.clone();
        let res = reducer.run(&mut state, ParentAction::Relabel("y".into()), &ParentEnv { factor: 2 });
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        let body: ErrorBody = serde_json::from_slice(&res.body).unwrap();
        assert!(!body.message.is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn boxed_reducers_still_run() {
        let reducer = parent_reducer().boxed();
        let mut state = Parent { tally: Tally::default(), label: String::new() };
        reducer.run(&mut state, ParentAction::Add(1), &ParentEnv { factor: 10 });
        assert_eq!(state.tally.total, 10);
    }

    // Holds a handle that cannot be cloned; the pullback must work on it in place.
    struct Journal { lines: Vec<String>, _sink: std::sync::mpsc::Sender<String> }

    struct Holder { journal: Journal, runs: u32 }

    #[test]
    fn pullback_edits_sub_state_in_place() {
        let (sink, _rx) = std::sync::mpsc::channel();
        let reducer = reducer_fn(|journal: &mut Journal, line: String, _: &()| {
            journal.lines.push(line);
            Response::empty(StatusCode::OK)
        })
        .pullback(|h: &mut Holder| &mut h.journal, |line: String| Some(line), |_: &()| ());

        let mut state = Holder { journal: Journal { lines: Vec::new(), _sink: sink }, runs: 7 };
        reducer.run(&mut state, "one".to_string(), &());
        reducer.run(&mut state, "two".to_string(), &());

        assert_eq!(state.journal.lines, ["one", "two"]);
        assert_eq!(state.runs, 7);
    }
}
