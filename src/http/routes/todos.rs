use http::Method;
use serde::de::DeserializeOwned;

use crate::domain::todo::{CreateTodo, TodoAction, TodoId, UpdateTodo};
use crate::http::routing::{path_segments, BufferedRequest, Router};

pub const RESOURCE: &str = "todos";

/// Maps `/todos` and `/todos/{id}` requests to [`TodoAction`]s.
///
/// The resource segment may appear anywhere in the path; the id is the
/// segment right after it, taken verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct TodoRouter;

impl Router for TodoRouter {
    type Action = TodoAction;

    fn route(&self, request: &BufferedRequest) -> Option<TodoAction> {
        let segments = path_segments(request);
        let index = segments.iter().position(|s| *s == RESOURCE)?;
        let id = segments.get(index + 1).map(|s| TodoId::from(*s));

        match *request.method() {
            Method::GET => Some(match id {
                Some(id) => TodoAction::Get(id),
                None => TodoAction::GetAll,
            }),
            Method::POST => decode::<CreateTodo>(request).map(TodoAction::Create),
            Method::PUT => {
                let id = id?;
                decode::<UpdateTodo>(request).map(|body| TodoAction::Update(id, body))
            }
            Method::DELETE => id.map(TodoAction::Delete),
            _ => None,
        }
    }
}

fn decode<T: DeserializeOwned>(request: &BufferedRequest) -> Option<T> {
    match serde_json::from_slice(request.body()) {
        Ok(body) => Some(body),
        Err(e) => {
            tracing::debug!(error = %e, "request body did not decode");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::{TimeZone, Utc};

    fn request(method: &str, path: &str, body: &str) -> BufferedRequest {
        http::Request::builder().method(method).uri(path).body(Bytes::from(body.to_string())).unwrap()
    }

    fn route(method: &str, path: &str, body: &str) -> Option<TodoAction> { TodoRouter.route(&request(method, path, body)) }

    #[test]
    fn get_one_and_all() {
        assert_eq!(route("GET", "/todos", ""), Some(TodoAction::GetAll));
        assert_eq!(route("GET", "/todos/", ""), Some(TodoAction::GetAll));
        assert_eq!(route("GET", "/todos/abc", ""), Some(TodoAction::Get(TodoId::from("abc"))));
        assert_eq!(route("GET", "/api/todos/abc/extra", ""), Some(TodoAction::Get(TodoId::from("abc"))));
    }

    #[test]
    fn id_is_taken_verbatim() {
        assert_eq!(route("GET", "/todos/a%20b", ""), Some(TodoAction::Get(TodoId::from("a%20b"))));
    }

    #[test]
    fn other_resources_do_not_match() {
        assert_eq!(route("GET", "/orders/1", ""), None);
        assert_eq!(route("GET", "/", ""), None);
        assert_eq!(route("GET", "/todoss", ""), None);
    }

    #[test]
    fn post_decodes_create_body() {
        let action = route("POST", "/todos", r#"{"description":"Blob","due_to":645606000000}"#);
        let due_to = Utc.timestamp_millis_opt(645_606_000_000).unwrap();
        assert_eq!(action, Some(TodoAction::Create(CreateTodo { description: "Blob".into(), due_to })));
    }

    #[test]
    fn post_with_bad_body_is_unroutable() {
        assert_eq!(route("POST", "/todos", ""), None);
        assert_eq!(route("POST", "/todos", r#"{"description":"Blob"}"#), None);
        assert_eq!(route("POST", "/todos", "not json"), None);
    }

    #[test]
    fn put_needs_id_and_body() {
        assert_eq!(
            route("PUT", "/todos/XYZ", r#"{"description":"New"}"#),
            Some(TodoAction::Update(TodoId::from("XYZ"), UpdateTodo { description: Some("New".into()), due_to: None }))
        );
        assert_eq!(route("PUT", "/todos", r#"{"description":"New"}"#), None);
        assert_eq!(route("PUT", "/todos/XYZ", ""), None);
    }

    #[test]
    fn delete_needs_id() {
        assert_eq!(route("DELETE", "/todos/XYZ", ""), Some(TodoAction::Delete(TodoId::from("XYZ"))));
        assert_eq!(route("DELETE", "/todos", ""), None);
    }

    #[test]
    fn other_methods_do_not_match() {
        assert_eq!(route("PATCH", "/todos/XYZ", "{}"), None);
        assert_eq!(route("HEAD", "/todos", ""), None);
    }
}
