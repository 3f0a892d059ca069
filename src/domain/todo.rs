use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier of a to-do item, taken verbatim from the request path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TodoId(pub String);

impl TodoId {
    pub fn as_str(&self) -> &str { &self.0 }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for TodoId {
    fn from(value: &str) -> Self { Self(value.to_string()) }
}

/// A single to-do item. Timestamps travel as epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToDoItem {
    pub id: TodoId,
    pub description: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub due_to: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl ToDoItem {
    pub fn new(id: TodoId, input: CreateTodo, now: DateTime<Utc>) -> Self {
        Self { id, description: input.description, due_to: input.due_to, created_at: now, updated_at: now }
    }

    /// Applies the present fields of `input`; `id` and `created_at` never change.
    pub fn apply(&mut self, input: UpdateTodo, now: DateTime<Utc>) {
        if let Some(d) = input.description { self.description = d; }
        if let Some(due) = input.due_to { self.due_to = due; }
        // `updated_at` never precedes `created_at`, even if the clock went back.
        self.updated_at = now.max(self.created_at);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateTodo {
    pub description: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub due_to: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateTodo {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub due_to: Option<DateTime<Utc>>,
}

/// The to-do collection. Insertion order is the order `GetAll` reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoState {
    pub todos: Vec<ToDoItem>,
}

impl TodoState {
    pub fn new() -> Self { Self::default() }

    pub fn position(&self, id: &TodoId) -> Option<usize> { self.todos.iter().position(|t| &t.id == id) }

    pub fn get(&self, id: &TodoId) -> Option<&ToDoItem> { self.todos.iter().find(|t| &t.id == id) }

    pub fn len(&self) -> usize { self.todos.len() }

    pub fn is_empty(&self) -> bool { self.todos.is_empty() }
}

/// One client intent against the to-do resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoAction {
    Get(TodoId),
    GetAll,
    Create(CreateTodo),
    Update(TodoId, UpdateTodo),
    Delete(TodoId),
}
