use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

use crate::txt::parser::TodoParser;
use crate::txt::writer::TodoWriter;

/// Task priority: a single uppercase letter, `(A)` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Priority(char);

impl Priority {
    /// Accepts A-Z only; lowercase letters are not priorities.
    pub fn from_char(c: char) -> Option<Self> {
        c.is_ascii_uppercase().then_some(Self(c))
    }

    pub fn as_char(self) -> char {
        self.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One todo.txt task line.
///
/// Dates are opaque `NNNN-NN-NN` tokens; the codec checks their shape, never
/// their calendar validity.
#[derive(Debug, Serialize, Deserialize)]
pub struct Task {
    /// In-memory identity for collection bookkeeping. Never written to the
    /// line format and ignored by equality.
    #[serde(skip, default = "Uuid::new_v4")]
    pub id: Uuid,
    pub completed: bool,
    pub priority: Option<Priority>,
    /// Only meaningful on completed tasks that also carry a creation date.
    pub completion_date: Option<String>,
    pub creation_date: Option<String>,
    pub due_date: Option<String>,
    /// Multi-line notes.
    pub notes: Option<String>,
    text: String,
    /// Project tags, `+` sigil included. Left visible in the text.
    pub projects: HashSet<String>,
    /// Context tags, `@` sigil included. Left visible in the text.
    pub contexts: HashSet<String>,
}

impl Task {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            completed: false,
            priority: None,
            completion_date: None,
            creation_date: None,
            due_date: None,
            notes: None,
            text: String::new(),
            projects: HashSet::new(),
            contexts: HashSet::new(),
        }
    }

    /// Parse a full task line, header and body.
    pub fn from_line(line: &str) -> Self {
        TodoParser::parse_line(line)
    }

    /// Body text of the task, inline project/context tags included.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the body text and re-extract its inline tags.
    ///
    /// Header fields (completion, priority, dates) are untouched; they are
    /// parsed once, from a full line. A due date or notes already on the task
    /// survive unless the new text carries its own tag; projects and contexts
    /// are rebuilt from scratch on every call.
    pub fn set_text(&mut self, text: &str) {
        let body = TodoParser::parse_body(text);
        self.text = body.text;
        self.projects = body.projects;
        self.contexts = body.contexts;
        if body.due_date.is_some() {
            self.due_date = body.due_date;
        }
        if body.notes.is_some() {
            self.notes = body.notes;
        }
    }

    /// Copy via a full encode/decode round trip, so the copy is exactly what
    /// re-reading the serialized line would produce. The copy gets a fresh id.
    pub fn duplicate(&self) -> Self {
        TodoParser::parse_line(&self.to_string())
    }

    pub fn complete(&mut self, date: impl Into<String>) {
        self.completed = true;
        self.completion_date = Some(date.into());
    }

    pub fn reopen(&mut self) {
        self.completed = false;
        self.completion_date = None;
    }

    pub fn has_project(&self, project: &str) -> bool {
        self.projects.contains(project)
    }

    pub fn has_context(&self, ctx: &str) -> bool {
        self.contexts.contains(ctx)
    }
}

impl Default for Task {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&TodoWriter::write_task(self))
    }
}

/// Content equality; `id` is per-instance bookkeeping, not content.
impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.completed == other.completed
            && self.priority == other.priority
            && self.completion_date == other.completion_date
            && self.creation_date == other.creation_date
            && self.due_date == other.due_date
            && self.notes == other.notes
            && self.text == other.text
            && self.projects == other.projects
            && self.contexts == other.contexts
    }
}

impl Eq for Task {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_text_preserves_header() {
        let mut task = Task::from_line("x (A) 2022-05-10 2022-05-01 buy milk");
        task.set_text("buy bread +errands");
        assert!(task.completed);
        assert_eq!(task.priority, Priority::from_char('A'));
        assert_eq!(task.completion_date.as_deref(), Some("2022-05-10"));
        assert_eq!(task.creation_date.as_deref(), Some("2022-05-01"));
        assert_eq!(task.text(), "buy bread +errands");
        assert!(task.has_project("+errands"));
    }

    #[test]
    fn set_text_keeps_old_due_date_when_absent() {
        let mut task = Task::from_line("call mom due:2022-01-01");
        task.set_text("call dad");
        assert_eq!(task.due_date.as_deref(), Some("2022-01-01"));

        task.set_text("call dad due:2022-03-03");
        assert_eq!(task.due_date.as_deref(), Some("2022-03-03"));
    }

    #[test]
    fn set_text_keeps_old_notes_when_absent() {
        let mut task = Task::from_line("pack bags notes:[[[passport]]]");
        task.set_text("pack bags again");
        assert_eq!(task.notes.as_deref(), Some("passport"));
    }

    #[test]
    fn set_text_rebuilds_tag_sets() {
        let mut task = Task::from_line("fix +app @home bug");
        task.set_text("write docs @work");
        assert!(task.projects.is_empty());
        assert_eq!(task.contexts, HashSet::from(["@work".to_string()]));
    }

    #[test]
    fn duplicate_is_a_reparse() {
        let task = Task::from_line("x 2022-05-10 2022-05-01 ship it +app due:2022-06-01");
        let copy = task.duplicate();
        assert_eq!(task, copy);
        assert_ne!(task.id, copy.id);
    }

    #[test]
    fn equality_ignores_id() {
        let a = Task::from_line("(B) water plants @home");
        let b = Task::from_line("(B) water plants @home");
        assert_ne!(a.id, b.id);
        assert_eq!(a, b);
    }

    #[test]
    fn complete_and_reopen() {
        let mut task = Task::from_line("2022-05-01 water plants");
        task.complete("2022-05-10");
        assert!(task.completed);
        assert_eq!(task.to_string(), "x 2022-05-10 2022-05-01 water plants");

        task.reopen();
        assert!(!task.completed);
        assert_eq!(task.to_string(), "2022-05-01 water plants");
    }

    #[test]
    fn display_matches_writer() {
        let task = Task::from_line("(C) fix +app @home bug due:2022-06-01");
        assert_eq!(task.to_string(), TodoWriter::write_task(&task));
    }

    #[test]
    fn serde_roundtrip_gets_fresh_id() {
        let task = Task::from_line("x 2022-05-10 2022-05-01 ship it +app");
        let json = serde_json::to_string(&task).unwrap();
        assert!(!json.contains(&task.id.to_string()));
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(task, back);
        assert_ne!(task.id, back.id);
    }
}
