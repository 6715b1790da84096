use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::core::task::{Priority, Task};

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

static PROJECT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(^| )(\+[^\s]+)").unwrap());

static CONTEXT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(^| )(@[^\s]+)").unwrap());

// The due/notes patterns leave the right delimiter unconsumed so that two
// tags sharing a single delimiter space are both recognized; the right edge
// is checked separately in bounded_right.
static DUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^| )due:(?P<date>\d{4}-\d{2}-\d{2})").unwrap());

static NOTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(^| )notes:\[\[\[(?P<content>[^"]+)\]\]\]"#).unwrap());

/// Parses todo.txt task lines.
pub struct TodoParser;

/// A parsed task body with its extracted inline tags.
#[derive(Debug, Clone)]
pub struct ParsedBody {
    /// Body text with due/notes tags stripped and the ends trimmed. Internal
    /// spacing left over from stripping is not collapsed.
    pub text: String,
    pub due_date: Option<String>,
    pub notes: Option<String>,
    pub projects: HashSet<String>,
    pub contexts: HashSet<String>,
}

impl TodoParser {
    /// Parse a whole document: one task per non-empty line, in order.
    pub fn parse(input: &str) -> Vec<Task> {
        let tasks: Vec<Task> = input
            .split('\n')
            .filter(|line| !line.is_empty())
            .map(Self::parse_line)
            .collect();
        log::debug!("parsed {} tasks", tasks.len());
        tasks
    }

    /// Parse one full task line: positional header, then the body pipeline.
    ///
    /// Never fails. Anything that does not match the header grammar exactly
    /// is left as body text.
    pub fn parse_line(line: &str) -> Task {
        let mut task = Task::new();
        let bytes = line.as_bytes();
        let mut pos = 0;

        // Completion marker: "x "
        if bytes.len() >= pos + 2 && bytes[pos] == b'x' && bytes[pos + 1] == b' ' {
            task.completed = true;
            pos += 2;
        }

        // Priority: "(A) " exactly; lowercase does not match
        if bytes.len() >= pos + 4
            && bytes[pos] == b'('
            && bytes[pos + 1].is_ascii_uppercase()
            && bytes[pos + 2] == b')'
            && bytes[pos + 3] == b' '
        {
            task.priority = Priority::from_char(bytes[pos + 1] as char);
            pos += 4;
        }

        // First leading date. It is the creation date, unless a second date
        // follows on a completed task, in which case the first is the
        // completion date. On a single date the completion date stays unset
        // even for completed tasks, and an incomplete task never gets a
        // second date: the token stays in the body text.
        if let Some(date) = leading_date(&line[pos..]) {
            task.creation_date = Some(date.to_string());
            pos += 11;

            if task.completed {
                if let Some(second) = leading_date(&line[pos..]) {
                    task.completion_date = task.creation_date.take();
                    task.creation_date = Some(second.to_string());
                    pos += 11;
                }
            }
        }

        task.set_text(&line[pos..]);
        task
    }

    /// Run the body pipeline only: collect projects and contexts, extract
    /// due/notes tags and strip them, trim the ends.
    pub fn parse_body(text: &str) -> ParsedBody {
        let mut projects = HashSet::new();
        let mut contexts = HashSet::new();

        // Projects and contexts are collected before due/notes stripping and
        // stay visible in the text, so an @token inside notes content counts
        // as a context too.
        for caps in PROJECT_RE.captures_iter(text) {
            projects.insert(caps[2].to_string());
        }
        for caps in CONTEXT_RE.captures_iter(text) {
            contexts.insert(caps[2].to_string());
        }

        let (work, due_date) = extract_due(text);
        let (work, notes) = extract_notes(&work);

        ParsedBody {
            text: work.trim().to_string(),
            due_date,
            notes,
            projects,
            contexts,
        }
    }
}

/// Matches a 10-character `NNNN-NN-NN` token followed by a space at the
/// start of `rest`. Lexical only; 2022-13-40 is accepted.
fn leading_date(rest: &str) -> Option<&str> {
    if rest.len() < 11 || rest.as_bytes()[10] != b' ' {
        return None;
    }
    let token = &rest[..10];
    DATE_RE.is_match(token).then_some(token)
}

/// Extract every bounded `due:` tag; the last one wins. Matched occurrences
/// collapse to a single space in the returned text.
fn extract_due(text: &str) -> (String, Option<String>) {
    let mut due = None;
    let mut spans = Vec::new();
    for caps in DUE_RE.captures_iter(text) {
        let m = caps.get(0).unwrap();
        if !bounded_right(text, m.end()) {
            continue;
        }
        due = Some(caps["date"].to_string());
        spans.push((m.start(), strip_end(text, m.end())));
    }
    (strip_spans(text, &spans), due)
}

/// Extract every bounded `notes:[[[...]]]` tag; the last one wins, with
/// `\]` and `\n` escapes resolved. Matched occurrences collapse to a single
/// space in the returned text.
fn extract_notes(text: &str) -> (String, Option<String>) {
    let mut notes = None;
    let mut spans = Vec::new();
    for caps in NOTES_RE.captures_iter(text) {
        let m = caps.get(0).unwrap();
        if !bounded_right(text, m.end()) {
            continue;
        }
        notes = Some(unescape_notes(&caps["content"]));
        spans.push((m.start(), strip_end(text, m.end())));
    }
    (strip_spans(text, &spans), notes)
}

/// A tag match is only valid when followed by a space or end of text.
fn bounded_right(text: &str, end: usize) -> bool {
    end == text.len() || text.as_bytes()[end] == b' '
}

/// Extends a match to swallow its right delimiter space, when present.
fn strip_end(text: &str, end: usize) -> usize {
    if end < text.len() { end + 1 } else { end }
}

/// Replaces each span with a single space. Overlapping spans (adjacent tags
/// sharing one delimiter space) merge into one replacement.
fn strip_spans(text: &str, spans: &[(usize, usize)]) -> String {
    if spans.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    for &(start, end) in spans {
        if start >= pos {
            out.push_str(&text[pos..start]);
            out.push(' ');
            pos = end;
        } else if end > pos {
            pos = end;
        }
    }
    out.push_str(&text[pos..]);
    out
}

fn unescape_notes(content: &str) -> String {
    content.replace("\\]", "]").replace("\\n", "\n")
}
