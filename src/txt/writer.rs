use crate::core::task::Task;

/// Writes tasks back to todo.txt lines.
pub struct TodoWriter;

impl TodoWriter {
    /// Write a single task line, no trailing newline.
    ///
    /// Inverse of the parser up to the whitespace that was collapsed when
    /// inline tags were stripped out of the body.
    pub fn write_task(task: &Task) -> String {
        let mut out = String::new();

        if task.completed {
            out.push_str("x ");
        }
        if let Some(priority) = task.priority {
            out.push_str(&format!("({}) ", priority));
        }

        // A completion date is only written for a completed task that also
        // has a creation date; otherwise it is silently dropped, mirroring
        // the parser never producing that combination.
        if task.completed && task.creation_date.is_some() {
            if let Some(ref completion) = task.completion_date {
                out.push_str(completion);
                out.push(' ');
            }
        }
        if let Some(ref creation) = task.creation_date {
            out.push_str(creation);
            out.push(' ');
        }

        out.push_str(task.text());

        if let Some(ref due) = task.due_date {
            out.push_str(&format!(" due:{}", due));
        }
        if let Some(ref notes) = task.notes {
            out.push_str(&format!(" notes:[[[{}]]]", escape_notes(notes)));
        }

        out
    }

    /// Write a complete document: one line per task, each newline-terminated,
    /// the last included.
    pub fn write_file(tasks: &[Task]) -> String {
        let mut out = String::new();
        for task in tasks {
            out.push_str(&Self::write_task(task));
            out.push('\n');
        }
        log::debug!("wrote {} tasks", tasks.len());
        out
    }
}

/// Inverse of the parser's unescaping: `]` then newline.
fn escape_notes(notes: &str) -> String {
    notes.replace(']', "\\]").replace('\n', "\\n")
}
