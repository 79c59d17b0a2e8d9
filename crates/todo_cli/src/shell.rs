//! Interactive menu shell.
//!
//! # Responsibility
//! - Read menu choices and render task lists.
//! - Translate 1-based list positions into task ids before calling core.
//! - Report each core error kind with its own message and keep the session
//!   alive.
//!
//! # Invariants
//! - Positions refer to the `list(StatusFilter::All)` ordering shown just
//!   before the prompt; they are never stored.
//! - End of input ends the session normally.

use log::debug;
use std::fmt::Display;
use std::io::{self, BufRead, Write};
use todo_core::{SearchQuery, StatusFilter, Task, TaskRepository, TaskService, TaskServiceError};

const MENU: &str = "
=== ToDo: console task manager ===
1) Add task
2) Delete task
3) Mark task done
4) Show tasks
5) Edit task
6) Search tasks
0) Exit
";

const EDIT_MENU: &str = "
What to change?
1) Rename
2) Toggle done / not done
0) Cancel
";

#[derive(Debug)]
enum ShellError {
    Io(io::Error),
    Service(TaskServiceError),
}

impl From<io::Error> for ShellError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<TaskServiceError> for ShellError {
    fn from(value: TaskServiceError) -> Self {
        Self::Service(value)
    }
}

type ShellResult<T> = Result<T, ShellError>;

/// Menu-driven front end over a [`TaskService`].
pub struct ConsoleShell<'a, R: TaskRepository, I: BufRead, O: Write> {
    service: &'a mut TaskService<R>,
    input: I,
    output: O,
}

impl<'a, R: TaskRepository, I: BufRead, O: Write> ConsoleShell<'a, R, I, O> {
    pub fn new(service: &'a mut TaskService<R>, input: I, output: O) -> Self {
        Self {
            service,
            input,
            output,
        }
    }

    /// Runs until the user exits or input ends.
    ///
    /// # Errors
    /// - Returns terminal I/O failures; core errors are reported inline.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            write!(self.output, "{MENU}")?;
            let Some(choice) = self.prompt("Choose an action: ")? else {
                writeln!(self.output, "\nInput closed. Bye!")?;
                return Ok(());
            };

            let outcome = match choice.as_str() {
                "0" => {
                    writeln!(self.output, "Bye!")?;
                    return Ok(());
                }
                "1" => self.add_task(),
                "2" => self.delete_task(),
                "3" => self.mark_done(),
                "4" => self.print_tasks().map_err(ShellError::from),
                "5" => self.edit_task(),
                "6" => self.search_tasks(),
                _ => {
                    writeln!(self.output, "Unknown command. Enter a number from the menu (0-6).")?;
                    Ok(())
                }
            };

            match outcome {
                Ok(()) => {}
                Err(ShellError::Io(err)) => return Err(err),
                Err(ShellError::Service(err)) => self.report(&err)?,
            }
        }
    }

    fn report(&mut self, err: &TaskServiceError) -> io::Result<()> {
        debug!("event=shell_error module=cli kind={}", error_kind(err));
        match err {
            TaskServiceError::Validation(_) | TaskServiceError::NotFound(_) => {
                writeln!(self.output, "Error: {err}")
            }
            TaskServiceError::Storage(_) => {
                writeln!(self.output, "Warning: {err}")?;
                writeln!(self.output, "Changes were not saved.")
            }
        }
    }

    fn add_task(&mut self) -> ShellResult<()> {
        let title = self.prompt("Task title: ")?.unwrap_or_default();
        let task = self.service.add(&title)?;
        writeln!(self.output, "Added: {}", task.title)?;
        Ok(())
    }

    fn delete_task(&mut self) -> ShellResult<()> {
        if let Some(task) = self.choose_task("delete")? {
            let deleted = self.service.delete(task.id)?;
            writeln!(self.output, "Deleted: {}", deleted.title)?;
        }
        Ok(())
    }

    fn mark_done(&mut self) -> ShellResult<()> {
        if let Some(task) = self.choose_task("mark as done")? {
            let was_done = task.done;
            let task = self.service.mark_done(task.id)?;
            if was_done {
                writeln!(self.output, "Already done: {}", task.title)?;
            } else {
                writeln!(self.output, "Done: {}", task.title)?;
            }
        }
        Ok(())
    }

    fn edit_task(&mut self) -> ShellResult<()> {
        let Some(task) = self.choose_task("edit")? else {
            return Ok(());
        };

        write!(self.output, "{EDIT_MENU}")?;
        match self.prompt("Choose an action: ")?.as_deref() {
            Some("1") => {
                let title = self.prompt("New title: ")?.unwrap_or_default();
                let updated = self.service.update_title(task.id, &title)?;
                writeln!(self.output, "Updated: {}", updated.title)?;
            }
            Some("2") => {
                let updated = self.service.toggle_done(task.id)?;
                let state = if updated.done { "done" } else { "not done" };
                writeln!(self.output, "Status changed: {} - {state}", updated.title)?;
            }
            Some("0") | Some("") | None => writeln!(self.output, "Cancelled.")?,
            Some(_) => writeln!(self.output, "Unknown command.")?,
        }
        Ok(())
    }

    fn search_tasks(&mut self) -> ShellResult<()> {
        let text = self.prompt("Search for: ")?.unwrap_or_default();
        if text.is_empty() {
            writeln!(self.output, "Cancelled.")?;
            return Ok(());
        }

        let hits = self.service.search(&SearchQuery::new(text));
        if hits.is_empty() {
            writeln!(self.output, "Nothing found.")?;
            return Ok(());
        }
        writeln!(self.output, "\nMatches:")?;
        for (position, hit) in hits.iter().enumerate() {
            writeln!(
                self.output,
                "  {}) {} {} (score: {:.2})",
                position + 1,
                status_marker(&hit.task),
                hit.task.title,
                hit.score
            )?;
        }
        Ok(())
    }

    fn print_tasks(&mut self) -> io::Result<()> {
        let tasks = self.service.list(StatusFilter::All);
        if tasks.is_empty() {
            return writeln!(self.output, "The task list is empty.");
        }
        self.render_list(&tasks)
    }

    fn render_list(&mut self, tasks: &[Task]) -> io::Result<()> {
        writeln!(self.output, "\nYour tasks:")?;
        for (position, task) in tasks.iter().enumerate() {
            write!(
                self.output,
                "  {}) {} {}",
                position + 1,
                status_marker(task),
                task.title
            )?;
            if !task.created_at.is_empty() {
                write!(self.output, " (created: {})", task.created_at)?;
            }
            writeln!(self.output)?;
        }
        writeln!(self.output)
    }

    /// Shows the list and maps the chosen 1-based position to a task.
    fn choose_task(&mut self, action: &str) -> io::Result<Option<Task>> {
        let tasks = self.service.list(StatusFilter::All);
        if tasks.is_empty() {
            writeln!(self.output, "The task list is empty.")?;
            return Ok(None);
        }
        self.render_list(&tasks)?;

        let prompt = format!("Task number to {action} (Enter to cancel): ");
        let raw = self.prompt(&prompt)?.unwrap_or_default();
        if raw.is_empty() {
            writeln!(self.output, "Cancelled.")?;
            return Ok(None);
        }
        let Ok(position) = raw.parse::<usize>() else {
            writeln!(self.output, "Expected a whole number.")?;
            return Ok(None);
        };
        match position.checked_sub(1).and_then(|index| tasks.get(index)) {
            Some(task) => Ok(Some(task.clone())),
            None => {
                writeln!(self.output, "No task with number {position}.")?;
                Ok(None)
            }
        }
    }

    /// Prints `label` and reads one trimmed line; `None` at end of input.
    fn prompt(&mut self, label: impl Display) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

fn status_marker(task: &Task) -> &'static str {
    if task.done {
        "[x]"
    } else {
        "[ ]"
    }
}

fn error_kind(err: &TaskServiceError) -> &'static str {
    match err {
        TaskServiceError::Validation(_) => "validation",
        TaskServiceError::NotFound(_) => "not_found",
        TaskServiceError::Storage(_) => "storage",
    }
}
