use crate::model::{NewTask, Task, TaskPatch};

/// Requests sent from the UI loop to the service actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    LoadTasks,
    CreateTask(NewTask),
    UpdateTask(i64, TaskPatch),
    ToggleCompletion(i64, bool),
    DeleteTask(i64),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Create,
    Update,
    Toggle,
    Delete,
}

impl Operation {
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Load => "Failed to load tasks",
            Operation::Create => "Failed to create task",
            Operation::Update => "Failed to update task",
            Operation::Toggle => "Failed to update task status",
            Operation::Delete => "Failed to delete task",
        }
    }
}

/// Completed service calls, delivered back to the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    TasksLoaded(Vec<Task>),
    TaskCreated(Task),
    TaskUpdated(Task),
    CompletionToggled(Task),
    TaskDeleted { id: i64, removed: bool },
    Failed { op: Operation, error: String },
}
