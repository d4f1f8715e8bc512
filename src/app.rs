//! Todo-list application runtime
//!
//! Consumes hydrated flags on init and sends `{tasks, uid}` through its
//! persist port after every update. The bridge never looks inside.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::flags::Flags;
use crate::port::PersistPort;

/// An application that can be started with flags and a persist port
pub trait Program {
    /// Mount on `mount`, start from `flags`, send state to save on `persist`
    fn init(&mut self, mount: &str, flags: Value, persist: PersistPort);
}

/// A single todo entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub description: String,
    pub completed: bool,
    #[serde(default)]
    pub editing: bool,
    pub id: u64,
}

impl Task {
    pub fn new(description: impl Into<String>, id: u64) -> Self {
        Self {
            description: description.into(),
            completed: false,
            editing: false,
            id,
        }
    }
}

/// Which tasks are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    All,
    Active,
    Completed,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::All => "All",
            Visibility::Active => "Active",
            Visibility::Completed => "Completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "all" => Some(Visibility::All),
            "active" => Some(Visibility::Active),
            "completed" => Some(Visibility::Completed),
            _ => None,
        }
    }

    pub fn shows(&self, task: &Task) -> bool {
        match self {
            Visibility::All => true,
            Visibility::Active => !task.completed,
            Visibility::Completed => task.completed,
        }
    }
}

/// Full application state; only `tasks` and `uid` are persisted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub tasks: Vec<Task>,
    pub uid: u64,
    /// Text in the new-task input
    pub field: String,
    pub visibility: Visibility,
}

/// User actions
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    UpdateField(String),
    Add,
    UpdateTask { id: u64, description: String },
    EditingTask { id: u64, editing: bool },
    Delete(u64),
    DeleteComplete,
    Check { id: u64, completed: bool },
    CheckAll(bool),
    ChangeVisibility(Visibility),
}

#[derive(Debug, Default)]
pub struct TodoApp {
    model: Model,
    mount: Option<String>,
    persist: Option<PersistPort>,
}

impl TodoApp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Mount point given at init, if started
    pub fn mount(&self) -> Option<&str> {
        self.mount.as_deref()
    }

    /// Apply a message, then ask for the new state to be persisted
    pub fn update(&mut self, msg: Msg) {
        let model = &mut self.model;
        match msg {
            Msg::UpdateField(text) => model.field = text,
            Msg::Add => {
                let description = model.field.trim();
                if !description.is_empty() {
                    model.tasks.push(Task::new(description, model.uid));
                    model.uid += 1;
                }
                model.field.clear();
            }
            Msg::UpdateTask { id, description } => {
                if let Some(task) = model.tasks.iter_mut().find(|t| t.id == id) {
                    task.description = description;
                }
            }
            Msg::EditingTask { id, editing } => {
                if let Some(task) = model.tasks.iter_mut().find(|t| t.id == id) {
                    task.editing = editing;
                }
                // Finishing an edit with nothing left removes the task
                if !editing {
                    model
                        .tasks
                        .retain(|t| t.id != id || !t.description.trim().is_empty());
                }
            }
            Msg::Delete(id) => model.tasks.retain(|t| t.id != id),
            Msg::DeleteComplete => model.tasks.retain(|t| !t.completed),
            Msg::Check { id, completed } => {
                if let Some(task) = model.tasks.iter_mut().find(|t| t.id == id) {
                    task.completed = completed;
                }
            }
            Msg::CheckAll(completed) => {
                for task in &mut model.tasks {
                    task.completed = completed;
                }
            }
            Msg::ChangeVisibility(visibility) => model.visibility = visibility,
        }
        self.persist();
    }

    /// Tasks matching the current visibility filter
    pub fn visible_tasks(&self) -> impl Iterator<Item = &Task> {
        let visibility = self.model.visibility;
        self.model.tasks.iter().filter(move |t| visibility.shows(t))
    }

    pub fn active_count(&self) -> usize {
        self.model.tasks.iter().filter(|t| !t.completed).count()
    }

    /// Footer text, e.g. "2 items left"
    pub fn items_left_label(&self) -> String {
        match self.active_count() {
            1 => "1 item left".to_string(),
            n => format!("{} items left", n),
        }
    }

    /// The persisted part of the model
    pub fn flags(&self) -> Flags<Task> {
        Flags {
            tasks: self.model.tasks.clone(),
            uid: self.model.uid,
        }
    }

    fn persist(&self) {
        let Some(port) = &self.persist else {
            return;
        };
        match serde_json::to_value(self.flags()) {
            Ok(payload) => port.send(payload),
            Err(err) => log::error!("Failed to encode tasks for persistence: {}", err),
        }
    }
}

impl Program for TodoApp {
    fn init(&mut self, mount: &str, flags: Value, persist: PersistPort) {
        let flags: Flags<Task> = serde_json::from_value(flags).unwrap_or_else(|err| {
            log::warn!("Unexpected flags shape ({}), starting empty", err);
            Flags::default()
        });

        // Never hand out an id that is already taken
        let next_free = flags.tasks.iter().map(|t| t.id.saturating_add(1)).max().unwrap_or(0);

        log::info!("Starting with {} tasks on #{}", flags.tasks.len(), mount);
        self.model = Model {
            uid: flags.uid.max(next_free),
            tasks: flags.tasks,
            ..Model::default()
        };
        self.mount = Some(mount.to_string());
        self.persist = Some(persist);
    }
}
