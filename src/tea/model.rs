//! Model for the TEA (The Elm Architecture) pattern.
//!
//! The Model is pure application state - no channels, no handles, no runtime
//! infrastructure. The three screens (login, registration, dashboard) and
//! the dashboard's modes form the only state machine in the application;
//! in particular, edit state is exactly `Option<(TaskId, EditForm)>` so the
//! "at most one task in edit mode" invariant holds by construction.

use chrono::NaiveDate;

use crate::config::Config;
use crate::render::{
    next_version, DashOverlay, DashboardView, FieldView, FormView, RenderState, ScreenView,
    TaskRowView,
};
use crate::session::Session;
use crate::task::{EditBuffer, Priority, Task, TaskDraft, TaskId};

/// Level of a notification message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Error notification - displayed in red with "Error:" prefix
    Error,
    /// Informational notification - displayed in green
    Info,
}

/// A notification message to display to the user. Shown until the next
/// keypress, the terminal analogue of a blocking alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Which screen is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    Dashboard,
}

/// Dashboard mode. `List` is the resting state; the others layer a form or
/// confirmation over the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashMode {
    #[default]
    List,
    Create,
    Edit,
    ConfirmDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

impl LoginField {
    pub fn label(&self) -> &'static str {
        match self {
            LoginField::Email => "Email",
            LoginField::Password => "Password",
        }
    }

    /// Cycle to next input field (Tab behavior).
    pub fn next(&self) -> Self {
        match self {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterField {
    #[default]
    Name,
    Email,
    Password,
}

impl RegisterField {
    pub fn label(&self) -> &'static str {
        match self {
            RegisterField::Name => "Name",
            RegisterField::Email => "Email",
            RegisterField::Password => "Password",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            RegisterField::Name => RegisterField::Email,
            RegisterField::Email => RegisterField::Password,
            RegisterField::Password => RegisterField::Name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateField {
    #[default]
    Title,
    Description,
    DueDate,
    Priority,
    AssignedTo,
}

impl CreateField {
    pub fn label(&self) -> &'static str {
        match self {
            CreateField::Title => "Title",
            CreateField::Description => "Description",
            CreateField::DueDate => "Due date",
            CreateField::Priority => "Priority",
            CreateField::AssignedTo => "Assigned to",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            CreateField::Title => CreateField::Description,
            CreateField::Description => CreateField::DueDate,
            CreateField::DueDate => CreateField::Priority,
            CreateField::Priority => CreateField::AssignedTo,
            CreateField::AssignedTo => CreateField::Title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditField {
    #[default]
    Title,
    Description,
    DueDate,
    Priority,
    Status,
    AssignedTo,
}

impl EditField {
    pub fn label(&self) -> &'static str {
        match self {
            EditField::Title => "Title",
            EditField::Description => "Description",
            EditField::DueDate => "Due date",
            EditField::Priority => "Priority",
            EditField::Status => "Status",
            EditField::AssignedTo => "Assigned to",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            EditField::Title => EditField::Description,
            EditField::Description => EditField::DueDate,
            EditField::DueDate => EditField::Priority,
            EditField::Priority => EditField::Status,
            EditField::Status => EditField::AssignedTo,
            EditField::AssignedTo => EditField::Title,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    pub error: Option<String>,
}

impl LoginForm {
    pub fn focused_value_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub focus: RegisterField,
    pub error: Option<String>,
}

impl RegisterForm {
    pub fn focused_value_mut(&mut self) -> &mut String {
        match self.focus {
            RegisterField::Name => &mut self.name,
            RegisterField::Email => &mut self.email,
            RegisterField::Password => &mut self.password,
        }
    }
}

/// The create form. Text fields are raw buffers; the due date is parsed at
/// submission time.
#[derive(Debug, Clone, Default)]
pub struct CreateForm {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub priority: Priority,
    pub assigned_to: String,
    pub focus: CreateField,
}

impl CreateForm {
    /// The focused text buffer, or None when priority (a cycled choice) is
    /// focused.
    pub fn focused_value_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            CreateField::Title => Some(&mut self.title),
            CreateField::Description => Some(&mut self.description),
            CreateField::DueDate => Some(&mut self.due_date),
            CreateField::Priority => None,
            CreateField::AssignedTo => Some(&mut self.assigned_to),
        }
    }

    /// Client-side preconditions. The assignee check comes first and uses
    /// the fixed alert wording; title and due-date are the required-field
    /// checks. No network call happens when this fails.
    pub fn validate(&self) -> std::result::Result<TaskDraft, String> {
        if self.assigned_to.trim().is_empty() {
            return Err("Please assign the task to a user.".to_string());
        }
        if self.title.trim().is_empty() {
            return Err("Title is required.".to_string());
        }
        let due_date = NaiveDate::parse_from_str(self.due_date.trim(), "%Y-%m-%d")
            .map_err(|_| "Due date must be YYYY-MM-DD.".to_string())?;

        Ok(TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            due_date,
            priority: self.priority,
            assigned_to: self.assigned_to.clone(),
        })
    }
}

/// The single edit buffer: one task's editable fields while being modified.
#[derive(Debug, Clone)]
pub struct EditForm {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub priority: Priority,
    pub status: String,
    pub assigned_to: String,
    pub focus: EditField,
}

impl EditForm {
    /// Copy a task's current values, due date truncated to calendar-date
    /// precision.
    pub fn from_task(task: &Task) -> Self {
        let buffer = EditBuffer::from_task(task);
        Self {
            title: buffer.title,
            description: buffer.description,
            due_date: buffer.due_date.format("%Y-%m-%d").to_string(),
            priority: buffer.priority,
            status: buffer.status,
            assigned_to: buffer.assigned_to,
            focus: EditField::default(),
        }
    }

    pub fn focused_value_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            EditField::Title => Some(&mut self.title),
            EditField::Description => Some(&mut self.description),
            EditField::DueDate => Some(&mut self.due_date),
            EditField::Priority => None,
            EditField::Status => Some(&mut self.status),
            EditField::AssignedTo => Some(&mut self.assigned_to),
        }
    }

    /// Build the update payload. The edit form has no required fields; only
    /// the due date must parse.
    pub fn to_buffer(&self) -> std::result::Result<EditBuffer, String> {
        let due_date = NaiveDate::parse_from_str(self.due_date.trim(), "%Y-%m-%d")
            .map_err(|_| "Due date must be YYYY-MM-DD.".to_string())?;

        Ok(EditBuffer {
            title: self.title.clone(),
            description: self.description.clone(),
            due_date,
            priority: self.priority,
            status: self.status.clone(),
            assigned_to: self.assigned_to.clone(),
        })
    }
}

/// Pure application state - the single source of truth.
pub struct Model {
    // Screen state
    pub screen: Screen,
    pub login: LoginForm,
    pub register: RegisterForm,

    // Dashboard state
    pub tasks: Vec<Task>,
    pub selected: usize,
    pub mode: DashMode,
    pub create: CreateForm,
    /// At most one task in edit mode at a time.
    pub editing: Option<(TaskId, EditForm)>,
    pub pending_delete: Option<TaskId>,

    // Session (explicit object, not ambient storage)
    pub session: Option<Session>,

    // UI state
    pub notification: Option<Notification>,
    /// Whether the keymap legend is expanded (toggled by '?')
    pub show_keymap: bool,

    // Dirty flag - set when state changes and render is needed
    pub dirty: bool,

    // Config (immutable after init)
    pub config: Config,
}

impl Model {
    /// Create a model from startup state. With a persisted session the app
    /// opens on the dashboard; without one, on the login screen.
    pub fn new(config: Config, session: Option<Session>) -> Self {
        let screen = if session.is_some() {
            Screen::Dashboard
        } else {
            Screen::Login
        };
        Self {
            screen,
            login: LoginForm::default(),
            register: RegisterForm::default(),
            tasks: Vec::new(),
            selected: 0,
            mode: DashMode::default(),
            create: CreateForm::default(),
            editing: None,
            pending_delete: None,
            session,
            notification: None,
            show_keymap: false,
            dirty: true,
            config,
        }
    }

    /// Commands to run at startup: exactly one fetch when a session is
    /// present, none otherwise (the session guard).
    pub fn startup_commands(&self) -> Vec<crate::tea::Command> {
        if self.session.is_some() {
            vec![crate::tea::Command::FetchTasks]
        } else {
            Vec::new()
        }
    }

    /// Create an immutable snapshot for the render thread.
    ///
    /// Each snapshot gets a monotonically increasing version number,
    /// enabling the render thread to detect state changes and skip
    /// redundant renders.
    pub fn snapshot(&self) -> RenderState {
        let screen = match self.screen {
            Screen::Login => ScreenView::Login(self.login_view()),
            Screen::Register => ScreenView::Register(self.register_view()),
            Screen::Dashboard => ScreenView::Dashboard(self.dashboard_view()),
        };

        RenderState {
            version: next_version(),
            screen,
            notification: self.notification.clone(),
            show_keymap: self.show_keymap,
            server_url: self.config.effective_server_url(),
        }
    }

    fn login_view(&self) -> FormView {
        FormView {
            heading: "Login",
            fields: vec![
                FieldView {
                    label: LoginField::Email.label(),
                    value: self.login.email.clone(),
                    focused: self.login.focus == LoginField::Email,
                },
                FieldView {
                    label: LoginField::Password.label(),
                    value: mask(&self.login.password),
                    focused: self.login.focus == LoginField::Password,
                },
            ],
            error: self.login.error.clone(),
        }
    }

    fn register_view(&self) -> FormView {
        FormView {
            heading: "Register",
            fields: vec![
                FieldView {
                    label: RegisterField::Name.label(),
                    value: self.register.name.clone(),
                    focused: self.register.focus == RegisterField::Name,
                },
                FieldView {
                    label: RegisterField::Email.label(),
                    value: self.register.email.clone(),
                    focused: self.register.focus == RegisterField::Email,
                },
                FieldView {
                    label: RegisterField::Password.label(),
                    value: mask(&self.register.password),
                    focused: self.register.focus == RegisterField::Password,
                },
            ],
            error: self.register.error.clone(),
        }
    }

    fn dashboard_view(&self) -> DashboardView {
        let tasks = self
            .tasks
            .iter()
            .map(|t| TaskRowView {
                title: t.title.clone(),
                due: t.due_date.format("%Y-%m-%d").to_string(),
                priority: t.priority,
                status: t.status.clone(),
                assigned_to: t.assigned_to.clone(),
                description: t.description.clone(),
                created_by: t.created_by.clone(),
            })
            .collect();

        let overlay = match self.mode {
            DashMode::List => DashOverlay::None,
            DashMode::Create => DashOverlay::Form(self.create_form_view()),
            DashMode::Edit => match &self.editing {
                Some((_, form)) => DashOverlay::Form(edit_form_view(form)),
                None => DashOverlay::None,
            },
            DashMode::ConfirmDelete => {
                let title = self
                    .pending_delete
                    .as_ref()
                    .and_then(|id| self.tasks.iter().find(|t| &t.id == id))
                    .map(|t| t.title.clone())
                    .unwrap_or_default();
                DashOverlay::ConfirmDelete { title }
            }
        };

        DashboardView {
            tasks,
            selected: self.selected,
            overlay,
        }
    }

    fn create_form_view(&self) -> FormView {
        let form = &self.create;
        let field = |label: CreateField, value: String| FieldView {
            label: label.label(),
            value,
            focused: form.focus == label,
        };
        FormView {
            heading: "Create Task",
            fields: vec![
                field(CreateField::Title, form.title.clone()),
                field(CreateField::Description, form.description.clone()),
                field(CreateField::DueDate, form.due_date.clone()),
                field(CreateField::Priority, form.priority.label().to_string()),
                field(CreateField::AssignedTo, form.assigned_to.clone()),
            ],
            error: None,
        }
    }
}

fn edit_form_view(form: &EditForm) -> FormView {
    let field = |label: EditField, value: String| FieldView {
        label: label.label(),
        value,
        focused: form.focus == label,
    };
    FormView {
        heading: "Edit Task",
        fields: vec![
            field(EditField::Title, form.title.clone()),
            field(EditField::Description, form.description.clone()),
            field(EditField::DueDate, form.due_date.clone()),
            field(EditField::Priority, form.priority.label().to_string()),
            field(EditField::Status, form.status.clone()),
            field(EditField::AssignedTo, form.assigned_to.clone()),
        ],
        error: None,
    }
}

fn mask(password: &str) -> String {
    "•".repeat(password.chars().count())
}
