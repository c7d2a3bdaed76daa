//! Immutable snapshot types handed from the logic thread to the render
//! thread. These are view structs only; the render thread never mutates
//! application state.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::task::Priority;
use crate::tea::Notification;

static VERSION_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn next_version() -> u64 {
    VERSION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// One labelled input field of a form, as rendered.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub label: &'static str,
    pub value: String,
    pub focused: bool,
}

/// A form with a heading and an optional inline error line.
#[derive(Debug, Clone)]
pub struct FormView {
    pub heading: &'static str,
    pub fields: Vec<FieldView>,
    pub error: Option<String>,
}

/// One task row of the dashboard list.
#[derive(Debug, Clone)]
pub struct TaskRowView {
    pub title: String,
    pub due: String,
    pub priority: Priority,
    pub status: String,
    pub assigned_to: String,
    pub description: String,
    pub created_by: String,
}

/// What is layered over the dashboard list, if anything.
#[derive(Debug, Clone)]
pub enum DashOverlay {
    None,
    Form(FormView),
    ConfirmDelete { title: String },
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub tasks: Vec<TaskRowView>,
    pub selected: usize,
    pub overlay: DashOverlay,
}

#[derive(Debug, Clone)]
pub enum ScreenView {
    Login(FormView),
    Register(FormView),
    Dashboard(DashboardView),
}

#[derive(Debug, Clone)]
pub struct RenderState {
    pub version: u64,
    pub screen: ScreenView,
    pub notification: Option<Notification>,
    /// Whether the keymap legend is expanded (toggled by '?')
    pub show_keymap: bool,
    /// Base URL of the API, shown on the auth screens
    pub server_url: String,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            version: 0,
            screen: ScreenView::Login(FormView {
                heading: "Login",
                fields: Vec::new(),
                error: None,
            }),
            notification: None,
            show_keymap: false,
            server_url: String::new(),
        }
    }
}
