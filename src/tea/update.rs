//! Pure update function for the TEA (The Elm Architecture) pattern.
//!
//! The update function takes a model and a message, mutates the model,
//! and returns a list of commands to execute. Failure policy mirrors the
//! per-operation contract: fetch/update/delete failures are logged only,
//! while create/login/register failures are surfaced to the user.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::{tlog, tlog_debug, tlog_warn};

use super::command::Command;
use super::message::Message;
use super::model::{
    CreateField, CreateForm, DashMode, EditField, EditForm, LoginForm, Model, Notification,
    NotificationLevel, RegisterForm, Screen,
};

/// Helper to set an error notification and mark model as dirty.
fn set_error(model: &mut Model, message: String) {
    tlog_warn!("UI Error: {}", message);
    model.notification = Some(Notification {
        level: NotificationLevel::Error,
        message,
    });
    model.dirty = true;
}

fn set_info(model: &mut Model, message: String) {
    model.notification = Some(Notification {
        level: NotificationLevel::Info,
        message,
    });
    model.dirty = true;
}

/// Pure update function: Model + Message → Commands
///
/// This function:
/// 1. Takes the current model and an input message
/// 2. Mutates the model state (and sets dirty flag)
/// 3. Returns a list of commands (side effects) to execute
///
/// The function itself has no side effects - all I/O happens via returned
/// Commands.
pub fn update(model: &mut Model, msg: Message) -> Vec<Command> {
    let mut cmds = Vec::new();

    match msg {
        Message::Key(key) => {
            model.notification = None; // Clear notification on any key press
            model.dirty = true; // Keyboard input always triggers render
            match model.screen {
                Screen::Login => update_login(model, key, &mut cmds),
                Screen::Register => update_register(model, key, &mut cmds),
                Screen::Dashboard => update_dashboard(model, key, &mut cmds),
            }
        }

        Message::Resize(_, _) => {
            model.dirty = true; // Resize triggers re-render
        }

        // Authentication callbacks
        Message::LoginCompleted(session) => {
            tlog!("Message::LoginCompleted token={}", session.token_preview());
            model.session = Some(session);
            model.screen = Screen::Dashboard;
            model.login = LoginForm::default();
            model.dirty = true;
            cmds.push(Command::FetchTasks);
        }

        Message::LoginFailed(err) => {
            tlog_warn!("Message::LoginFailed err={}", err);
            model.login.error = Some(err);
            model.dirty = true;
        }

        Message::RegisterCompleted => {
            tlog!("Message::RegisterCompleted");
            model.register = RegisterForm::default();
            model.screen = Screen::Login;
            set_info(model, "Account created. Please log in.".to_string());
        }

        Message::RegisterFailed(err) => {
            tlog_warn!("Message::RegisterFailed err={}", err);
            model.register.error = Some(err);
            model.dirty = true;
        }

        // Task collection callbacks
        Message::TasksFetched(tasks) => {
            tlog_debug!("Message::TasksFetched count={}", tasks.len());
            // Wholesale replacement: the cache is never patched incrementally
            model.tasks = tasks;
            if model.selected >= model.tasks.len() {
                model.selected = model.tasks.len().saturating_sub(1);
            }
            model.dirty = true;
        }

        Message::TasksFetchFailed(err) => {
            // Logged only: the stale list stays, no user-visible error
            tlog_warn!("Message::TasksFetchFailed err={}", err);
        }

        // Mutation callbacks
        Message::TaskCreated => {
            tlog!("Message::TaskCreated");
            model.create = CreateForm::default();
            model.mode = DashMode::List;
            model.dirty = true;
            cmds.push(Command::FetchTasks);
        }

        Message::TaskCreateFailed(err) => {
            tlog_warn!("Message::TaskCreateFailed err={}", err);
            set_error(model, err);
        }

        Message::TaskUpdated(id) => {
            tlog!("Message::TaskUpdated id={}", id);
            if model.editing.as_ref().is_some_and(|(eid, _)| *eid == id) {
                model.editing = None;
                model.mode = DashMode::List;
            }
            model.dirty = true;
            cmds.push(Command::FetchTasks);
        }

        Message::TaskUpdateFailed(id, err) => {
            // Logged only; the edit buffer stays active
            tlog_warn!("Message::TaskUpdateFailed id={} err={}", id, err);
        }

        Message::TaskDeleted(id) => {
            tlog!("Message::TaskDeleted id={}", id);
            model.dirty = true;
            cmds.push(Command::FetchTasks);
        }

        Message::TaskDeleteFailed(id, err) => {
            tlog_warn!("Message::TaskDeleteFailed id={} err={}", id, err);
        }
    }

    cmds
}

fn update_login(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    match key.code {
        KeyCode::Tab => {
            model.login.focus = model.login.focus.next();
        }

        KeyCode::Enter => {
            if model.login.email.trim().is_empty() || model.login.password.is_empty() {
                model.login.error = Some("Email and password are required.".to_string());
                return;
            }
            model.login.error = None;
            cmds.push(Command::Login {
                email: model.login.email.clone(),
                password: model.login.password.clone(),
            });
        }

        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            model.register.error = None;
            model.screen = Screen::Register;
        }

        KeyCode::Esc => {
            cmds.push(Command::Quit);
        }

        KeyCode::Backspace => {
            model.login.focused_value_mut().pop();
        }

        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            model.login.focused_value_mut().push(c);
        }

        _ => {}
    }
}

fn update_register(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    match key.code {
        KeyCode::Tab => {
            model.register.focus = model.register.focus.next();
        }

        KeyCode::Enter => {
            if model.register.name.trim().is_empty()
                || model.register.email.trim().is_empty()
                || model.register.password.is_empty()
            {
                model.register.error = Some("All fields are required.".to_string());
                return;
            }
            model.register.error = None;
            cmds.push(Command::Register {
                name: model.register.name.clone(),
                email: model.register.email.clone(),
                password: model.register.password.clone(),
            });
        }

        KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            model.login.error = None;
            model.screen = Screen::Login;
        }

        KeyCode::Esc => {
            model.screen = Screen::Login;
        }

        KeyCode::Backspace => {
            model.register.focused_value_mut().pop();
        }

        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            model.register.focused_value_mut().push(c);
        }

        _ => {}
    }
}

fn update_dashboard(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    match model.mode {
        DashMode::List => update_dash_list(model, key, cmds),
        DashMode::Create => update_dash_create(model, key, cmds),
        DashMode::Edit => update_dash_edit(model, key, cmds),
        DashMode::ConfirmDelete => update_dash_confirm(model, key, cmds),
    }
}

fn update_dash_list(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if !model.tasks.is_empty() {
                model.selected = (model.selected + 1) % model.tasks.len();
            }
        }

        KeyCode::Char('k') | KeyCode::Up => {
            if !model.tasks.is_empty() {
                model.selected = model
                    .selected
                    .checked_sub(1)
                    .unwrap_or(model.tasks.len() - 1);
            }
        }

        KeyCode::Char('n') => {
            model.mode = DashMode::Create;
        }

        KeyCode::Char('e') => {
            // Starting an edit replaces any in-progress edit buffer
            if let Some(task) = model.tasks.get(model.selected) {
                model.editing = Some((task.id.clone(), EditForm::from_task(task)));
                model.mode = DashMode::Edit;
            }
        }

        KeyCode::Char('d') => {
            if let Some(task) = model.tasks.get(model.selected) {
                model.pending_delete = Some(task.id.clone());
                model.mode = DashMode::ConfirmDelete;
            }
        }

        KeyCode::Char('r') => {
            cmds.push(Command::FetchTasks);
        }

        KeyCode::Char('l') => {
            // Logout: drop the session and return to the login screen
            model.session = None;
            model.tasks.clear();
            model.selected = 0;
            model.editing = None;
            model.pending_delete = None;
            model.screen = Screen::Login;
            cmds.push(Command::Logout);
        }

        KeyCode::Char('q') | KeyCode::Esc => {
            cmds.push(Command::Quit);
        }

        KeyCode::Char('?') => {
            model.show_keymap = !model.show_keymap;
        }

        _ => {}
    }
}

fn update_dash_create(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    match key.code {
        KeyCode::Tab => {
            model.create.focus = model.create.focus.next();
        }

        KeyCode::Enter => match model.create.validate() {
            Ok(draft) => cmds.push(Command::CreateTask { draft }),
            Err(message) => set_error(model, message),
        },

        KeyCode::Esc => {
            // Cancel; form contents are retained for next time
            model.mode = DashMode::List;
        }

        KeyCode::Left if model.create.focus == CreateField::Priority => {
            model.create.priority = model.create.priority.prev();
        }

        KeyCode::Right if model.create.focus == CreateField::Priority => {
            model.create.priority = model.create.priority.next();
        }

        KeyCode::Backspace => {
            if let Some(value) = model.create.focused_value_mut() {
                value.pop();
            }
        }

        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(value) = model.create.focused_value_mut() {
                value.push(c);
            }
        }

        _ => {}
    }
}

fn update_dash_edit(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    if model.editing.is_none() {
        model.mode = DashMode::List;
        return;
    }

    match key.code {
        KeyCode::Tab => {
            if let Some((_, form)) = &mut model.editing {
                form.focus = form.focus.next();
            }
        }

        KeyCode::Enter => {
            let submission = model
                .editing
                .as_ref()
                .map(|(id, form)| (id.clone(), form.to_buffer()));
            match submission {
                Some((id, Ok(buffer))) => cmds.push(Command::UpdateTask { id, buffer }),
                Some((_, Err(message))) => set_error(model, message),
                None => {}
            }
        }

        KeyCode::Esc => {
            // Discard the in-progress buffer
            model.editing = None;
            model.mode = DashMode::List;
        }

        KeyCode::Left => {
            if let Some((_, form)) = &mut model.editing {
                if form.focus == EditField::Priority {
                    form.priority = form.priority.prev();
                }
            }
        }

        KeyCode::Right => {
            if let Some((_, form)) = &mut model.editing {
                if form.focus == EditField::Priority {
                    form.priority = form.priority.next();
                }
            }
        }

        KeyCode::Backspace => {
            if let Some(value) = model.editing.as_mut().and_then(|(_, f)| f.focused_value_mut()) {
                value.pop();
            }
        }

        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(value) = model.editing.as_mut().and_then(|(_, f)| f.focused_value_mut()) {
                value.push(c);
            }
        }

        _ => {}
    }
}

fn update_dash_confirm(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('y') => {
            if let Some(id) = model.pending_delete.take() {
                cmds.push(Command::DeleteTask { id });
            }
            model.mode = DashMode::List;
        }

        KeyCode::Esc | KeyCode::Char('n') => {
            // Declined: no network call
            model.pending_delete = None;
            model.mode = DashMode::List;
        }

        _ => {}
    }
}
