//! The logic thread: owns the Model, polls keyboard input, drains background
//! messages, and executes Commands by spawning async HTTP calls whose
//! completions come back as Messages.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Sender;
use crossterm::event::{self, Event};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::api::ApiClient;
use crate::config::Config;
use crate::render::RenderState;
use crate::session::Session;
use crate::tea::{update, Command, Message, Model};
use crate::util::blocking;
use crate::{tlog_debug, tlog_warn, Result};

const MAX_BG_MESSAGES: usize = 50;

pub struct LogicThread;

impl LogicThread {
    pub fn run(
        config: Config,
        session: Option<Session>,
        state_tx: Sender<RenderState>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        Runtime::new()?.block_on(Self::run_async(config, session, state_tx, shutdown))
    }

    async fn run_async(
        config: Config,
        session: Option<Session>,
        state_tx: Sender<RenderState>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        let api = Arc::new(ApiClient::new(config.effective_server_url()));
        tlog_debug!(
            "LogicThread::run_async server={} logged_in={}",
            api.base_url(),
            session.is_some()
        );

        let mut model = Model::new(config, session);
        let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<Message>();

        // Session guard: with a session this issues exactly one fetch,
        // without one it issues nothing
        for cmd in model.startup_commands() {
            execute_command(&mut model, cmd, &api, &msg_tx);
        }

        send_state(&state_tx, &model);
        model.dirty = false;

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            // Keyboard input (priority)
            while event::poll(Duration::ZERO)? {
                match event::read()? {
                    Event::Key(key) => {
                        for cmd in update(&mut model, Message::Key(key)) {
                            if execute_command(&mut model, cmd, &api, &msg_tx) {
                                shutdown.store(true, Ordering::Relaxed);
                                return Ok(());
                            }
                        }
                    }
                    Event::Resize(w, h) => {
                        let _ = update(&mut model, Message::Resize(w, h));
                    }
                    _ => {}
                }

                if model.dirty {
                    send_state(&state_tx, &model);
                    model.dirty = false;
                }
            }

            // Background messages (bounded)
            for _ in 0..MAX_BG_MESSAGES {
                let Ok(msg) = msg_rx.try_recv() else { break };
                for cmd in update(&mut model, msg) {
                    if execute_command(&mut model, cmd, &api, &msg_tx) {
                        shutdown.store(true, Ordering::Relaxed);
                        return Ok(());
                    }
                }
            }

            if model.dirty {
                send_state(&state_tx, &model);
                model.dirty = false;
            }

            tokio::time::sleep(Duration::from_micros(500)).await;
        }

        Ok(())
    }
}

/// Execute a single command. Returns true when the app should quit.
///
/// HTTP commands spawn detached tasks; their outcomes arrive as Messages on
/// the next loop iteration. There is no cancellation or retry.
fn execute_command(
    model: &mut Model,
    cmd: Command,
    api: &Arc<ApiClient>,
    msg_tx: &mpsc::UnboundedSender<Message>,
) -> bool {
    match cmd {
        Command::Login { email, password } => {
            tlog_debug!("Command::Login email={}", email);
            let api = api.clone();
            let tx = msg_tx.clone();
            tokio::spawn(async move {
                match api.login(&email, &password).await {
                    Ok(session) => {
                        // Persist before navigating; a failed write is logged
                        // but the in-memory session still works
                        let to_save = session.clone();
                        if let Err(e) = blocking(move || to_save.save()).await {
                            tlog_warn!("Failed to persist session: {}", e);
                        }
                        let _ = tx.send(Message::LoginCompleted(session));
                    }
                    Err(e) => {
                        tlog_warn!("Login failed: {}", e);
                        let _ = tx.send(Message::LoginFailed(e.to_string()));
                    }
                }
            });
        }

        Command::Register {
            name,
            email,
            password,
        } => {
            tlog_debug!("Command::Register email={}", email);
            let api = api.clone();
            let tx = msg_tx.clone();
            tokio::spawn(async move {
                match api.register(&name, &email, &password).await {
                    Ok(()) => {
                        let _ = tx.send(Message::RegisterCompleted);
                    }
                    Err(e) => {
                        tlog_warn!("Registration failed: {}", e);
                        let _ = tx.send(Message::RegisterFailed(e.to_string()));
                    }
                }
            });
        }

        Command::FetchTasks => {
            tlog_debug!("Command::FetchTasks");
            let Some(session) = model.session.clone() else {
                tlog_warn!("FetchTasks without a session");
                return false;
            };
            let api = api.clone();
            let tx = msg_tx.clone();
            tokio::spawn(async move {
                match api.list_tasks(&session).await {
                    Ok(tasks) => {
                        let _ = tx.send(Message::TasksFetched(tasks));
                    }
                    Err(e) => {
                        let _ = tx.send(Message::TasksFetchFailed(e.to_string()));
                    }
                }
            });
        }

        Command::CreateTask { draft } => {
            tlog_debug!("Command::CreateTask title={:?}", draft.title);
            let Some(session) = model.session.clone() else {
                tlog_warn!("CreateTask without a session");
                return false;
            };
            let api = api.clone();
            let tx = msg_tx.clone();
            tokio::spawn(async move {
                match api.create_task(&session, &draft).await {
                    Ok(()) => {
                        let _ = tx.send(Message::TaskCreated);
                    }
                    Err(e) => {
                        let _ = tx.send(Message::TaskCreateFailed(e.to_string()));
                    }
                }
            });
        }

        Command::UpdateTask { id, buffer } => {
            tlog_debug!("Command::UpdateTask id={}", id);
            let Some(session) = model.session.clone() else {
                tlog_warn!("UpdateTask without a session");
                return false;
            };
            let api = api.clone();
            let tx = msg_tx.clone();
            tokio::spawn(async move {
                match api.update_task(&session, &id, &buffer).await {
                    Ok(()) => {
                        let _ = tx.send(Message::TaskUpdated(id));
                    }
                    Err(e) => {
                        let _ = tx.send(Message::TaskUpdateFailed(id, e.to_string()));
                    }
                }
            });
        }

        Command::DeleteTask { id } => {
            tlog_debug!("Command::DeleteTask id={}", id);
            let Some(session) = model.session.clone() else {
                tlog_warn!("DeleteTask without a session");
                return false;
            };
            let api = api.clone();
            let tx = msg_tx.clone();
            tokio::spawn(async move {
                match api.delete_task(&session, &id).await {
                    Ok(()) => {
                        let _ = tx.send(Message::TaskDeleted(id));
                    }
                    Err(e) => {
                        let _ = tx.send(Message::TaskDeleteFailed(id, e.to_string()));
                    }
                }
            });
        }

        Command::Logout => {
            tlog_debug!("Command::Logout");
            tokio::spawn(async move {
                match blocking(Session::clear).await {
                    Ok(removed) => tlog_debug!("Session file removed: {}", removed),
                    Err(e) => tlog_warn!("Failed to remove session file: {}", e),
                }
            });
        }

        Command::Quit => {
            tlog_debug!("Command::Quit");
            return true;
        }
    }

    false
}

fn send_state(state_tx: &Sender<RenderState>, model: &Model) {
    let _ = state_tx.try_send(model.snapshot());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{EditBuffer, Priority, TaskDraft, TaskId};
    use chrono::NaiveDate;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn harness(
        server_uri: &str,
    ) -> (
        Model,
        Arc<ApiClient>,
        mpsc::UnboundedSender<Message>,
        mpsc::UnboundedReceiver<Message>,
    ) {
        let config = Config {
            server_url: Some(server_uri.to_string()),
        };
        let model = Model::new(config, Some(Session::new("T1".to_string())));
        let api = Arc::new(ApiClient::new(server_uri));
        let (tx, rx) = mpsc::unbounded_channel();
        (model, api, tx, rx)
    }

    #[tokio::test]
    async fn test_fetch_sends_bearer_header_and_tasks_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks"))
            .and(header("Authorization", "Bearer T1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "_id": "42",
                "title": "t",
                "description": "",
                "dueDate": "2026-03-01T00:00:00Z",
                "priority": "low",
                "status": "pending",
                "assignedTo": "u1",
                "createdBy": "u2"
            }])))
            .mount(&server)
            .await;

        let (mut model, api, tx, mut rx) = harness(&server.uri());
        assert!(!execute_command(&mut model, Command::FetchTasks, &api, &tx));

        match rx.recv().await.unwrap() {
            Message::TasksFetched(tasks) => {
                assert_eq!(tasks.len(), 1);
                assert_eq!(tasks[0].id, TaskId::new("42"));
            }
            other => panic!("Expected TasksFetched, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_sends_failure_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (mut model, api, tx, mut rx) = harness(&server.uri());
        execute_command(&mut model, Command::FetchTasks, &api, &tx);

        assert!(matches!(
            rx.recv().await.unwrap(),
            Message::TasksFetchFailed(_)
        ));
    }

    #[tokio::test]
    async fn test_create_201_sends_created_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tasks"))
            .and(header("Authorization", "Bearer T1"))
            .and(body_partial_json(serde_json::json!({
                "title": "t",
                "assignedTo": "u1",
                "priority": "low"
            })))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let (mut model, api, tx, mut rx) = harness(&server.uri());
        let draft = TaskDraft {
            title: "t".to_string(),
            description: String::new(),
            due_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            priority: Priority::Low,
            assigned_to: "u1".to_string(),
        };
        execute_command(&mut model, Command::CreateTask { draft }, &api, &tx);

        assert!(matches!(rx.recv().await.unwrap(), Message::TaskCreated));
    }

    #[tokio::test]
    async fn test_create_non_201_success_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let (mut model, api, tx, mut rx) = harness(&server.uri());
        let draft = TaskDraft {
            title: "t".to_string(),
            description: String::new(),
            due_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            priority: Priority::Low,
            assigned_to: "u1".to_string(),
        };
        execute_command(&mut model, Command::CreateTask { draft }, &api, &tx);

        match rx.recv().await.unwrap() {
            Message::TaskCreateFailed(msg) => assert_eq!(msg, "Task creation failed"),
            other => panic!("Expected TaskCreateFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_puts_buffer_to_task_path() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/tasks/42"))
            .and(header("Authorization", "Bearer T1"))
            .and(body_partial_json(serde_json::json!({"priority": "high"})))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let (mut model, api, tx, mut rx) = harness(&server.uri());
        let buffer = EditBuffer {
            title: "t".to_string(),
            description: String::new(),
            due_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            priority: Priority::High,
            status: "pending".to_string(),
            assigned_to: "u1".to_string(),
        };
        execute_command(
            &mut model,
            Command::UpdateTask {
                id: TaskId::new("42"),
                buffer,
            },
            &api,
            &tx,
        );

        match rx.recv().await.unwrap() {
            Message::TaskUpdated(id) => assert_eq!(id, TaskId::new("42")),
            other => panic!("Expected TaskUpdated, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_hits_task_path() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/tasks/42"))
            .and(header("Authorization", "Bearer T1"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let (mut model, api, tx, mut rx) = harness(&server.uri());
        execute_command(
            &mut model,
            Command::DeleteTask {
                id: TaskId::new("42"),
            },
            &api,
            &tx,
        );

        assert!(matches!(rx.recv().await.unwrap(), Message::TaskDeleted(_)));
    }

    #[tokio::test]
    async fn test_task_command_without_session_is_dropped() {
        let server = MockServer::start().await;
        let (mut model, api, tx, mut rx) = harness(&server.uri());
        model.session = None;

        execute_command(&mut model, Command::FetchTasks, &api, &tx);
        drop(tx);
        assert!(rx.recv().await.is_none(), "No message without a session");
    }

    #[tokio::test]
    async fn test_quit_command_requests_shutdown() {
        let server = MockServer::start().await;
        let (mut model, api, tx, _rx) = harness(&server.uri());
        assert!(execute_command(&mut model, Command::Quit, &api, &tx));
    }
}
