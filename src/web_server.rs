use anyhow::{Context, Result};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    serve, Json, Router,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::mpsc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::conversation::{AwaitingFlag, ChatMessage, SubmitError};
use crate::resolver::MessageResolver;
use crate::session::{ChatSession, CompletedReply, Step};

/// Frames sent to the browser over the WebSocket.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "message_type", content = "payload")]
pub enum ServerEvent {
    Transcript { messages: Vec<ChatMessage>, dark_mode: bool },
    Message(ChatMessage),
    Typing { active: bool },
    Theme { dark_mode: bool },
    Notice { message: String },
}

/// Frames received from the browser.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    Send { text: String },
    ToggleTheme,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub message: String,
}

// Shared application state
#[derive(Clone)]
pub struct AppState {
    templates: Arc<AutoReloader>,
    resolver: Arc<MessageResolver>,
    greeting: String,
}

impl AppState {
    pub fn new(resolver: Arc<MessageResolver>, greeting: String) -> Self {
        Self {
            templates: Arc::new(create_minijinja_env()),
            resolver,
            greeting,
        }
    }
}

// Minijinja Environment setup
fn create_minijinja_env() -> AutoReloader {
    // Templates are re-read when the directory changes
    AutoReloader::new(|notifier| {
        let mut env = Environment::new();
        env.set_loader(path_loader("templates"));
        // Watch the templates directory for changes
        notifier.watch_path("templates", true);
        Ok(env)
    })
}

async fn index_handler(
    State(state): State<AppState>,
) -> Result<axum::response::Html<String>, (StatusCode, axum::response::Html<String>)> {
    // Acquire env, get template, and render within the same block
    state
        .templates
        .acquire_env()
        .and_then(|env| {
            env.get_template("index.html").and_then(|tmpl| {
                tmpl.render(minijinja::context! {
                    title => format!("{} – AI Chatbot", state.resolver.company()),
                    greeting => state.greeting,
                })
            })
        })
        .map(axum::response::Html) // Wrap successful render in Html()
        .map_err(|e| {
            error!("Failed to get or render template: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::response::Html(format!("Internal Server Error: {}", e)),
            )
        })
}

/// Stateless single-question endpoint.
async fn ask_handler(State(state): State<AppState>, Json(request): Json<AskRequest>) -> Response {
    match state.resolver.resolve(&request.message, &AwaitingFlag::default()).await {
        Some(reply) => Json(reply).into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": SubmitError::Empty.to_string() })),
        )
            .into_response(),
    }
}

// WebSocket upgrade handler
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    info!("WebSocket connection upgrade requested");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

// Serialize and push one event; false once the client is gone.
async fn send_event<S>(sender: &mut S, event: &ServerEvent) -> bool
where
    S: Sink<Message> + Unpin,
{
    match serde_json::to_string(event) {
        Ok(json) => sender.send(Message::Text(json)).await.is_ok(),
        Err(e) => {
            error!("Failed to serialize server event: {}", e);
            true
        }
    }
}

/// What to send back for one client frame; remote lookups are spawned so
/// the socket keeps reading while they run.
fn handle_client_event(
    session: &mut ChatSession,
    event: ClientEvent,
    reply_tx: &mpsc::Sender<CompletedReply>,
) -> Vec<ServerEvent> {
    match event {
        ClientEvent::ToggleTheme => vec![ServerEvent::Theme {
            dark_mode: session.toggle_theme(),
        }],
        ClientEvent::Send { text } => match session.handle_input(&text) {
            Step::Rejected(SubmitError::Empty) => Vec::new(),
            Step::Rejected(e) => vec![ServerEvent::Notice { message: e.to_string() }],
            Step::Answered { user, reply } => vec![ServerEvent::Message(user), ServerEvent::Message(reply)],
            Step::Pending { user, request } => {
                let reply_tx = reply_tx.clone();
                // The reply comes back through the session loop's channel
                tokio::spawn(async move {
                    let completed = request.resolve().await;
                    if reply_tx.send(completed).await.is_err() {
                        warn!("Reply finished after the WebSocket closed");
                    }
                });
                vec![ServerEvent::Message(user), ServerEvent::Typing { active: true }]
            }
        },
    }
}

// Handle individual WebSocket connections
async fn handle_socket(socket: WebSocket, state: AppState) {
    info!("New WebSocket connection established");
    // Split so the read and write halves can be driven independently
    let (sender, receiver) = socket.split();
    run_session(sender, receiver, state).await;
    info!("WebSocket connection closed");
}

/// Drives one chat window: client frames in, server events out, with
/// finished remote replies merged in as they arrive.
async fn run_session<S, R>(mut sender: S, mut receiver: R, state: AppState)
where
    S: Sink<Message> + Unpin,
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    // Each connection gets its own transcript
    let mut session = ChatSession::new(state.resolver.clone(), state.greeting.clone());
    let (reply_tx, mut reply_rx) = mpsc::channel::<CompletedReply>(1);

    // Send the greeting transcript first
    let initial = ServerEvent::Transcript {
        messages: session.state().transcript().to_vec(),
        dark_mode: session.state().dark_mode(),
    };
    if !send_event(&mut sender, &initial).await {
        warn!("Failed to send transcript to new WebSocket client");
        return;
    }

    loop {
        let events = tokio::select! {
            // A remote reply finished
            Some(completed) = reply_rx.recv() => {
                let reply = session.finish(completed);
                vec![ServerEvent::Message(reply), ServerEvent::Typing { active: false }]
            }

            // Message received from the client
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => handle_client_event(&mut session, event, &reply_tx),
                    Err(e) => {
                        warn!("Ignoring unrecognised client frame: {}", e);
                        Vec::new()
                    }
                },
                Some(Ok(Message::Close(_))) => {
                    info!("Client requested WebSocket close");
                    break;
                }
                // Axum answers pings itself; binary frames mean nothing here
                Some(Ok(_)) => Vec::new(),
                Some(Err(e)) => {
                    warn!("WebSocket receive error: {}", e);
                    break;
                }
                // Client disconnected without sending a Close message
                None => {
                    info!("WebSocket client disconnected");
                    break;
                }
            },
        };

        for event in &events {
            if !send_event(&mut sender, event).await {
                warn!("WebSocket client disconnected or send error. Closing connection.");
                return;
            }
        }
    }
}

// Build our application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/ws", get(ws_handler))
        .route("/api/chat", post(ask_handler))
        // Serve static files from the 'static' directory
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state)
        .layer(TraceLayer::new_for_http()) // Add request logging
}

pub async fn start_web_server(port: u16, resolver: Arc<MessageResolver>, greeting: String) -> Result<()> {
    let app = build_router(AppState::new(resolver, greeting));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Web server listening on http://{}", addr);

    // Bind using tokio::net::TcpListener
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    // Use axum::serve to run the application
    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
