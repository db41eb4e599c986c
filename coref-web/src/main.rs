//! Servidor web Axum com WebSocket para visualização da resolução de correferência em tempo real

use std::env;
use std::error::Error;
use std::sync::{mpsc, Arc};
use std::time::Instant;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use coref_core::{
    check_unique_ids, corpus::demo_documents, CorefModel, DiscourseEntity, Linker, LinkerEvent,
    MentionContext, MentionDecision, ResolverMode, TrainingEvent,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// Estado compartilhado da aplicação: um linker por modo.
struct AppState {
    test: Linker,
    train: Linker,
}

impl AppState {
    fn build() -> coref_core::Result<Self> {
        let model = CorefModel::build()?;
        Ok(Self {
            test: model.linker(ResolverMode::Test)?,
            train: model.linker(ResolverMode::Train)?,
        })
    }

    fn linker(&self, mode: ResolverMode) -> &Linker {
        match mode {
            ResolverMode::Test => &self.test,
            ResolverMode::Train => &self.train,
        }
    }
}

/// Corpo de `/resolve` e das mensagens WebSocket.
///
/// `demo` escolhe um documento de demonstração no lugar de `mentions`.
#[derive(Deserialize)]
struct ResolveRequest {
    #[serde(default)]
    mentions: Vec<MentionContext>,
    #[serde(default)]
    demo: Option<usize>,
    #[serde(default)]
    mode: ResolverMode,
}

impl ResolveRequest {
    /// Menções a resolver, ou a mensagem de erro para o cliente.
    fn into_mentions(self) -> Result<Vec<MentionContext>, String> {
        let mentions = match self.demo {
            Some(index) => demo_documents()
                .into_iter()
                .nth(index)
                .map(|doc| doc.mentions)
                .ok_or_else(|| format!("Documento de demonstração inexistente: {index}"))?,
            None => self.mentions,
        };
        if mentions.is_empty() {
            return Err("Nenhuma menção informada".to_string());
        }
        check_unique_ids(&mentions).map_err(|err| err.to_string())?;
        Ok(mentions)
    }
}

#[derive(Serialize)]
struct ResolveResponse {
    entities: Vec<DiscourseEntity>,
    decisions: Vec<MentionDecision>,
    training_events: Vec<TrainingEvent>,
    total_mentions: usize,
    processing_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let state = Arc::new(AppState::build()?);
    let addr = env::var("COREF_WEB_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Servidor de correferência iniciado em http://{addr}");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/resolve", post(resolve_handler))
        .route("/ws", get(ws_handler))
        .route("/demo-documents", get(demo_documents_handler))
        .layer(cors)
        .with_state(state)
}

/// Resolução via HTTP POST (sem streaming)
async fn resolve_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResolveRequest>,
) -> impl IntoResponse {
    let mode = req.mode;
    let mentions = match req.into_mentions() {
        Ok(mentions) => mentions,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(serde_json::json!({"error": message})))
                .into_response();
        }
    };

    let start = Instant::now();
    let total_mentions = mentions.len();
    let state_for_task = Arc::clone(&state);
    let linked = tokio::task::spawn_blocking(move || state_for_task.linker(mode).link(&mentions)).await;

    match linked {
        Ok(doc) => Json(ResolveResponse {
            entities: doc.entities,
            decisions: doc.decisions,
            training_events: doc.training_events,
            total_mentions,
            processing_ms: start.elapsed().as_millis() as u64,
        })
        .into_response(),
        Err(err) => {
            warn!(error = %err, "tarefa de resolução falhou");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Falha ao resolver o documento"})),
            )
                .into_response()
        }
    }
}

/// Retorna os documentos de demonstração
async fn demo_documents_handler() -> impl IntoResponse {
    Json(demo_documents())
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Lógica do WebSocket: recebe menções, executa o linker e envia eventos em tempo real
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                let req = match serde_json::from_str::<ResolveRequest>(&text) {
                    Ok(req) => req,
                    Err(err) => {
                        warn!(error = %err, "mensagem WebSocket inválida");
                        let reply = serde_json::json!({"type": "Error", "data": {"message": err.to_string()}});
                        if socket.send(Message::Text(reply.to_string())).await.is_err() {
                            return;
                        }
                        continue;
                    }
                };
                let mode = req.mode;
                let mentions = match req.into_mentions() {
                    Ok(mentions) => mentions,
                    Err(message) => {
                        warn!(error = %message, "pedido WebSocket rejeitado");
                        let reply = serde_json::json!({"type": "Error", "data": {"message": message}});
                        if socket.send(Message::Text(reply.to_string())).await.is_err() {
                            return;
                        }
                        continue;
                    }
                };

                info!("Resolvendo via WebSocket [{:?}]: {} menções", mode, mentions.len());

                // O linker é síncrono: roda fora do runtime e devolve os eventos coletados
                let state_for_task = Arc::clone(&state);
                let events = tokio::task::spawn_blocking(move || {
                    let (tx, rx) = mpsc::channel::<LinkerEvent>();
                    state_for_task.linker(mode).link_streaming(&mentions, tx);
                    rx.into_iter().collect::<Vec<_>>()
                })
                .await;

                let Ok(events) = events else {
                    warn!("tarefa de resolução falhou");
                    continue;
                };

                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json)).await.is_err() {
                            return; // cliente desconectou
                        }
                        // Pequena pausa para animação visual (passo a passo)
                        tokio::time::sleep(tokio::time::Duration::from_millis(35)).await;
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_app() -> Router {
        app(Arc::new(AppState::build().unwrap()))
    }

    async fn post_json(body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/resolve")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_resolve_links_pronoun() {
        let (status, body) = post_json(serde_json::json!({
            "mentions": [
                {"id": 0, "text": "John", "head_text": "John", "head_tag": "NNP", "sentence": 0},
                {"id": 1, "text": "he", "head_text": "he", "head_tag": "PRP", "sentence": 1}
            ]
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_mentions"], 2);
        assert_eq!(body["entities"].as_array().unwrap().len(), 1);
        assert_eq!(body["decisions"][1]["decision"]["type"], "link");
    }

    #[tokio::test]
    async fn test_resolve_demo_in_train_mode() {
        let (status, body) = post_json(serde_json::json!({"demo": 0, "mode": "train"})).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["training_events"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_rejects_empty_input() {
        let (status, body) = post_json(serde_json::json!({"mentions": []})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) = post_json(serde_json::json!({"demo": 99})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_resolve_rejects_duplicate_mention_ids() {
        let (status, body) = post_json(serde_json::json!({
            "mentions": [
                {"id": 0, "text": "John", "head_text": "John", "head_tag": "NNP", "sentence": 0},
                {"id": 0, "text": "he", "head_text": "he", "head_tag": "PRP", "sentence": 1}
            ]
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("M0"));
    }

    #[test]
    fn test_request_validation_is_shared_with_websocket() {
        let req: ResolveRequest = serde_json::from_value(serde_json::json!({
            "mentions": [
                {"id": 4, "text": "Mary", "head_text": "Mary", "head_tag": "NNP", "sentence": 0},
                {"id": 4, "text": "she", "head_text": "she", "head_tag": "PRP", "sentence": 0}
            ]
        }))
        .unwrap();
        assert!(req.into_mentions().is_err());

        let req: ResolveRequest = serde_json::from_value(serde_json::json!({"demo": 1})).unwrap();
        assert_eq!(req.into_mentions().unwrap().len(), demo_documents()[1].mentions.len());
    }

    #[tokio::test]
    async fn test_demo_documents_endpoint() {
        let response = test_app()
            .oneshot(Request::builder().uri("/demo-documents").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let docs: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(docs.as_array().unwrap().len(), demo_documents().len());
    }
}
