//! realtime.rs
//!
//! Оповещение открытых клиентов об изменениях. После каждой мутации
//! обработчик публикует небольшое событие вида {"event": "putRoom", ...},
//! клиенты слушают /ws и перезапрашивают данные. Никакой гарантии
//! доставки: отставший клиент просто пропускает события и перечитывает
//! всё при следующем обращении.

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::AppState;

#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<String>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Публикует событие всем подключённым клиентам.
    pub fn emit<T: Serialize>(&self, event: &str, payload: &T) {
        let envelope = serde_json::json!({ "event": event, "payload": payload });
        match serde_json::to_string(&envelope) {
            // Отсутствие подписчиков - не ошибка
            Ok(message) => {
                let _ = self.tx.send(message);
            }
            Err(e) => warn!("failed to serialize change event {}: {:?}", event, e),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

/// GET /ws - апгрейд до WebSocket и трансляция ленты изменений.
pub async fn ws_handler(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let rx = state.realtime.subscribe();
    ws.on_upgrade(move |socket| client_loop(socket, rx))
}

async fn client_loop(socket: WebSocket, mut rx: broadcast::Receiver<String>) {
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(message) => {
                    if sender.send(Message::Text(message.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("ws client lagged, skipped {} change events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                // Клиенты ничего не присылают, важен только разрыв
                Some(Ok(_)) => {}
                _ => break,
            },
        }
    }
}
