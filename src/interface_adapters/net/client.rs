use crate::frameworks::config;
use crate::interface_adapters::protocol::{self, ClientCommand, SessionCommand};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::rng::{rand_id, rand_seed};
use crate::use_cases::{Session, SessionRegistry};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::sink::SinkExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, info_span, warn};

// Categorizes connection lifecycle failures so callers can decide policy.
#[derive(Debug)]
enum NetError {
    Ws(axum::Error),
    OutboundClosed,
}

/// Membership of a connection in a session: which game, which seat.
struct Membership {
    session: Arc<Session>,
    seat: usize,
}

struct ConnCtx {
    // Sender handed to sessions on join; peers' broadcasts flow back
    // through outbound_rx to this connection's socket.
    outbound_tx: mpsc::Sender<String>,
    outbound_rx: mpsc::Receiver<String>,
    membership: Option<Membership>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    // Connection id for correlating logs before a seat exists.
    let conn_id = rand_id();
    let span = info_span!("conn", conn_id);
    let _enter = span.enter();

    info!("client connected");

    let (outbound_tx, outbound_rx) = mpsc::channel::<String>(config::OUTBOUND_CHANNEL_CAPACITY);
    let mut ctx = ConnCtx {
        outbound_tx,
        outbound_rx,
        membership: None,
    };

    // Main Client Loop
    if let Err(e) = run_client_loop(&mut socket, &mut ctx, &state.registry).await {
        warn!(error = ?e, "client loop exited with error");
    }

    disconnect_cleanup(&ctx.membership).await;
}

async fn send_text(socket: &mut WebSocket, frame: String) -> Result<(), NetError> {
    socket
        .send(Message::Text(frame.into()))
        .await
        .map_err(NetError::Ws)
}

async fn run_client_loop(
    socket: &mut WebSocket,
    ctx: &mut ConnCtx,
    registry: &Arc<SessionRegistry>,
) -> Result<(), NetError> {
    // Split borrows so `tokio::select!` can hold them concurrently.
    let ConnCtx {
        outbound_tx,
        outbound_rx,
        membership,
    } = ctx;

    let idle_timeout = config::idle_timeout();
    // Refreshed on every inbound message; a silent connection is
    // treated as failed when the deadline passes.
    let mut idle_deadline = Instant::now() + idle_timeout;
    let mut fatal: Option<NetError> = None;

    loop {
        // disconnect becomes true on error
        let disconnect: bool = tokio::select! {
            // Incoming command from the client.
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        idle_deadline = Instant::now() + idle_timeout;
                        match handle_command(socket, membership, outbound_tx, registry, text.as_str()).await {
                            Ok(()) => false,
                            Err(e) => {
                                fatal = Some(e);
                                true
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => true,
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => false,
                    Some(Ok(other)) => {
                        debug!(?other, "ignoring non-text message");
                        false
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "websocket recv error");
                        true
                    }
                    None => {
                        info!("websocket closed");
                        true
                    }
                }
            }

            // Rendered frame queued for this connection (peer broadcasts).
            frame = outbound_rx.recv() => {
                match frame {
                    Some(frame) => match send_text(socket, frame).await {
                        Ok(()) => false,
                        Err(e) => {
                            fatal = Some(e);
                            true
                        }
                    },
                    // Unreachable while ctx holds outbound_tx; treat a
                    // closed channel as fatal anyway.
                    None => {
                        fatal = Some(NetError::OutboundClosed);
                        true
                    }
                }
            }

            // Per-read idle timeout.
            _ = sleep_until(idle_deadline) => {
                info!("idle timeout; disconnecting");
                true
            }
        };

        if disconnect {
            if let Err(e) = socket.close().await {
                debug!(error = ?e, "socket close error");
            }
            break;
        }
    }

    if let Some(err) = fatal { Err(err) } else { Ok(()) }
}

async fn handle_command(
    socket: &mut WebSocket,
    membership: &mut Option<Membership>,
    outbound_tx: &mpsc::Sender<String>,
    registry: &Arc<SessionRegistry>,
    text: &str,
) -> Result<(), NetError> {
    let command = match protocol::parse(text) {
        Ok(Some(command)) => command,
        Ok(None) => {
            // Back-compat diagnostic path: echo unknown input verbatim.
            debug!(message = text, "unrecognized command; echoing");
            return send_text(socket, text.to_string()).await;
        }
        Err(e) => {
            debug!(error = ?e, "malformed command");
            return send_text(socket, protocol::render_error(&e.message())).await;
        }
    };

    match command {
        ClientCommand::CreateGame => create_game(socket, membership, outbound_tx, registry).await,
        ClientCommand::JoinGame => join_game(socket, membership, outbound_tx, registry).await,
        ClientCommand::Session(command) => {
            let Some(membership) = membership.as_ref() else {
                return send_text(socket, protocol::render_error("you are not in a game")).await;
            };
            apply_session_command(socket, membership, command).await
        }
    }
}

async fn create_game(
    socket: &mut WebSocket,
    membership: &mut Option<Membership>,
    outbound_tx: &mpsc::Sender<String>,
    registry: &Arc<SessionRegistry>,
) -> Result<(), NetError> {
    if membership.is_some() {
        return send_text(socket, protocol::render_error("you are already in a game")).await;
    }

    let session_id = rand_id();
    let seed = rand_seed(config::SEED_SPAN);
    let session = match registry
        .create_session(session_id, seed, outbound_tx.clone())
        .await
    {
        Ok(session) => session,
        Err(e) => return send_text(socket, protocol::render_session_error(e)).await,
    };

    let map = {
        let game = session.state.lock().await;
        protocol::render_map(game.board.size(), game.chunk_scale, game.seed)
    };

    info!(session_id, "game created");
    // Creator is always seat 0.
    *membership = Some(Membership { session, seat: 0 });

    send_text(socket, protocol::render_ack()).await?;
    send_text(socket, map).await
}

async fn join_game(
    socket: &mut WebSocket,
    membership: &mut Option<Membership>,
    outbound_tx: &mpsc::Sender<String>,
    registry: &Arc<SessionRegistry>,
) -> Result<(), NetError> {
    if membership.is_some() {
        return send_text(socket, protocol::render_error("you are already in a game")).await;
    }

    for session in registry.sessions_newest_first().await {
        // Roster mutation, snapshot, and new-player broadcast share one
        // critical section so the snapshot can never miss or
        // double-count a concurrent mutation.
        let mut game = session.state.lock().await;
        let seat = match game.join(outbound_tx.clone()) {
            Ok(seat) => seat,
            // Full; keep scanning older sessions.
            Err(_) => continue,
        };
        let snapshot = protocol::render_game_state(&game, seat);
        game.broadcast(
            seat,
            &protocol::render_broadcast(&protocol::render_new_player(seat)),
        );
        drop(game);

        info!(session_id = session.session_id, seat, "joined game");
        *membership = Some(Membership { session, seat });
        return send_text(socket, snapshot).await;
    }

    send_text(socket, protocol::render_error("no game to join")).await
}

async fn apply_session_command(
    socket: &mut WebSocket,
    membership: &Membership,
    command: SessionCommand,
) -> Result<(), NetError> {
    let seat = membership.seat;
    let mut game = membership.session.state.lock().await;

    // Mutation, direct response, and broadcast are composed inside one
    // critical section so every frame reflects a single consistent
    // post-mutation snapshot.
    let (direct, broadcast) = match command {
        SessionCommand::GenerateMap {
            length,
            chunk_scale,
        } => {
            let seed = rand_seed(config::SEED_SPAN);
            match game.regenerate(length, chunk_scale, Some(seed)) {
                Ok(()) => {
                    let map =
                        protocol::render_map(game.board.size(), game.chunk_scale, game.seed);
                    (Some(map.clone()), Some(map))
                }
                Err(e) => (Some(protocol::render_session_error(e)), None),
            }
        }
        SessionCommand::UpdateMap {
            length,
            chunk_scale,
        } => match game.regenerate(length, chunk_scale, None) {
            // The actor already applied this locally; peers only.
            Ok(()) => (
                None,
                Some(protocol::render_map(
                    game.board.size(),
                    game.chunk_scale,
                    game.seed,
                )),
            ),
            Err(e) => (Some(protocol::render_session_error(e)), None),
        },
        SessionCommand::AddTroop { x, y } => match game.add_troop(seat, x, y) {
            Ok(()) => (
                Some(protocol::render_ack()),
                Some(protocol::render_add_troop(seat, x, y)),
            ),
            Err(e) => (Some(protocol::render_session_error(e)), None),
        },
        SessionCommand::MoveTroop { troop_index, x, y } => {
            match game.move_troop(seat, troop_index, x, y) {
                Ok(()) => (
                    Some(protocol::render_ack()),
                    Some(protocol::render_move_troop(seat, troop_index, x, y)),
                ),
                Err(e) => (Some(protocol::render_session_error(e)), None),
            }
        }
        SessionCommand::ModifyTile { x, y } => match game.toggle_tile(x, y) {
            Ok(()) => (
                Some(protocol::render_ack()),
                Some(protocol::render_modify_tile(x, y)),
            ),
            Err(e) => (Some(protocol::render_session_error(e)), None),
        },
    };

    if let Some(body) = broadcast {
        game.broadcast(seat, &protocol::render_broadcast(&body));
    }
    drop(game);

    if let Some(frame) = direct {
        send_text(socket, frame).await?;
    }
    Ok(())
}

async fn disconnect_cleanup(membership: &Option<Membership>) {
    if let Some(membership) = membership {
        // The seat's state is retained; only the liveness flag drops.
        let mut game = membership.session.state.lock().await;
        game.mark_disconnected(membership.seat);
    }
    info!("client disconnected");
}
