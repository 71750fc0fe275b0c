//! WebSocket client driving the gateway session.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use presence_common::{opcode, GatewayFrame, Identify, MemberListRequest, Resume};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::presence::{PresenceTracker, RenderTuple};
use crate::renderer::Renderer;

use super::{route, DispatchEvent, HeartbeatMonitor, RoutedEvent, Session};

type WsError = tokio_tungstenite::tungstenite::Error;

/// Lifecycle of the one gateway connection this process holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Transport is being opened.
    Connecting,
    /// Identify or resume sent, waiting for the first dispatch.
    Handshaking,
    /// Normal inbound-frame processing.
    Steady,
    /// Transport torn down, about to open a replacement.
    Reconnecting,
    /// Deliberate shutdown; never left.
    Closed,
}

/// Capped exponential backoff with jitter for transport-open retries.
struct Backoff {
    base_millis: u64,
    cap_millis: u64,
    attempt: u32,
}

impl Backoff {
    fn new(base_secs: u64, cap_secs: u64) -> Self {
        Self {
            base_millis: base_secs.saturating_mul(1000).max(1),
            cap_millis: cap_secs.saturating_mul(1000).max(1),
            attempt: 0,
        }
    }

    fn reset(&mut self) {
        self.attempt = 0;
    }

    fn next_delay(&mut self) -> Duration {
        let exp = self
            .base_millis
            .saturating_mul(1u64 << self.attempt.min(16))
            .min(self.cap_millis)
            .max(1);
        self.attempt = self.attempt.saturating_add(1);
        // Half-to-full jitter keeps simultaneous clients from synchronizing.
        let jittered = rand::thread_rng().gen_range(exp / 2..=exp);
        Duration::from_millis(jittered)
    }
}

/// Gateway WebSocket client.
///
/// Owns the connection state machine, the session, the heartbeat monitor
/// and the presence tracker. All of them are mutated from a single task:
/// the steady-state loop is one `select!` over the socket stream and the
/// heartbeat ticker, so no two mutations can interleave.
pub struct GatewayClient {
    config: GatewayConfig,
    session: Session,
    heartbeat: HeartbeatMonitor,
    tracker: PresenceTracker,
    renderer: Arc<dyn Renderer>,
    state: ConnectionState,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig, tracker: PresenceTracker, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            config,
            session: Session::new(),
            heartbeat: HeartbeatMonitor::new(),
            tracker,
            renderer,
            state: ConnectionState::Connecting,
        }
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.state != next {
            tracing::info!(from = ?self.state, to = ?next, "connection state changed");
            self.state = next;
        }
    }

    /// Run until the shutdown future resolves. This is the only way to
    /// reach `Closed`; every in-connection failure reconnects instead.
    pub async fn run_until_shutdown<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        tokio::select! {
            _ = self.run() => {}
            _ = &mut shutdown => {}
        }
        self.heartbeat.disarm();
        self.transition(ConnectionState::Closed);
    }

    /// Connect, run, reconnect. Never returns; every error path loops back
    /// through a backoff sleep and a fresh transport.
    pub async fn run(&mut self) {
        let mut backoff = Backoff::new(self.config.backoff_base_secs, self.config.backoff_cap_secs);
        loop {
            self.transition(ConnectionState::Connecting);
            tracing::info!("connecting to gateway at {}", self.config.url);

            match self.connect_and_run().await {
                Ok(()) => tracing::info!("gateway connection closed"),
                Err(e) => tracing::warn!("gateway connection lost: {}", e),
            }

            // The timer must be dead before any new transport exists, so a
            // stale pulse can never race a half-torn-down connection.
            let reached_steady = self.state == ConnectionState::Steady;
            self.heartbeat.disarm();
            self.transition(ConnectionState::Reconnecting);

            if reached_steady {
                backoff.reset();
            }
            let delay = backoff.next_delay();
            tracing::info!(delay_millis = delay.as_millis() as u64, "reconnecting after backoff");
            tokio::time::sleep(delay).await;
        }
    }

    /// One connection attempt: open the transport, handshake, then process
    /// frames until something ends the connection.
    async fn connect_and_run(&mut self) -> Result<(), GatewayError> {
        let (ws_stream, _) = connect_async(&self.config.url).await?;
        let (mut write, mut read) = ws_stream.split();

        self.transition(ConnectionState::Handshaking);
        self.send_handshake(&mut write).await?;

        let result = self.steady_loop(&mut write, &mut read).await;

        // One logical session, one live socket: close this transport
        // before the caller opens a replacement.
        let _ = write.close().await;
        result
    }

    /// Send resume when the session allows it, identify otherwise.
    async fn send_handshake<S>(&mut self, write: &mut S) -> Result<(), GatewayError>
    where
        S: SinkExt<Message, Error = WsError> + Unpin,
    {
        let frame = match (self.session.can_resume(), self.session.session_id()) {
            (true, Some(id)) => {
                let resume = Resume {
                    session_id: id.to_string(),
                    seq: self.session.last_sequence().unwrap_or(0),
                };
                tracing::info!(seq = resume.seq, "resuming previous session");
                GatewayFrame::command(opcode::RESUME, &resume)?
            }
            _ => {
                self.session.begin_new_session();
                tracing::info!("identifying with a fresh session");
                let identify = Identify::new(self.config.credential.clone());
                GatewayFrame::command(opcode::IDENTIFY, &identify)?
            }
        };
        send_frame(write, &frame).await
    }

    /// Steady-state processing: inbound frames and heartbeat pulses,
    /// serialized through one `select!`.
    async fn steady_loop<S, R>(&mut self, write: &mut S, read: &mut R) -> Result<(), GatewayError>
    where
        S: SinkExt<Message, Error = WsError> + Unpin,
        R: StreamExt<Item = Result<Message, WsError>> + Unpin,
    {
        loop {
            tokio::select! {
                _ = self.heartbeat.tick() => {
                    if !self.heartbeat.ack_received() {
                        tracing::warn!("previous pulse unacknowledged, tearing down");
                        return Err(GatewayError::LivenessFailure);
                    }
                    let pulse = GatewayFrame::heartbeat(self.session.last_sequence());
                    send_frame(write, &pulse).await?;
                    self.heartbeat.mark_pending();
                }

                item = read.next() => {
                    match item {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_text(write, &text).await?;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("gateway sent close frame");
                            return Err(GatewayError::ConnectionClosed);
                        }
                        Some(Ok(_)) => {} // Ignore binary, pong, etc.
                        Some(Err(e)) => return Err(e.into()),
                        None => return Err(GatewayError::ConnectionClosed),
                    }
                }
            }
        }
    }

    /// Decode and route one inbound text frame. Malformed frames are
    /// dropped here; they never end the connection.
    async fn handle_text<S>(&mut self, write: &mut S, text: &str) -> Result<(), GatewayError>
    where
        S: SinkExt<Message, Error = WsError> + Unpin,
    {
        let frame = match GatewayFrame::decode(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("dropping malformed frame: {}", e);
                return Ok(());
            }
        };

        match route(&frame, &mut self.session) {
            Ok(RoutedEvent::Hello(interval_millis)) => {
                if self.heartbeat.is_armed() {
                    tracing::debug!(
                        previous_millis = ?self.heartbeat.interval_millis(),
                        "replacing heartbeat schedule"
                    );
                }
                tracing::info!(interval_millis, "heartbeat schedule announced");
                self.heartbeat.arm(interval_millis);
            }
            Ok(RoutedEvent::HeartbeatAck) => {
                tracing::debug!("pulse acknowledged");
                self.heartbeat.note_ack();
            }
            Ok(RoutedEvent::ReconnectRequested) => {
                return Err(GatewayError::ReconnectRequested);
            }
            Ok(RoutedEvent::SessionInvalidated) => {
                self.session.begin_new_session();
                return Err(GatewayError::SessionInvalidated);
            }
            Ok(RoutedEvent::Dispatch(event)) => {
                self.handle_dispatch(write, event).await?;
            }
            Ok(RoutedEvent::Unhandled(op)) => {
                tracing::debug!(op, "ignoring unhandled opcode");
            }
            Err(e) => {
                tracing::warn!("dropping frame with undecodable payload: {}", e);
            }
        }
        Ok(())
    }

    async fn handle_dispatch<S>(&mut self, write: &mut S, event: DispatchEvent) -> Result<(), GatewayError>
    where
        S: SinkExt<Message, Error = WsError> + Unpin,
    {
        // Any dispatch payload acknowledges the handshake, resume and
        // identify alike.
        if self.state == ConnectionState::Handshaking {
            self.transition(ConnectionState::Steady);
        }

        match event {
            DispatchEvent::Ready(ready) => {
                self.session.capture_session_id(ready.session_id.clone());
                tracing::info!(groups = ready.groups.len(), "session ready");

                for group in ready.groups.iter().filter(|g| self.tracker.watches_group(&g.id)) {
                    let request =
                        GatewayFrame::command(opcode::REQUEST_MEMBERS, &MemberListRequest::new(group.id.clone()))?;
                    send_frame(write, &request).await?;
                }

                let changed = self.tracker.apply_ready(&ready);
                self.emit(changed).await;
            }
            DispatchEvent::StatusUpdate(ev) => {
                let changed = self.tracker.apply_status_update(&ev);
                self.emit(changed).await;
            }
            DispatchEvent::MembershipUpdate(ev) => {
                let changed = self.tracker.apply_membership_update(&ev);
                self.emit(changed).await;
            }
            DispatchEvent::MemberListUpdate(ev) => {
                let changed = self.tracker.apply_member_list_update(&ev);
                self.emit(changed).await;
            }
            DispatchEvent::Unknown(t) => {
                tracing::debug!(event = %t, "ignoring dispatch event");
            }
        }
        Ok(())
    }

    async fn emit<I>(&self, changed: I)
    where
        I: IntoIterator<Item = RenderTuple>,
    {
        for tuple in changed {
            self.renderer.render(&tuple).await;
        }
    }
}

/// Serialize and send a single frame. Fire-and-forget: acknowledgements
/// arrive through the normal inbound path.
async fn send_frame<S>(write: &mut S, frame: &GatewayFrame) -> Result<(), GatewayError>
where
    S: SinkExt<Message, Error = WsError> + Unpin,
{
    let text = frame.encode()?;
    write.send(Message::Text(text)).await?;
    tracing::debug!(op = frame.op, "sent frame");
    Ok(())
}
