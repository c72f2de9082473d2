// --- PROVIDER WEBSOCKET CLIENT ---
// Real-time conversational session over the provider's JSON WebSocket.
// One worker thread owns the socket: it relays transcript frames to the
// GUI, answers pings, dispatches client tool calls, and streams mic audio
// collected by a companion capture thread.

use std::io::ErrorKind;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use tungstenite::{Message, WebSocket};
use url::Url;

use super::tools::ToolRegistry;
use super::{ChatMessage, ConnectionStatus, SessionConfig, VoiceSession};

type WsStream = WebSocket<native_tls::TlsStream<TcpStream>>;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const READ_TIMEOUT: Duration = Duration::from_millis(100);
const AUDIO_FLUSH_INTERVAL: Duration = Duration::from_millis(250);

pub struct WsSession {
    config: SessionConfig,
    tools: Arc<ToolRegistry>,
    out: Sender<ChatMessage>,
    status: Arc<Mutex<ConnectionStatus>>,
    stop_signal: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl WsSession {
    pub fn new(config: SessionConfig, tools: ToolRegistry, out: Sender<ChatMessage>) -> Self {
        Self {
            config,
            tools: Arc::new(tools),
            out,
            status: Arc::new(Mutex::new(ConnectionStatus::Disconnected)),
            stop_signal: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }
}

impl VoiceSession for WsSession {
    /// Spawn the worker; connection happens off the GUI thread and failures
    /// show up as a Disconnected status rather than an Err here.
    fn start(&self) -> Result<()> {
        let mut worker = self.worker.lock().unwrap();
        if worker.is_some() {
            return Err(anyhow!("session already started"));
        }

        self.stop_signal.store(false, Ordering::SeqCst);
        *self.status.lock().unwrap() = ConnectionStatus::Connecting;

        let config = self.config.clone();
        let tools = self.tools.clone();
        let out = self.out.clone();
        let status = self.status.clone();
        let stop_signal = self.stop_signal.clone();

        *worker = Some(std::thread::spawn(move || {
            run_session(config, tools, out, status, stop_signal);
        }));
        Ok(())
    }

    /// Raise the stop flag and reap the worker. While the worker is still
    /// inside its bounded connect phase it cannot see the flag yet, so it
    /// is left to wind down detached rather than blocking the GUI thread
    /// on a join.
    fn stop(&self) -> Result<()> {
        self.stop_signal.store(true, Ordering::SeqCst);

        let handle = self.worker.lock().unwrap().take();
        let connecting = *self.status.lock().unwrap() == ConnectionStatus::Connecting;
        if let Some(handle) = handle {
            if connecting {
                drop(handle);
                return Ok(());
            }
            *self.status.lock().unwrap() = ConnectionStatus::Disconnecting;
            handle
                .join()
                .map_err(|_| anyhow!("session worker panicked"))?;
        }
        *self.status.lock().unwrap() = ConnectionStatus::Disconnected;
        Ok(())
    }

    fn status(&self) -> ConnectionStatus {
        *self.status.lock().unwrap()
    }
}

impl Drop for WsSession {
    fn drop(&mut self) {
        // Teardown must always release the worker and capture threads
        self.stop_signal.store(true, Ordering::SeqCst);
    }
}

fn run_session(
    config: SessionConfig,
    tools: Arc<ToolRegistry>,
    out: Sender<ChatMessage>,
    status: Arc<Mutex<ConnectionStatus>>,
    stop_signal: Arc<AtomicBool>,
) {
    let finish = |status: &Arc<Mutex<ConnectionStatus>>| {
        *status.lock().unwrap() = ConnectionStatus::Disconnected;
        request_repaint();
    };

    let mut socket = match connect_websocket(&config) {
        Ok(s) => s,
        Err(e) => {
            crate::log_info!("[Session] Connection failed: {:#}", e);
            finish(&status);
            return;
        }
    };

    // The user may have toggled off during the connect phase
    if stop_signal.load(Ordering::SeqCst) {
        let _ = socket.close(None);
        finish(&status);
        return;
    }

    if let Err(e) = send_init(&mut socket, &config) {
        crate::log_info!("[Session] Handshake failed: {:#}", e);
        let _ = socket.close(None);
        finish(&status);
        return;
    }

    if let Err(e) = set_read_timeout(&socket, READ_TIMEOUT) {
        crate::log_info!("[Session] Socket setup failed: {:#}", e);
        let _ = socket.close(None);
        finish(&status);
        return;
    }

    *status.lock().unwrap() = ConnectionStatus::Connected;
    crate::log_info!("[Session] Connected to {}", config.api_host);
    request_repaint();

    // Companion capture thread fills the buffer; this thread drains it
    let audio_buffer: Arc<Mutex<Vec<i16>>> = Arc::new(Mutex::new(Vec::new()));
    let capture_rate = Arc::new(AtomicU32::new(16_000));
    let audio_handle = {
        let buffer = audio_buffer.clone();
        let rate = capture_rate.clone();
        let stop = stop_signal.clone();
        std::thread::spawn(move || crate::audio::run_capture(buffer, rate, stop))
    };

    let mut last_flush = Instant::now();
    loop {
        if stop_signal.load(Ordering::Relaxed) {
            let _ = socket.close(None);
            break;
        }

        if last_flush.elapsed() >= AUDIO_FLUSH_INTERVAL {
            last_flush = Instant::now();
            let samples: Vec<i16> = std::mem::take(&mut *audio_buffer.lock().unwrap());
            if !samples.is_empty() {
                let rate = capture_rate.load(Ordering::Relaxed);
                let pcm = crate::audio::resample_to_16khz(&samples, rate);
                if let Err(e) = send_audio_chunk(&mut socket, &pcm) {
                    crate::log_info!("[Session] Audio send failed: {}", e);
                    break;
                }
            }
        }

        match socket.read() {
            Ok(Message::Text(text)) => match parse_frame(&text) {
                Ok(frame) => {
                    if let Err(e) = handle_frame(&mut socket, frame, &tools, &out) {
                        crate::log_info!("[Session] Frame handling failed: {:#}", e);
                    }
                }
                Err(e) => crate::log_info!("[Session] Unparseable frame: {:#}", e),
            },
            Ok(Message::Ping(payload)) => {
                let _ = socket.send(Message::Pong(payload));
            }
            Ok(Message::Close(_)) => {
                crate::log_info!("[Session] Closed by server");
                break;
            }
            Ok(_) => {}
            Err(tungstenite::Error::Io(e))
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(e) => {
                crate::log_info!("[Session] Read error: {}", e);
                break;
            }
        }
    }

    // Reader may exit on its own (server close); the capture thread only
    // watches the stop flag, so raise it before joining
    stop_signal.store(true, Ordering::SeqCst);
    let _ = audio_handle.join();
    finish(&status);
}

fn connect_websocket(config: &SessionConfig) -> Result<WsStream> {
    let url = format!(
        "wss://{}/v1/convai/conversation?agent_id={}",
        config.api_host, config.agent_id
    );
    let parsed = Url::parse(&url).context("invalid session URL")?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("session URL has no host"))?
        .to_string();
    let port = parsed.port_or_known_default().unwrap_or(443);

    let addrs = (host.as_str(), port)
        .to_socket_addrs()
        .with_context(|| format!("failed to resolve {}:{}", host, port))?;
    let mut tcp = None;
    let mut last_err = anyhow!("no addresses resolved for {}:{}", host, port);
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
            Ok(stream) => {
                tcp = Some(stream);
                break;
            }
            Err(e) => last_err = anyhow!("TCP connect to {} failed: {}", addr, e),
        }
    }
    let tcp = tcp.ok_or(last_err)?;
    let connector = native_tls::TlsConnector::new().context("TLS connector init failed")?;
    let tls = connector
        .connect(&host, tcp)
        .map_err(|e| anyhow!("TLS handshake failed: {}", e))?;
    let (socket, _response) = tungstenite::client(url.as_str(), tls)
        .map_err(|e| anyhow!("WebSocket handshake failed: {}", e))?;
    Ok(socket)
}

fn set_read_timeout(socket: &WsStream, timeout: Duration) -> Result<()> {
    socket
        .get_ref()
        .get_ref()
        .set_read_timeout(Some(timeout))
        .context("failed to set socket read timeout")?;
    Ok(())
}

fn send_init(socket: &mut WsStream, config: &SessionConfig) -> Result<()> {
    let init = json!({
        "type": "conversation_initiation_client_data",
        "dynamic_variables": { "platform": config.platform },
    });
    socket.send(Message::Text(init.to_string().into()))?;
    Ok(())
}

fn send_audio_chunk(socket: &mut WsStream, samples: &[i16]) -> Result<()> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for s in samples {
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    let frame = json!({ "user_audio_chunk": BASE64.encode(&bytes) });
    socket.send(Message::Text(frame.to_string().into()))?;
    Ok(())
}

/// Everything the server can send that this client reacts to.
#[derive(Debug, PartialEq)]
enum ServerFrame {
    Metadata,
    UserTranscript(String),
    AgentResponse(String),
    Ping { event_id: i64 },
    ToolCall { name: String, id: String, params: Value },
    Other,
}

fn parse_frame(text: &str) -> Result<ServerFrame> {
    let value: Value = serde_json::from_str(text).context("frame is not JSON")?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("frame has no type"))?;

    let frame = match kind {
        "conversation_initiation_metadata" => ServerFrame::Metadata,
        "user_transcript" => {
            let text = value["user_transcription_event"]["user_transcript"]
                .as_str()
                .ok_or_else(|| anyhow!("user_transcript frame without text"))?
                .to_string();
            ServerFrame::UserTranscript(text)
        }
        "agent_response" => {
            let text = value["agent_response_event"]["agent_response"]
                .as_str()
                .ok_or_else(|| anyhow!("agent_response frame without text"))?
                .to_string();
            ServerFrame::AgentResponse(text)
        }
        "ping" => {
            let event_id = value["ping_event"]["event_id"]
                .as_i64()
                .ok_or_else(|| anyhow!("ping frame without event_id"))?;
            ServerFrame::Ping { event_id }
        }
        "client_tool_call" => {
            let call = &value["client_tool_call"];
            let name = call["tool_name"]
                .as_str()
                .ok_or_else(|| anyhow!("tool call without tool_name"))?
                .to_string();
            let id = call["tool_call_id"]
                .as_str()
                .ok_or_else(|| anyhow!("tool call without tool_call_id"))?
                .to_string();
            let params = call.get("parameters").cloned().unwrap_or(Value::Null);
            ServerFrame::ToolCall { name, id, params }
        }
        _ => ServerFrame::Other,
    };
    Ok(frame)
}

fn handle_frame(
    socket: &mut WsStream,
    frame: ServerFrame,
    tools: &ToolRegistry,
    out: &Sender<ChatMessage>,
) -> Result<()> {
    match frame {
        ServerFrame::Metadata => {
            crate::log_info!("[Session] Conversation metadata received");
        }
        ServerFrame::UserTranscript(text) => {
            let _ = out.send(ChatMessage::new(text, "user"));
            request_repaint();
        }
        ServerFrame::AgentResponse(text) => {
            let _ = out.send(ChatMessage::new(text, "ai"));
            request_repaint();
        }
        ServerFrame::Ping { event_id } => {
            let pong = json!({ "type": "pong", "event_id": event_id });
            socket.send(Message::Text(pong.to_string().into()))?;
        }
        ServerFrame::ToolCall { name, id, params } => {
            let (result, is_error) = match tools.invoke(&name, params) {
                Ok(value) => (value.to_string(), false),
                Err(e) => {
                    crate::log_info!("[Session] Tool {} failed: {:#}", name, e);
                    (format!("{:#}", e), true)
                }
            };
            let reply = json!({
                "type": "client_tool_result",
                "tool_call_id": id,
                "result": result,
                "is_error": is_error,
            });
            socket.send(Message::Text(reply.to_string().into()))?;
        }
        ServerFrame::Other => {}
    }
    Ok(())
}

fn request_repaint() {
    if let Some(ctx) = crate::gui::GUI_CONTEXT.lock().unwrap().as_ref() {
        ctx.request_repaint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_user_transcript() {
        let frame = parse_frame(
            r#"{"type":"user_transcript","user_transcription_event":{"user_transcript":"hello there"}}"#,
        )
        .unwrap();
        assert_eq!(frame, ServerFrame::UserTranscript("hello there".into()));
    }

    #[test]
    fn parses_agent_response() {
        let frame = parse_frame(
            r#"{"type":"agent_response","agent_response_event":{"agent_response":"hi!"}}"#,
        )
        .unwrap();
        assert_eq!(frame, ServerFrame::AgentResponse("hi!".into()));
    }

    #[test]
    fn parses_ping_event_id() {
        let frame = parse_frame(r#"{"type":"ping","ping_event":{"event_id":42}}"#).unwrap();
        assert_eq!(frame, ServerFrame::Ping { event_id: 42 });
    }

    #[test]
    fn parses_tool_call_with_parameters() {
        let frame = parse_frame(
            r#"{"type":"client_tool_call","client_tool_call":{"tool_name":"change_brightness","tool_call_id":"c1","parameters":{"brightness":0.5}}}"#,
        )
        .unwrap();
        match frame {
            ServerFrame::ToolCall { name, id, params } => {
                assert_eq!(name, "change_brightness");
                assert_eq!(id, "c1");
                assert_eq!(params["brightness"], 0.5);
            }
            other => panic!("unexpected frame {:?}", other),
        }
    }

    #[test]
    fn unknown_types_are_ignored_not_errors() {
        let frame = parse_frame(r#"{"type":"vad_score","vad_score_event":{"vad_score":0.9}}"#)
            .unwrap();
        assert_eq!(frame, ServerFrame::Other);
    }

    #[test]
    fn frames_without_type_are_rejected() {
        assert!(parse_frame(r#"{"hello":"world"}"#).is_err());
        assert!(parse_frame("not json").is_err());
    }

    #[test]
    fn stop_while_connecting_returns_without_blocking() {
        let (tx, _rx) = std::sync::mpsc::channel();
        // TEST-NET address: connect either hangs until the timeout or
        // fails immediately, depending on the host network
        let config = SessionConfig {
            api_host: "192.0.2.1".to_string(),
            agent_id: "agent".to_string(),
            platform: "test".to_string(),
        };
        let session = WsSession::new(config, ToolRegistry::new(), tx);
        session.start().unwrap();

        let before = Instant::now();
        session.stop().unwrap();
        assert!(
            before.elapsed() < Duration::from_secs(1),
            "stop blocked on the connect phase"
        );
    }
}
