use crate::commands::CommandTables;
use crate::error::ServerError;
use crate::manager::InstanceManager;
use collider_ports::{
    Frame, LangMessage, LangPort, ServerConfig, SessionId, SyncCount, TextFrame, TimerPort,
    DEFAULT_SESSION,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub type ServerHandler = fn(&mut SynthServer, &[Value], SessionId) -> Result<(), ServerError>;

/// Server-level text commands keyed by name.
#[derive(Clone, Default)]
pub struct ServerCommands {
    handlers: HashMap<&'static str, ServerHandler>,
}

impl ServerCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut commands = Self::new();
        commands.register("/init", init_command);
        commands.register("/play", play_command);
        commands.register("/pause", pause_command);
        commands.register("/reset", reset_command);
        commands.register("/processed", processed_command);
        commands
    }

    pub fn register(&mut self, name: &'static str, handler: ServerHandler) {
        self.handlers.insert(name, handler);
    }

    pub fn get(&self, name: &str) -> Option<ServerHandler> {
        self.handlers.get(name).copied()
    }
}

struct RenderClock {
    origin: Instant,
    rendered: u64,
}

/// Owns the instance manager, the render clock and the outbound stream.
pub struct SynthServer {
    config: ServerConfig,
    lang: Arc<dyn LangPort>,
    timer: Box<dyn TimerPort>,
    tables: Arc<CommandTables>,
    commands: ServerCommands,
    manager: Option<InstanceManager>,
    strm: Vec<i16>,
    strm_pos: usize,
    sync_count: SyncCount,
    clock: Option<RenderClock>,
}

impl SynthServer {
    pub fn new(config: ServerConfig, lang: Arc<dyn LangPort>, timer: Box<dyn TimerPort>) -> Result<Self, ServerError> {
        Self::with_tables(
            config,
            lang,
            timer,
            CommandTables::with_builtins(),
            ServerCommands::with_builtins(),
        )
    }

    pub fn with_tables(
        config: ServerConfig,
        lang: Arc<dyn LangPort>,
        timer: Box<dyn TimerPort>,
        tables: CommandTables,
        commands: ServerCommands,
    ) -> Result<Self, ServerError> {
        config.validate()?;
        Ok(Self {
            config,
            lang,
            timer,
            tables: Arc::new(tables),
            commands,
            manager: None,
            strm: Vec::new(),
            strm_pos: 0,
            sync_count: 0,
            clock: None,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.manager.is_some()
    }

    pub fn manager(&self) -> Option<&InstanceManager> {
        self.manager.as_ref()
    }

    pub fn manager_mut(&mut self) -> Option<&mut InstanceManager> {
        self.manager.as_mut()
    }

    pub fn sync_count(&self) -> SyncCount {
        self.sync_count
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Instant the render clock was started at, while the timer runs.
    pub fn clock_origin(&self) -> Option<Instant> {
        self.clock.as_ref().map(|clock| clock.origin)
    }

    /// Allocates the output stream and the default instance. Later calls are
    /// no-ops.
    pub fn init(&mut self, sample_rate: Option<u32>, channels: Option<usize>) -> Result<(), ServerError> {
        if self.manager.is_some() {
            return Ok(());
        }
        let mut config = self.config.clone();
        if let Some(sample_rate) = sample_rate {
            config.sample_rate = sample_rate;
        }
        if let Some(channels) = channels {
            config.channels = channels;
        }
        config.validate()?;
        self.config = config;

        self.strm = vec![0; self.config.strm_length * self.config.channels];
        self.strm_pos = 0;
        let mut manager = InstanceManager::new(
            self.config.bus_layout(),
            self.config.sample_rate,
            self.config.instance_gain,
            Arc::clone(&self.tables),
        );
        manager.append(DEFAULT_SESSION);
        self.manager = Some(manager);
        info!(
            sample_rate = self.config.sample_rate,
            channels = self.config.channels,
            buf_length = self.config.buf_length,
            "synth server initialized"
        );
        Ok(())
    }

    pub fn play(&mut self, session: SessionId) -> Result<(), ServerError> {
        let manager = self.manager.as_mut().ok_or(ServerError::NotInitialized)?;
        manager.play(session);
        if !self.timer.is_running() {
            self.timer.start(self.config.timer_period());
            self.clock = Some(RenderClock {
                origin: Instant::now(),
                rendered: 0,
            });
            debug!("render timer started");
        }
        self.lang.send(LangMessage::ack("/played", self.sync_count));
        Ok(())
    }

    /// The timer keeps running while any other instance still plays.
    pub fn pause(&mut self, session: SessionId) -> Result<(), ServerError> {
        let manager = self.manager.as_mut().ok_or(ServerError::NotInitialized)?;
        manager.pause(session);
        if self.timer.is_running() && !manager.is_any_running() {
            self.timer.stop();
            self.clock = None;
            debug!("render timer stopped");
        }
        self.lang.send(LangMessage::ack("/paused", self.sync_count));
        Ok(())
    }

    pub fn reset(&mut self, session: SessionId) -> Result<(), ServerError> {
        let manager = self.manager.as_mut().ok_or(ServerError::NotInitialized)?;
        manager.reset(session);
        Ok(())
    }

    pub fn push_to_timeline(&mut self, session: SessionId, fragment: Vec<TextFrame>) -> Result<(), ServerError> {
        let manager = self.manager.as_mut().ok_or(ServerError::NotInitialized)?;
        manager.enqueue(session, fragment);
        Ok(())
    }

    /// Entry point for every inbound frame. Binary frames bypass the command
    /// table; an unseen session gets its own instance once initialized.
    pub fn dispatch(&mut self, frame: Frame, session: SessionId) -> Result<(), ServerError> {
        match frame {
            Frame::Binary(bytes) => {
                if let Some(manager) = self.manager.as_mut() {
                    manager.append(session);
                    manager.apply_binary_command(session, &bytes);
                }
                Ok(())
            }
            Frame::Text(msg) => {
                let name = msg
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| ServerError::MalformedFrame("missing command name".into()))?;
                let handler = self
                    .commands
                    .get(name)
                    .ok_or_else(|| ServerError::UnknownCommand(name.to_string()))?;
                if let Some(manager) = self.manager.as_mut() {
                    manager.append(session);
                }
                handler(self, &msg, session)
            }
        }
    }

    /// Renders every buffer that has come due since the clock started and
    /// returns how many were rendered. There is no catch-up limit.
    pub fn process(&mut self, now: Instant) -> usize {
        let Some(clock) = self.clock.as_mut() else {
            return 0;
        };
        let elapsed = now.saturating_duration_since(clock.origin).as_secs_f64();
        let due = (elapsed * self.config.sample_rate as f64 / self.config.buf_length as f64) as u64;
        let pending = due.saturating_sub(clock.rendered);
        clock.rendered = clock.rendered.max(due);
        for _ in 0..pending {
            self.render_buffer();
        }
        pending as usize
    }

    /// Renders one synthesis buffer into the stream, flushing it when full.
    pub fn render_buffer(&mut self) {
        let Some(manager) = self.manager.as_mut() else {
            return;
        };
        let buf_length = self.config.buf_length;
        let channels = self.config.channels;
        manager.process(buf_length);
        let bus = manager.bus_out();
        for frame in 0..buf_length {
            let base = (self.strm_pos + frame) * channels;
            for channel in 0..channels {
                self.strm[base + channel] = to_i16(bus[channel * buf_length + frame]);
            }
        }
        self.strm_pos += buf_length;
        self.sync_count = self.sync_count.wrapping_add(buf_length as SyncCount);
        if self.strm_pos >= self.config.strm_length {
            self.strm_pos = 0;
            self.lang.send(LangMessage::Stream(self.strm.clone()));
        }
    }
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0) as i16
}

fn init_command(server: &mut SynthServer, msg: &[Value], _session: SessionId) -> Result<(), ServerError> {
    let positive = |index: usize| msg.get(index).and_then(Value::as_f64).filter(|v| *v >= 1.0);
    let sample_rate = positive(1).map(|v| v as u32);
    let channels = positive(2).map(|v| v as usize);
    server.init(sample_rate, channels)
}

fn play_command(server: &mut SynthServer, _msg: &[Value], session: SessionId) -> Result<(), ServerError> {
    server.play(session)
}

fn pause_command(server: &mut SynthServer, _msg: &[Value], session: SessionId) -> Result<(), ServerError> {
    server.pause(session)
}

fn reset_command(server: &mut SynthServer, _msg: &[Value], session: SessionId) -> Result<(), ServerError> {
    server.reset(session)
}

/// `/processed [[name, args...], ...]`
fn processed_command(server: &mut SynthServer, msg: &[Value], session: SessionId) -> Result<(), ServerError> {
    let Some(Value::Array(commands)) = msg.get(1) else {
        return Err(ServerError::MalformedFrame("/processed expects a command list".into()));
    };
    let fragment = commands
        .iter()
        .filter_map(|command| {
            let frame = command.as_array().cloned();
            if frame.is_none() {
                warn!(session, %command, "timeline entry is not a command list");
            }
            frame
        })
        .collect();
    server.push_to_timeline(session, fragment)
}
