use clap::Parser;
use collider_core::SynthServer;
use collider_infra_timer_thread::ThreadTimer;
use collider_infra_transport_rtrb::{lang_channel, LangReceiver, DEFAULT_CAPACITY};
use collider_ports::{Frame, LangMessage, ServerConfig, SessionId, TextFrame, DEFAULT_SESSION};
use parking_lot::Mutex;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::thread;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "collider")]
#[command(about = "Headless synthesis server speaking JSON lines on stdin/stdout", long_about = None)]
struct Cli {
    /// JSON server config; defaults apply for missing fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Append the rendered stream here as interleaved 16-bit little-endian PCM
    #[arg(short, long)]
    stream_out: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    queue_capacity: usize,
}

/// One stdin line: a bare command list for session 0, or an envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum InboundLine {
    Bare(TextFrame),
    Envelope {
        #[serde(default)]
        session: SessionId,
        #[serde(default)]
        text: Option<TextFrame>,
        #[serde(default)]
        binary: Option<Vec<u8>>,
    },
}

impl InboundLine {
    fn into_frame(self) -> Option<(Frame, SessionId)> {
        match self {
            InboundLine::Bare(frame) => Some((Frame::Text(frame), DEFAULT_SESSION)),
            InboundLine::Envelope {
                session,
                text: Some(frame),
                ..
            } => Some((Frame::Text(frame), session)),
            InboundLine::Envelope {
                session,
                binary: Some(bytes),
                ..
            } => Some((Frame::Binary(bytes), session)),
            InboundLine::Envelope { .. } => None,
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(ServerConfig::from_json_str(&fs::read_to_string(path)?)?),
        None => Ok(ServerConfig::default()),
    }
}

fn relay(mut receiver: LangReceiver, mut stream_out: Option<BufWriter<File>>, done: Arc<AtomicBool>) {
    let stdout = io::stdout();
    loop {
        let finished = done.load(Ordering::Acquire);
        for msg in receiver.drain() {
            match msg {
                LangMessage::Text(frame) => {
                    let mut out = stdout.lock();
                    if let Err(err) = serde_json::to_writer(&mut out, &frame).map_err(io::Error::from).and_then(|_| writeln!(out)) {
                        tracing::warn!(%err, "failed to write reply");
                    }
                }
                LangMessage::Stream(samples) => {
                    let Some(writer) = stream_out.as_mut() else {
                        continue;
                    };
                    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
                    if let Err(err) = writer.write_all(&bytes) {
                        tracing::warn!(%err, "failed to write stream");
                    }
                }
            }
        }
        if finished {
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }
    if let Some(mut writer) = stream_out {
        if let Err(err) = writer.flush() {
            tracing::warn!(%err, "failed to flush stream");
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let stream_out = cli.stream_out.as_ref().map(File::create).transpose()?.map(BufWriter::new);

    let (lang, receiver) = lang_channel(cli.queue_capacity);

    let target: Arc<OnceLock<Weak<Mutex<SynthServer>>>> = Arc::default();
    let timer = ThreadTimer::new({
        let target = Arc::clone(&target);
        move |now| {
            if let Some(server) = target.get().and_then(Weak::upgrade) {
                server.lock().process(now);
            }
        }
    });
    let server = Arc::new(Mutex::new(SynthServer::new(config, Arc::new(lang), Box::new(timer))?));
    let _ = target.set(Arc::downgrade(&server));

    let done = Arc::new(AtomicBool::new(false));
    let relay_thread = {
        let done = Arc::clone(&done);
        thread::Builder::new()
            .name("collider-relay".into())
            .spawn(move || relay(receiver, stream_out, done))?
    };

    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let inbound = match serde_json::from_str::<InboundLine>(&line) {
            Ok(inbound) => inbound,
            Err(err) => {
                tracing::warn!(%err, "unparseable input line");
                continue;
            }
        };
        let Some((frame, session)) = inbound.into_frame() else {
            tracing::warn!("input envelope carries no frame");
            continue;
        };
        if let Err(err) = server.lock().dispatch(frame, session) {
            tracing::warn!(session, %err, "command rejected");
        }
    }

    drop(server);
    done.store(true, Ordering::Release);
    if relay_thread.join().is_err() {
        tracing::error!("relay thread panicked");
    }
    Ok(())
}
