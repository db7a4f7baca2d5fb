mod services;
mod tal_loopback;

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use clap::Parser;

use r2_config::toml_config;
use r2_core::{ChannelId, SpanId};
use r2_pe::{PeEngine, SimulatedPe};
use r2_span::{SpanMonitor, SpanRegistry};
use r2_tal::{ChannelEventSink, TalEventSink};

use services::DefaultServices;
use tal_loopback::LoopbackTal;

type Registry = SpanRegistry<LoopbackTal, DefaultServices>;

#[derive(Parser, Debug)]
#[command(author, version, about = "R2 span signaling daemon", long_about = "Loads a span's TOML configuration, starts its monitor loop, and exposes the administrative control surface over TCP")]
struct Args {
    /// TOML span configuration file
    config: String,

    /// Span id this configuration describes
    #[arg(long, default_value_t = 1)]
    span_id: u32,

    /// Administrative control surface bind address
    #[arg(long, default_value = "127.0.0.1:7000")]
    control_addr: String,

    /// Optional verbose log file, mirrors stdout at debug level
    #[arg(long)]
    debug_log: Option<String>,
}

fn load_span(args: &Args) -> r2_span::Span<LoopbackTal, DefaultServices> {
    let shared = match toml_config::from_file(&args.config, SpanId(args.span_id)) {
        Ok(shared) => shared,
        Err(err) => {
            eprintln!("failed to load {}: {}", args.config, err);
            std::process::exit(1);
        }
    };

    let channel_count = shared.config().channel_count;
    let allow_collect_calls = shared.config().allow_collect_calls;
    let span_id = SpanId(args.span_id);

    let (tx, rx) = crossbeam_channel::unbounded();
    thread::spawn(move || {
        for event in rx.iter() {
            tracing::info!(?event, "upward event");
        }
    });

    let tal_channels: Vec<LoopbackTal> = (0..channel_count).map(|i| LoopbackTal::new(span_id, ChannelId(i + 1))).collect();

    r2_span::configure(
        shared,
        tal_channels,
        |id| Box::new(SimulatedPe::new(id)) as Box<dyn PeEngine>,
        move |_id| DefaultServices::new(allow_collect_calls),
        move |_id| Box::new(ChannelEventSink::new(tx.clone())) as Box<dyn TalEventSink>,
    )
    .unwrap_or_else(|err| {
        eprintln!("failed to configure span {}: {}", args.span_id, err);
        std::process::exit(1);
    })
}

fn run_control_listener(addr: String, registry: Arc<Registry>, running: Arc<AtomicBool>) {
    let listener = match TcpListener::bind(&addr) {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%addr, %err, "failed to bind control listener");
            return;
        }
    };
    listener.set_nonblocking(true).expect("failed to set control listener non-blocking");
    tracing::info!(%addr, "control surface listening");

    while running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                tracing::info!(%peer, "control connection accepted");
                let registry = registry.clone();
                thread::spawn(move || handle_control_connection(stream, &registry));
            }
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(std::time::Duration::from_millis(50));
            }
            Err(err) => {
                tracing::error!(%err, "control listener accept failed");
            }
        }
    }
}

fn handle_control_connection(stream: TcpStream, registry: &Registry) {
    let peer = stream.peer_addr();
    let mut writer = stream.try_clone().expect("failed to clone control stream");
    let reader = BufReader::new(stream);
    let control = r2_control::Control::new(registry);

    for line in reader.lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        let response = control.dispatch(&line);
        if writer.write_all(response.as_bytes()).is_err() || writer.write_all(b"\n").is_err() {
            break;
        }
    }
    tracing::debug!(?peer, "control connection closed");
}

fn main() {
    eprintln!("█▀█ ▀█▀ ▀█▀ █▀█ █▀█ █▀█ █ █▀▄");
    eprintln!("█▀▄  █   █  █▀▀ █▀█ █ █ █ █ █");
    eprintln!("▀ ▀ ▀▀▀  ▀  ▀   ▀ ▀ ▀ ▀ ▀ ▀▀ \n");
    eprintln!(" R2 span signaling core\n");

    let args = Args::parse();
    let _log_guard = r2_core::debug::setup_logging_default(args.debug_log.clone());

    let span = load_span(&args);
    let span_id = span.span_id();
    let registry: Arc<Registry> = Arc::new(SpanRegistry::new());
    registry.register(Arc::new(span));

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("failed to set Ctrl+C handler");

    let control_addr = args.control_addr.clone();
    let control_registry = registry.clone();
    let control_running = running.clone();
    let control_thread = thread::spawn(move || run_control_listener(control_addr, control_registry, control_running));

    // `Span` is a thin handle over `Arc`s (config, state, per-channel
    // mutexes): cloning it for the monitor thread shares the exact same
    // state the registry's copy points at, it does not fork the span.
    let monitor_span = (*registry.get(span_id).expect("span was just registered")).clone();
    let monitor_running = running.clone();
    let monitor_thread = thread::Builder::new()
        .name(format!("r2-span-{}", span_id.0))
        .spawn(move || {
            let thread_name = thread::current().name().unwrap_or("unnamed").to_string();
            monitor_span.shared.state_write().monitor_thread = Some(thread_name);

            let mut monitor = SpanMonitor::new(monitor_span);
            while monitor_running.load(Ordering::SeqCst) && monitor.is_running() {
                monitor.run_once();
            }
        })
        .expect("failed to spawn span monitor thread");

    monitor_thread.join().expect("span monitor thread panicked");
    running.store(false, Ordering::SeqCst);
    control_thread.join().expect("control listener thread panicked");
}
