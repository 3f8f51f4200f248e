//! city-runner: caller-owned tick driver for the city simulation.
//!
//! Usage:
//!   city-runner --seed 12345 --ticks 600 --speed 4 --policies p1,p3
//!   city-runner --seed 12345 --realtime --ticks 120
//!   city-runner --seed 12345 --ipc-mode
//!   city-runner --data-dir ./data ...

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use citysim_core::{
    command::PlayerCommand,
    config::SimConfig,
    engine::{SimEngine, TickOutcome},
    event::SimEvent,
    history::MetricHistory,
    metric::MetricCategory,
    snapshot::{PolicyListing, SimSnapshot},
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    GetHistory,
    Tick { count: u64 },
    Command { command: PlayerCommand },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    #[serde(flatten)]
    snapshot: SimSnapshot,
    available_policies: Vec<PolicyListing>,
    events: Vec<SimEvent>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 600u64);
    let speed = parse_arg(&args, "--speed", 1.0f64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let realtime = args.iter().any(|a| a == "--realtime");
    let data_dir = flag_value(&args, "--data-dir");
    let policies: Vec<String> = flag_value(&args, "--policies")
        .map(|list| list.split(',').map(str::trim).filter(|p| !p.is_empty()).map(String::from).collect())
        .unwrap_or_default();

    let config = match data_dir {
        Some(dir) => SimConfig::load(dir)?,
        None => SimConfig::builtin()?,
    };

    if !ipc_mode {
        println!("city-runner");
        println!("  seed:      {seed}");
        println!("  ticks:     {ticks}");
        println!("  speed:     {speed}x");
        println!("  data_dir:  {}", data_dir.unwrap_or("(built-in)"));
        println!("  policies:  {}", if policies.is_empty() { "-".to_string() } else { policies.join(",") });
        println!();
    }

    let run_id = format!("run-{seed}-{}", Utc::now().timestamp());
    let mut engine = SimEngine::build(run_id, seed, config, Utc::now())?;
    engine.set_acceleration(speed);

    for policy_id in &policies {
        let outcome = engine.activate_policy(policy_id);
        if !outcome.is_activated() {
            log::warn!("policy {policy_id} not activated: {outcome:?}");
        }
    }

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else if realtime {
        run_realtime(&mut engine, ticks)?;
        print_summary(&engine, ticks);
    } else {
        let events = engine.run_ticks(ticks)?;
        log_notable(&events);
        print_summary(&engine, ticks);
    }

    Ok(())
}

/// Tick on the wall clock at the configured cadence.
fn run_realtime(engine: &mut SimEngine, ticks: u64) -> Result<()> {
    let interval = std::time::Duration::from_millis(engine.config().tuning.tick_interval_ms);
    engine.resume(Utc::now());
    for _ in 0..ticks {
        std::thread::sleep(interval);
        match engine.tick(Utc::now())? {
            TickOutcome::Completed { tick, events } => {
                log_notable(&events);
                let city = engine.city();
                log::info!(
                    "tick={tick} {:02}:{:02} day {} | congestion {:.0}% | usage {:.0}MW | budget ${:.1}M",
                    city.time.hour.floor() as u32,
                    (city.time.hour.fract() * 60.0).floor() as u32,
                    city.time.day,
                    city.traffic.congestion_level,
                    city.energy.electricity_usage,
                    city.economy.budget
                );
            }
            TickOutcome::Skipped { delta_secs } => log::warn!("tick skipped ({delta_secs:.1}s)"),
            TickOutcome::Paused => {}
        }
    }
    Ok(())
}

/// JSON lines on stdin, one JSON reply per line on stdout. Ticks run on a
/// synthetic clock one tick interval apart.
fn run_ipc_loop(engine: &mut SimEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();
    let step = Duration::milliseconds(engine.config().tuning.tick_interval_ms as i64);
    let mut now: DateTime<Utc> = engine.clock().last_update;

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {
                writeln!(stdout, "{}", serde_json::to_string(&ui_state(engine, Vec::new()))?)?;
            }
            IpcCommand::GetHistory => {
                let history: MetricHistory = engine.history();
                writeln!(stdout, "{}", serde_json::to_string(&history)?)?;
            }
            IpcCommand::Tick { count } => {
                let mut events = Vec::new();
                for _ in 0..count {
                    now += step;
                    if let TickOutcome::Completed { events: tick_events, .. } = engine.tick(now)? {
                        events.extend(tick_events.into_iter().filter(is_notable));
                    }
                }
                writeln!(stdout, "{}", serde_json::to_string(&ui_state(engine, events))?)?;
            }
            IpcCommand::Command { command } => {
                let (outcome, events) = engine.apply(command, now);
                log::debug!("command outcome: {outcome:?}");
                writeln!(stdout, "{}", serde_json::to_string(&ui_state(engine, events))?)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn ui_state(engine: &SimEngine, events: Vec<SimEvent>) -> UiState {
    UiState {
        snapshot: engine.snapshot(),
        available_policies: engine.available_policies(),
        events,
    }
}

fn is_notable(event: &SimEvent) -> bool {
    !matches!(event, SimEvent::TickStarted { .. } | SimEvent::TickCompleted { .. })
}

fn log_notable(events: &[SimEvent]) {
    for event in events.iter().filter(|e| is_notable(e)) {
        log::info!("{}: {}", event.type_name(), serde_json::to_string(event).unwrap_or_default());
    }
}

fn print_summary(engine: &SimEngine, ticks: u64) {
    let snapshot = engine.snapshot();
    let city = &snapshot.city;

    println!("=== RUN SUMMARY ===");
    println!("  run_id:         {}", snapshot.run_id);
    println!("  ticks driven:   {ticks}");
    println!("  ticks run:      {}", snapshot.tick);
    println!(
        "  sim date:       {:04}-{:02}-{:02} {:05.2}h",
        city.time.year, city.time.month, city.time.day, city.time.hour
    );
    println!("  acceleration:   {}x", snapshot.acceleration);

    println!();
    println!("=== CITY METRICS ===");
    for category in MetricCategory::ALL {
        let fields: Vec<String> = category
            .metrics()
            .map(|m| format!("{}={:.1}", m.field_name(), city.value(m)))
            .collect();
        println!("  {:<12} {}", category.name(), fields.join("  "));
    }

    println!();
    println!("=== POLICIES ===");
    if snapshot.active_policies.is_empty() {
        println!("  (none active)");
    }
    for p in &snapshot.active_policies {
        println!(
            "  {} {:<28} {:>5.1}% implemented",
            p.definition.id, p.definition.name, p.implementation_progress
        );
    }

    println!();
    println!("=== CITY EVENTS ===");
    if snapshot.active_events.is_empty() {
        println!("  (none active)");
    }
    for e in &snapshot.active_events {
        println!(
            "  {} {:<28} {:?} since {}",
            e.definition.id, e.definition.title, e.definition.severity, e.started_at
        );
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    flag_value(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
