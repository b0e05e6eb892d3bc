//! Terminal front-end for the earbridge engine.
//!
//! Stands in for the presentation layer: reads single-letter commands from
//! stdin, drives the [`AudioGraphController`] and renders engine events —
//! including a live level meter — to the terminal.
//!
//! # Commands
//!
//! ```text
//! s            start (or restart) the engine
//! x            stop
//! g <value>    set amplification, e.g. `g 1.5` (clamped to 0..=2)
//! i <source>   select input: `auto`, `builtin` or `headset`
//! l            list available input devices
//! q            quit
//! ```

use std::io::BufRead;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Result;

use earbridge::audio::silence_floor_db;
use earbridge::config::AppConfig;
use earbridge::engine::{AudioBackend, AudioGraphController, CpalBackend, EngineEvent};
use earbridge::session::InputSource;

/// dB range mapped onto the meter bar (floor..0 dBFS).
const METER_FLOOR_DB: f32 = -60.0;
const METER_WIDTH: usize = 40;

fn main() -> Result<()> {
    env_logger::init();

    let config = AppConfig::load()?;
    log::info!(
        "config: {} Hz / {} ms, amplification {:.2}",
        config.audio.sample_rate,
        config.audio.buffer_ms,
        config.audio.amplification
    );

    let (tx, rx) = mpsc::channel();
    let backend = CpalBackend::new(tx.clone());
    let mut controller =
        AudioGraphController::new(backend, config.audio.session_config(), tx);

    if config.audio.input_source != InputSource::Auto {
        if let Err(e) = controller.set_preferred_input(config.audio.input_source) {
            log::warn!("configured input source unavailable, staying on auto: {e}");
        }
    }

    let mut amplification = config.audio.amplification;
    controller.start(amplification)?;

    println!("earbridge — s start, x stop, g <gain>, i <auto|builtin|headset>, l list, q quit");

    // Commands arrive over a channel so this loop can keep draining engine
    // events between keystrokes.
    let commands = spawn_stdin_reader();

    loop {
        // Engine events first: the level meter repaints per audio block.
        while let Ok(event) = rx.try_recv() {
            match event {
                EngineEvent::Started => println!("\n[started]"),
                EngineEvent::Stopped => println!("\n[stopped]"),
                EngineEvent::Level(db) => draw_meter(db),
                EngineEvent::Error(e) => eprintln!("\n[stream fault] {e}"),
            }
        }

        match commands.recv_timeout(Duration::from_millis(30)) {
            Ok(line) => {
                if !handle_command(&line, &mut controller, &mut amplification)? {
                    break;
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    controller.stop();
    Ok(())
}

/// Returns `false` when the user asked to quit.
fn handle_command(
    line: &str,
    controller: &mut AudioGraphController<CpalBackend>,
    amplification: &mut f32,
) -> Result<bool> {
    let mut parts = line.split_whitespace();
    match parts.next() {
        Some("s") => {
            if let Err(e) = controller.start(*amplification) {
                eprintln!("start failed: {e}");
            }
        }
        Some("x") => controller.stop(),
        Some("g") => match parts.next().map(str::parse::<f32>) {
            Some(Ok(value)) => {
                *amplification = controller.set_amplification(value);
                println!("amplification: {amplification:.2}");
            }
            _ => eprintln!("usage: g <value>"),
        },
        Some("i") => {
            let source = match parts.next() {
                Some("auto") => Some(InputSource::Auto),
                Some("builtin") => Some(InputSource::BuiltInMic),
                Some("headset") => Some(InputSource::HeadsetMic),
                _ => None,
            };
            match source {
                Some(source) => match controller.set_preferred_input(source) {
                    Ok(()) => println!("input: {source:?}"),
                    // Selection is unchanged on failure; the UI falls back
                    // to showing the previous choice.
                    Err(e) => eprintln!("input unchanged: {e}"),
                },
                None => eprintln!("usage: i <auto|builtin|headset>"),
            }
        }
        Some("l") => {
            let (tx, _rx) = mpsc::channel();
            for device in CpalBackend::new(tx).available_inputs() {
                println!("  {:?}  {}", device.kind, device.name);
            }
        }
        Some("q") => return Ok(false),
        Some(other) => eprintln!("unknown command: {other}"),
        None => {}
    }
    Ok(true)
}

/// Forward stdin lines over a channel so the main loop never blocks on a
/// read.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Render one meter frame in place: `[########        ] -23.4 dB`.
fn draw_meter(db: f32) {
    let clamped = db.clamp(METER_FLOOR_DB, 0.0);
    let fill = ((clamped - METER_FLOOR_DB) / -METER_FLOOR_DB * METER_WIDTH as f32) as usize;

    let shown = if db <= silence_floor_db() + 1.0 {
        METER_FLOOR_DB // don't print the ε floor as a real reading
    } else {
        db
    };

    print!(
        "\r[{:#<fill$}{:<rest$}] {shown:>6.1} dB",
        "",
        "",
        fill = fill,
        rest = METER_WIDTH - fill,
    );
    use std::io::Write;
    let _ = std::io::stdout().flush();
}
