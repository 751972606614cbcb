//! # Headless Race Board Demo
//!
//! Builds the race control board, feeds it a scripted race from a background
//! "timing" thread plus scripted pointer input, and runs the frame loop
//! without a window. Prints frame statistics at the end.
//!
//! ```text
//! cargo run --bin trackside_demo -- [trackside.toml]
//! RUST_LOG=trackside=debug,trackside_ui=debug cargo run --bin trackside_demo
//! ```

use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use trackside::{FrameLoop, RaceBoard, TracksideConfig};
use trackside_shared::{DomainEvent, EventChannel, PilotId, RaceId};
use trackside_ui::{
    tessellate, CommandDrawer, InputEvent, Key, KeyEvent, MapTextureResolver, MouseButton,
    MouseEvent, NodeId, NodeTree, TextureHandle,
};
use tracing_subscriber::EnvFilter;

/// Frames simulated.
const FRAMES: u64 = 600;

/// Fixed timestep of the headless run.
const DT: f32 = 1.0 / 60.0;

const PILOTS: [(u64, &str); 4] = [(1, "Ava"), (2, "Kai"), (3, "Mia"), (4, "Leo")];

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => match TracksideConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::error!(%err, "could not load config");
                return ExitCode::FAILURE;
            }
        },
        None => TracksideConfig::default(),
    };
    let theme = match config.build_theme() {
        Ok(theme) => theme,
        Err(err) => {
            tracing::error!(%err, "bad theme");
            return ExitCode::FAILURE;
        }
    };

    // =========================================================================
    // BUILD
    // =========================================================================
    let channel: EventChannel<DomainEvent> = EventChannel::new("race-control");
    let mut frame_loop = FrameLoop::from_config(&config);
    let pilots: Vec<(PilotId, &str)> = PILOTS
        .iter()
        .map(|(id, name)| (PilotId::new(*id), *name))
        .collect();
    let races = (1..=3).map(RaceId::new).collect();
    let board = match RaceBoard::build(
        frame_loop.tree_mut(),
        &channel,
        &config,
        &theme,
        &pilots,
        3,
        races,
    ) {
        Ok(board) => board,
        Err(err) => {
            tracing::error!(%err, "could not build board");
            return ExitCode::FAILURE;
        }
    };
    frame_loop.tree_mut().layout();

    // =========================================================================
    // TIMING BACKEND (background thread)
    // =========================================================================
    let backend = {
        let channel = channel.clone();
        thread::spawn(move || run_race(&channel))
    };

    // =========================================================================
    // SCRIPTED INPUT
    // =========================================================================
    let script = input_script(frame_loop.tree(), &board);
    let input = frame_loop.input_sender();

    let resolver = MapTextureResolver::new();
    let mut drawer = CommandDrawer::new(resolver);
    for frame in 0..FRAMES {
        for (at, event) in &script {
            if *at == frame && input.send(*event).is_err() {
                tracing::warn!(frame, "input queue closed");
            }
        }
        if frame == FRAMES / 2 {
            // Assets finish streaming halfway through.
            drawer
                .resolver_mut()
                .insert("sponsor/banner", TextureHandle(1));
        }

        let stats = frame_loop.step(DT, &mut drawer);
        for outcome in frame_loop.outcomes() {
            tracing::info!(frame, ?outcome, "input");
        }
        if stats.drawn {
            let vertices: usize = drawer.batches().iter().map(|b| tessellate(b).len()).sum();
            tracing::debug!(
                frame,
                drawn = stats.draw.drawn,
                skipped = stats.draw.skipped,
                vertices,
                "frame drawn"
            );
        }
    }

    if backend.join().is_err() {
        tracing::error!("timing thread panicked");
    }

    // =========================================================================
    // REPORT
    // =========================================================================
    while let Ok(assignment) = board.assignments.try_recv() {
        println!(
            "slot {} <- {} ({})",
            assignment.index + 1,
            assignment.name,
            assignment.pilot
        );
    }
    println!(
        "selected race: {}",
        board
            .selected_race
            .get()
            .map_or_else(|| "none".to_string(), |race| race.to_string())
    );
    println!(
        "notice card: {}",
        if frame_loop.tree().is_alive(board.notice) {
            "open"
        } else {
            "closed"
        }
    );
    println!();
    frame_loop.stats().print_summary();
    ExitCode::SUCCESS
}

/// Emits a short race: select, register pilots, start, three laps each, end.
fn run_race(channel: &EventChannel<DomainEvent>) {
    let race = RaceId::new(1);
    channel.emit(&DomainEvent::RaceChanged { race: Some(race) });
    for (id, name) in PILOTS {
        channel.emit(&DomainEvent::PilotAdded {
            pilot: PilotId::new(id),
            name: name.to_string(),
        });
    }
    channel.emit(&DomainEvent::RaceStarted { race });
    let mut lap_ms = 61_250;
    for lap in 1..=3 {
        for (id, _) in PILOTS {
            thread::sleep(Duration::from_millis(5));
            lap_ms = (lap_ms * 997) % 70_000 + 50_000;
            channel.emit(&DomainEvent::LapRecorded {
                race,
                pilot: PilotId::new(id),
                lap,
                lap_ms,
            });
        }
    }
    channel.emit(&DomainEvent::RaceEnded { race });
}

/// Pointer and keyboard input keyed by the frame it is sent on.
fn input_script(tree: &NodeTree, board: &RaceBoard) -> Vec<(u64, InputEvent)> {
    let centre = |id: NodeId| {
        tree.absolute_bounds(id)
            .map_or((0.0, 0.0), |bounds| bounds.center())
    };
    let mut script = Vec::new();

    // Drag the second pilot into the first slot.
    if let (Some(&chip), Some(&slot)) = (board.chips.get(1), board.slots.first()) {
        let (cx, cy) = centre(chip);
        let (sx, sy) = centre(slot);
        script.push((30, MouseEvent::pressed(cx, cy, MouseButton::Left).into()));
        script.push((31, MouseEvent::moved(cx + 20.0, cy).into()));
        script.push((32, MouseEvent::moved(sx, sy).into()));
        script.push((33, MouseEvent::released(sx, sy, MouseButton::Left).into()));
    }

    // Focus the race picker and step it forward twice.
    let (px, py) = centre(board.selector);
    script.push((60, MouseEvent::pressed(px, py, MouseButton::Left).into()));
    script.push((61, KeyEvent::press(Key::Right).into()));
    script.push((62, KeyEvent::press(Key::Right).into()));
    script.push((63, KeyEvent::press(Key::Escape).into()));

    // Dismiss the notice card.
    let (bx, by) = centre(board.notice_close);
    script.push((90, MouseEvent::moved(bx, by).into()));
    script.push((91, MouseEvent::pressed(bx, by, MouseButton::Left).into()));

    script
}
