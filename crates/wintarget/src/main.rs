//! wintarget - Inspect window targeting scenes
//!
//! Loads a display-group snapshot ("scene") from a JSON or TOML file and
//! answers targeting questions against it, using the same engine the
//! service runs. Useful for debugging why an event landed where it did
//! without a live device stack.
//!
//! # Usage
//!
//! ```text
//! # Which window receives a touch at (x, y)?
//! wintarget hit scene.json 500 300
//! wintarget hit scene.json 500 300 --display 2
//!
//! # Where does a physical point land after rotation/one-hand remap?
//! wintarget transform scene.json 0 10 20
//!
//! # Full engine state dump
//! wintarget dump scene.json
//! ```
//!
//! Scenes are the serialized `DisplayGroupInfo` model; `RUST_LOG=debug`
//! enables engine tracing.
//!
//! Exit codes:
//! - 0: success
//! - 1: runtime error (unreadable scene, no such display)
//! - 2: usage error

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};

use targeting::event::{KeyEvent, PointerAction, PointerEvent, PointerItem, SourceType};
use targeting::geometry::{
    adjust_display_coordinate, one_hand_position, rotate_screen, transform_display_xy, Position,
};
use targeting::ports::{AnrKind, NoDevices, SessionTable};
use targeting::types::{DisplayGroupInfo, Pid};
use targeting::{Config, Resolution, TargetingEngine};

/// Exit code for bad command-line usage.
const EXIT_USAGE: u8 = 2;

/// Transport that prints deliveries instead of writing to sockets.
struct PrintTransport;

impl SessionTable for PrintTransport {
    fn fd_for_pid(&self, pid: Pid) -> Option<i32> {
        Some(pid)
    }

    fn send_event(&self, fd: i32, event: &PointerEvent) -> bool {
        println!(
            "  -> pid {} {:?} window={:?}",
            fd, event.action, event.target_window_id
        );
        true
    }

    fn send_key_event(&self, fd: i32, event: &KeyEvent) -> bool {
        println!("  -> pid {} key {} window={:?}", fd, event.key_code, event.target_window_id);
        true
    }

    fn trigger_anr(&self, _kind: AnrKind, _ts: i64, _fd: i32) -> bool {
        true
    }
}

fn usage() {
    eprintln!("usage: wintarget <command> <scene-file> [args]");
    eprintln!();
    eprintln!("commands:");
    eprintln!("  hit <scene> <x> <y> [--display N]   resolve a touch at (x, y)");
    eprintln!("  transform <scene> <display> <x> <y> map a physical point to logical");
    eprintln!("  dump <scene>                        print full engine state");
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        usage();
        return ExitCode::from(EXIT_USAGE);
    };

    let result = match command.as_str() {
        "hit" => cmd_hit(rest),
        "transform" => cmd_transform(rest),
        "dump" => cmd_dump(rest),
        "-h" | "--help" | "help" => {
            usage();
            return ExitCode::SUCCESS;
        }
        other => {
            eprintln!("unknown command: {other}");
            usage();
            return ExitCode::from(EXIT_USAGE);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Load a scene from JSON (default) or TOML (by extension).
fn load_scene(path: &Path) -> Result<DisplayGroupInfo> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading scene {}", path.display()))?;
    if path.extension().and_then(|e| e.to_str()) == Some("toml") {
        toml::from_str(&contents).with_context(|| format!("parsing scene {}", path.display()))
    } else {
        serde_json::from_str(&contents)
            .with_context(|| format!("parsing scene {}", path.display()))
    }
}

/// Engine config from ~/.config/wintarget/config.toml, defaults when
/// absent or malformed.
fn load_config() -> Config {
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let path = PathBuf::from(home)
        .join(".config")
        .join("wintarget")
        .join("config.toml");
    match std::fs::read_to_string(&path) {
        Ok(contents) => match Config::from_toml_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("warning: failed to parse config: {e}");
                Config::default()
            }
        },
        Err(_) => Config::default(),
    }
}

fn engine_for(scene: DisplayGroupInfo) -> TargetingEngine {
    tracing::debug!(
        windows = scene.windows.len(),
        displays = scene.displays.len(),
        "scene loaded"
    );
    let mut engine = TargetingEngine::new(load_config(), Box::new(NoDevices), Box::new(PrintTransport));
    engine.update_display_info(scene);
    engine
}

fn parse_i32(s: &str, what: &str) -> Result<i32> {
    s.parse::<i32>().with_context(|| format!("{what} must be an integer, got {s:?}"))
}

fn cmd_hit(args: &[String]) -> Result<()> {
    let (positional, display) = split_display_flag(args)?;
    let [scene_path, x, y] = positional.as_slice() else {
        bail!("hit needs <scene> <x> <y>");
    };
    let scene = load_scene(Path::new(scene_path))?;
    let mut engine = engine_for(scene);

    let event = PointerEvent {
        source: SourceType::TouchScreen,
        action: PointerAction::Down,
        target_display_id: display.unwrap_or(0),
        items: vec![PointerItem {
            pointer_id: 0,
            display_x: parse_i32(x, "x")?,
            display_y: parse_i32(y, "y")?,
            ..Default::default()
        }],
        ..Default::default()
    };
    match engine.handle_pointer_event(&event) {
        Resolution::Target(t) => {
            println!(
                "window {} (agent {}, pid {}, display {:?})",
                t.window_id, t.agent_window_id, t.pid, t.display_id
            );
        }
        Resolution::Swallowed => println!("swallowed by policy"),
        Resolution::NoTarget => println!("no target"),
    }
    Ok(())
}

fn cmd_transform(args: &[String]) -> Result<()> {
    let [scene_path, display_id, x, y] = args else {
        bail!("transform needs <scene> <display> <x> <y>");
    };
    let scene = load_scene(Path::new(scene_path))?;
    let id = parse_i32(display_id, "display")?;
    let display = scene
        .displays
        .iter()
        .find(|d| d.id == id)
        .with_context(|| format!("no display {id} in scene"))?;

    let p = Position::new(parse_i32(x, "x")?, parse_i32(y, "y")?);
    let one_hand = one_hand_position(display, p);
    let rotated = rotate_screen(display, one_hand);
    let transformed = transform_display_xy(display, rotated);
    let clamped = adjust_display_coordinate(display, transformed);

    println!("physical   ({}, {})", p.x, p.y);
    if one_hand != p {
        println!("one-hand   ({}, {})", one_hand.x, one_hand.y);
    }
    println!("rotated    ({}, {})", rotated.x, rotated.y);
    if transformed != rotated {
        println!("transform  ({}, {})", transformed.x, transformed.y);
    }
    println!("logical    ({}, {})", clamped.x, clamped.y);
    Ok(())
}

fn cmd_dump(args: &[String]) -> Result<()> {
    let [scene_path] = args else {
        bail!("dump needs <scene>");
    };
    let scene = load_scene(Path::new(scene_path))?;
    let engine = engine_for(scene);
    let mut out = std::io::stdout();
    engine.dump(&mut out, &[])?;
    Ok(())
}

/// Split off an optional trailing `--display N` flag.
fn split_display_flag(args: &[String]) -> Result<(Vec<String>, Option<i32>)> {
    let mut positional = Vec::new();
    let mut display = None;
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        if arg == "--display" {
            let value = it.next().context("--display needs a value")?;
            display = Some(parse_i32(value, "display")?);
        } else {
            positional.push(arg.clone());
        }
    }
    Ok((positional, display))
}
