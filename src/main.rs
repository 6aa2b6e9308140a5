//! Command-line front end: opens a WAV file, lays it out for a widget size and
//! reports the draw commands a UI would receive.

use std::path::PathBuf;

use waveview::config;
use waveview::logging;
use waveview::waveform::{AccessMode, DrawCommand, WaveformView};

const DEFAULT_WIDTH: usize = 800;
const DEFAULT_HEIGHT: usize = 200;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let Some(options) = parse_args(std::env::args().skip(1).collect())? else {
        return Ok(());
    };
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }

    let mut settings = config::load_or_default().map_err(|err| err.to_string())?;
    if let Some(mode) = options.access_mode {
        settings.access_mode = mode;
    }
    let mut view = WaveformView::open(settings, &options.file).map_err(|err| err.to_string())?;
    let spec = view.source().spec().map_err(|err| err.to_string())?;
    println!("File: {}", options.file.display());
    println!(
        "Stream: {} ch, {} Hz, {} frames ({:.3} s)",
        spec.channels,
        spec.sample_rate,
        spec.total_frames,
        spec.duration_seconds()
    );
    println!("Access: {:?}", view.access_mode());

    view.resize(options.width, options.height)
        .map_err(|err| err.to_string())?;
    let from = options.from.unwrap_or(0);
    let to = options.to.unwrap_or(options.width).max(from);
    let list = view.render(from..to).map_err(|err| err.to_string())?;

    println!("Widget: {}x{}", options.width, options.height);
    println!("Mode: {:?}", list.mode);
    match view.viewport().scale_factor() {
        Some(scale) => println!("Scale factor: {scale:.4}"),
        None => println!("Scale factor: (none)"),
    }
    let markers = list
        .commands
        .iter()
        .filter(|command| matches!(command, DrawCommand::Marker { .. }))
        .count();
    println!(
        "Columns {from}..{to}: {} lines, {markers} markers",
        list.commands.len() - markers
    );

    if options.dump {
        for command in &list.commands {
            match command {
                DrawCommand::Line { from, to } => println!(
                    "line {:.1},{:.1} -> {:.1},{:.1}",
                    from.x, from.y, to.x, to.y
                ),
                DrawCommand::Marker { at } => println!("marker {:.1},{:.1}", at.x, at.y),
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    file: PathBuf,
    width: usize,
    height: usize,
    access_mode: Option<AccessMode>,
    from: Option<usize>,
    to: Option<usize>,
    dump: bool,
}

fn parse_args(args: Vec<String>) -> Result<Option<CliOptions>, String> {
    let mut file: Option<PathBuf> = None;
    let mut width = DEFAULT_WIDTH;
    let mut height = DEFAULT_HEIGHT;
    let mut access_mode = None;
    let mut from = None;
    let mut to = None;
    let mut dump = false;
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => {
                println!("{}", help_text());
                return Ok(None);
            }
            "--file" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--file requires a value".to_string())?;
                file = Some(PathBuf::from(value));
            }
            "--width" => {
                idx += 1;
                width = parse_usize(&args, idx, "--width")?;
            }
            "--height" => {
                idx += 1;
                height = parse_usize(&args, idx, "--height")?;
            }
            "--from" => {
                idx += 1;
                from = Some(parse_usize(&args, idx, "--from")?);
            }
            "--to" => {
                idx += 1;
                to = Some(parse_usize(&args, idx, "--to")?);
            }
            "--access" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--access requires a value".to_string())?;
                access_mode = Some(parse_access_mode(value)?);
            }
            "--dump" => dump = true,
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    let Some(file) = file else {
        return Err("--file is required".to_string());
    };
    if width == 0 {
        return Err("--width must be at least 1".to_string());
    }
    Ok(Some(CliOptions {
        file,
        width,
        height,
        access_mode,
        from,
        to,
        dump,
    }))
}

fn parse_usize(args: &[String], idx: usize, flag: &str) -> Result<usize, String> {
    let value = args
        .get(idx)
        .ok_or_else(|| format!("{flag} requires a value"))?;
    value
        .parse::<usize>()
        .map_err(|_| format!("Invalid {flag} value: {value}"))
}

fn parse_access_mode(value: &str) -> Result<AccessMode, String> {
    match value {
        "full_cache" | "full" => Ok(AccessMode::FullCache),
        "on_demand" | "disk" => Ok(AccessMode::OnDemand),
        other => Err(format!(
            "Invalid --access value: {other} (expected full_cache or on_demand)"
        )),
    }
}

fn help_text() -> String {
    [
        "waveview",
        "",
        "Usage:",
        "  waveview --file <path.wav> [--width <px>] [--height <px>]",
        "           [--access full_cache|on_demand] [--from <px>] [--to <px>] [--dump]",
        "",
        "Options:",
        "  --width    Widget width in pixels (default 800)",
        "  --height   Widget height in pixels (default 200)",
        "  --access   Override the configured access mode",
        "  --from     First invalidated pixel column (default 0)",
        "  --to       End of the invalidated pixel range (default width)",
        "  --dump     Print every draw command",
    ]
    .join("\n")
}
