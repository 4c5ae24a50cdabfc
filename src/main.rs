use clap::Parser;
use ledstep::control::ControlMessage;
use ledstep::transport::{Link, WriterTransport};
use ledstep::{compile, registry, CompilerConfig, LinkConfig, Outcome, Session};
use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledstep")]
#[command(about = "Compile an LED sign program and send it down the wire")]
struct Args {
    /// Program source; stdin when omitted
    source: Option<PathBuf>,

    /// Where wire messages go (serial device or file); stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,

    /// Step ceiling for the target
    #[arg(long = "max-steps", default_value_t = ledstep::MAX_STEPS)]
    max_steps: usize,

    /// Message lifespan prefix
    #[arg(long, default_value_t = '2')]
    lifespan: char,

    /// Compile only, send nothing
    #[arg(long = "no-send")]
    no_send: bool,

    /// Print the step table and variables
    #[arg(long)]
    listing: bool,

    /// Print operators, functions and special variables, then exit
    #[arg(long)]
    reference: bool,

    #[arg(long = "reset-time")]
    reset_time: bool,

    /// Brightness, 0-255
    #[arg(long)]
    brightness: Option<u8>,

    /// Apply gamma correction (with --brightness)
    #[arg(long)]
    gamma: bool,

    #[arg(long)]
    blink: Option<u8>,

    #[arg(long = "station-id")]
    station_id: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn read_source(path: &Option<PathBuf>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn controls(args: &Args) -> Vec<ControlMessage> {
    let mut out = Vec::new();
    if args.station_id {
        out.push(ControlMessage::StationId);
    }
    if args.reset_time {
        out.push(ControlMessage::ResetTime);
    }
    if let Some(brightness) = args.brightness {
        out.push(ControlMessage::GammaBrightness {
            gamma: args.gamma,
            brightness,
        });
    }
    if let Some(v) = args.blink {
        out.push(ControlMessage::Blink(v));
    }
    out
}

fn run<W: Write>(args: &Args, out: W) -> ledstep::Result<bool> {
    let config = CompilerConfig::new(args.max_steps)?;
    let link_config = LinkConfig::new(args.lifespan, !args.no_send)?;
    let mut session = Session::new(config, Link::new(WriterTransport::new(out), link_config));

    for message in controls(args) {
        session.link_mut().send_control(message)?;
    }

    let source = match read_source(&args.source) {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to read program: {}", e);
            return Ok(false);
        }
    };

    match session.update(&source)? {
        Outcome::Rejected(diagnostic) => {
            eprintln!("{}", diagnostic);
            Ok(false)
        }
        // with --no-send the session reports Undelivered and keeps no program
        _ => {
            if args.listing {
                eprint!("{}", compile(&source, &config)?);
            }
            Ok(true)
        }
    }
}

fn main() {
    init_logging();

    let args = Args::parse();

    if args.reference {
        print!("{}", registry::reference());
        return;
    }

    let result = match &args.output {
        Some(path) => match OpenOptions::new().write(true).create(true).truncate(true).open(path) {
            Ok(file) => run(&args, file),
            Err(e) => {
                error!("Failed to open {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => run(&args, io::stdout()),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
