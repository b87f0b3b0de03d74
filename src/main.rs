// src/main.rs
//! GNSS Sky View - satellite sky plot, signal chart and compass for gpsd or NMEA receivers

use clap::{Args, Parser, Subcommand, ValueEnum};
use gnss_skyview::{
    config::SkyviewConfig,
    display::{self, terminal::TerminalDisplay},
    monitor::list_serial_ports,
    prefs::JsonPreferenceStore,
    FilterKey, GnssMonitor, Result, VisibilityFilter,
};
use log::{info, warn};

#[derive(Parser)]
#[command(name = "gnss-skyview", version, about)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the sky view (default)
    Run(RunArgs),
    /// List serial ports
    ListPorts,
    /// Show or change which satellites the sky plot draws
    Filter {
        /// Toggle assignment such as `glonassChecked=false`; repeatable
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(FilterKey, bool)>,
        /// Turn every toggle back on
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum SourceKind {
    Gpsd,
    Serial,
}

#[derive(Args, Default)]
struct RunArgs {
    /// Positioning source, overrides the config file
    #[arg(long, value_enum)]
    source: Option<SourceKind>,
    /// Serial port of the NMEA receiver
    #[arg(long)]
    port: Option<String>,
    /// Serial baud rate
    #[arg(long)]
    baud: Option<u32>,
    /// gpsd host
    #[arg(long)]
    host: Option<String>,
    /// gpsd port
    #[arg(long)]
    gpsd_port: Option<u16>,
    /// Use the terminal display even when a GUI is available
    #[arg(long)]
    terminal: bool,
    /// Persist the resulting source settings to the config file
    #[arg(long)]
    save: bool,
}

fn parse_assignment(text: &str) -> std::result::Result<(FilterKey, bool), String> {
    let (key, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", text))?;
    let value = match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => true,
        "false" | "off" | "0" | "no" => false,
        other => return Err(format!("expected a boolean, got '{}'", other)),
    };
    Ok((key.parse()?, value))
}

/// Fold command-line source settings into the loaded config
fn apply_overrides(config: &mut SkyviewConfig, args: &RunArgs) {
    let kind = args.source.or(match config.source_type.as_str() {
        "serial" => Some(SourceKind::Serial),
        "gpsd" => Some(SourceKind::Gpsd),
        _ => None,
    });
    match kind {
        Some(SourceKind::Serial) => config.update_serial(args.port.clone(), args.baud),
        Some(SourceKind::Gpsd) => config.update_gpsd(args.host.clone(), args.gpsd_port),
        // leave an unknown type for `source()` to report
        None => {}
    }
    if args.terminal {
        config.terminal = true;
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => run(RunArgs::default()),
        Some(Command::Run(args)) => run(args),
        Some(Command::ListPorts) => list_ports(),
        Some(Command::Filter { set, reset }) => filter(set, reset),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: RunArgs) -> Result<()> {
    let mut config = SkyviewConfig::load().unwrap_or_else(|e| {
        warn!("Ignoring config file: {}", e);
        SkyviewConfig::default()
    });

    apply_overrides(&mut config, &args);
    if args.save {
        config.save()?;
        info!("Saved configuration to {}", SkyviewConfig::config_path()?.display());
    }

    let source = config.source()?;
    let prefs_path = JsonPreferenceStore::default_path()?;

    let runtime = tokio::runtime::Runtime::new()?;
    let monitor = GnssMonitor::new();
    info!("Using {} source", source.name());
    runtime.block_on(monitor.start(source))?;

    let result = if config.terminal || !display::should_use_gui() {
        let terminal = TerminalDisplay::new(Some(prefs_path));
        runtime.block_on(terminal.run(monitor.shared_state(), monitor.running_flag()))
    } else {
        run_gui(&monitor, prefs_path)
    };

    monitor.stop();
    result
}

#[cfg(feature = "gui")]
fn run_gui(monitor: &GnssMonitor, prefs_path: std::path::PathBuf) -> Result<()> {
    let prefs = JsonPreferenceStore::open(prefs_path)?;
    display::gui::run(monitor.shared_state(), monitor.running_flag(), Box::new(prefs))
}

#[cfg(not(feature = "gui"))]
fn run_gui(_monitor: &GnssMonitor, _prefs_path: std::path::PathBuf) -> Result<()> {
    Err(gnss_skyview::SkyviewError::Config(
        "GUI support not compiled in; build with --features gui".to_string(),
    ))
}

fn list_ports() -> Result<()> {
    let ports = list_serial_ports()?;
    if ports.is_empty() {
        println!("No serial ports found.");
    } else {
        println!("Available serial ports:");
        for port in ports {
            println!("  {}", port);
        }
    }
    Ok(())
}

fn filter(assignments: Vec<(FilterKey, bool)>, reset: bool) -> Result<()> {
    let mut store = JsonPreferenceStore::open_default()?;
    let mut current = if reset {
        VisibilityFilter::default()
    } else {
        VisibilityFilter::load(&store)
    };

    if reset || !assignments.is_empty() {
        for (key, value) in assignments {
            current.set(key, value);
        }
        current.save(&mut store)?;
        info!("Saved satellite filter to {}", store.path().display());
    }

    for key in FilterKey::ALL {
        println!("{:<16} {}", key.key(), if current.get(key) { "on" } else { "off" });
    }
    Ok(())
}
