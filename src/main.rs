use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::tty::IsTty;
use env_logger::{Builder, Env, Target};
use eyekiosk::{
    acuity::RandomDirections,
    app_dirs::AppDirs,
    channel::{CommandChannel, SerialTransport},
    config::{Config, ConfigStore, FileConfigStore},
    kiosk::{Kiosk, LoopSettings, Shutdown},
    ui::TerminalSurface,
    KioskError,
};
use log::error;
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::{Path, PathBuf},
    process,
    time::Duration,
};

/// listens for test commands from the vision kiosk and runs acuity tests
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Listens on a serial port for commands from the vision-testing kiosk and runs adaptive visual acuity tests (cataract, glare, low contrast) in the terminal."
)]
pub struct Cli {
    /// serial port paired with the kiosk
    #[clap(short = 'p', long = "port")]
    port_name: Option<String>,

    /// baud rate of the serial link
    #[clap(short = 'b', long = "baud")]
    baud_rate: Option<u32>,

    /// path to the JSON config file
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// file to write the log to
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// milliseconds to wait between polls of the serial port
    #[clap(long)]
    poll_interval_ms: Option<u64>,

    /// stop listening when the kiosk sends CMD:SHUTDOWN
    #[clap(long)]
    exit_on_shutdown: bool,

    /// keep commands that arrive while a test is running instead of dropping them
    #[clap(long)]
    keep_backlog: bool,

    /// write the effective configuration to the config file and exit
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Command line values take precedence over the config file
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(port) = &self.port_name {
            cfg.port_name = port.clone();
        }
        if let Some(baud) = self.baud_rate {
            cfg.baud_rate = baud;
        }
        if let Some(ms) = self.poll_interval_ms {
            cfg.poll_interval_ms = ms;
        }
        if self.exit_on_shutdown {
            cfg.exit_on_shutdown_command = true;
        }
        if self.keep_backlog {
            cfg.discard_backlog = false;
        }
        cfg
    }

    fn config_store(&self) -> FileConfigStore {
        self.config
            .as_ref()
            .map(FileConfigStore::with_path)
            .unwrap_or_default()
    }
}

fn init_logging(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(AppDirs::log_path);
    if let Err(e) = init_logging(&log_path) {
        eprintln!("warning: logging disabled, cannot open {}: {}", log_path.display(), e);
    }

    let store = cli.config_store();
    let config = cli.apply(store.load());

    if cli.save_config {
        store.save(&config)?;
        println!("Configuration written to {}", store.path().display());
        return Ok(());
    }

    let transport = match SerialTransport::open(
        &config.port_name,
        config.baud_rate,
        Duration::from_millis(config.read_timeout_ms),
    ) {
        Ok(t) => t,
        Err(KioskError::PortOpen { port, source }) => {
            error!("Could not open port {}: {}", port, source);
            eprintln!("\nFATAL ERROR: Could not open port {}.", port);
            eprintln!("   Details: {}", source);
            process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };
    let channel = CommandChannel::new(transport);

    if !stdin().is_tty() {
        drop(channel);
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    println!(
        "--- Listener Active on {} @ {} bps ---",
        config.port_name, config.baud_rate
    );
    let surface = TerminalSurface::new()?;
    let mut kiosk = Kiosk::new(
        channel,
        surface,
        RandomDirections::new(),
        LoopSettings::from(&config),
        config.baud_rate,
    );
    let outcome = kiosk.run();
    // restores the terminal and closes the port
    drop(kiosk);

    match outcome {
        Ok(Shutdown::Interrupted) => println!("Listener stopped by user (interrupt)."),
        Ok(Shutdown::ShutdownCommand) => println!("Listener stopped by kiosk shutdown command."),
        Ok(Shutdown::Operator) => println!("Listener stopped."),
        Err(e) => {
            eprintln!("\nFATAL ERROR: {}", e);
            process::exit(1);
        }
    }
    println!("Connection on {} closed.", config.port_name);

    Ok(())
}
