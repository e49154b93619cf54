use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use netusage::configuration::{Config, ConfigOverrides};
use netusage::controller::{render, Controller, OutputFormat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "netusage")]
#[command(version)]
#[command(about = "Measure the network activity of a process over a start/end window")]
struct Args {
    /// TOML configuration file
    #[arg(long, global = true, env = "NETUSAGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch a program and report network usage once it exits
    Run {
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Program to launch
        program: String,

        /// Arguments passed to the program
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Monitor a running process for a while
    Watch {
        #[arg(long)]
        pid: u32,

        /// Stop after this many seconds instead of waiting for Ctrl-C
        #[arg(long)]
        seconds: Option<u64>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Print the number of inet connections held by a process
    Connections {
        #[arg(long)]
        pid: u32,
    },
}

fn load_config(args: &Args) -> Config {
    let mut config = match args.config {
        Some(ref path) => Config::from_file(path).unwrap_or_else(|e| {
            eprintln!("Unable to import configuration from {}: {}", path.display(), e);
            std::process::exit(1);
        }),
        None => Config::default(),
    };
    config.apply_overrides(&args.overrides);
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }
    config
}

fn print_report(report: &netusage::UsageReport, format: OutputFormat) {
    match render(report, format) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = load_config(&args);

    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_level.as_str()))
        .format_target(false)
        .init();

    info!("configuration loaded: {:?}", config);
    let controller = Controller::new(&config);

    match args.command {
        Commands::Run {
            format,
            program,
            args,
        } => match controller.run_program(&program, &args).await {
            Ok(run) => {
                print_report(&run.report, format);
                std::process::exit(run.exit_code.unwrap_or(1));
            }
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        },
        Commands::Watch {
            pid,
            seconds,
            format,
        } => match controller.watch(pid, seconds).await {
            Ok(report) => print_report(&report, format),
            Err(e) => {
                error!("{}", e);
                controller.shutdown();
                std::process::exit(1);
            }
        },
        Commands::Connections { pid } => {
            println!("{}", controller.connections(pid));
        }
    }
}
