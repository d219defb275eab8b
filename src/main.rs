use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use svcfetch::config::Config;
use svcfetch::events::ProgressObserver;
use svcfetch::host::{Host, RealHost};
use svcfetch::logger::LogLogger;
use svcfetch::platform::PlatformInformation;
use svcfetch::provider::{ServerProvider, ServiceDownloadProvider};

/// svcfetch - platform-specific service installer
///
/// Works out which pre-built service package fits this machine, downloads
/// it and unpacks it into the configured install directory.
///
/// Set SVCFETCH_RUNTIME to a runtime identifier (for example Ubuntu_16 or
/// Windows_64) to skip platform detection.
///
/// Examples:
///   svcfetch detect                     # Show the detected runtime
///   svcfetch --config svc.json install  # Install the service if missing
#[derive(Parser, Debug)]
#[command(author, version = env!("SVCFETCH_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Service configuration file (also via SVCFETCH_CONFIG)
    #[arg(
        long = "config",
        short = 'c',
        env = "SVCFETCH_CONFIG",
        value_name = "PATH",
        global = true
    )]
    pub config: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Show platform information, the runtime and its fallback chain
    Detect,

    /// Print the installed service executable, failing if it is missing
    Path,

    /// Install the service unless already present and print its executable
    Install,
}

/// Progress lines on stderr so stdout carries only results.
struct StderrObserver;

impl ProgressObserver for StderrObserver {
    fn download_started(&self, url: &str, total_size: Option<u64>) {
        match total_size {
            Some(size) => eprintln!("Downloading {} ({} KB)", url, size.div_ceil(1024)),
            None => eprintln!("Downloading {}", url),
        }
    }

    fn download_progress(&self, percentage: u8) {
        if percentage % 10 == 0 {
            eprintln!("  {}%", percentage);
        }
    }

    fn install_started(&self, target: &Path) {
        eprintln!("Installing to {}", target.display());
    }

    fn install_ended(&self) {
        eprintln!("Installed");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let host = RealHost;

    match cli.command {
        Commands::Detect => detect(&host)?,
        Commands::Path => {
            let server = server_provider(host, cli.config)?;
            match server.server_path()? {
                Some(path) => println!("{}", path.display()),
                None => bail!("The service is not installed"),
            }
        }
        Commands::Install => {
            let server = server_provider(host, cli.config)?;
            match server.get_or_download_server().await? {
                Some(path) => println!("{}", path.display()),
                None => bail!("The package was installed but contains none of the executable files"),
            }
        }
    }
    Ok(())
}

fn detect(host: &RealHost) -> Result<()> {
    let logger = LogLogger;
    let info = PlatformInformation::current(host, &logger);
    println!("Platform: {}", info);

    let runtime = info
        .require_runtime(&logger)
        .context("Failed to determine the runtime for this machine")?;
    println!("Runtime: {}", runtime);

    let chain: Vec<String> = runtime.fallback_chain()?.iter().map(|r| r.to_string()).collect();
    if chain.is_empty() {
        println!("Fallback: none");
    } else {
        println!("Fallback: {}", chain.join(" -> "));
    }
    Ok(())
}

fn server_provider(host: RealHost, config: Option<PathBuf>) -> Result<ServerProvider<RealHost>> {
    let config_path = config_path(&host, config)?;
    let config = Config::load(&host, &config_path)
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;

    let provider = ServiceDownloadProvider::new(config, host, LogLogger::shared(), Arc::new(StderrObserver))
        .context("Failed to set up the downloader")?;
    Ok(ServerProvider::new(provider))
}

fn config_path<H: Host>(host: &H, explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => host
            .config_dir()
            .map(|dir| dir.join("svcfetch").join("config.json"))
            .context("Could not determine the configuration directory; pass --config"),
    }
}
