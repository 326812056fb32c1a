use anyhow::Result;
use clap::Parser;
use gopacked::commands::{self, Options};
use gopacked::pack::Side;
use std::io::Write;
use std::path::PathBuf;

/// goPacked - Simple command-line Minecraft modpack manager
///
/// Installs a modpack from its definition URL, keeps it up to date and
/// removes it again, registering a launcher profile on the client side.
///
/// Examples:
///   gopacked install https://example.com/pack.json
///   gopacked update examplepack
///   gopacked -s server -p /srv/mc uninstall
#[derive(Parser, Debug)]
#[command(author, version = env!("GOPACKED_BUILD_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// The path to save the modpack in (defaults to <MINECRAFT>/gopacked/<simplename>)
    #[arg(
        long = "path",
        short = 'p',
        env = "GOPACKED_PATH",
        value_name = "PATH",
        global = true
    )]
    install_path: Option<PathBuf>,

    /// The Minecraft launcher directory
    #[arg(
        long = "minecraft",
        short = 'm',
        env = "GOPACKED_MINECRAFT",
        value_name = "PATH",
        global = true
    )]
    minecraft_path: Option<PathBuf>,

    /// The side to install
    #[arg(
        long,
        short = 's',
        value_enum,
        default_value_t = SideArg::Client,
        global = true
    )]
    side: SideArg,

    /// Answer yes to every confirmation prompt
    #[arg(long = "yes", short = 'y', global = true)]
    yes: bool,

    /// Maven repository the Forge installer is downloaded from
    #[arg(
        long = "forge-maven",
        env = "GOPACKED_FORGE_MAVEN",
        value_name = "URL",
        global = true
    )]
    forge_maven: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Install the modpack from the given URL
    Install(InstallArgs),

    /// Update the modpack by URL, name or install path
    Update(TargetArgs),

    /// Uninstall the modpack by URL, name or install path
    Uninstall(TargetArgs),
}

#[derive(clap::Args, Debug)]
struct InstallArgs {
    /// URL of the goPack definition
    #[arg(value_name = "URL")]
    url: String,
}

#[derive(clap::Args, Debug)]
struct TargetArgs {
    /// goPack definition URL or installed pack name (omit to use --path)
    #[arg(value_name = "URL|NAME")]
    target: Option<String>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SideArg {
    Client,
    Server,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Client => Side::Client,
            SideArg::Server => Side::Server,
        }
    }
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            install_path: self.install_path.clone(),
            minecraft_path: self.minecraft_path.clone(),
            side: self.side.into(),
            assume_yes: self.yes,
            forge_maven: self.forge_maven.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
    let cli = Cli::parse();
    let runtime = gopacked::runtime::RealRuntime;
    let options = cli.options();

    match &cli.command {
        Commands::Install(args) => commands::install(runtime, options, &args.url).await?,
        Commands::Update(args) => {
            commands::update(runtime, options, args.target.as_deref()).await?
        }
        Commands::Uninstall(args) => {
            commands::uninstall(runtime, options, args.target.as_deref()).await?
        }
    }
    Ok(())
}
