//! Command dispatch for the `sixml` binary

use std::ffi::OsString;
use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::services::PunchStore;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::text::from_os_str;
use crate::domain::{RecordSpec, TreeNode};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Format of punch times when none is given.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, run `sixml --help`".to_string(),
        ));
    };

    match command {
        Commands::Completion { shell } => {
            completion(*shell);
            Ok(())
        }
        Commands::Config { command } => config(cli, command),
        Commands::Init => init(&container(cli)?),
        Commands::Punch {
            station,
            card,
            time,
            info,
        } => punch(&container(cli)?, station, card, time.as_ref(), info),
        Commands::Dump => dump(&container(cli)?),
        Commands::Tree => tree(&container(cli)?),
        Commands::Info => info(&container(cli)?),
    }
}

/// Layered settings with command line flags applied last.
pub fn effective_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(None)?;
    if let Some(file) = &cli.file {
        settings.store_path = file.clone();
    }
    if let Some(name) = &cli.name {
        settings.competition_name = Some(from_os_str("competition name", name)?);
    }
    if cli.no_pretty {
        settings.pretty_print = false;
    }
    debug!("settings: {:?}", settings);
    Ok(settings)
}

fn container(cli: &Cli) -> CliResult<ServiceContainer> {
    Ok(ServiceContainer::new(effective_settings(cli)?))
}

/// Parse `TAG=TEXT` into an element spec below the punch.
pub fn parse_info(raw: &OsString) -> CliResult<RecordSpec> {
    let raw = from_os_str("info", raw)?;
    match raw.split_once('=') {
        Some((tag, text)) if !tag.trim().is_empty() => {
            Ok(RecordSpec::new(tag.trim()).text(text))
        }
        _ => Err(CliError::InvalidArgs(format!(
            "expected TAG=TEXT, got {:?}",
            raw
        ))),
    }
}

#[instrument(skip(container))]
fn init(container: &ServiceContainer) -> CliResult<()> {
    let store = container.open_store()?;
    output::success(&format!(
        "store {} ready, competition {:?}",
        store.location().display(),
        store.name()
    ));
    Ok(())
}

#[instrument(skip(container))]
fn punch(
    container: &ServiceContainer,
    station: &OsString,
    card: &OsString,
    time: Option<&OsString>,
    info: &[OsString],
) -> CliResult<()> {
    let station = from_os_str("station", station)?;
    let card = from_os_str("card", card)?;
    let time = match time {
        Some(t) => from_os_str("time", t)?,
        None => chrono::Local::now().format(TIME_FORMAT).to_string(),
    };
    let other_info = info.iter().map(parse_info).collect::<CliResult<Vec<_>>>()?;

    let mut store = container.open_store()?;
    store.add_punch(&station, &card, &time, other_info)?;
    output::success(&format!("station {station}, card {card}, time {time}"));
    Ok(())
}

fn dump(container: &ServiceContainer) -> CliResult<()> {
    let store = container.open_store()?;
    let stdout = io::stdout();
    store.dump(&mut stdout.lock())?;
    Ok(())
}

fn tree(container: &ServiceContainer) -> CliResult<()> {
    let store = container.open_store()?;
    output::info(&to_termtree(store.root()));
    Ok(())
}

fn info(container: &ServiceContainer) -> CliResult<()> {
    let store = container.open_store()?;
    print_summary(&store);
    Ok(())
}

fn print_summary(store: &PunchStore) {
    let summary = store.summary();
    output::header(&summary.name);
    output::field("file", &store.location().display());
    output::field("stations", &summary.stations);
    output::field("cards", &summary.cards);
    output::field("punches", &summary.punches);
}

/// Render the tree for display; layout whitespace is not shown.
pub fn to_termtree(node: &TreeNode) -> Tree<String> {
    Tree::new(node.to_string()).with_leaves(node.children().iter().map(to_termtree))
}

fn config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = effective_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::field("global", &path.display()),
                None => output::warning("no config directory for this platform"),
            }
            let cwd = std::env::current_dir()
                .map_err(|e| InfraError::io("current directory", e))?;
            output::field("local", &local_config_path(&cwd).display());
        }
    }
    Ok(())
}

fn completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
