#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::env;
use std::io;
use std::path;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use chrono::Utc;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgGroup;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use super::format::format_session;
use super::repl::help_text;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendName;
use crate::domain::models::StorageName;
use crate::domain::services::SessionStore;
use crate::infrastructure::storage::StorageManager;

/// Directory the debug log is written to: `PARLOR_LOG_DIR` when set, else
/// the user's cache directory.
pub fn log_dir() -> path::PathBuf {
    return log_dir_from(env::var("PARLOR_LOG_DIR").ok());
}

fn log_dir_from(override_dir: Option<String>) -> path::PathBuf {
    if let Some(dir) = override_dir.filter(|e| return !e.is_empty()) {
        return path::PathBuf::from(dir);
    }

    return dirs::cache_dir()
        .unwrap_or_else(|| return path::PathBuf::from("."))
        .join("parlor");
}

/// Where sessions live for the given storage backend.
fn storage_location(storage: &str, storage_dir: &str) -> String {
    if StorageName::parse(storage.to_string()) == Some(StorageName::Memory) {
        return "Sessions are kept in memory and discarded on exit.".to_string();
    }

    return storage_dir.to_string();
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

pub fn open_store() -> Result<SessionStore> {
    let storage_name = Config::get(ConfigKey::Storage);
    let storage = StorageName::parse(storage_name.to_string())
        .ok_or_else(|| return anyhow!(format!("Unknown storage {storage_name}")))?;

    return Ok(SessionStore::open(StorageManager::get(storage)?));
}

fn print_sessions_list() -> Result<()> {
    let now = Utc::now();
    let sessions = open_store()?
        .sessions()
        .iter()
        .map(|session| {
            return format_session(session, now);
        })
        .collect::<Vec<String>>();

    if sessions.is_empty() {
        println!("There are no sessions available. You should start your first one!");
    } else {
        println!("{}", sessions.join("\n"));
    }

    return Ok(());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn load_config_from_session(session_id: &str) -> Result<()> {
    let store = open_store()?;
    if store.get(session_id).is_none() {
        bail!(format!("No session found for id {session_id}"));
    }

    Config::set(ConfigKey::SessionID, session_id);

    return Ok(());
}

fn load_config_from_session_interactive() -> Result<bool> {
    let store = open_store()?;
    let sessions = store.sessions();

    if sessions.is_empty() {
        println!("There are no sessions available. You should start your first one!");
        return Ok(false);
    }

    let now = Utc::now();
    let session_options = sessions
        .iter()
        .map(|session| {
            return format_session(session, now);
        })
        .collect::<Vec<String>>();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Which session would you like to open?")
        .default(0)
        .items(&session_options)
        .interact_opt()?;

    if let Some(idx) = selection {
        Config::set(ConfigKey::SessionID, &sessions[idx].id);
        return Ok(true);
    }

    return Ok(false);
}

fn delete_sessions(session_id: Option<&String>, all: bool) -> Result<()> {
    let mut store = open_store()?;

    if all {
        store.clear()?;
        println!("Deleted all sessions");
        return Ok(());
    }

    if let Some(session_id) = session_id {
        if store.get(session_id).is_none() {
            bail!(format!("No session found for id {session_id}"));
        }
        store.delete_session(session_id)?;
        println!("Deleted session {session_id}");
        return Ok(());
    }

    subcommand_sessions_delete().print_long_help()?;
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for Parlor")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Parlor with environment variable RUST_LOG=parlor")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn subcommand_sessions_delete() -> Command {
    return Command::new("delete")
        .about("Delete one or all sessions.")
        .arg(
            clap::Arg::new("session-id")
                .short('i')
                .long("id")
                .help("Session ID")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("all")
                .long("all")
                .help("Delete all sessions.")
                .action(ArgAction::SetTrue),
        )
        .group(
            ArgGroup::new("delete-args")
                .args(["session-id", "all"])
                .required(true),
        );
}

fn arg_backend() -> Arg {
    return Arg::new(ConfigKey::Backend.to_string())
        .short('b')
        .long(ConfigKey::Backend.to_string())
        .env("PARLOR_BACKEND")
        .num_args(1)
        .help(format!(
            "The backend generating assistant replies. [default: {}]",
            Config::default(ConfigKey::Backend)
        ))
        .value_parser(PossibleValuesParser::new(BackendName::VARIANTS));
}

fn arg_response_delay_min() -> Arg {
    return Arg::new(ConfigKey::ResponseDelayMin.to_string())
        .long(ConfigKey::ResponseDelayMin.to_string())
        .env("PARLOR_RESPONSE_DELAY_MIN")
        .num_args(1)
        .help(format!(
            "Shortest pause in milliseconds before the simulated backend answers. [default: {}]",
            Config::default(ConfigKey::ResponseDelayMin)
        ));
}

fn arg_response_delay_max() -> Arg {
    return Arg::new(ConfigKey::ResponseDelayMax.to_string())
        .long(ConfigKey::ResponseDelayMax.to_string())
        .env("PARLOR_RESPONSE_DELAY_MAX")
        .num_args(1)
        .help(format!(
            "Upper bound, exclusive, in milliseconds for the simulated backend's pause. [default: {}]",
            Config::default(ConfigKey::ResponseDelayMax)
        ));
}

fn arg_response_timeout() -> Arg {
    return Arg::new(ConfigKey::ResponseTimeout.to_string())
        .long(ConfigKey::ResponseTimeout.to_string())
        .env("PARLOR_RESPONSE_TIMEOUT")
        .num_args(1)
        .help(format!(
            "Time to wait in milliseconds for a reply before giving up. 0 waits forever. [default: {}]",
            Config::default(ConfigKey::ResponseTimeout)
        ));
}

fn subcommand_chat() -> Command {
    return Command::new("chat")
        .about("Start chatting, continuing the most recent session.")
        .arg(arg_backend())
        .arg(arg_response_delay_min())
        .arg(arg_response_delay_max())
        .arg(arg_response_timeout());
}

fn subcommand_sessions() -> Command {
    return Command::new("sessions")
        .about("Manage past chat sessions.")
        .arg_required_else_help(true)
        .subcommand(Command::new("dir").about("Print the directory sessions are stored in."))
        .subcommand(Command::new("list").about("List all previous sessions with their ids, newest first."))
        .subcommand(
            Command::new("open")
                .about("Open a previous session by ID. Omit passing any session ID to load an interactive selection.")
                .arg(
                    clap::Arg::new(ConfigKey::SessionID.to_string())
                        .short('i')
                        .long("id")
                        .help("Session ID")
                        .required(false),
                ),
        )
        .subcommand(subcommand_sessions_delete());
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") {
                return Paint::new(format!("CHAT {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("parlor")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_chat())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .subcommand(Command::new("manpages").about("Generates manpages and outputs to stdout."))
        .subcommand(subcommand_sessions())
        .arg(arg_backend())
        .arg(arg_response_delay_min())
        .arg(arg_response_delay_max())
        .arg(arg_response_timeout())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("PARLOR_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::Storage.to_string())
                .long(ConfigKey::Storage.to_string())
                .env("PARLOR_STORAGE")
                .num_args(1)
                .help(format!("Where sessions are kept. The memory storage forgets everything on exit. [default: {}]", Config::default(ConfigKey::Storage)))
                .value_parser(PossibleValuesParser::new(StorageName::VARIANTS))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::StorageDir.to_string())
                .long(ConfigKey::StorageDir.to_string())
                .env("PARLOR_STORAGE_DIR")
                .num_args(1)
                .help(format!("Directory used by the file storage. [default: {}]", Config::default(ConfigKey::StorageDir)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Username.to_string())
                .short('u')
                .long(ConfigKey::Username.to_string())
                .env("PARLOR_USERNAME")
                .num_args(1)
                .help("Your name shown next to your messages.")
                .global(true),
        );
}

pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    let log_path = log_dir().join("debug.log");
                    println!("{}", log_path.to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("chat", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        Some(("manpages", _)) => {
            clap_mangen::Man::new(build()).render(&mut io::stdout())?;
            return Ok(false);
        }
        Some(("sessions", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("dir", dir_matches)) => {
                Config::load(build(), vec![&matches, subcmd_matches, dir_matches]).await?;
                println!(
                    "{}",
                    storage_location(
                        &Config::get(ConfigKey::Storage),
                        &Config::get(ConfigKey::StorageDir)
                    )
                );
                return Ok(false);
            }
            Some(("list", list_matches)) => {
                Config::load(build(), vec![&matches, subcmd_matches, list_matches]).await?;
                print_sessions_list()?;
                return Ok(false);
            }
            Some(("open", open_matches)) => {
                Config::load(build(), vec![&matches, subcmd_matches, open_matches]).await?;
                if let Some(session_id) = open_matches.get_one::<String>("session-id") {
                    load_config_from_session(session_id)?;
                } else if !load_config_from_session_interactive()? {
                    return Ok(false);
                }
            }
            Some(("delete", delete_matches)) => {
                Config::load(build(), vec![&matches, subcmd_matches, delete_matches]).await?;
                delete_sessions(
                    delete_matches.get_one::<String>("session-id"),
                    delete_matches.get_flag("all"),
                )?;
                return Ok(false);
            }
            _ => {
                subcommand_sessions().print_long_help()?;
                return Ok(false);
            }
        },
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(true);
}
