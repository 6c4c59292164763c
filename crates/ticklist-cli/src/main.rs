//! tick - personal to-do lists from the terminal
//!
//! Lists, items, favorites and a trash bin, stored as JSON files in the
//! data directory.

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "tick")]
#[command(about = "Personal to-do lists with favorites and a trash bin")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Data directory (overrides config)
    #[arg(long, global = true, env = "TICKLIST_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Config file path
    #[arg(long, global = true, env = "TICKLIST_CONFIG")]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with the identity from the config file
    Login,

    /// Sign out and wipe all local data
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Show lists
    Lists,

    /// Manage lists
    List {
        #[command(subcommand)]
        command: ListCommands,
    },

    /// Show items
    Items {
        /// Only items in this list (ID or name)
        #[arg(short, long)]
        list: Option<String>,

        /// Only favorites
        #[arg(short, long)]
        favorites: bool,

        /// Include completed items
        #[arg(short, long)]
        all: bool,
    },

    /// Add an item to a list
    Add {
        /// List ID or name
        list: String,

        /// Item text
        content: String,
    },

    /// Add a favorite to the default list
    Fav {
        /// Item text
        content: String,
    },

    /// Change an item's text
    Edit {
        /// Item ID
        id: String,

        /// New text
        content: String,
    },

    /// Toggle an item's completion
    Done {
        /// Item ID
        id: String,
    },

    /// Toggle an item's favorite flag
    Star {
        /// Item ID
        id: String,
    },

    /// Move an item to another list
    Mv {
        /// Item ID
        id: String,

        /// Target list ID or name
        list: String,
    },

    /// Move an item to the trash
    Rm {
        /// Item ID
        id: String,
    },

    /// Restore an item from the trash
    Restore {
        /// Item ID
        id: String,
    },

    /// Delete a trashed item for good
    Purge {
        /// Item ID
        id: String,
    },

    /// Trash many items at once
    Clear {
        /// Every item in this list (ID or name)
        #[arg(long, conflicts_with_all = ["favorites", "all"])]
        list: Option<String>,

        /// Every favorite
        #[arg(long, conflicts_with = "all")]
        favorites: bool,

        /// Everything
        #[arg(long)]
        all: bool,
    },

    /// Show the trash bin
    Trash,

    /// Show or change settings
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommands>,
    },

    /// Show or set the current view
    View {
        /// dashboard, focus, all, favorites or trash
        view: Option<String>,

        /// Focused list (ID or name)
        list: Option<String>,
    },

    /// Storage health and counts
    Status,

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum ListCommands {
    /// Create a list
    Add {
        /// List name
        name: String,
    },
    /// Rename a list
    Rename {
        /// List ID or name
        list: String,
        /// New name
        name: String,
    },
    /// Move a list and its items to the trash
    Rm {
        /// List ID or name
        list: String,
    },
    /// Restore a list from the trash
    Restore {
        /// List ID
        id: String,
    },
    /// Delete a list and its items for good
    Purge {
        /// List ID
        id: String,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show current settings
    Show,
    /// Change one setting
    Set {
        /// show_items_in_dashboard, always_show_item_actions or show_default_list
        key: String,
        /// true or false
        value: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Print the config file path
    Path,
    /// Reset to default configuration
    Reset,
}

/// Log level when RUST_LOG is unset
fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbose: u8) {
    let filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_level(verbose).to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = commands::Context::load(cli.config, cli.data_dir, cli.json)?;

    match cli.command {
        Commands::Login => commands::login(&ctx),
        Commands::Logout => commands::logout(&ctx),
        Commands::Whoami => commands::whoami(&ctx),
        Commands::Lists => commands::lists(&ctx),
        Commands::List { command } => match command {
            ListCommands::Add { name } => commands::list_add(&ctx, &name),
            ListCommands::Rename { list, name } => commands::list_rename(&ctx, &list, &name),
            ListCommands::Rm { list } => commands::list_rm(&ctx, &list),
            ListCommands::Restore { id } => commands::list_restore(&ctx, &id),
            ListCommands::Purge { id } => commands::list_purge(&ctx, &id),
        },
        Commands::Items {
            list,
            favorites,
            all,
        } => commands::items(&ctx, list, favorites, all),
        Commands::Add { list, content } => commands::add(&ctx, &list, &content),
        Commands::Fav { content } => commands::fav(&ctx, &content),
        Commands::Edit { id, content } => commands::edit(&ctx, &id, &content),
        Commands::Done { id } => commands::done(&ctx, &id),
        Commands::Star { id } => commands::star(&ctx, &id),
        Commands::Mv { id, list } => commands::mv(&ctx, &id, &list),
        Commands::Rm { id } => commands::rm(&ctx, &id),
        Commands::Restore { id } => commands::restore(&ctx, &id),
        Commands::Purge { id } => commands::purge(&ctx, &id),
        Commands::Clear {
            list,
            favorites,
            all,
        } => commands::clear(&ctx, list, favorites, all),
        Commands::Trash => commands::trash(&ctx),
        Commands::Settings { command } => match command {
            Some(SettingsCommands::Set { key, value }) => {
                commands::settings_set(&ctx, &key, &value)
            }
            Some(SettingsCommands::Show) | None => commands::settings_show(&ctx),
        },
        Commands::View { view, list } => commands::view(&ctx, view, list),
        Commands::Status => commands::status(&ctx),
        Commands::Config { command } => match command {
            Some(ConfigCommands::Path) => commands::config_path(&ctx),
            Some(ConfigCommands::Reset) => commands::config_reset(&ctx),
            Some(ConfigCommands::Show) | None => commands::config_show(&ctx),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_levels() {
        assert_eq!(default_level(0), "warn");
        // Session mutations log at debug
        assert_eq!(default_level(1), "debug");
        assert_eq!(default_level(3), "trace");
    }

    #[test]
    fn test_verbose_flag_counts() {
        let cli = Cli::try_parse_from(["tick", "-v", "status"]).unwrap();
        assert_eq!(default_level(cli.verbose), "debug");
    }
}
