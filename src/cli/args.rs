//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Compare contractor proposals along a standard WBS tree
#[derive(Parser, Debug)]
#[command(name = "wbscmp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level: -d info, -dd debug, -ddd trace
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Snapshot file (overrides config)
    #[arg(short, long, global = true, env = "WBSCMP_SNAPSHOT", value_hint = ValueHint::FilePath)]
    pub snapshot: Option<PathBuf>,

    /// Project directory holding .wbscmp.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the comparison tree, one column per proposal
    Tree {
        /// Levels to expand (default: config tree.depth)
        #[arg(long)]
        depth: Option<usize>,
        /// Keep branches without any value
        #[arg(short, long)]
        all: bool,
        /// Emit JSON instead of a tree
        #[arg(long)]
        json: bool,
    },

    /// Show items linked to one WBS node, per proposal
    Detail {
        /// WBS node id
        wbs_id: String,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// List proposals with declared totals
    Proposals {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a proposal's items grouped by section
    Sheet {
        /// Proposal id
        proposal_id: String,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit review flags on proposal items
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// Set the review tag (omit tag to clear it)
    Tag {
        /// Proposal item id
        item_id: String,
        /// Tag slug, e.g. cortesia, estimativa, opcional
        tag: Option<String>,
    },

    /// Exclude item from comparison totals
    Hide {
        /// Proposal item id
        item_id: String,
    },

    /// Include item in comparison totals again
    Show {
        /// Proposal item id
        item_id: String,
    },

    /// List available tags
    Tags,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
