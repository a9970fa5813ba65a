//! Command dispatch and terminal presentation

use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use colored::Colorize;
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::services::ItemEdit;
use crate::cli::args::{Cli, Commands, ConfigCommands, ItemCommands};
use crate::cli::output;
use crate::cli::render::{RenderOptions, TreeNodeConvert};
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{ItemTag, NestedNode, NodeDetail, Proposal, ProposalItem, ProposalSheet};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Completion { shell }) => cmd_completion(*shell),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(command) => {
            let container = build_container(cli)?;
            match command {
                Commands::Tree { depth, all, json } => cmd_tree(&container, *depth, *all, *json),
                Commands::Detail { wbs_id, json } => cmd_detail(&container, wbs_id, *json),
                Commands::Proposals { json } => cmd_proposals(&container, *json),
                Commands::Sheet { proposal_id, json } => cmd_sheet(&container, proposal_id, *json),
                Commands::Item { command } => cmd_item(&container, command),
                Commands::Completion { .. } | Commands::Config { .. } => Ok(()),
            }
        }
        None => {
            Cli::command()
                .print_help()
                .map_err(|e| InfraError::io("print help", e))?;
            Ok(())
        }
    }
}

fn project_dir(cli: &Cli) -> Option<PathBuf> {
    cli.project_dir
        .clone()
        .or_else(|| std::env::current_dir().ok())
}

/// Settings for this invocation; `--snapshot` beats every config layer.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(project_dir(cli).as_deref())?;
    if let Some(path) = &cli.snapshot {
        settings.snapshot = path.clone();
    }
    debug!("settings: {:?}", settings);
    Ok(settings)
}

fn build_container(cli: &Cli) -> CliResult<ServiceContainer> {
    let settings = load_settings(cli)?;
    Ok(ServiceContainer::new(settings)?)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Infra(InfraError::io("serialize JSON", e.into())))
}

// ============================================================
// Comparison
// ============================================================

#[derive(Serialize)]
struct TreeReport<'a> {
    proposals: &'a [Proposal],
    nodes: Vec<NestedNode>,
}

#[instrument(level = "debug", skip(container))]
fn cmd_tree(
    container: &ServiceContainer,
    depth: Option<usize>,
    all: bool,
    json: bool,
) -> CliResult<()> {
    let settings = &container.settings;
    let service = container.comparison();
    let comparison = if all || settings.tree.show_empty {
        service.load_unfiltered()?
    } else {
        service.load()?
    };

    if json {
        let report = TreeReport {
            proposals: &comparison.proposals,
            nodes: comparison.tree.to_nested(),
        };
        output::info(&to_json(&report)?);
        return Ok(());
    }

    let opts = RenderOptions {
        depth: depth.unwrap_or(settings.tree.depth),
        currency_symbol: settings.display.currency_symbol.clone(),
        decimals: settings.display.tree_decimals,
    };
    output::detail(&output::legend());
    output::info(&comparison.tree.to_tree_string(&comparison.proposals, &opts));
    let levels = comparison.tree.depth();
    if opts.depth != 0 && levels > opts.depth {
        output::detail(
            &format!(
                "{} deeper level(s) collapsed; --depth 0 expands all",
                levels - opts.depth
            )
            .dimmed(),
        );
    }

    let declared = comparison
        .proposals
        .iter()
        .map(|p| {
            format!(
                "{}: {}",
                p.contractor_name,
                output::format_currency(
                    p.declared_total,
                    &settings.display.currency_symbol,
                    settings.display.tree_decimals
                )
            )
        })
        .join(" | ");
    output::detail(&format!("declared totals: {declared}"));
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_detail(container: &ServiceContainer, wbs_id: &str, json: bool) -> CliResult<()> {
    let detail = container.comparison().detail(wbs_id)?;
    if json {
        output::info(&to_json(&detail)?);
        return Ok(());
    }
    print_detail(&detail, &container.settings);
    Ok(())
}

fn print_detail(detail: &NodeDetail, settings: &Settings) {
    let symbol = &settings.display.currency_symbol;
    let decimals = settings.display.detail_decimals;

    output::header(&format!("{} {}", detail.node.code, detail.node.label));
    for column in &detail.columns {
        let total = output::format_currency(column.total, symbol, decimals);
        println!(
            "\n{}  {}  ({})",
            column.contractor_name.bold(),
            output::paint(&total, column.highlight),
            output::format_share(column.share_of_max)
        );
        if column.items.is_empty() {
            output::detail(&"-".dimmed());
        }
        for item in &column.items {
            output::detail(&item_line(item, symbol, decimals));
        }
    }
}

fn item_line(item: &ProposalItem, symbol: &str, decimals: usize) -> String {
    let mut line = format!(
        "{}  {}  {}",
        item.id.dimmed(),
        item.description.as_deref().unwrap_or(""),
        output::format_currency(item.subtotal(), symbol, decimals)
    );
    if let Some(tag) = item.tag {
        line.push_str(&format!("  [{}]", tag.as_str().yellow()));
    }
    if item.hidden_from_equalization {
        line.push_str(&format!("  {}", "(hidden)".dimmed()));
    }
    line
}

// ============================================================
// Proposals
// ============================================================

fn cmd_proposals(container: &ServiceContainer, json: bool) -> CliResult<()> {
    let proposals = container.proposals().list()?;
    if json {
        output::info(&to_json(&proposals)?);
        return Ok(());
    }
    let display = &container.settings.display;
    for p in &proposals {
        let status = p.status.as_deref().unwrap_or("-");
        let status = match status {
            "aprovada" => status.green(),
            "rejeitada" => status.red(),
            "pendente" => status.yellow(),
            _ => status.normal(),
        };
        output::info(&format!(
            "{}  {}  {}  {}  {}  {}",
            p.id.dimmed(),
            p.contractor_name.bold(),
            p.site_name.as_deref().unwrap_or("-"),
            p.reference_date.map(output::format_date).unwrap_or_else(|| "-".into()),
            status,
            output::format_currency(p.declared_total, &display.currency_symbol, display.detail_decimals)
        ));
    }
    Ok(())
}

#[derive(Serialize)]
struct SheetReport<'a> {
    proposal: &'a Proposal,
    #[serde(flatten)]
    sheet: &'a ProposalSheet,
}

#[instrument(level = "debug", skip(container))]
fn cmd_sheet(container: &ServiceContainer, proposal_id: &str, json: bool) -> CliResult<()> {
    let (proposal, sheet) = container.proposals().sheet(proposal_id)?;
    if json {
        let report = SheetReport {
            proposal: &proposal,
            sheet: &sheet,
        };
        output::info(&to_json(&report)?);
        return Ok(());
    }

    let display = &container.settings.display;
    let symbol = &display.currency_symbol;
    let decimals = display.detail_decimals;
    output::header(&format!("{} ({} items)", proposal.contractor_name, sheet.item_count()));
    for section in &sheet.sections {
        let total = section
            .section_total
            .map(|t| output::format_currency(t, symbol, decimals))
            .unwrap_or_default();
        println!("\n{}  {}", section.section_name.bold(), total);
        for item in &section.items {
            output::detail(&item_line(item, symbol, decimals));
        }
    }
    Ok(())
}

// ============================================================
// Item edits
// ============================================================

fn cmd_item(container: &ServiceContainer, command: &ItemCommands) -> CliResult<()> {
    let edit = match command {
        ItemCommands::Tags => {
            for tag in ItemTag::ALL {
                output::info(&format!("{:<26} {}", tag.slug(), tag.as_str()));
            }
            return Ok(());
        }
        ItemCommands::Tag { item_id, tag } => {
            let tag = tag
                .as_deref()
                .map(ItemTag::from_str)
                .transpose()
                .map_err(|e| CliError::InvalidArgs(e.to_string()))?;
            ItemEdit::SetTag {
                item_id: item_id.clone(),
                tag,
            }
        }
        ItemCommands::Hide { item_id } => ItemEdit::SetHidden {
            item_id: item_id.clone(),
            hidden: true,
        },
        ItemCommands::Show { item_id } => ItemEdit::SetHidden {
            item_id: item_id.clone(),
            hidden: false,
        },
    };

    let item = container.proposals().edit_item(&edit)?;
    match edit {
        ItemEdit::SetTag { tag: Some(tag), .. } => output::success(&format!("{}: tagged {}", item.id, tag)),
        ItemEdit::SetTag { tag: None, .. } => output::success(&format!("{}: tag cleared", item.id)),
        ItemEdit::SetHidden { hidden: true, .. } => {
            output::success(&format!("{}: hidden from comparison", item.id))
        }
        ItemEdit::SetHidden { hidden: false, .. } => {
            output::success(&format!("{}: included in comparison", item.id))
        }
    }
    Ok(())
}

// ============================================================
// Config and completion
// ============================================================

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let global = global_config_path();
            match &global {
                Some(path) => print_config_path("global", path),
                None => output::warning(&"no config directory for this platform"),
            }
            if let Some(dir) = project_dir(cli) {
                print_config_path("local", &local_config_path(&dir));
            }
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path()
                    .ok_or_else(|| CliError::Usage("no config directory for this platform".into()))?
            } else {
                let dir = project_dir(cli)
                    .ok_or_else(|| CliError::Usage("cannot determine project directory".into()))?;
                local_config_path(&dir)
            };
            if path.exists() {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
            }
            fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
        }
    }
    Ok(())
}

fn print_config_path(label: &str, path: &std::path::Path) {
    let marker = if path.exists() {
        "✓".green()
    } else {
        "-".dimmed()
    };
    output::info(&format!("{marker} {label:<7} {}", path.display()));
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
