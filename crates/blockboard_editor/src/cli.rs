// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless command line front end.
//!
//! Every mutating command loads the slot, replays one gesture through the
//! [`InteractionController`], and saves the slot again.

use crate::config::{ConfigError, EditorConfig, CONFIG_FILE_NAME};
use crate::controller::{DropTarget, InteractionController, Key};
use crate::gate::{ConfirmationGate, PendingAction};
use crate::persistence::{PersistenceError, PersistenceGateway};
use crate::projection::IdentityProjection;
use crate::storage::FileStorage;
use blockboard_graph::{
    BlockCatalog, BlockCategory, DragPayload, EdgeId, GraphError, NodeId, Position, SelectMode,
};
use clap::{ArgAction, Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(
    name = "blockboard",
    version,
    about = "Compose smart-contract block graphs from the terminal",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Config file (default: ./blockboard.ron).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding storage slots (overrides the config).
    #[arg(long, global = true, value_name = "DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Storage slot to work on (overrides the config).
    #[arg(long, global = true, value_name = "KEY")]
    pub slot: Option<String>,

    /// Answer yes to every confirmation.
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Debug output (repeat for more).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Editor commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the block palette.
    Catalog,

    /// Write a config file with the default settings.
    Init,

    /// Print the nodes and edges in the slot.
    #[command(alias = "ls")]
    Show,

    /// Drop a block onto the canvas.
    Add {
        /// Block type, e.g. Deploy or Transfer.
        block_type: String,
        /// Canvas x coordinate.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        x: f64,
        /// Canvas y coordinate.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        y: f64,
        /// Label instead of "New <type>".
        #[arg(long)]
        label: Option<String>,
    },

    /// Connect one block's output to another block's input.
    Connect {
        /// Source node id.
        source: String,
        /// Target node id.
        target: String,
    },

    /// Move a block.
    Move {
        /// Node id.
        id: String,
        /// New x coordinate.
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        /// New y coordinate.
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
    },

    /// Change a block's label (prompts when no label is given).
    Rename {
        /// Node id.
        id: String,
        /// New label.
        label: Option<String>,
    },

    /// Duplicate a block.
    Duplicate {
        /// Node id.
        id: String,
    },

    /// Delete blocks and their connections.
    #[command(alias = "rm")]
    Delete {
        /// Node ids.
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Delete a connection.
    Disconnect {
        /// Edge id.
        edge: String,
    },

    /// Remove every block and connection.
    Clear,

    /// Write the export document to a file.
    Export {
        /// Output file.
        path: PathBuf,
    },
}

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Config could not be loaded or written
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// `init` found an existing config
    #[error("Config already exists at {0:?}")]
    ConfigExists(PathBuf),

    /// Save, load or export failed
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Graph operation failed
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Block type is not in the palette
    #[error("Unknown block type {0:?} (see `blockboard catalog`)")]
    UnknownBlock(String),

    /// Connection was not created
    #[error("Cannot connect {0} to {1}")]
    NotConnected(NodeId, NodeId),

    /// Writing output failed
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Gate backed by the terminal
#[derive(Debug, Clone, Copy)]
pub struct TerminalGate {
    assume_yes: bool,
}

impl TerminalGate {
    /// Gate that asks on stdin unless `assume_yes` is set
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    fn ask(question: &str) -> Option<String> {
        eprint!("{question} ");
        std::io::stderr().flush().ok()?;
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line).ok()?;
        Some(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl ConfirmationGate for TerminalGate {
    fn confirm(&mut self, action: &PendingAction) -> bool {
        if self.assume_yes {
            return true;
        }
        Self::ask(&format!("{} [y/N]", action.prompt()))
            .is_some_and(|answer| matches!(answer.trim(), "y" | "Y" | "yes"))
    }

    fn prompt_label(&mut self, current: &str) -> Option<String> {
        Self::ask(&format!("New label [{current}]:"))
    }
}

/// Run a parsed command, writing results to stdout
pub fn run(cli: Cli) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let gate = TerminalGate::new(cli.yes);
    run_with(cli, gate, &mut stdout.lock())
}

/// Run a parsed command against an explicit gate and output
pub fn run_with<G: ConfirmationGate>(
    cli: Cli,
    gate: G,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    let config = EditorConfig::load_or_default(&config_path)?;

    let config_dir = config_path.parent().unwrap_or(Path::new(""));
    let storage_dir = cli
        .storage_dir
        .clone()
        .unwrap_or_else(|| config.storage_dir_in(config_dir));
    let slot = cli.slot.clone().unwrap_or_else(|| config.default_slot.clone());
    let catalog = BlockCatalog::default();

    match cli.command {
        Command::Catalog => return print_catalog(&catalog, out),
        Command::Init => return write_default_config(&config_path, out),
        _ => {}
    }

    let mut gateway = PersistenceGateway::new(FileStorage::new(storage_dir), config.export.metadata());
    let mut controller = InteractionController::new(gate).confirm_destructive(config.confirm_destructive);
    if let Some(graph) = gateway.load(&slot)? {
        controller.load_graph(graph);
    }

    let changed = match cli.command {
        Command::Catalog | Command::Init => false,
        Command::Show => {
            print_graph(&controller, &catalog, out)?;
            false
        }
        Command::Add { block_type, x, y, label } => {
            let block = catalog
                .get(&block_type)
                .ok_or_else(|| CliError::UnknownBlock(block_type.clone()))?;
            let payload = DragPayload::for_block(block);
            let Some(node) = controller.drop_on_canvas(&payload, Position::new(x, y), &IdentityProjection) else {
                return Ok(());
            };
            if let Some(label) = label {
                controller.rename(&node.id, &label)?;
            }
            writeln!(out, "{}", node.id)?;
            true
        }
        Command::Connect { source, target } => {
            let (source, target) = (NodeId::from(source), NodeId::from(target));
            for endpoint in [&source, &target] {
                if !controller.graph().contains_node(endpoint) {
                    return Err(GraphError::NodeNotFound(endpoint.clone()).into());
                }
            }
            controller.begin_connection(&source)?;
            let edge = controller
                .finish_connection(DropTarget::InputHandle(target.clone()))
                .ok_or(CliError::NotConnected(source, target))?;
            writeln!(out, "{}", edge.id)?;
            true
        }
        Command::Move { id, x, y } => {
            let id = NodeId::from(id);
            controller.begin_node_drag(&id)?;
            controller.drag_node_to(Position::new(x, y))?;
            controller.end_node_drag();
            true
        }
        Command::Rename { id, label } => {
            let id = NodeId::from(id);
            match label {
                Some(label) => controller.rename(&id, &label)?,
                None => controller.edit_label(&id)?,
            }
        }
        Command::Duplicate { id } => {
            let copy = controller.duplicate(&NodeId::from(id))?;
            writeln!(out, "{}", copy.id)?;
            true
        }
        Command::Delete { ids } => {
            let ids: Vec<NodeId> = ids.into_iter().map(NodeId::from).collect();
            for id in &ids {
                if !controller.graph().contains_node(id) {
                    return Err(GraphError::NodeNotFound(id.clone()).into());
                }
            }
            controller.select(ids, SelectMode::Set);
            match controller.handle_key(Key::Delete) {
                Some(report) => {
                    writeln!(
                        out,
                        "Deleted {} block(s) and {} connection(s)",
                        report.nodes.len(),
                        report.edges.len()
                    )?;
                    true
                }
                None => false,
            }
        }
        Command::Disconnect { edge } => {
            let edge = EdgeId::from(edge.as_str());
            controller
                .delete_edge(&edge)
                .ok_or(GraphError::EdgeNotFound(edge))?;
            true
        }
        Command::Clear => controller.clear_all(),
        Command::Export { path } => {
            gateway.export_to(controller.graph(), &path)?;
            writeln!(out, "Exported to {}", path.display())?;
            false
        }
    };

    if changed {
        gateway.save(&slot, controller.graph())?;
    }
    Ok(())
}

fn write_default_config(path: &Path, out: &mut dyn Write) -> Result<(), CliError> {
    if path.exists() {
        return Err(CliError::ConfigExists(path.to_path_buf()));
    }
    EditorConfig::default().save(path)?;
    writeln!(out, "Wrote {}", path.display())?;
    Ok(())
}

fn print_catalog(catalog: &BlockCatalog, out: &mut dyn Write) -> Result<(), CliError> {
    for category in BlockCategory::all() {
        writeln!(out, "{}", category.display_name())?;
        for block in catalog.in_category(*category) {
            writeln!(out, "  {:<12} {:<14} {}", block.id, block.icon, block.description)?;
        }
    }
    Ok(())
}

fn print_graph<G: ConfirmationGate>(
    controller: &InteractionController<G>,
    catalog: &BlockCatalog,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let graph = controller.graph();
    writeln!(out, "{} block(s), {} connection(s)", graph.node_count(), graph.edge_count())?;
    for node in graph.nodes() {
        let block = catalog.resolve(&node.type_id);
        writeln!(
            out,
            "  {:<10} {:<12} {:<24} ({}, {}) {} {}",
            node.id,
            node.type_id,
            node.label,
            node.position.x,
            node.position.y,
            node.status.as_str(),
            block.category.display_name()
        )?;
    }
    for edge in graph.edges() {
        writeln!(out, "  {} -> {}  [{}]", edge.source, edge.target, edge.id)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{AlwaysConfirm, ScriptedGate};

    fn cli(dir: &Path, args: &[&str]) -> Cli {
        let storage = dir.join("slots");
        let config = dir.join(CONFIG_FILE_NAME);
        let mut argv = vec![
            "blockboard".to_string(),
            "--storage-dir".to_string(),
            storage.display().to_string(),
            "--config".to_string(),
            config.display().to_string(),
        ];
        argv.extend(args.iter().map(|a| a.to_string()));
        Cli::try_parse_from(argv).unwrap()
    }

    fn run_ok(dir: &Path, args: &[&str]) -> String {
        let mut out = Vec::new();
        run_with(cli(dir, args), AlwaysConfirm, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_session_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let a = run_ok(dir.path(), &["add", "Deploy", "--x", "100", "--y", "100"]);
        let b = run_ok(dir.path(), &["add", "Constructor", "--x", "400", "--y", "100", "--label", "Init"]);
        assert_eq!(a.trim(), "node_1");
        assert_eq!(b.trim(), "node_2");

        let edge = run_ok(dir.path(), &["connect", "node_1", "node_2"]);
        assert_eq!(edge.trim(), "enode_1-node_2");

        let shown = run_ok(dir.path(), &["show"]);
        assert!(shown.starts_with("2 block(s), 1 connection(s)"));
        assert!(shown.contains("Init"));
        assert!(shown.contains("New Deploy"));

        run_ok(dir.path(), &["delete", "node_1"]);
        let shown = run_ok(dir.path(), &["show"]);
        assert!(shown.starts_with("1 block(s), 0 connection(s)"));
    }

    #[test]
    fn test_ids_continue_after_reload() {
        let dir = tempfile::tempdir().unwrap();
        run_ok(dir.path(), &["add", "Mint"]);
        run_ok(dir.path(), &["add", "Burn"]);
        run_ok(dir.path(), &["delete", "node_1"]);
        let copy = run_ok(dir.path(), &["duplicate", "node_2"]);
        assert_eq!(copy.trim(), "node_3");
    }

    #[test]
    fn test_unknown_block_and_node() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        let err = run_with(cli(dir.path(), &["add", "Teleport"]), AlwaysConfirm, &mut out).unwrap_err();
        assert!(matches!(err, CliError::UnknownBlock(_)));

        let err = run_with(cli(dir.path(), &["connect", "node_1", "node_2"]), AlwaysConfirm, &mut out)
            .unwrap_err();
        assert!(matches!(err, CliError::Graph(GraphError::NodeNotFound(_))));
    }

    #[test]
    fn test_connect_reports_missing_target() {
        let dir = tempfile::tempdir().unwrap();
        run_ok(dir.path(), &["add", "Deploy"]);
        let mut out = Vec::new();
        let err = run_with(cli(dir.path(), &["connect", "node_1", "node_9"]), AlwaysConfirm, &mut out)
            .unwrap_err();
        assert!(matches!(err, CliError::Graph(GraphError::NodeNotFound(id)) if id.as_str() == "node_9"));
    }

    #[test]
    fn test_storage_dir_is_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        let config = EditorConfig {
            storage_dir: PathBuf::from("boards"),
            default_slot: "token".to_string(),
            ..EditorConfig::default()
        };
        config.save(&config_path).unwrap();

        let argv = ["blockboard", "--config", config_path.to_str().unwrap(), "add", "Mint"];
        let mut out = Vec::new();
        run_with(Cli::try_parse_from(argv).unwrap(), AlwaysConfirm, &mut out).unwrap();
        assert!(dir.path().join("boards").join("token.json").is_file());
    }

    #[test]
    fn test_init_writes_default_config_once() {
        let dir = tempfile::tempdir().unwrap();
        run_ok(dir.path(), &["init"]);
        let config = EditorConfig::load(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, EditorConfig::default());

        let mut out = Vec::new();
        let err = run_with(cli(dir.path(), &["init"]), AlwaysConfirm, &mut out).unwrap_err();
        assert!(matches!(err, CliError::ConfigExists(_)));
    }

    #[test]
    fn test_declined_clear_keeps_slot() {
        let dir = tempfile::tempdir().unwrap();
        run_ok(dir.path(), &["add", "Event"]);

        let mut out = Vec::new();
        run_with(cli(dir.path(), &["clear"]), ScriptedGate::new().answer(false), &mut out).unwrap();
        assert!(run_ok(dir.path(), &["show"]).starts_with("1 block(s)"));

        run_with(cli(dir.path(), &["clear"]), ScriptedGate::new().answer(true), &mut out).unwrap();
        assert!(run_ok(dir.path(), &["show"]).starts_with("0 block(s)"));
    }

    #[test]
    fn test_rename_prompts_without_label() {
        let dir = tempfile::tempdir().unwrap();
        run_ok(dir.path(), &["add", "Oracle"]);
        let mut out = Vec::new();
        run_with(
            cli(dir.path(), &["rename", "node_1"]),
            ScriptedGate::new().label(Some("Price Feed")),
            &mut out,
        )
        .unwrap();
        assert!(run_ok(dir.path(), &["show"]).contains("Price Feed"));
    }

    #[test]
    fn test_move_and_export() {
        let dir = tempfile::tempdir().unwrap();
        run_ok(dir.path(), &["add", "Transfer"]);
        run_ok(dir.path(), &["move", "node_1", "--x", "-20", "--y", "35.5"]);

        let path = dir.path().join("export.json");
        run_ok(dir.path(), &["export", path.to_str().unwrap()]);
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["nodes"][0]["position"]["x"], -20.0);
        assert_eq!(value["nodes"][0]["position"]["y"], 35.5);
        assert_eq!(value["metadata"]["contractType"], "custom");
    }

    #[test]
    fn test_catalog_lists_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let listing = run_ok(dir.path(), &["catalog"]);
        assert!(listing.contains("Lifecycle"));
        assert!(listing.contains("Deploy"));
        assert!(!dir.path().join("slots").exists());
    }
}
