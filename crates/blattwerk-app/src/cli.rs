// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line surface.

use std::path::PathBuf;

use blattwerk_core::Operation;
use blattwerk_remote::Permission;
use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "blattwerk")]
#[command(author, version, about = "Local PDF page toolkit with an undoable annotation canvas")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding config.json and shares.json
    #[arg(long, global = true, env = "BLATTWERK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply a page operation to a PDF
    Process(ProcessArgs),

    /// Show page geometry of a PDF
    Info {
        input: PathBuf,
    },

    /// Ask the remote processing stub to acknowledge an operation
    Simulate {
        /// Operation identifier; unknown names get the default delay
        operation: String,
        input: PathBuf,

        /// Multiplier for the simulated delay (overrides config)
        #[arg(long)]
        latency_scale: Option<f64>,
    },

    /// Issue, open, list and revoke share links
    #[command(subcommand)]
    Share(ShareCommands),

    /// Draw annotations onto a page raster and export PNG
    Render(RenderArgs),

    /// Print the effective configuration
    Config {
        /// Also write it to config.json
        #[arg(long)]
        write: bool,
    },
}

#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// compress, split, merge, delete, crop, sign, convert or word-to-pdf
    pub operation: Operation,

    pub input: PathBuf,

    /// Further PDFs appended by `merge`, in order
    #[arg(long = "with")]
    pub merge_with: Vec<PathBuf>,

    /// Output path (defaults to processed_<input name> beside the input)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum ShareCommands {
    /// Share a file and print the link
    Issue {
        file: PathBuf,

        #[arg(long, value_enum, default_values_t = [PermissionArg::View, PermissionArg::Download])]
        permission: Vec<PermissionArg>,

        /// Days until the link expires (overrides config)
        #[arg(long)]
        days: Option<u32>,

        #[arg(long)]
        max_access: Option<u32>,

        #[arg(long)]
        password: Option<String>,

        /// Recipients to notify about the link
        #[arg(long)]
        notify: Vec<String>,
    },

    /// Open a link, counting the access
    Open {
        token: Uuid,

        #[arg(long)]
        password: Option<String>,
    },

    /// List issued links
    List,

    /// Remove a link
    Revoke {
        token: Uuid,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PermissionArg {
    View,
    Download,
    Comment,
}

impl From<PermissionArg> for Permission {
    fn from(arg: PermissionArg) -> Self {
        match arg {
            PermissionArg::View => Permission::View,
            PermissionArg::Download => Permission::Download,
            PermissionArg::Comment => Permission::Comment,
        }
    }
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// JSON file holding an array of annotations, committed one by one
    pub annotations: PathBuf,

    /// Base page image; a blank page from config is used when absent
    #[arg(long)]
    pub base: Option<PathBuf>,

    /// Undo this many commits before exporting
    #[arg(long, default_value_t = 0)]
    pub undo: usize,

    #[arg(long)]
    pub stroke_width: Option<u32>,

    /// Font for text annotations (overrides config)
    #[arg(long)]
    pub font: Option<PathBuf>,

    #[arg(long, short)]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_process_with_merge_inputs() {
        let cli = Cli::parse_from([
            "blattwerk", "process", "merge", "a.pdf", "--with", "b.pdf", "--with", "c.pdf",
        ]);
        match cli.command {
            Commands::Process(args) => {
                assert_eq!(args.operation, Operation::Merge);
                assert_eq!(args.merge_with.len(), 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_operation() {
        let result = Cli::try_parse_from(["blattwerk", "process", "rotate", "a.pdf"]);
        assert!(result.is_err());
    }

    #[test]
    fn share_issue_defaults_permissions() {
        let cli = Cli::parse_from(["blattwerk", "share", "issue", "a.pdf"]);
        match cli.command {
            Commands::Share(ShareCommands::Issue { permission, .. }) => {
                assert_eq!(permission, [PermissionArg::View, PermissionArg::Download]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
