// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand handlers wiring the CLI to the document engine, the annotation
// canvas and the remote stand-ins.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use blattwerk_annotate::render::{self, CanvasRenderer};
use blattwerk_annotate::{Annotation, EditorSession, ToolSettings};
use blattwerk_core::{AppConfig, DocumentType};
use blattwerk_document::{Document, DocumentSession, OperationParams};
use blattwerk_remote::{
    Permission, ProcessingRequest, RemoteProcessor, ShareRegistry, ShareRequest,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::{Commands, ProcessArgs, RenderArgs, ShareCommands};

/// Resolved data directory plus the config loaded from it.
pub struct AppContext {
    pub data_dir: PathBuf,
    pub config: AppConfig,
}

pub async fn run(command: Commands, ctx: &AppContext) -> Result<()> {
    match command {
        Commands::Process(args) => process(args).await,
        Commands::Info { input } => info_cmd(&input),
        Commands::Simulate {
            operation,
            input,
            latency_scale,
        } => simulate(operation, &input, latency_scale, &ctx.config).await,
        Commands::Share(cmd) => share(cmd, ctx),
        Commands::Render(args) => render_cmd(args, &ctx.config),
        Commands::Config { write } => {
            println!("{}", serde_json::to_string_pretty(&ctx.config)?);
            if write {
                ctx.config.persist(&ctx.data_dir)?;
                info!(dir = %ctx.data_dir.display(), "config written");
            }
            Ok(())
        }
    }
}

// -- Documents ----------------------------------------------------------------

async fn process(args: ProcessArgs) -> Result<()> {
    let bytes = read(&args.input)?;
    let name = file_name(&args.input);
    let mut session = DocumentSession::open(&name, bytes).await?;

    let merge_with = args
        .merge_with
        .iter()
        .map(|path| Ok(Document::load(&read(path)?)?))
        .collect::<Result<Vec<_>>>()?;

    // Ctrl-C abandons the run; the input file is never touched.
    let cancel = session.cancel_handle();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            cancel.cancel();
        }
    });

    let result = session
        .process(args.operation, OperationParams { merge_with })
        .await;
    watcher.abort();
    let processed = result?;

    let output = args.output.unwrap_or_else(|| {
        args.input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&processed.file_name)
    });
    let produced = processed.blob.document_type();
    let named = output
        .extension()
        .and_then(|ext| DocumentType::from_extension(&ext.to_string_lossy()));
    if named.is_some_and(|named| named != produced) {
        warn!(
            output = %output.display(),
            mime = processed.blob.mime_type(),
            "output extension does not match the produced content"
        );
    }
    std::fs::write(&output, processed.blob.bytes())
        .with_context(|| format!("writing {}", output.display()))?;
    println!(
        "{} -> {} ({}, {} bytes)",
        args.operation,
        output.display(),
        processed.blob.mime_type(),
        processed.blob.bytes().len()
    );
    Ok(())
}

fn info_cmd(input: &Path) -> Result<()> {
    let doc = Document::load(&read(input)?)?;
    println!("{}: {} page(s)", input.display(), doc.page_count());
    for (index, page) in doc.pages().iter().enumerate() {
        let crop = page.crop();
        println!(
            "  page {index}: {} x {}  crop ({}, {}, {}, {})",
            page.width(),
            page.height(),
            crop.x0,
            crop.y0,
            crop.x1,
            crop.y1
        );
    }
    Ok(())
}

// -- Remote stand-ins ---------------------------------------------------------

async fn simulate(
    operation: String,
    input: &Path,
    latency_scale: Option<f64>,
    config: &AppConfig,
) -> Result<()> {
    let file_size = std::fs::metadata(input)
        .with_context(|| format!("reading {}", input.display()))?
        .len();
    let processor = match latency_scale {
        Some(scale) => RemoteProcessor::new(scale),
        None => RemoteProcessor::from_config(config),
    };
    let response = processor
        .process(ProcessingRequest {
            operation,
            file_name: file_name(input),
            file_size,
        })
        .await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn share(cmd: ShareCommands, ctx: &AppContext) -> Result<()> {
    let mut registry = ShareRegistry::open(&ctx.config, &ctx.data_dir)?;

    match cmd {
        ShareCommands::Issue {
            file,
            permission,
            days,
            max_access,
            password,
            notify,
        } => {
            let request = ShareRequest {
                file_name: file_name(&file),
                file_data: BASE64.encode(read(&file)?),
                permissions: permission.into_iter().map(Permission::from).collect(),
                expiry_days: days,
                max_access,
                password,
                email_recipients: notify,
            };
            let response = registry.issue_now(request)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        ShareCommands::Open { token, password } => {
            let access = registry.access(token, password.as_deref(), Utc::now())?;
            let remaining = access
                .remaining
                .map_or_else(|| "unlimited".to_owned(), |n| n.to_string());
            println!(
                "{} (sha256 {}) opened {} time(s), {remaining} left",
                access.file_name, access.file_sha256, access.access_count
            );
        }
        ShareCommands::List => {
            let now = Utc::now();
            for (token, record) in registry.links() {
                let state = if record.is_expired(now) { "expired" } else { "active" };
                println!(
                    "{token}  {}  {state}  expires {}  opened {}{}",
                    record.file_name,
                    record.expires_at.to_rfc3339(),
                    record.access_count,
                    record
                        .max_access
                        .map(|limit| format!("/{limit}"))
                        .unwrap_or_default()
                );
            }
        }
        ShareCommands::Revoke { token } => {
            let record = registry.revoke(token)?;
            println!("revoked {token} ({})", record.file_name);
        }
    }

    registry.persist(&ctx.data_dir)?;
    Ok(())
}

// -- Canvas -------------------------------------------------------------------

fn render_cmd(args: RenderArgs, config: &AppConfig) -> Result<()> {
    let json = std::fs::read_to_string(&args.annotations)
        .with_context(|| format!("reading {}", args.annotations.display()))?;
    let annotations: Vec<Annotation> =
        serde_json::from_str(&json).context("annotations must be a JSON array")?;

    let mut renderer = CanvasRenderer::new(args.stroke_width.unwrap_or(config.stroke_width));
    if let Some(path) = args.font.as_ref().or(config.font_path.as_ref()) {
        renderer = renderer.with_font(render::load_font(path)?);
    }

    let mut session = match &args.base {
        Some(path) => EditorSession::new(
            Some(render::decode_raster(&read(path)?)?),
            renderer,
            ToolSettings::new(config.default_color, config.default_font_size),
        ),
        None => EditorSession::from_config(config, renderer),
    };

    let count = annotations.len();
    for annotation in annotations {
        session.commit(annotation);
    }
    for _ in 0..args.undo {
        session.undo()?;
    }

    let png = session.export_png()?;
    std::fs::write(&args.output, &png)
        .with_context(|| format!("writing {}", args.output.display()))?;
    println!(
        "{} of {count} annotation(s) drawn -> {}",
        session.annotations().len(),
        args.output.display()
    );
    Ok(())
}

// -- Helpers ------------------------------------------------------------------

fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
