use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use dbd2cpp_core::display_names::DisplayNames;
use dbd2cpp_core::listfile::Listfile;
use dbd2cpp_core::{
    compile_document, render_all, Artifacts, Build, CompilationResult, CompileOptions,
    EmitOptions, StructStyle,
};
use dbd2cpp_source::{CachedSource, DirectorySource, DocumentSource, HttpSource};

const MANIFEST_SCHEMA_VERSION: &str = "dbd2cpp.manifest@0.1.0";
const STRUCTURES_FILE: &str = "structures.h";
const METADATA_FILE: &str = "metadata.h";
const LOAD_INFO_FILE: &str = "loadinfo.h";

#[derive(Parser, Debug)]
#[command(name = "dbd2cpp")]
#[command(about = "Generate C++ DB2 structures, metadata and load info from WoWDBDefs definitions.", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone, Default)]
struct SourceArgs {
    /// Read definitions from a local WoWDBDefs `definitions/` directory.
    #[arg(long)]
    defs_dir: Option<PathBuf>,
    /// Base URL of the definitions (must end with '/'); defaults to DBD2CPP_DEFS_URL or WoWDBDefs master.
    #[arg(long)]
    defs_url: Option<String>,
    /// Cache directory for fetched definitions (default: $DBD2CPP_HOME/cache or ~/.dbd2cpp/cache).
    #[arg(long)]
    cache_dir: Option<PathBuf>,
    /// Do not read or write the definition cache.
    #[arg(long, default_value_t = false)]
    no_cache: bool,
    /// Refetch definitions even when cached.
    #[arg(long, default_value_t = false)]
    refresh: bool,
}

#[derive(Args, Debug, Clone, Default)]
struct RenderArgs {
    /// Align struct member types, names and comments.
    #[arg(long, default_value_t = false)]
    padded: bool,
    /// Emit localized strings as plain `string[N]` members.
    #[arg(long, default_value_t = false)]
    plain_strings: bool,
}

impl RenderArgs {
    fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            localize_strings: !self.plain_strings,
        }
    }

    fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            struct_style: if self.padded {
                StructStyle::Padded
            } else {
                StructStyle::Plain
            },
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the artifacts for one table.
    Dump {
        #[arg(long)]
        table: String,
        /// Client build, like 10.0.2.45969. Without it the latest version is used.
        #[arg(long)]
        build: Option<Build>,
        #[arg(long, conflicts_with = "listfile")]
        file_data_id: Option<u32>,
        /// Listfile (`id;path` lines) used to look up the table's FileDataID.
        #[arg(long)]
        listfile: Option<PathBuf>,
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        render: RenderArgs,
        /// Write structures.h, metadata.h and loadinfo.h here instead of stdout.
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Print a JSON report (compiled columns and artifacts) to stdout.
        #[arg(long, default_value_t = false)]
        json: bool,
        /// If set, fail if output differs; do not write.
        #[arg(long, default_value_t = false, requires = "out_dir")]
        check: bool,
    },
    /// Generate the artifacts for many tables into three concatenated files.
    Batch {
        /// JSON manifest listing the tables to dump.
        #[arg(long, conflicts_with = "listfile")]
        manifest: Option<PathBuf>,
        /// Dump every .db2 entry of this listfile.
        #[arg(long, requires = "out_dir")]
        listfile: Option<PathBuf>,
        /// Table name lookup (`internal;Friendly` or `Friendly` lines).
        #[arg(long)]
        names: Option<PathBuf>,
        #[arg(long)]
        build: Option<Build>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        render: RenderArgs,
        /// If set, fail if any output differs; do not write.
        #[arg(long, default_value_t = false)]
        check: bool,
    },
    /// Print the diagnostics catalog as Markdown.
    Diagnostics,
}

fn main() -> Result<()> {
    try_main().map_err(|err| {
        eprintln!("{err:#}");
        err
    })
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Command::Dump {
            table,
            build,
            file_data_id,
            listfile,
            source,
            render,
            out_dir,
            json,
            check,
        } => {
            let file_data_id = match (file_data_id, listfile) {
                (Some(id), _) => id,
                (None, Some(path)) => read_listfile(&path)?.file_data_id_for(&db2_path(&table)),
                (None, None) => 0,
            };
            let src = open_source(&source)?;
            let (result, artifacts) =
                compile_one(&src, &table, build.as_ref(), file_data_id, &render)?;
            if json {
                let report = serde_json::json!({
                    "result": result,
                    "artifacts": artifacts,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            match out_dir {
                Some(dir) => write_artifacts(&dir, &[artifacts], check),
                None if json => Ok(()),
                None => {
                    print!("{}", join_artifacts(&[artifacts]).join("\n"));
                    Ok(())
                }
            }
        }
        Command::Batch {
            manifest,
            listfile,
            names,
            build,
            out_dir,
            source,
            render,
            check,
        } => {
            let plan = match (manifest, listfile) {
                (Some(path), _) => {
                    let mut plan = BatchPlan::from_manifest(&read_manifest(&path)?)?;
                    if build.is_some() {
                        plan.build = build;
                    }
                    plan
                }
                (None, Some(path)) => {
                    let src_names = match (&names, &source.defs_dir) {
                        (Some(p), _) => DisplayNames::parse(
                            &std::fs::read_to_string(p)
                                .with_context(|| format!("read names: {}", p.display()))?,
                        ),
                        (None, Some(dir)) => {
                            DisplayNames::from_names(DirectorySource::new(dir).table_names()?)
                        }
                        (None, None) => anyhow::bail!(
                            "batch --listfile needs --names or --defs-dir to map storage names to table names"
                        ),
                    };
                    BatchPlan::from_listfile(&read_listfile(&path)?, &src_names, build)
                }
                (None, None) => anyhow::bail!("batch needs --manifest or --listfile"),
            };
            let out_dir = out_dir
                .or_else(|| plan.out_dir.clone())
                .context("batch needs --out-dir (or out_dir in the manifest)")?;
            let render = RenderArgs {
                padded: render.padded || plan.padded,
                ..render
            };
            let src = open_source(&source)?;
            let summary = run_batch(&src, &plan, &render);
            summary.report();
            write_artifacts(&out_dir, &summary.artifacts, check)
        }
        Command::Diagnostics => {
            print!("{}", dbd2cpp_core::diagnostics::render_diagnostics_md());
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .try_init();
}

fn open_source(args: &SourceArgs) -> Result<Box<dyn DocumentSource>> {
    if let Some(dir) = &args.defs_dir {
        return Ok(Box::new(DirectorySource::new(dir)));
    }
    let http = match &args.defs_url {
        Some(url) => HttpSource::new(url)?,
        None => HttpSource::from_env()?,
    };
    if args.no_cache {
        return Ok(Box::new(http));
    }
    let cache_dir = match &args.cache_dir {
        Some(dir) => dir.clone(),
        None => dbd2cpp_source::default_cache_dir()?,
    };
    log::info!("definitions from {} (cache {})", http.base(), cache_dir.display());
    Ok(Box::new(
        CachedSource::new(http, cache_dir).with_refresh(args.refresh),
    ))
}

/// Listfile path of a table's client database.
fn db2_path(table: &str) -> String {
    format!("dbfilesclient/{}.db2", table.to_ascii_lowercase())
}

fn read_listfile(path: &Path) -> Result<Listfile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read listfile: {}", path.display()))?;
    let lf = Listfile::parse(&text);
    log::info!("listfile {}: {} entries", path.display(), lf.len());
    Ok(lf)
}

fn compile_one(
    src: &dyn DocumentSource,
    table: &str,
    build: Option<&Build>,
    file_data_id: u32,
    render: &RenderArgs,
) -> Result<(CompilationResult, Artifacts)> {
    let document = src.fetch(table).map_err(|err| {
        log::debug!("fetch {table}: {err:#}");
        anyhow::anyhow!("could not retrieve definition for table {table}")
    })?;
    let result = compile_document(
        &document,
        table,
        build,
        file_data_id,
        &render.compile_options(),
    )
    .with_context(|| format!("compile {table}"))?;
    let artifacts =
        render_all(&result, &render.emit_options()).with_context(|| format!("render {table}"))?;
    Ok((result, artifacts))
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    schema_version: String,
    #[serde(default)]
    build: Option<String>,
    #[serde(default)]
    out_dir: Option<String>,
    #[serde(default)]
    padded: bool,
    tables: Vec<ManifestTable>,
}

#[derive(Debug, serde::Deserialize)]
struct ManifestTable {
    name: String,
    #[serde(default)]
    file_data_id: u32,
}

fn read_manifest(path: &Path) -> Result<Manifest> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read manifest: {}", path.display()))?;
    parse_manifest(&bytes).with_context(|| format!("manifest: {}", path.display()))
}

fn parse_manifest(bytes: &[u8]) -> Result<Manifest> {
    let m: Manifest = serde_json::from_slice(bytes).context("parse manifest JSON")?;
    if m.schema_version.trim() != MANIFEST_SCHEMA_VERSION {
        anyhow::bail!(
            "manifest schema_version mismatch: expected {MANIFEST_SCHEMA_VERSION} got {:?}",
            m.schema_version
        );
    }
    Ok(m)
}

#[derive(Debug, Clone, PartialEq)]
struct BatchPlan {
    build: Option<Build>,
    out_dir: Option<PathBuf>,
    padded: bool,
    tables: Vec<(String, u32)>,
}

impl BatchPlan {
    fn from_manifest(m: &Manifest) -> Result<Self> {
        let build = match m.build.as_deref().map(str::trim) {
            Some(b) if !b.is_empty() => Some(b.parse::<Build>()?),
            _ => None,
        };
        Ok(BatchPlan {
            build,
            out_dir: m.out_dir.as_ref().map(PathBuf::from),
            padded: m.padded,
            tables: m
                .tables
                .iter()
                .map(|t| (t.name.clone(), t.file_data_id))
                .collect(),
        })
    }

    fn from_listfile(lf: &Listfile, names: &DisplayNames, build: Option<Build>) -> Self {
        let mut tables = Vec::new();
        for (id, path) in lf.db2_tables() {
            match names.friendly_for_path(path) {
                Some(name) => tables.push((name.to_string(), id)),
                None => log::warn!("no table name for {path} ({id}); skipping"),
            }
        }
        BatchPlan {
            build,
            out_dir: None,
            padded: false,
            tables,
        }
    }
}

#[derive(Debug, Default)]
struct BatchSummary {
    artifacts: Vec<Artifacts>,
    failed: Vec<(String, String)>,
}

impl BatchSummary {
    fn report(&self) {
        eprintln!(
            "dumped {} tables, {} failed",
            self.artifacts.len(),
            self.failed.len()
        );
        for (table, err) in &self.failed {
            eprintln!("  {table}: {err}");
        }
    }
}

/// Compiles each table on its own; a failing table is recorded and skipped.
fn run_batch(src: &dyn DocumentSource, plan: &BatchPlan, render: &RenderArgs) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for (table, file_data_id) in &plan.tables {
        match compile_one(src, table, plan.build.as_ref(), *file_data_id, render) {
            Ok((_, artifacts)) => summary.artifacts.push(artifacts),
            Err(err) => {
                log::warn!("{table}: {err:#}");
                summary.failed.push((table.clone(), format!("{err:#}")));
            }
        }
    }
    summary
}

/// Concatenated structure, metadata and load-info text, in that order.
fn join_artifacts(all: &[Artifacts]) -> [String; 3] {
    fn join(all: &[Artifacts], pick: fn(&Artifacts) -> &str) -> String {
        all.iter().map(pick).collect::<Vec<_>>().join("\n")
    }
    [
        join(all, |a| a.structure.as_str()),
        join(all, |a| a.metadata.as_str()),
        join(all, |a| a.load_info.as_str()),
    ]
}

fn write_artifacts(out_dir: &Path, all: &[Artifacts], check: bool) -> Result<()> {
    let [structures, metadata, load_info] = join_artifacts(all);
    for (file, text) in [
        (STRUCTURES_FILE, structures),
        (METADATA_FILE, metadata),
        (LOAD_INFO_FILE, load_info),
    ] {
        write_output(&out_dir.join(file), &text, check)?;
    }
    Ok(())
}

fn write_output(out_path: &Path, src: &str, check: bool) -> Result<()> {
    if check {
        let cur = std::fs::read_to_string(out_path)
            .with_context(|| format!("read existing output: {}", out_path.display()))?;
        if cur != src {
            anyhow::bail!("generated output differs: {}", out_path.display());
        }
        return Ok(());
    }

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }
    std::fs::write(out_path, src.as_bytes())
        .with_context(|| format!("write output: {}", out_path.display()))?;
    Ok(())
}
