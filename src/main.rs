use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rust_dbmerge::datasource::DataSource;
use rust_dbmerge::loader;
use rust_dbmerge::merge::report;
use rust_dbmerge::{plan_merge, Dialect, MergeOptions};

#[derive(Parser)]
#[command(name = "rust-dbmerge")]
#[command(author, version, about = "Plan and apply schema merges between a model and a database")]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PlanArgs {
    /// Model schema: DataMap XML, DDL file, directory or glob pattern
    #[arg(short, long)]
    model: String,

    /// Current database schema, in the same formats as --model
    #[arg(long)]
    db: String,

    /// Target dialect (generic, hsql, h2, derby, postgres, mysql, sqlserver, oracle)
    #[arg(short, long, default_value = "generic")]
    dialect: Dialect,

    /// Table name regex to include (repeatable)
    #[arg(long = "include")]
    include: Vec<String>,

    /// Table name regex to exclude (repeatable)
    #[arg(long = "exclude")]
    exclude: Vec<String>,

    /// Do not plan foreign key changes
    #[arg(long)]
    skip_relationships: bool,

    /// Do not plan primary key changes
    #[arg(long)]
    skip_pk: bool,

    /// Match table and column names case-sensitively
    #[arg(long)]
    case_sensitive: bool,

    /// TABLE.COLUMN=literal used to fill NULLs before NOT NULL is set (repeatable)
    #[arg(long = "value-for-null")]
    value_for_null: Vec<String>,
}

impl PlanArgs {
    fn options(&self) -> MergeOptions {
        MergeOptions {
            model: self.model.clone(),
            db: self.db.clone(),
            dialect: self.dialect,
            include_tables: self.include.clone(),
            exclude_tables: self.exclude.clone(),
            skip_relationships: self.skip_relationships,
            skip_primary_keys: self.skip_pk,
            case_sensitive: self.case_sensitive,
            values_for_null: self.value_for_null.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the merge plan without executing it
    Plan {
        #[command(flatten)]
        args: PlanArgs,

        /// Show the plan that would update the model from the database
        #[arg(long)]
        reverse: bool,
    },
    /// Write the merge plan as a SQL script
    Script {
        #[command(flatten)]
        args: PlanArgs,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Execute the merge plan
    Apply {
        #[command(flatten)]
        args: PlanArgs,

        /// Connection string (defaults to DBMERGE_CONNECTION)
        #[arg(short, long)]
        connection: Option<String>,

        /// Update the model from the database instead of the database from the model
        #[arg(long)]
        to_model: bool,

        /// Where to write the updated model when --to-model is set
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print tables as a tree of foreign key dependencies
    Deps {
        /// Schema: DataMap XML, DDL file, directory or glob pattern
        #[arg(short, long)]
        schema: String,

        #[arg(short, long, default_value = "generic")]
        dialect: Dialect,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "rust_dbmerge=debug" } else { "rust_dbmerge=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Plan { args, reverse } => {
            let mut planned = plan_merge(&args.options())?;
            if reverse {
                planned.reverse()?;
            }
            report::print_plan(&planned.plan, planned.factory.as_ref());
        }
        Commands::Script { args, output } => {
            let mut planned = plan_merge(&args.options())?;
            let report = match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    let mut out = BufWriter::new(file);
                    let report = planned.write_script(&mut out)?;
                    out.flush()?;
                    report
                }
                None => planned.write_script(&mut io::stdout().lock())?,
            };
            if !report.is_success() {
                bail!("{} token(s) could not be rendered", report.failed_count());
            }
        }
        Commands::Apply {
            args,
            connection,
            to_model,
            output,
        } => {
            let mut planned = plan_merge(&args.options())?;

            let outcome = if to_model {
                planned.reverse()?;
                report::print_plan(&planned.plan, planned.factory.as_ref());
                planned.execute(None)
            } else {
                report::print_plan(&planned.plan, planned.factory.as_ref());
                let connection = connection
                    .or_else(|| std::env::var("DBMERGE_CONNECTION").ok())
                    .context("No connection string: pass --connection or set DBMERGE_CONNECTION")?;
                let mut data_source = connect(&connection)?;
                planned.execute(Some(data_source.as_mut()))
            };

            println!();
            report::print_execution(&outcome.report);

            if to_model {
                if !outcome.model_changes.is_empty() {
                    println!();
                    println!("Model changes ({}):", outcome.model_changes.len());
                    for change in &outcome.model_changes {
                        println!("  {}", change);
                    }
                }
                if let Some(path) = output {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    loader::write_data_map(&planned.model, BufWriter::new(file))?;
                    println!("Wrote updated model: {}", path.display());
                }
            }

            if !outcome.report.is_success() {
                bail!("{} token(s) failed", outcome.report.failed_count());
            }
        }
        Commands::Deps { schema, dialect } => {
            let map = loader::load_data_map(&schema, dialect)?;
            print!("{}", report::format_dependency_tree(&map));
        }
    }

    Ok(())
}

#[cfg(feature = "mssql")]
fn connect(connection: &str) -> Result<Box<dyn DataSource>> {
    use rust_dbmerge::datasource::MssqlDataSource;
    Ok(Box::new(MssqlDataSource::connect(connection)?))
}

#[cfg(not(feature = "mssql"))]
fn connect(_connection: &str) -> Result<Box<dyn DataSource>> {
    bail!("Built without the `mssql` feature; use the `script` command to produce SQL instead")
}
