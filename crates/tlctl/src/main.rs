// Файл: crates/tlctl/src/main.rs
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use termlist_core::partition::json::{JsonPartitionReader, JsonPartitionWriter};
use termlist_core::partition::PartitionReader;
use termlist_core::request::DEFAULT_MAX_PER_SHARD;
use termlist_core::validate::{validate_fields, FieldKinds};
use termlist_core::{run_local, FacetRequest};

#[derive(Parser)]
#[command(version, about = "Term list control: build partitions / run a facet locally")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Построить партицию (или N партиций) из JSONL
    BuildPartition {
        #[arg(long)]
        input: String,
        #[arg(long)]
        out: String,
        /// Нарезать round-robin на N партиций (out/part-00000, ...)
        #[arg(long, default_value_t = 1)]
        split: usize,
    },
    /// Фасет по одной или нескольким партициям, без брокера
    Facet {
        #[arg(long = "partition", required = true)]
        partitions: Vec<String>,
        #[arg(long = "field", required = true)]
        fields: Vec<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = false)]
        prefix: bool,
        #[arg(long, default_value_t = false)]
        case_sensitive: bool,
        #[arg(long, default_value_t = false)]
        unsorted: bool,
        #[arg(long, default_value_t = DEFAULT_MAX_PER_SHARD)]
        max_per_shard: i64,
        /// Печатать результат как JSON вместо строки на терм
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::BuildPartition { input, out, split } => {
            let dirs = JsonPartitionWriter::with_split(split).write_partitions(&input, &out)?;
            for d in dirs {
                println!("{}", d.display());
            }
        }
        Cmd::Facet {
            partitions,
            fields,
            search,
            prefix,
            case_sensitive,
            unsorted,
            max_per_shard,
            json,
        } => {
            let request = FacetRequest::builder(fields)
                .search_opt(search)
                .prefix(prefix)
                .case_insensitive(!case_sensitive)
                .max_per_partition(max_per_shard)
                .sort(!unsorted)
                .build()?;

            let mut readers = Vec::with_capacity(partitions.len());
            for p in &partitions {
                match JsonPartitionReader::open_partition(p) {
                    Ok(r) => readers.push(r),
                    Err(err) => tracing::warn!(path = %p, error = ?err, "failed to open partition"),
                }
            }

            let mut catalog = FieldKinds::new();
            for r in &readers {
                for f in request.fields() {
                    if let Some(kind) = r.field_kind(f) {
                        catalog.observe(f, kind);
                    }
                }
            }
            if !readers.is_empty() {
                validate_fields(&request, &catalog)?;
            }

            let result = run_local(&request, &readers)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                for term in result.entries() {
                    println!("{term}");
                }
            }
            tracing::debug!(
                partitions = readers.len(),
                entries = result.entries().len(),
                "facet done"
            );
        }
    }
    Ok(())
}

fn init_tracing() {
    // логи в stderr, stdout остаётся под результат
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
