//! tardataset CLI
//!
//! Inspect tar archives through the index: list samples, print a member,
//! show archive statistics.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tardataset::{Config, MemberKind, TarDataset};
use tracing_subscriber::{fmt, EnvFilter};

/// tardataset CLI
#[derive(Parser, Debug)]
#[command(name = "tardataset-cli")]
#[command(about = "Random-access inspection of uncompressed tar archives")]
#[command(version)]
struct Args {
    /// Path to the tar archive
    archive: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List samples as "position<TAB>kind<TAB>name"
    List {
        /// Only include files with this extension (repeatable, e.g. -e .png)
        #[arg(short, long = "ext")]
        extensions: Vec<String>,

        /// Only include members below this folder
        #[arg(short, long)]
        root: Option<String>,

        /// Order by name instead of header order
        #[arg(short, long)]
        sorted: bool,
    },

    /// Write a member's content to stdout
    Cat {
        /// Member name
        name: String,
    },

    /// Print member counts and sizes
    Stat,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tardataset=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    tracing::debug!("tardataset-cli v{}", tardataset::VERSION);

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> tardataset::Result<()> {
    match args.command {
        Commands::List {
            extensions,
            root,
            sorted,
        } => {
            let mut builder = Config::builder().sort_by_name(sorted);
            if !extensions.is_empty() {
                builder = builder.extensions(&extensions);
            }
            if let Some(root) = root {
                builder = builder.root_in_archive(root);
            }

            let dataset = TarDataset::open(&args.archive, &builder.build())?;
            let mut out = io::stdout().lock();
            for entry in dataset.list() {
                writeln!(out, "{}\t{}\t{}", entry.position, kind_label(entry.kind), entry.name)?;
            }
        }

        Commands::Cat { name } => {
            let dataset = TarDataset::open(&args.archive, &Config::default())?;
            let mut reader = dataset.read(name.as_str())?;
            io::copy(&mut reader, &mut io::stdout().lock())?;
        }

        Commands::Stat => {
            let dataset = TarDataset::open(&args.archive, &Config::default())?;
            let index = dataset.index();

            let (mut files, mut dirs, mut other, mut bytes) = (0usize, 0usize, 0usize, 0u64);
            for record in index.members() {
                match record.kind {
                    MemberKind::RegularFile => {
                        files += 1;
                        bytes += record.size;
                    }
                    MemberKind::Directory => dirs += 1,
                    MemberKind::Other => other += 1,
                }
            }

            println!("archive:     {}", index.path().display());
            println!("length:      {} bytes", index.archive_len());
            println!("members:     {}", index.member_count());
            println!("files:       {} ({} content bytes)", files, bytes);
            println!("directories: {}", dirs);
            println!("other:       {}", other);
        }
    }

    Ok(())
}

fn kind_label(kind: MemberKind) -> &'static str {
    match kind {
        MemberKind::RegularFile => "file",
        MemberKind::Directory => "dir",
        MemberKind::Other => "other",
    }
}
