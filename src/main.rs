use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use twig::areas::repository::Repository;
use twig::artifacts::diff::toc_diff::DiffFilter;
use twig::commands::porcelain::fetch::DEFAULT_REMOTE_NAME;
use twig::commands::porcelain::merge::MergeOutcome;

const LOG_ENV: &str = "TWIG_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Parser)]
#[command(
    name = "twig",
    version = "0.1.0",
    about = "A content-addressed version-control engine",
    long_about = "twig stores snapshots in a Git-compatible object database and reconciles \
    divergent histories with a three-way merge.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(name = "init", about = "Create an empty repository")]
    Init {
        #[arg(index = 1, help = "Where to create the repository (defaults to the current directory)")]
        path: Option<PathBuf>,
        #[arg(long, help = "Create a bare repository without a work tree")]
        bare: bool,
    },
    #[command(name = "add", about = "Stage file contents")]
    Add {
        #[arg(required = true, help = "Files or directories to stage")]
        paths: Vec<String>,
    },
    #[command(name = "rm", about = "Remove files from the index and the work tree")]
    Rm {
        #[arg(short, long, help = "Remove directories recursively")]
        recursive: bool,
        #[arg(short, long, help = "Remove even with local changes or conflicts")]
        force: bool,
        #[arg(required = true)]
        paths: Vec<String>,
    },
    #[command(name = "commit", about = "Record the index as a new commit")]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: Option<String>,
    },
    #[command(name = "branch", about = "List, create or delete branches")]
    Branch {
        #[arg(short, long, help = "Delete the named branch")]
        delete: bool,
        #[arg(index = 1)]
        name: Option<String>,
        #[arg(index = 2, help = "Revision the new branch starts at (defaults to HEAD)")]
        start_point: Option<String>,
    },
    #[command(name = "checkout", about = "Switch branches or detach HEAD at a revision")]
    Checkout {
        #[arg(index = 1)]
        target: String,
    },
    #[command(name = "diff", about = "Show changes between snapshots")]
    Diff {
        #[arg(long, help = "Show only names and status letters")]
        name_status: bool,
        #[arg(long, value_parser = parse_diff_filter, help = "Keep only the given statuses (A, D, M, U)")]
        diff_filter: Option<DiffFilter>,
        #[arg(num_args = 0..=2)]
        revisions: Vec<String>,
    },
    #[command(name = "status", about = "Show the working tree status")]
    Status {
        #[arg(long, help = "Short, machine-readable output")]
        porcelain: bool,
    },
    #[command(name = "merge", about = "Join another history into the current branch")]
    Merge {
        #[arg(index = 1, required_unless_present = "abort")]
        target: Option<String>,
        #[arg(short, long, help = "Message of the merge commit")]
        message: Option<String>,
        #[arg(long, conflicts_with = "target", help = "Abandon an unconcluded merge")]
        abort: bool,
    },
    #[command(name = "fetch", about = "Download a branch from another repository")]
    Fetch {
        remote: String,
        branch: String,
        #[arg(long, default_value = DEFAULT_REMOTE_NAME, help = "Name of the remote for tracking refs")]
        name: String,
    },
    #[command(name = "push", about = "Update a branch of another repository")]
    Push {
        remote: String,
        branch: String,
        #[arg(short, long, help = "Allow non-fast-forward updates")]
        force: bool,
        #[arg(long, default_value = DEFAULT_REMOTE_NAME)]
        name: String,
    },
    #[command(name = "pull", about = "Fetch a branch and merge it")]
    Pull {
        remote: String,
        branch: String,
        #[arg(long, default_value = DEFAULT_REMOTE_NAME)]
        name: String,
    },
    #[command(name = "hash-object", about = "Compute a blob id, optionally storing the blob")]
    HashObject {
        #[arg(short, long, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: String,
    },
    #[command(name = "cat-file", about = "Print the content of an object")]
    CatFile {
        #[arg(short = 'p', long = "pretty", help = "The object to print")]
        object: String,
    },
    #[command(name = "ls-tree", about = "List the contents of a tree")]
    LsTree {
        #[arg(short, long, help = "Recurse into subtrees")]
        recursive: bool,
        #[arg(index = 1)]
        tree_ish: String,
    },
    #[command(name = "write-tree", about = "Store the index as a tree object")]
    WriteTree,
}

fn parse_diff_filter(filter: &str) -> Result<DiffFilter, String> {
    DiffFilter::try_parse(filter).ok_or_else(|| format!("invalid diff filter '{filter}'"))
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();
    let pwd = std::env::current_dir()?;

    let code = match cli.command {
        Commands::Init { path, bare } => {
            let path = path.unwrap_or(pwd);
            let writer = Box::new(std::io::stdout());
            let mut repository = if bare {
                Repository::new_bare(&path, writer)?
            } else {
                Repository::new(&path, writer)?
            };

            repository.init().await?;
            ExitCode::SUCCESS
        }
        command => {
            let mut repository = Repository::open(&pwd, Box::new(std::io::stdout()))?;
            let code = run(&mut repository, command).await;
            repository.writer().flush()?;
            code?
        }
    };

    Ok(code)
}

async fn run(repository: &mut Repository, command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Init { .. } => anyhow::bail!("init does not run inside an existing repository"),
        Commands::Add { paths } => repository.add(&paths).await?,
        Commands::Rm {
            recursive,
            force,
            paths,
        } => repository.rm(&paths, recursive, force).await?,
        Commands::Commit { message } => repository.commit(message.as_deref()).await?,
        Commands::Branch {
            delete,
            name,
            start_point,
        } => match (delete, name) {
            (true, Some(name)) => repository.delete_branch(&name).await?,
            (true, None) => anyhow::bail!("branch name required"),
            (false, Some(name)) => {
                repository
                    .create_branch(&name, start_point.as_deref())
                    .await?
            }
            (false, None) => repository.list_branches().await?,
        },
        Commands::Checkout { target } => repository.checkout(&target).await?,
        Commands::Diff {
            name_status,
            diff_filter,
            revisions,
        } => repository.diff(&revisions, name_status, diff_filter).await?,
        Commands::Status { porcelain } => repository.status(porcelain).await?,
        Commands::Merge {
            target,
            message,
            abort,
        } => {
            if abort {
                repository.merge_abort().await?;
            } else if let Some(target) = target {
                let outcome = repository.merge(&target, message.as_deref()).await?;
                return Ok(exit_code(outcome));
            }
        }
        Commands::Fetch {
            remote,
            branch,
            name,
        } => {
            repository.fetch(&remote, &branch, &name).await?;
        }
        Commands::Push {
            remote,
            branch,
            force,
            name,
        } => repository.push(&remote, &branch, force, &name).await?,
        Commands::Pull {
            remote,
            branch,
            name,
        } => {
            let outcome = repository.pull(&remote, &branch, &name).await?;
            return Ok(exit_code(outcome));
        }
        Commands::HashObject { write, file } => repository.hash_object(&file, write).await?,
        Commands::CatFile { object } => repository.cat_file(&object).await?,
        Commands::LsTree {
            recursive,
            tree_ish,
        } => repository.ls_tree(&tree_ish, recursive).await?,
        Commands::WriteTree => repository.write_tree().await?,
    }

    Ok(ExitCode::SUCCESS)
}

fn exit_code(outcome: MergeOutcome) -> ExitCode {
    match outcome {
        MergeOutcome::Conflicted => ExitCode::from(1),
        _ => ExitCode::SUCCESS,
    }
}
