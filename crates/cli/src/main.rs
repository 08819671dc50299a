use anyhow::Context;
use api_shared::ListFilesQuery;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use storeit_core::{
    constants::SORT_OPTIONS, format_size, ActionOutcome, ActionRequest, CoreConfig, EmailAddress,
    FileAction, FileRecord, FileService, FileType, Section, SessionToken, UniqueId,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "storeit")]
#[command(about = "StoreIt file storage CLI")]
struct Cli {
    /// Session token of the acting user
    #[arg(long, env = "STOREIT_SESSION", global = true, hide_env_values = true)]
    session: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List files you own or that are shared with you
    List {
        /// Comma-separated file types (image,document,video,audio,other)
        #[arg(long)]
        types: Option<String>,
        /// Section slug: documents, images, media or others
        #[arg(long)]
        section: Option<String>,
        /// Text to search for in file names
        #[arg(long)]
        query: Option<String>,
        /// Sort key such as size-desc (see `storeit sorts`)
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Upload a local file
    Upload {
        path: PathBuf,
        /// Name to store the file under (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Show one file
    Details { id: String },
    /// Rename a file, keeping its extension
    Rename { id: String, name: String },
    /// Replace the share list of a file
    Share {
        id: String,
        #[arg(required = true)]
        emails: Vec<String>,
    },
    /// Remove one collaborator from a file
    Unshare { id: String, email: String },
    /// Print the download URL, or save the content with --output
    Download {
        id: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Delete a file and its content
    Delete { id: String },
    /// Show storage used by your own files
    Space,
    /// Show the file menu actions
    Actions,
    /// Show the available sort keys
    Sorts,
    /// Format a byte count for display
    FormatSize { bytes: u64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("storeit_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'storeit --help' for commands");
        return Ok(());
    };

    // Commands that need neither a session nor the data directory.
    match &command {
        Commands::FormatSize { bytes } => {
            println!("{}", format_size(*bytes));
            return Ok(());
        }
        Commands::Sorts => {
            for (label, value) in SORT_OPTIONS {
                println!("{value:<16} {label}");
            }
            return Ok(());
        }
        Commands::Actions => {
            for action in FileAction::ALL {
                let mode = match (action.requires_dialog(), action.requires_submit()) {
                    (true, true) => "dialog with submit",
                    (true, false) => "dialog",
                    (false, _) => "direct",
                };
                println!("{:<10} {}", action.label(), mode);
            }
            return Ok(());
        }
        _ => {}
    }

    let cfg = Arc::new(CoreConfig::from_env()?);
    tracing::debug!(data_dir = %cfg.data_dir().display(), "opening local store");
    let service = FileService::local(cfg)?;
    let session = SessionToken::new(
        cli.session
            .context("a session is required: pass --session or set STOREIT_SESSION")?,
    );

    match command {
        Commands::List {
            types,
            section,
            query,
            sort,
            limit,
        } => {
            if let Some(slug) = section.as_deref().filter(|_| types.is_none()) {
                println!("{}", Section::from_slug(slug).label());
            }
            let filter = ListFilesQuery {
                types,
                section,
                query,
                sort,
                limit,
            }
            .into_filter()?;
            let list = service.get_files(&session, &filter).await?;
            if list.documents.is_empty() {
                println!("No files found.");
            }
            for file in &list.documents {
                print_file(file);
            }
            println!(
                "{} of {} file(s), {}",
                list.documents.len(),
                list.total,
                format_size(list.total_size())
            );
        }
        Commands::Upload { path, name } => {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let name = match name {
                Some(name) => name,
                None => path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .context("path has no file name")?,
            };
            let record = service.upload_file(&session, &name, &bytes).await?;
            println!("Uploaded {} ({})", record.name, record.id);
        }
        Commands::Details { id } => {
            report(service.apply_action(&session, &parse_id(&id)?, ActionRequest::Details).await?);
        }
        Commands::Rename { id, name } => {
            let request = ActionRequest::Rename { name };
            report(service.apply_action(&session, &parse_id(&id)?, request).await?);
        }
        Commands::Share { id, emails } => {
            let emails = emails
                .iter()
                .map(EmailAddress::parse)
                .collect::<Result<Vec<_>, _>>()?;
            let request = ActionRequest::Share { emails };
            report(service.apply_action(&session, &parse_id(&id)?, request).await?);
        }
        Commands::Unshare { id, email } => {
            let email = EmailAddress::parse(&email)?;
            let record = service
                .remove_file_user(&session, &parse_id(&id)?, &email)
                .await?;
            print_file(&record);
        }
        Commands::Download { id, output } => {
            let file_id = parse_id(&id)?;
            match output {
                Some(output) => {
                    let (record, bytes) = service.download_file(&session, &file_id).await?;
                    std::fs::write(&output, &bytes)
                        .with_context(|| format!("failed to write {}", output.display()))?;
                    println!("Saved {} to {}", record.name, output.display());
                }
                None => report(
                    service
                        .apply_action(&session, &file_id, ActionRequest::Download)
                        .await?,
                ),
            }
        }
        Commands::Delete { id } => {
            report(service.apply_action(&session, &parse_id(&id)?, ActionRequest::Delete).await?);
        }
        Commands::Space => {
            let summary = service.total_space_used(&session).await?;
            for file_type in FileType::ALL {
                let usage = summary.category(file_type);
                let latest = usage
                    .latest_date
                    .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".into());
                println!(
                    "{:<9} {:>10}  last updated {}",
                    file_type.to_string(),
                    format_size(usage.size),
                    latest
                );
            }
            println!(
                "Used {} of {} ({}%)",
                format_size(summary.used),
                format_size(summary.all),
                summary.percentage_used()
            );
        }
        Commands::FormatSize { .. } | Commands::Sorts | Commands::Actions => {}
    }

    Ok(())
}

fn parse_id(id: &str) -> anyhow::Result<UniqueId> {
    UniqueId::parse(id).with_context(|| format!("invalid file id '{id}'"))
}

fn print_file(file: &FileRecord) {
    println!(
        "{}  {:<8} {:>10}  {}{}",
        file.id,
        file.file_type.to_string(),
        format_size(file.size),
        file.name,
        if file.users.is_empty() {
            String::new()
        } else {
            format!("  shared with {}", file.users.iter().cloned().collect::<Vec<_>>().join(", "))
        }
    );
}

fn report(outcome: ActionOutcome) {
    match outcome {
        ActionOutcome::Renamed(record) => println!("Renamed to {}", record.name),
        ActionOutcome::Details(record) => {
            print_file(&record);
            println!("  owner:    {}", record.owner);
            println!("  created:  {}", record.created_at);
            println!("  updated:  {}", record.updated_at);
            println!("  url:      {}", record.url);
        }
        ActionOutcome::Shared(record) => print_file(&record),
        ActionOutcome::Download { url, file_name } => println!("{file_name}: {url}"),
        ActionOutcome::Deleted => println!("Deleted."),
    }
}
