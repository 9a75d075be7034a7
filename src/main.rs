use std::path::PathBuf;

use clap::{Parser, Subcommand};

use kb_session::authz::PermissionEngine;
use kb_session::http::FileUpload;
use kb_session::models::RegisterRequest;
use kb_session::navigation::Resolution;
use kb_session::{create_default_client, ClientConfig, KbClient};

#[derive(Parser, Debug)]
#[command(author, version, about = "knowledge-base session client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and persist the session token
    Login {
        username: String,
        #[arg(long, env = "KB_PASSWORD")]
        password: String,
    },
    /// Create an account and log in with it
    Register {
        username: String,
        email: String,
        #[arg(long, env = "KB_PASSWORD")]
        password: String,
    },
    /// Forget the stored token
    Logout,
    /// Show the identity behind the stored token
    Whoami,
    /// Check whether the current user holds a permission, e.g. `kb:edit`
    Can { permission: String },
    /// Run the navigation guard for a path
    Navigate { path: String },
    /// Knowledge-base operations
    #[command(subcommand)]
    Kb(KbCommands),
}

#[derive(Subcommand, Debug)]
enum KbCommands {
    /// List knowledge bases
    List,
    /// Create a knowledge base
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Rename a knowledge base
    Rename { id: i64, name: String },
    /// Delete a knowledge base and its documents
    Delete { id: i64 },
    /// List documents in a knowledge base
    Documents { id: i64 },
    /// Delete one document from a knowledge base
    RemoveDocument { id: i64, document_id: i64 },
    /// Upload a document into a knowledge base
    Upload { id: i64, file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env();
    init_tracing();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;
    let (client, mut redirects) = create_default_client(config)?;

    let result = run(&client, cli.command).await;

    while let Ok(path) = redirects.try_recv() {
        println!("Session expired; continue at {path}");
    }

    result
}

async fn run(client: &KbClient, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Login { username, password } => {
            let user = client.auth().login(&username, &password).await?;
            println!("Logged in as {} (admin: {})", user.display_name, user.is_admin);
        }
        Commands::Register {
            username,
            email,
            password,
        } => {
            let request = RegisterRequest {
                username,
                email,
                password,
                is_admin: None,
            };
            let user = client.auth().register(&request).await?;
            println!("Registered {} (admin: {})", user.display_name, user.is_admin);
        }
        Commands::Logout => {
            client.logout();
            println!("Logged out");
        }
        Commands::Whoami => {
            hydrate(client).await?;
            match client.session.user() {
                Some(user) => println!(
                    "{} (id {}, admin: {}, can manage KB: {})",
                    user.display_name, user.id, user.is_admin, user.can_manage_kb
                ),
                None => println!("Not logged in"),
            }
        }
        Commands::Can { permission } => {
            hydrate(client).await?;
            let granted = PermissionEngine::new().check_str(&client.session.snapshot(), &permission);
            println!("{permission}: {}", if granted { "granted" } else { "denied" });
        }
        Commands::Navigate { path } => {
            hydrate(client).await?;
            match client.navigate(&path) {
                Resolution::Mount(route) => println!("{path} -> {} ({})", route.name, route.path),
                Resolution::Redirect { outcome, to } => println!("{path} -> redirect to {to} ({outcome:?})"),
                Resolution::NotFound { path } => println!("{path} -> not found"),
            }
        }
        Commands::Kb(kb) => {
            hydrate(client).await?;
            run_kb(client, kb).await?;
        }
    }

    Ok(())
}

async fn run_kb(client: &KbClient, command: KbCommands) -> anyhow::Result<()> {
    let api = client.knowledge_bases();
    match command {
        KbCommands::List => {
            for kb in api.list().await? {
                println!("{:>5}  {}  ({} documents)", kb.id, kb.name, kb.document_count.unwrap_or(0));
            }
        }
        KbCommands::Create { name, description } => {
            let kb = api.create(&name, description.as_deref()).await?;
            println!("Created knowledge base {} ({})", kb.id, kb.name);
        }
        KbCommands::Rename { id, name } => {
            api.update(id, &name).await?;
            println!("Renamed knowledge base {id} to {name}");
        }
        KbCommands::Delete { id } => {
            api.delete(id).await?;
            println!("Deleted knowledge base {id}");
        }
        KbCommands::RemoveDocument { id, document_id } => {
            api.delete_document(id, document_id).await?;
            println!("Deleted document {document_id} from knowledge base {id}");
        }
        KbCommands::Documents { id } => {
            for doc in api.documents(id).await? {
                println!("{:>5}  {}", doc.id, doc.name);
            }
        }
        KbCommands::Upload { id, file } => {
            let upload = FileUpload::from_path(&file).await?;
            let receipt = api.upload_document(id, upload).await?;
            println!(
                "Uploaded {} as document {} ({} chunks indexed)",
                file.display(),
                receipt.id,
                receipt.vector_count.unwrap_or(0)
            );
        }
    }
    Ok(())
}

/// Load the stored token and wait for the identity check, which the CLI
/// needs before it can answer anything about the user.
async fn hydrate(client: &KbClient) -> anyhow::Result<()> {
    if let Some(handle) = client.init()? {
        if let Err(err) = handle.await? {
            tracing::warn!(error = %err, "stored session is no longer valid");
        }
    }
    Ok(())
}

fn load_env() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    let _ = dotenvy::from_path(crate_env);
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr);

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
