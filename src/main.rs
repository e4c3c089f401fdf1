use anyhow::{Context, Result, bail};
use axum::Router;
use fabtrack::{
    config::{AppConfig, Command},
    models::{Category, RecordId, StagedFile},
    routes,
    services::{
        api_client::ApiClient,
        file_backend::{FileBackend, UploadRequest},
        object_urls::ObjectUrlManager,
        preview_registry::PreviewRegistry,
    },
    shell::Shell,
    view::{
        FileView, TaskBoard, TaskFilter,
        download::{safe_file_name, save_bytes},
    },
};
use std::{
    io::{self, BufRead, ErrorKind, Write},
    sync::Arc,
};
use tokio::{io::BufReader, net::TcpListener};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // --- Logging setup (stderr, so command output stays clean) ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    // --- Parse config + command ---
    let (cfg, command) = AppConfig::from_env_and_args()?;
    tracing::debug!("Starting fabtrack with config: {:?}", cfg);

    let client = ApiClient::new(&cfg.api_base, cfg.timeout())
        .with_context(|| format!("configuring API client for {}", cfg.api_base))?;

    match command {
        Command::Browse { project_no } => browse(&cfg, client, project_no).await,
        Command::Projects => list_projects(&client).await,
        Command::DeleteProject { id, yes } => {
            let id = RecordId::from(id);
            if !yes && !confirm(&format!("Delete project {}?", id))? {
                println!("Cancelled.");
                return Ok(());
            }
            client.delete_project(&id).await?;
            println!("Project {} deleted.", id);
            Ok(())
        }
        Command::Files {
            project_no,
            category,
        } => list_files(&client, &project_no, category).await,
        Command::Upload {
            project_no,
            category,
            paths,
        } => {
            let mut files = Vec::with_capacity(paths.len());
            for path in &paths {
                files.push(
                    StagedFile::from_path(path)
                        .await
                        .with_context(|| format!("reading {}", path.display()))?,
                );
            }
            let request = UploadRequest {
                project_no,
                category,
                files,
            };
            let response = client.upload(&request).await?;
            tracing::debug!("upload response: {}", response);
            println!(
                "Uploaded {} file(s) to {} / {}.",
                request.files.len(),
                request.project_no,
                category.label()
            );
            Ok(())
        }
        Command::Download {
            file_id,
            name,
            project,
        } => {
            let id = RecordId::from(file_id);
            let name = match (name, project) {
                (Some(name), _) => Some(name),
                (None, Some(project_no)) => stored_name(&client, &project_no, &id).await?,
                (None, None) => None,
            };
            let blob = client.fetch_blob(&id).await?;
            let fallback = format!("file-{}", id);
            let name = safe_file_name(name.as_deref().unwrap_or(&fallback), &fallback);
            let path = save_bytes(&cfg.download_dir, &name, &blob.bytes)
                .await
                .with_context(|| format!("saving into {}", cfg.download_dir.display()))?;
            println!("Saved {} bytes to {}", blob.len(), path.display());
            Ok(())
        }
        Command::DeleteFile { file_id, yes } => {
            let id = RecordId::from(file_id);
            if !yes && !confirm(&format!("Are you sure you want to permanently delete file {}?", id))? {
                println!("Cancelled.");
                return Ok(());
            }
            client.delete_file(&id).await?;
            println!("File {} deleted.", id);
            Ok(())
        }
        Command::Tasks {
            category,
            status,
            priority,
            project,
        } => {
            let mut board = TaskBoard::new(client.tasks(category));
            board.load().await;
            if let Some(error) = board.error() {
                bail!("{}", error);
            }
            board.set_filter(TaskFilter {
                priority,
                status,
                project_no: project,
            });
            println!("{}", board.title());
            for task in board.visible() {
                println!(
                    "  [{}] {:<8} {:<12} {:<8} {}",
                    task.id,
                    task.priority,
                    task.status,
                    task.project_no.as_deref().unwrap_or("-"),
                    task.title
                );
            }
            Ok(())
        }
    }
}

async fn list_projects(client: &ApiClient) -> Result<()> {
    let projects = client.list_projects().await?;
    if projects.is_empty() {
        println!("No projects.");
    }
    for project in projects {
        println!(
            "  {:<10} {:<24} {:<10} {}",
            project.project_no,
            project.customer.as_deref().unwrap_or("-"),
            project.payment_label(),
            project.requested_delivery.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

/// Name the file was uploaded under, looked up in the job's file listing.
async fn stored_name(client: &ApiClient, project_no: &str, id: &RecordId) -> Result<Option<String>> {
    let files = client
        .list_project_files(project_no)
        .await
        .with_context(|| format!("listing files of project {}", project_no))?;
    let name = files.into_iter().find(|f| &f.id == id).map(|f| f.file_name);
    if name.is_none() {
        tracing::warn!("file {} is not listed under project {}", id, project_no);
    }
    Ok(name)
}

async fn list_files(client: &ApiClient, project_no: &str, category: Category) -> Result<()> {
    let files = client.list_files(project_no, category).await?;
    if files.is_empty() {
        println!("No files found in this category.");
    }
    for file in files {
        println!(
            "  [{}] {}  {}  {}",
            file.id,
            file.file_name,
            file.size_label(),
            file.mime_type
        );
    }
    Ok(())
}

/// Start the preview server and run the interactive file view on stdin.
async fn browse(cfg: &AppConfig, client: ApiClient, project_no: String) -> Result<()> {
    // --- Start preview server ---
    let addr = cfg.preview_addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.preview_host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.preview_port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };
    let local = listener.local_addr()?;
    let host = if local.ip().is_unspecified() {
        "127.0.0.1".to_string()
    } else {
        local.ip().to_string()
    };
    let registry = PreviewRegistry::new(format!("http://{}:{}", host, local.port()));
    tracing::info!("Preview server listening on {}", registry.base_url());

    let app: Router = routes::routes::routes().with_state(registry.clone());
    let server = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            tracing::error!("preview server stopped: {}", err);
        }
    });

    // --- Interactive view ---
    let urls: Arc<dyn ObjectUrlManager> = Arc::new(registry.clone());
    let view = FileView::new(project_no, Arc::new(client), urls);
    let mut shell = Shell::new(view, cfg.download_dir.clone());
    let mut stdout = io::stdout();
    shell
        .run(BufReader::new(tokio::io::stdin()), &mut stdout)
        .await?;

    drop(shell);
    tracing::debug!("{} preview URL(s) still live at exit", registry.live_count());
    server.abort();
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
