use anyhow::{bail, Context, Result};
use atlas_desk::config::{self, Config};
use atlas_desk::gateway::{self, DocumentService};
use atlas_desk::model::{ConnectionMode, RequestStatus};
use atlas_desk::mutation::{self, MutationOutcome, Notices};
use atlas_desk::poller;
use atlas_desk::render;
use atlas_desk::store::{CollectionBrowser, RequestStore, StatusFilter};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Poll the data source and re-render the HTML dashboard each cycle
    Run,
    /// Print the current request table
    List {
        /// all | pending | confirmed | denied
        #[arg(long, default_value = "all")]
        status: String,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show one request in full
    Show { id: String },
    /// Confirm a pending request
    Confirm { id: String },
    /// Deny a pending request
    Deny { id: String },
    /// Browse a secondary collection read-only
    Browse {
        collection: String,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Print an example config file to stdout
    ExampleConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    if let Command::ExampleConfig = args.command {
        print!("{}", config::example());
        return Ok(());
    }

    let cfg = config::load(Some(&args.config))?;
    match args.command {
        Command::Run => cmd_run(&cfg).await,
        Command::List {
            status,
            search,
            page,
        } => cmd_list(&cfg, &status, search.as_deref(), page).await,
        Command::Show { id } => cmd_show(&cfg, &id).await,
        Command::Confirm { id } => cmd_mutate(&cfg, &id, RequestStatus::Confirmed).await,
        Command::Deny { id } => cmd_mutate(&cfg, &id, RequestStatus::Denied).await,
        Command::Browse {
            collection,
            search,
            page,
        } => cmd_browse(&cfg, &collection, search.as_deref(), page).await,
        Command::ExampleConfig => unreachable!("handled before config load"),
    }
}

async fn cmd_run(cfg: &Config) -> Result<()> {
    cfg.ensure_dirs()?;
    let out_dir = PathBuf::from(&cfg.app.output_dir);
    let static_dir = out_dir.join("static");
    std::fs::create_dir_all(&static_dir)
        .with_context(|| format!("failed to create {}", static_dir.display()))?;
    std::fs::write(static_dir.join("style.css"), render::DEFAULT_STYLE)
        .context("failed to write stylesheet")?;

    let (service, mode) = gateway::connect(cfg).await;
    let mut store = RequestStore::new(cfg.app.page_size);
    let mut notices = Notices::new();

    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = tx.send(true);
    });

    let index_path = out_dir.join("index.html");
    info!(path = %index_path.display(), "writing dashboard every cycle");
    poller::run(
        &mut store,
        service.as_ref(),
        Duration::from_secs(cfg.app.poll_interval_secs),
        rx,
        |store| {
            let now = Utc::now();
            notices.expire(now);
            let html = render::dashboard_page(store, &notices, mode, now);
            if let Err(err) = std::fs::write(&index_path, html) {
                error!(?err, "failed to write dashboard page");
            }
        },
    )
    .await;
    Ok(())
}

/// One fetch into a fresh store, shared by the one-shot subcommands.
async fn load_store(
    cfg: &Config,
    service: &dyn DocumentService,
) -> Result<RequestStore> {
    let mut store = RequestStore::new(cfg.app.page_size);
    poller::poll_cycle(&mut store, service, Utc::now())
        .await
        .context("initial fetch failed")?;
    Ok(store)
}

fn announce_mode(mode: ConnectionMode) {
    if mode.is_local() {
        println!("[local mode] showing sample data; data api not configured");
    }
}

fn parse_filter(status: &str) -> Result<StatusFilter> {
    if status == "all" {
        return Ok(StatusFilter::All);
    }
    match RequestStatus::parse(status) {
        Some(s) => Ok(StatusFilter::Only(s)),
        None => bail!("unknown status '{status}' (expected all|pending|confirmed|denied)"),
    }
}

async fn cmd_list(
    cfg: &Config,
    status: &str,
    search: Option<&str>,
    page: usize,
) -> Result<()> {
    let filter = parse_filter(status)?;
    let (service, mode) = gateway::connect(cfg).await;
    announce_mode(mode);

    let mut store = load_store(cfg, service.as_ref()).await?;
    store.set_filter(filter);
    if let Some(term) = search {
        store.set_search(term);
    }
    if !store.set_page(page) {
        bail!("page {page} out of range (1..={})", store.page_count());
    }

    let counts = store.counts();
    println!(
        "total {}  pending {}  confirmed {}  denied {}",
        counts.total, counts.pending, counts.confirmed, counts.denied
    );
    println!(
        "{:<10} {:<22} {:<18} {:<22} {}",
        "ID", "CLIENT", "DATE", "SERVICE", "STATUS"
    );
    for r in store.page_slice() {
        println!(
            "{:<10} {:<22} {:<18} {:<22} {}",
            r.short_id(),
            r.client_name.as_deref().unwrap_or("no name"),
            format!(
                "{} {}",
                render::format_date(r.requested_date.as_deref()),
                r.requested_time.as_deref().unwrap_or("--:--")
            ),
            r.service_name.as_deref().unwrap_or("no service"),
            r.status.as_str()
        );
    }
    println!("page {} / {}", store.page(), store.page_count());
    Ok(())
}

async fn cmd_show(cfg: &Config, id: &str) -> Result<()> {
    let (service, mode) = gateway::connect(cfg).await;
    announce_mode(mode);

    let store = load_store(cfg, service.as_ref()).await?;
    let Some(r) = store.find(id) else {
        bail!("no request with id '{id}' in the current view");
    };

    println!("id              {}", r.id);
    println!("client          {}", r.client_name.as_deref().unwrap_or("no name"));
    println!("phone           {}", r.client_phone.as_deref().unwrap_or("unavailable"));
    println!("service         {}", r.service_name.as_deref().unwrap_or("no service"));
    println!(
        "requested for   {} {}",
        render::format_date(r.requested_date.as_deref()),
        r.requested_time.as_deref().unwrap_or("--:--")
    );
    println!("status          {}", r.status.as_str());
    println!(
        "message         {}",
        r.original_message.as_deref().unwrap_or("no message")
    );
    println!(
        "source channel  {}",
        r.source_channel_id.as_deref().unwrap_or("unavailable")
    );
    println!("created         {}", render::format_timestamp(r.created_at));
    println!(
        "last updated    {}",
        r.updated_at
            .map(render::format_timestamp)
            .unwrap_or_else(|| "never updated".to_string())
    );
    Ok(())
}

async fn cmd_mutate(cfg: &Config, id: &str, target: RequestStatus) -> Result<()> {
    let (service, mode) = gateway::connect(cfg).await;
    announce_mode(mode);

    let mut store = load_store(cfg, service.as_ref()).await?;
    if let Some(current) = store.find(id) {
        if current.status.is_terminal() {
            bail!(
                "request {} is already {}; only pending requests can change",
                current.short_id(),
                current.status.as_str()
            );
        }
    }

    let mut notices = Notices::new();
    let outcome = mutation::change_status(
        &mut store,
        service.as_ref(),
        &mut notices,
        id,
        target,
        Utc::now(),
    )
    .await;

    match outcome {
        MutationOutcome::Committed => {
            println!("request {} -> {}", id, target.as_str());
        }
        MutationOutcome::RolledBack => {
            for notice in notices.iter() {
                eprintln!("[ERROR] {}", notice.message);
            }
            bail!("update failed; local state rolled back");
        }
        MutationOutcome::UnknownId => bail!("no request with id '{id}'"),
    }
    Ok(())
}

async fn cmd_browse(
    cfg: &Config,
    collection: &str,
    search: Option<&str>,
    page: usize,
) -> Result<()> {
    let Some(spec) = cfg.collection_spec(collection) else {
        let known: Vec<&str> = cfg.collections.iter().map(|c| c.name.as_str()).collect();
        bail!(
            "collection '{collection}' not configured (known: {})",
            known.join(", ")
        );
    };

    let (service, mode) = gateway::connect(cfg).await;
    announce_mode(mode);

    let docs = service
        .fetch_collection(collection, cfg.api.query_limit)
        .await
        .context("collection fetch failed")?;
    let total = service
        .count(collection)
        .await
        .context("collection count failed")?;

    let mut browser = CollectionBrowser::new(collection, cfg.app.page_size);
    browser.replace_all(docs);
    if let Some(term) = search {
        browser.set_search(term);
    }
    if !browser.set_page(page) {
        bail!("page {page} out of range (1..={})", browser.page_count());
    }

    println!("{collection}: {total} documents");
    for doc in browser.page_slice() {
        let id = doc.get("_id").and_then(|v| v.as_str()).unwrap_or("-");
        let fields: Vec<String> = spec
            .fields
            .iter()
            .map(|f| {
                let value = doc
                    .get(f)
                    .map(|v| match v {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .unwrap_or_else(|| "-".to_string());
                format!("{f}={value}")
            })
            .collect();
        println!("{:<10} {}", id, fields.join("  "));
    }
    println!("page {} / {}", browser.page(), browser.page_count());

    cfg.ensure_dirs()?;
    let out_dir = PathBuf::from(&cfg.app.output_dir);
    let page_path = out_dir.join(format!("browse_{collection}.html"));
    let html = render::browse_page(&browser, &spec.fields, mode, total);
    std::fs::write(&page_path, html)
        .with_context(|| format!("failed to write {}", page_path.display()))?;
    info!(path = %page_path.display(), "wrote collection page");
    Ok(())
}
