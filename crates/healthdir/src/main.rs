//! `healthdir` - CLI for the health-care facility directory
//!
//! This binary loads the directory from the configured store and lets you
//! list, search, browse and publish it.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Write;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::warn;

use healthdir::cli::{
    BrowseCommand, Cli, Command, ConfigCommand, FeedbackCommand, ImportCommand, ListCommand,
    OutputFormat, PageCommand,
};
use healthdir::config::{validate_collection_name, SourceKind};
use healthdir::feedback::LoggingSubmitter;
use healthdir::render::{
    render_load_error, render_records, LOAD_ERROR_MESSAGE, NO_RESULTS_MESSAGE,
};
use healthdir::store::{JsonFileStore, SqliteStore};
use healthdir::{
    filter, init_logging, open_store, run_session, Config, DatasetCache, Directory,
    DisplaySurface, DocumentStore, FacilityRecord, FeedbackForm, FileSurface, LoadState, Loader,
    WriterSurface,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::List(cmd) => handle_list(&config, &cmd, &mut std::io::stdout()).await,
        Command::Browse(cmd) => handle_browse(&config, &cmd).await,
        Command::Page(cmd) => handle_page(&config, &cmd, &mut std::io::stdout()).await,
        Command::Import(cmd) => handle_import(&config, &cmd, &mut std::io::stdout()).await,
        Command::Status(cmd) => handle_status(&config, cmd.json).await,
        Command::Feedback(cmd) => handle_feedback(&cmd).await,
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn loader(config: &Config) -> anyhow::Result<Loader<Box<dyn DocumentStore>>> {
    let store = open_store(config).context("failed to open data source")?;
    Ok(Loader::new(store, config.source.collection.clone()))
}

async fn handle_list(
    config: &Config,
    cmd: &ListCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let records = match loader(config)?.load().await {
        Ok(records) => records,
        Err(e) => {
            match cmd.format {
                OutputFormat::Table => writeln!(out, "{LOAD_ERROR_MESSAGE}")?,
                OutputFormat::Html => writeln!(out, "{}", render_load_error().into_string())?,
                OutputFormat::Json => {}
            }
            return Err(e.into());
        }
    };
    let matches = filter(&records, &cmd.term);

    match cmd.format {
        OutputFormat::Table => write_table(out, &matches)?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&matches)?)?,
        OutputFormat::Html => writeln!(
            out,
            "{}",
            render_records(Some(matches.as_slice())).into_string()
        )?,
    }
    Ok(())
}

fn write_table(out: &mut impl Write, records: &[&FacilityRecord]) -> std::io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "{NO_RESULTS_MESSAGE}");
    }
    writeln!(
        out,
        "{:<36} {:<16} {:<20} {:<24} SERVICES",
        "NAME", "TYPE", "NEIGHBORHOOD", "PHONE"
    )?;
    for record in records {
        writeln!(
            out,
            "{:<36} {:<16} {:<20} {:<24} {}",
            record.name,
            record.unit_type(),
            record.neighborhood(),
            record.phone_or_fallback(),
            record.services.join(", ")
        )?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "{} facilit{}",
        records.len(),
        if records.len() == 1 { "y" } else { "ies" }
    )
}

async fn handle_browse(config: &Config, cmd: &BrowseCommand) -> anyhow::Result<()> {
    let loader = loader(config)?;
    let input = tokio::io::BufReader::new(tokio::io::stdin());

    let summary = match &cmd.output {
        Some(path) => {
            eprintln!("Writing to {}; type a search and press Enter.", path.display());
            let surface = FileSurface::new(path, config.display.title.clone());
            browse(surface, &loader, input, config).await?
        }
        None => {
            let surface = WriterSurface::new(std::io::stdout());
            browse(surface, &loader, input, config).await?
        }
    };

    if summary.state == LoadState::Failed {
        bail!("could not load collection '{}'", config.source.collection);
    }
    eprintln!(
        "{} search{}, {} visible",
        summary.searches,
        if summary.searches == 1 { "" } else { "es" },
        summary.visible
    );
    Ok(())
}

async fn browse<D, R>(
    surface: D,
    loader: &Loader<Box<dyn DocumentStore>>,
    input: R,
    config: &Config,
) -> healthdir::Result<healthdir::SessionSummary>
where
    D: DisplaySurface,
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut directory = Directory::new(surface);
    run_session(&mut directory, loader, input, config.debounce()).await
}

async fn handle_page(
    config: &Config,
    cmd: &PageCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let path = cmd.output.clone().unwrap_or_else(|| config.output_path());
    let mut directory = Directory::new(FileSurface::new(&path, config.display.title.clone()));

    // A failed load leaves the error page in place; searching would replace it.
    if directory.load(&loader(config)?).await == LoadState::Failed {
        bail!(
            "could not load collection '{}'; wrote error page to {}",
            config.source.collection,
            path.display()
        );
    }
    if !cmd.term.is_empty() {
        directory.on_search_input(&cmd.term);
    }

    writeln!(
        out,
        "Wrote {} ({} of {} facilities)",
        path.display(),
        directory.visible_count(),
        directory.records().len()
    )?;
    Ok(())
}

async fn handle_import(
    config: &Config,
    cmd: &ImportCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let collection = cmd
        .collection
        .clone()
        .unwrap_or_else(|| config.source.collection.clone());
    validate_collection_name(&collection)?;

    let documents = JsonFileStore::new(&cmd.file)
        .read_collection(&collection)
        .await
        .with_context(|| format!("failed to read {}", cmd.file.display()))?;

    let store = SqliteStore::open(config.database_path())?;
    let stats = store.import(&collection, &documents, cmd.replace)?;

    writeln!(out, "Imported into '{collection}' at {}", store.path().display())?;
    writeln!(out, "  Inserted:  {}", stats.inserted)?;
    writeln!(out, "  Updated:   {}", stats.updated)?;
    writeln!(out, "  Unchanged: {}", stats.unchanged)?;
    if cmd.replace {
        writeln!(out, "  Removed:   {}", stats.removed)?;
    }
    writeln!(out, "  Total:     {}", store.count(&collection)?)?;
    Ok(())
}

async fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let loader = loader(config)?;
    let mut cache = DatasetCache::new();
    let ticket = cache.begin_load();
    let error = match loader.load().await {
        Ok(records) => {
            cache.complete(ticket, records);
            None
        }
        Err(e) => {
            cache.fail(ticket);
            Some(e.to_string())
        }
    };

    let sqlite = match config.source.kind {
        SourceKind::Sqlite => Some(SqliteStore::open(config.database_path())?.stats()?),
        SourceKind::Firestore | SourceKind::Json => None,
    };

    if json {
        let status = serde_json::json!({
            "source": config.source.kind.to_string(),
            "collection": config.source.collection,
            "state": cache.state().to_string(),
            "records": cache.len(),
            "fingerprint": cache.fingerprint(),
            "loaded_at": cache.loaded_at(),
            "error": error,
            "database_path": sqlite.as_ref().map(|_| config.database_path()),
            "database_size_bytes": sqlite.as_ref().map(|s| s.db_size_bytes),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("healthdir status");
        println!("----------------");
        println!("Source:        {}", config.source.kind);
        println!("Collection:    {}", config.source.collection);
        println!("State:         {}", cache.state());
        println!("Records:       {}", cache.len());
        println!("Fingerprint:   {}", cache.fingerprint());
        if let Some(at) = cache.loaded_at() {
            println!("Loaded at:     {}", at.to_rfc3339());
        }
        if let Some(error) = &error {
            println!("Error:         {error}");
        }
        if let Some(stats) = &sqlite {
            println!();
            println!("Database:      {}", config.database_path().display());
            println!("Size:          {} bytes", stats.db_size_bytes);
            for (collection, count) in &stats.collections {
                println!("  {collection:<20} {count}");
            }
        }
    }
    Ok(())
}

async fn handle_feedback(cmd: &FeedbackCommand) -> anyhow::Result<()> {
    let mut form = FeedbackForm::new();
    form.set_anonymous(cmd.anonymous);
    if let Some(first) = &cmd.first_name {
        if !form.first_name_mut().set(first.as_str()) {
            warn!("First name ignored for anonymous feedback");
        }
    }
    if let Some(last) = &cmd.last_name {
        if !form.last_name_mut().set(last.as_str()) {
            warn!("Last name ignored for anonymous feedback");
        }
    }
    form.message.clone_from(&cmd.message);
    form.unit_id.clone_from(&cmd.unit);

    form.submit(&LoggingSubmitter).await?;
    println!("Feedback sent. Thank you!");
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                let mut out = std::io::stdout().lock();
                writeln!(out, "Current Configuration")?;
                writeln!(out, "=====================")?;
                writeln!(out)?;
                writeln!(out, "[Source]")?;
                writeln!(out, "  Kind:               {}", config.source.kind)?;
                writeln!(out, "  Collection:         {}", config.source.collection)?;
                writeln!(out, "  Database path:      {}", config.database_path().display())?;
                if let Some(path) = &config.source.json_path {
                    writeln!(out, "  JSON path:          {}", path.display())?;
                }
                writeln!(out)?;
                writeln!(out, "[Firestore]")?;
                writeln!(
                    out,
                    "  Project:            {}",
                    config.firestore.project_id.as_deref().unwrap_or("(not set)")
                )?;
                writeln!(out, "  Database:           {}", config.firestore.database)?;
                writeln!(out, "  Page size:          {}", config.firestore.page_size)?;
                writeln!(out)?;
                writeln!(out, "[Search]")?;
                writeln!(out, "  Debounce (ms):      {}", config.search.debounce_ms)?;
                writeln!(out)?;
                writeln!(out, "[Display]")?;
                writeln!(out, "  Title:              {}", config.display.title)?;
                writeln!(out, "  Output path:        {}", config.output_path().display())?;
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
