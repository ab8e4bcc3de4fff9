//! Host program for the web service helper.
//!
//! Supplies what the core leaves to its host: settings on disk
//! (`JsonFilePersistence`), a ureq transport, logging, and an admin page
//! served with axum.

pub mod admin_server;
pub mod transport;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use webservice_core::{
    kv, webservice_fields, HttpMethod, JsonFilePersistence, Plugin, RequestBody, RequestOverrides,
    SettingsStore, WebService,
};

use crate::admin_server::AdminState;
use crate::transport::UreqClient;

#[derive(Debug, Parser)]
#[command(name = "webservice", about = "Send requests built from stored settings")]
pub struct Cli {
    /// Directory holding `<bundle id>.json` settings files.
    #[arg(long, env = "WEBSERVICE_STORE_DIR", default_value = ".")]
    pub store_dir: PathBuf,

    /// Component name the bundle id is derived from.
    #[arg(long, env = "WEBSERVICE_NAME", default_value = "ZnWP WebService Plugin")]
    pub name: String,

    /// Title shown on the settings page; underscores become spaces.
    #[arg(long, default_value = "ZnWP_WebService")]
    pub title: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the stored settings as JSON.
    Show,
    /// Store one setting.
    Set { key: String, value: String },
    /// Send the configured request and print the response body.
    Request(RequestArgs),
    /// Serve the settings page.
    Serve {
        #[arg(long, env = "PORT", default_value_t = 3000)]
        port: u16,
    },
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct RequestArgs {
    /// Send to this URL instead of the stored one.
    #[arg(long)]
    pub url: Option<String>,
    /// GET or POST.
    #[arg(long)]
    pub method: Option<String>,
    /// Replace all stored headers; repeat as `--header Name=value`.
    #[arg(long = "header")]
    pub headers: Vec<String>,
    /// Replace all stored parameters; repeat as `--data key=value`.
    #[arg(long = "data")]
    pub data: Vec<String>,
    /// Send this text as the body instead of form parameters.
    #[arg(long, conflicts_with = "data")]
    pub raw_body: Option<String>,
    /// Override the TLS verification setting.
    #[arg(long)]
    pub verify_ssl: Option<bool>,
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// Print the request instead of sending it.
    #[arg(long)]
    pub dry_run: bool,
}

impl RequestArgs {
    /// Translate flags into overrides. Repeated `--header`/`--data` values
    /// are parsed like the stored text settings.
    pub fn overrides(&self) -> anyhow::Result<RequestOverrides> {
        let mut overrides = RequestOverrides::new();
        if let Some(method) = &self.method {
            overrides = overrides.method(method.parse::<HttpMethod>()?);
        }
        if !self.headers.is_empty() {
            overrides = overrides.headers(kv::parse(&self.headers.join("\n")));
        }
        if let Some(raw) = &self.raw_body {
            overrides = overrides.body(RequestBody::Raw(raw.clone()));
        } else if !self.data.is_empty() {
            overrides = overrides.body(RequestBody::Form(kv::parse(&self.data.join("\n"))));
        }
        if let Some(verify) = self.verify_ssl {
            overrides = overrides.verify_ssl(verify);
        }
        if let Some(secs) = self.timeout_secs {
            overrides = overrides.timeout(Duration::from_secs(secs));
        }
        Ok(overrides)
    }
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let plugin = Plugin::new(&cli.name, &cli.title);
    let persistence = JsonFilePersistence::new(&cli.store_dir)
        .with_context(|| format!("opening settings directory {}", cli.store_dir.display()))?;
    let mut store = SettingsStore::new(persistence, webservice_fields());
    let id = plugin.bundle_id().to_string();

    match cli.command {
        Command::Show => {
            let bundle = store.load(&id)?;
            println!("{}", serde_json::to_string_pretty(&bundle)?);
        }
        Command::Set { key, value } => {
            let mut bundle = store.load(&id)?;
            bundle.set(key, value);
            store.save(&id, bundle)?;
            info!(bundle = %id, "setting saved");
        }
        Command::Request(args) => {
            let service = WebService::from_store(&mut store, &id)?;
            let overrides = args.overrides()?;
            if args.dry_run {
                let descriptor = service.build_request(args.url.as_deref(), Some(&overrides))?;
                println!("{}", serde_json::to_string_pretty(&descriptor)?);
                return Ok(());
            }
            let response = service.get_response(&UreqClient::new(), args.url.as_deref(), Some(&overrides));
            print!("{}", WebService::response_body(&response));
            response?;
        }
        Command::Serve { port } => {
            let state = Arc::new(AdminState::new(plugin, store));
            let addr = SocketAddr::from(([127, 0, 0, 1], port));
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(async {
                let listener = tokio::net::TcpListener::bind(addr).await?;
                admin_server::run(listener, state).await
            })?;
        }
    }
    Ok(())
}
