mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use equiptrack_core::ItemId;
use equiptrack_infra::{config, CsvTableStore, InventoryService, ServiceError, TrackerConfig};
use equiptrack_ledger::{RegisterEquipment, RelocateEquipment};

#[derive(Parser, Debug)]
#[command(name = "equiptrack", version, about = "Track office equipment and where it is")]
struct Cli {
    /// Shared login (defaults to EQUIPTRACK_LOGIN)
    #[arg(long, global = true)]
    login: Option<String>,

    /// Shared password (defaults to EQUIPTRACK_PASSWORD)
    #[arg(long, global = true)]
    password: Option<String>,

    /// Directory with items.csv / history.csv (defaults to EQUIPTRACK_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all equipment
    List,
    /// Show one item and its history
    Show { id: u64 },
    /// Register new equipment
    Register {
        #[arg(long)]
        name: String,
        #[arg(long = "type")]
        item_type: String,
        #[arg(long, default_value = "")]
        serial: String,
        #[arg(long, default_value = "")]
        specs: String,
        #[arg(long)]
        location: String,
        #[arg(long, default_value = "new")]
        status: String,
    },
    /// Move equipment to another location
    Relocate {
        id: u64,
        #[arg(long)]
        to: String,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Show the audit log, most recent first
    History {
        #[arg(long)]
        item: Option<u64>,
    },
    /// Print accepted locations, types and statuses
    Catalog,
}

fn main() -> Result<()> {
    equiptrack_observability::init();
    let cli = Cli::parse();

    let mut config = TrackerConfig::from_env().context("load configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let login = cli
        .login
        .or_else(|| std::env::var(config::ENV_LOGIN).ok())
        .unwrap_or_default();
    let password = cli
        .password
        .or_else(|| std::env::var(config::ENV_PASSWORD).ok())
        .unwrap_or_default();
    let operator = config
        .credentials
        .authenticate(&login, &password)
        .context("login failed")?;

    tracing::debug!(data_dir = %config.data_dir.display(), "opening store");
    let store = Arc::new(CsvTableStore::new(config.data_dir.clone()));
    let service = InventoryService::new(store, config.catalog);

    match run(&service, &operator, cli.command) {
        Err(ServiceError::NotFound) => bail!("no such item"),
        // The buffer dies with the process, so say what was not logged.
        Err(err) if service.pending_audit_len() > 0 => {
            bail!("{err}\n{}", render::unwritten_audit(service.pending_audit_len()))
        }
        result => Ok(result?),
    }
}

fn run<S>(
    service: &InventoryService<S>,
    operator: &equiptrack_auth::Operator,
    command: Command,
) -> Result<(), ServiceError>
where
    S: equiptrack_infra::TabularStore + Clone,
{
    match command {
        Command::List => {
            let items = service.list_items(operator)?;
            print!("{}", render::items(&items));
        }
        Command::Show { id } => {
            let item = service.find_item_by_id(operator, ItemId::new(id))?;
            print!("{}", render::item_detail(&item));
            let history = service.history_for_item(operator, item.id)?;
            print!("{}", render::history(&history));
        }
        Command::Register {
            name,
            item_type,
            serial,
            specs,
            location,
            status,
        } => {
            let item = service.register_equipment(
                operator,
                RegisterEquipment {
                    name,
                    item_type,
                    serial_number: serial,
                    specs,
                    location,
                    status,
                },
            )?;
            println!("registered #{} {} at {}", item.id, item.name, item.location);
        }
        Command::Relocate { id, to, comment } => {
            let (before, after) = service.relocate_equipment(
                operator,
                RelocateEquipment {
                    item_id: ItemId::new(id),
                    to_location: to,
                    comment,
                },
            )?;
            println!(
                "moved #{} {}: {} -> {}",
                after.id, after.name, before.location, after.location
            );
        }
        Command::History { item } => {
            let history = match item {
                Some(id) => service.history_for_item(operator, ItemId::new(id))?,
                None => service.list_history(operator)?,
            };
            print!("{}", render::history(&history));
        }
        Command::Catalog => {
            print!("{}", render::catalog(service.catalog()));
        }
    }
    Ok(())
}
