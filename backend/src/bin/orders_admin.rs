//! Operator CLI for the order store: apply migrations, inspect and assign
//! orders.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::ffi::OsString;
use std::io;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use ortho_config::OrthoConfig;
use orders_backend::domain::ports::{
    AssignOrderRequest, GetOrderRequest, ListOrdersRequest, OrderCommand, OrderQuery,
};
use orders_backend::domain::{OrderCommandService, OrderQueryService, UserId};
use orders_backend::outbound::persistence::{DbPool, DieselOrderRepository, run_migrations};
use orders_backend::settings::OrderStoreSettings;
use serde::Serialize;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

/// `orders-admin` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "orders-admin",
    about = "Inspect and manage orders in the order store",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `ORDERS_DATABASE_URL`, then
    /// `DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url", global = true)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Apply pending schema migrations.
    Migrate,
    /// Print one order as JSON.
    Show {
        #[arg(long = "order-id", value_name = "uuid")]
        order_id: Uuid,
    },
    /// Print a page of a user's orders as JSON.
    List {
        #[arg(long = "user-id", value_name = "uuid")]
        user_id: Uuid,
        /// Exact order code to match.
        #[arg(long)]
        code: Option<String>,
        /// Exact status to match.
        #[arg(long)]
        status: Option<String>,
        /// Sort field: id, code, status, total_price, created_at or updated_at.
        #[arg(long = "order-by")]
        order_by: Option<String>,
        /// Sort descending. Ignored without `--order-by`.
        #[arg(long)]
        desc: bool,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Page size; 0 selects the default.
        #[arg(long, default_value_t = 0)]
        limit: u32,
    },
    /// Move an order to `in_progress`.
    Assign {
        #[arg(long = "order-id", value_name = "uuid")]
        order_id: Uuid,
    },
}

fn main() -> io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }

    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = OrderStoreSettings::load_from_iter([OsString::from("orders-admin")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let database_url = resolve_database_url(args.database_url, settings.database_url.clone())?;

    if matches!(args.command, Command::Migrate) {
        let applied = run_migrations(&database_url)
            .map_err(|error| io::Error::other(error.to_string()))?;
        println!("applied_migrations={applied}");
        return Ok(());
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main(args.command, settings, database_url))
}

async fn async_main(
    command: Command,
    settings: OrderStoreSettings,
    database_url: String,
) -> io::Result<()> {
    let pool = DbPool::new(settings.pool_config(database_url))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    let repo = Arc::new(DieselOrderRepository::new(pool));
    let timeout = settings.query_timeout();

    match command {
        Command::Migrate => Ok(()),
        Command::Show { order_id } => {
            let query = OrderQueryService::new(repo).with_timeout(timeout);
            let response = query
                .get_order(GetOrderRequest { order_id })
                .await
                .map_err(|error| io::Error::other(format!("show order: {error}")))?;
            print_json(&response)
        }
        Command::List {
            user_id,
            code,
            status,
            order_by,
            desc,
            page,
            limit,
        } => {
            let query = OrderQueryService::new(repo).with_timeout(timeout);
            let response = query
                .list_orders_for_user(ListOrdersRequest {
                    user_id: UserId::from_uuid(user_id),
                    code,
                    status,
                    order_by,
                    order_desc: desc,
                    page,
                    limit,
                })
                .await
                .map_err(|error| io::Error::other(format!("list orders: {error}")))?;
            print_json(&response)
        }
        Command::Assign { order_id } => {
            let command = OrderCommandService::new(repo).with_timeout(timeout);
            let response = command
                .assign_order(AssignOrderRequest { order_id })
                .await
                .map_err(|error| io::Error::other(format!("assign order: {error}")))?;
            print_json(&response)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|error| io::Error::other(format!("render JSON: {error}")))?;
    println!("{rendered}");
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

fn resolve_database_url(
    explicit: Option<String>,
    configured: Option<String>,
) -> io::Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--database-url must not be empty when provided",
            ));
        }
        return Ok(value);
    }

    non_blank(configured)
        .or_else(|| non_blank(env::var("DATABASE_URL").ok()))
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "database URL missing: set --database-url, ORDERS_DATABASE_URL or DATABASE_URL",
            )
        })
}
