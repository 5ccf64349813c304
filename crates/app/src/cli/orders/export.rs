use std::io::{self, Write};

use clap::{Args, ValueEnum};
use ordering_app::{
    config::AppConfig,
    domain::{
        identity::UserId,
        orders::{OrdersService, data::ExportFilter, status::OrderStatus},
    },
    export::{write_csv, write_json},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ExportFormat {
    Json,
    Csv,
}

#[derive(Debug, Args)]
pub(crate) struct ExportArgs {
    /// Only orders placed by this user
    #[arg(long)]
    user_id: Option<i64>,

    /// Only orders in this status
    #[arg(long)]
    status: Option<String>,

    /// Minimum order total, inclusive
    #[arg(long)]
    min_amount: Option<u64>,

    /// Maximum order total, inclusive
    #[arg(long)]
    max_amount: Option<u64>,

    /// Page size; 0 or unset selects the default of 20
    #[arg(long)]
    limit: Option<u32>,

    /// Number of orders to skip
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    offset: i64,

    /// Output format
    #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
    format: ExportFormat,
}

pub(crate) async fn run(args: ExportArgs, config: &AppConfig) -> Result<(), String> {
    let filter = export_filter(&args)?;

    let context = super::connect(config).await?;

    export_to(
        context.orders.as_ref(),
        filter,
        args.format,
        io::stdout().lock(),
    )
    .await
}

async fn export_to<W: Write>(
    orders: &dyn OrdersService,
    filter: ExportFilter,
    format: ExportFormat,
    out: W,
) -> Result<(), String> {
    let orders = orders
        .export_orders(filter)
        .await
        .map_err(|error| format!("failed to export orders: {error}"))?;

    match format {
        ExportFormat::Json => write_json(&orders, out),
        ExportFormat::Csv => write_csv(&orders, out),
    }
    .map_err(|error| error.to_string())
}

fn export_filter(args: &ExportArgs) -> Result<ExportFilter, String> {
    if let (Some(min), Some(max)) = (args.min_amount, args.max_amount)
        && min > max
    {
        return Err("min-amount must be <= max-amount".to_string());
    }

    let status = args
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()
        .map_err(|error| format!("invalid status: {error}"))?;

    Ok(ExportFilter {
        user_id: args.user_id.map(UserId::from_i64),
        status,
        min_amount: args.min_amount,
        max_amount: args.max_amount,
        limit: args.limit,
        offset: args.offset,
    })
}
