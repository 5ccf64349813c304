use std::io::{self, Write};

use clap::Args;
use jiff::{Timestamp, civil::Date, tz::TimeZone};
use ordering_app::{
    config::AppConfig,
    domain::orders::{OrdersService, data::StatsRange},
};

#[derive(Debug, Args)]
pub(crate) struct StatsArgs {
    /// Start of the range (YYYY-MM-DD, midnight UTC); defaults to the start of this month
    #[arg(long)]
    from: Option<String>,

    /// End of the range (YYYY-MM-DD, midnight UTC); defaults to now
    #[arg(long)]
    to: Option<String>,
}

pub(crate) async fn run(args: StatsArgs, config: &AppConfig) -> Result<(), String> {
    let range = StatsRange {
        from: parse_day("from", args.from.as_deref())?,
        to: parse_day("to", args.to.as_deref())?,
    };

    let context = super::connect(config).await?;

    report_stats(context.orders.as_ref(), range, io::stdout().lock()).await
}

async fn report_stats<W: Write>(
    orders: &dyn OrdersService,
    range: StatsRange,
    mut out: W,
) -> Result<(), String> {
    let stats = orders
        .get_stats(range)
        .await
        .map_err(|error| format!("failed to get order stats: {error}"))?;

    let written = if stats.is_empty() {
        writeln!(out, "no orders in range")
    } else {
        stats
            .iter()
            .try_for_each(|count| writeln!(out, "{}: {}", count.status, count.count))
    };

    written.map_err(|error| format!("failed to write stats: {error}"))
}

fn parse_day(name: &str, raw: Option<&str>) -> Result<Option<Timestamp>, String> {
    raw.map(|value| {
        value
            .parse::<Date>()
            .and_then(|date| date.to_zoned(TimeZone::UTC))
            .map(|zoned| zoned.timestamp())
            .map_err(|error| format!("invalid {name} date, use YYYY-MM-DD: {error}"))
    })
    .transpose()
}
