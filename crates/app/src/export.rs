//! Order export formats.

use std::io::Write;

use jiff::Timestamp;
use serde::Serialize;
use thiserror::Error;

use crate::domain::orders::records::OrderRecord;

const CSV_HEADER: [&str; 10] = [
    "ID",
    "UserID",
    "Status",
    "DeliveryDate",
    "PickupPoint",
    "OrderDate",
    "TotalAmount",
    "ReceiptURL",
    "CreatedAt",
    "UpdatedAt",
];

const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to flush export: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
struct OrdersDocument<'a> {
    orders: &'a [OrderRecord],
}

/// Write `{"orders": [...]}`.
///
/// # Errors
///
/// Returns an error when serialization or the underlying writer fails.
pub fn write_json<W: Write>(orders: &[OrderRecord], writer: W) -> Result<(), ExportError> {
    serde_json::to_writer(writer, &OrdersDocument { orders })?;

    Ok(())
}

/// Write one CSV row per order under a fixed header. Timestamps are UTC; missing values
/// are empty cells.
///
/// # Errors
///
/// Returns an error when a row cannot be written or the writer cannot be flushed.
pub fn write_csv<W: Write>(orders: &[OrderRecord], writer: W) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record(CSV_HEADER)?;

    for order in orders {
        csv.write_record([
            order.id.to_string(),
            order.user_id.to_string(),
            order.status.to_string(),
            order.delivery_date.map(csv_timestamp).unwrap_or_default(),
            order.pickup_point.clone(),
            csv_timestamp(order.order_date),
            order.total_amount.to_string(),
            order.receipt_url.clone().unwrap_or_default(),
            csv_timestamp(order.created_at),
            csv_timestamp(order.updated_at),
        ])?;
    }

    csv.flush()?;

    Ok(())
}

fn csv_timestamp(timestamp: Timestamp) -> String {
    timestamp.strftime(CSV_TIMESTAMP_FORMAT).to_string()
}
