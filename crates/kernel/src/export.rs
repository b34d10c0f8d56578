//! CSV export of customer records.
//!
//! Rows follow RFC 4180: fields holding a comma, double quote, CR or LF
//! are quoted with embedded quotes doubled, and every line ends in CRLF.
//! Columns are [`CustomerField::ALL`] in order; absent values are empty.

use std::pin::Pin;

use anyhow::Context;
use futures_core::Stream;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_stream::StreamExt;

use crate::error::AppResult;
use crate::models::Customer;
use crate::query::CustomerField;
use crate::store::CustomerStream;

/// File name used when the export target is a directory.
pub const FILE_NAME: &str = "clientes.csv";

const LINE_END: &str = "\r\n";

/// Stream of encoded CSV lines, header first.
pub type CsvStream = Pin<Box<dyn Stream<Item = AppResult<String>> + Send>>;

/// The header line, terminated.
pub fn header_line() -> String {
    let mut line = CustomerField::ALL
        .iter()
        .map(|field| field.name())
        .collect::<Vec<_>>()
        .join(",");
    line.push_str(LINE_END);
    line
}

/// One record as a terminated CSV line.
pub fn customer_line(customer: &Customer) -> String {
    let mut line = String::new();
    for (i, field) in CustomerField::ALL.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        if let Some(text) = field.text(customer) {
            push_cell(&mut line, &text);
        }
    }
    line.push_str(LINE_END);
    line
}

fn push_cell(out: &mut String, value: &str) {
    if value.contains([',', '"', '\r', '\n']) {
        out.push('"');
        out.push_str(&value.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(value);
    }
}

/// Encode a record stream lazily; the first error ends the stream.
pub fn csv_lines(mut rows: CustomerStream) -> CsvStream {
    Box::pin(async_stream::stream! {
        yield Ok(header_line());
        while let Some(row) = rows.next().await {
            match row {
                Ok(customer) => {
                    yield Ok(customer_line(&customer));
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }
    })
}

/// Write the full export to `out`, returning the number of records.
pub async fn write_csv<W>(rows: CustomerStream, out: &mut W) -> AppResult<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut lines = csv_lines(rows);
    let mut lines_written = 0u64;

    while let Some(line) = lines.next().await {
        let line = line?;
        out.write_all(line.as_bytes())
            .await
            .context("failed to write export")?;
        lines_written += 1;
    }
    out.flush().await.context("failed to flush export")?;

    // Header excluded.
    Ok(lines_written.saturating_sub(1))
}
