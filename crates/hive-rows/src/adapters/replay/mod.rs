//! Replays a recorded server conversation through a cursor and prints the
//! result set as NDJSON: a `columns` line, one array per row, then a summary.

mod io;

use std::{io::Write, path::Path, sync::Arc};

use crate::{
    client::{Fixture, ScriptedClient},
    core::{blocking::BlockingCursor, cursor::ResultCursor, options::CursorOptions},
    error::AppResult,
};

pub use io::NdjsonWriter;

pub fn run(fixture_path: &Path, options: CursorOptions) -> AppResult<()> {
    let fixture = Fixture::load(fixture_path)?;
    let mut out = NdjsonWriter::stdout();
    let res = replay(fixture, options, &mut out);
    if let Err(e) = &res {
        out.error_line(e)?;
    }
    out.flush()?;
    res.map(|_| ())
}

/// Drives a cursor over `fixture`, returning the number of rows written.
pub fn replay<W: Write>(
    fixture: Fixture,
    options: CursorOptions,
    out: &mut NdjsonWriter<W>,
) -> AppResult<usize> {
    let operation = fixture.operation.clone();
    let client = Arc::new(ScriptedClient::new(fixture));
    let mut cursor = BlockingCursor::new(ResultCursor::with_options(client, operation, options))?;

    let res = stream_rows(&mut cursor, out);
    cursor.close()?;
    res
}

fn stream_rows<W: Write>(cursor: &mut BlockingCursor, out: &mut NdjsonWriter<W>) -> AppResult<usize> {
    let status = cursor.wait()?;
    tracing::info!(operation = %cursor.cursor().operation().guid, state = %status, "replaying result set");
    out.write_json_line(&serde_json::json!({ "columns": cursor.columns() }))?;

    let mut rows = 0;
    for row in cursor.by_ref() {
        let row = row?;
        let values: Vec<serde_json::Value> = row.iter().map(|v| v.to_json()).collect();
        out.write_json_line(&values)?;
        rows += 1;
    }

    out.write_json_line(&serde_json::json!({ "rows": rows, "status": status.to_string() }))?;
    Ok(rows)
}
