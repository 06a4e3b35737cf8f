use std::io::{BufWriter, Write};

use crate::error::{AppError, AppResult};

pub struct NdjsonWriter<W: Write> {
    out: BufWriter<W>,
}

impl NdjsonWriter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> NdjsonWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: BufWriter::new(out),
        }
    }

    pub fn write_json_line<T: serde::Serialize>(&mut self, v: &T) -> AppResult<()> {
        serde_json::to_writer(&mut self.out, v)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    pub fn error_line(&mut self, e: &AppError) -> AppResult<()> {
        #[derive(serde::Serialize)]
        struct ErrLine<'a> {
            status: &'static str,
            error: String,
            code: &'a str,
        }
        self.write_json_line(&ErrLine {
            status: "error",
            error: e.to_string(),
            code: e.code(),
        })
    }

    pub fn flush(&mut self) -> AppResult<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> AppResult<W> {
        self.out
            .into_inner()
            .map_err(|e| AppError::Io(e.into_error()))
    }
}
