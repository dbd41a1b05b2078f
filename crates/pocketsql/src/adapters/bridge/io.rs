use std::io::{BufRead, BufReader, BufWriter, Stdin, Stdout, Write};

use crate::error::{AppError, AppResult};

/// Newline-delimited JSON over any reader/writer pair.
pub struct NdjsonIo<R, W> {
    input: R,
    output: W,
}

impl NdjsonIo<BufReader<Stdin>, BufWriter<Stdout>> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(std::io::stdin()), BufWriter::new(std::io::stdout()))
    }
}

impl<R: BufRead, W: Write> NdjsonIo<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Next line without its terminator; `None` at end of input. Blank lines
    /// come back as an empty string.
    pub fn read_line(&mut self) -> AppResult<Option<String>> {
        let mut line = String::new();
        let n = self.input.read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        if line.trim().is_empty() {
            return Ok(Some(String::new()));
        }
        Ok(Some(line.to_string()))
    }

    pub fn write_json_line<T: serde::Serialize>(&mut self, v: &T) -> AppResult<()> {
        serde_json::to_writer(&mut self.output, v)?;
        self.output.write_all(b"\n")?;
        self.output.flush()?;
        Ok(())
    }

    pub fn protocol_error(&mut self, id: String, v: u32, msg: String) -> AppResult<()> {
        #[derive(serde::Serialize)]
        struct ErrResp<'a> {
            v: u32,
            id: &'a str,
            status: &'static str,
            error: String,
            code: &'static str,
        }
        let r = ErrResp {
            v,
            id: &id,
            status: "error",
            error: msg,
            code: AppError::InvalidRequest(String::new()).code(),
        };
        self.write_json_line(&r)
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}
