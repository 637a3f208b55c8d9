use std::{
    fs::{self, File},
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use gtrcoach_engine::Board;
use gtrcoach_evaluator::config::ScoringConfig;

/// Destination of a command's JSON output.
#[derive(Debug)]
pub enum Output {
    Stdout(StdoutLock<'static>),
    File(BufWriter<File>),
}

impl Output {
    /// Writes `value` to the file at `path`, or to stdout when no path is given.
    pub fn save_json<T>(value: &T, path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = match path {
            Some(path) => {
                let file = File::create(&path).with_context(|| {
                    format!("Failed to create output file: {}", path.display())
                })?;
                Output::File(BufWriter::new(file))
            }
            None => Output::stdout(),
        };
        output.write_json(value)
    }

    pub fn stdout() -> Self {
        Output::Stdout(io::stdout().lock())
    }

    /// Pretty-prints `value` followed by a newline.
    pub fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, value).context("Failed to write JSON output")?;
        writeln!(self)?;
        self.flush()?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout(writer) => writer.write(buf),
            Output::File(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout(writer) => writer.flush(),
            Output::File(writer) => writer.flush(),
        }
    }
}

/// Deserializes a JSON file, naming `file_kind` in error messages.
pub fn read_json_file<T>(file_kind: &str, path: &Path) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    serde_json::from_reader(io::BufReader::new(file))
        .with_context(|| format!("Failed to parse {file_kind} file: {}", path.display()))
}

/// Reads a board from a `.json` file (array of row strings) or a text file (one row per
/// line, top row first).
pub fn read_board_file(path: &Path) -> anyhow::Result<Board> {
    if path.extension().is_some_and(|ext| ext == "json") {
        return read_json_file("board", path);
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read board file: {}", path.display()))?;
    let board = text
        .trim()
        .parse()
        .with_context(|| format!("Failed to parse board file: {}", path.display()))?;
    Ok(board)
}

/// Reads a scoring configuration, or the defaults when no path is given.
pub fn read_scoring_config(path: Option<&Path>) -> anyhow::Result<ScoringConfig> {
    match path {
        Some(path) => read_json_file("scoring config", path),
        None => Ok(ScoringConfig::default()),
    }
}
