use {
    crate::{DumpError, History, HistoryRecord},
    std::{
        fs::File,
        io::{BufWriter, Write},
        path::Path,
    },
    tracing::{debug, info},
};

/// Default destination for a dumped history.
pub const DEFAULT_HISTORY_PATH: &str = "execution_history.log";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum HistoryFormat {
    /// One line per record in the `inv`/`res` grammar understood by the checker.
    #[default]
    Text,

    /// One JSON object per record.
    #[cfg(feature = "serde")]
    JsonLines,
}

/// Renders a [`History`] in append order.
///
/// Output is a pure function of the history, so dumping the same history twice produces
/// byte-identical files.
#[derive(Clone, Copy, Debug, Default)]
pub struct HistorySerializer {
    format: HistoryFormat,
}

impl HistorySerializer {
    pub fn new(format: HistoryFormat) -> Self {
        HistorySerializer { format }
    }

    pub fn format(&self) -> HistoryFormat {
        self.format
    }

    /// Creates (or truncates) `path` and writes the history to it line by line. The file is
    /// not replaced atomically, so a failure can leave a truncated file behind.
    pub fn dump(&self, history: &History, path: impl AsRef<Path>) -> Result<(), DumpError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| DumpError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        let mut out = BufWriter::new(file);
        self.write(history, &mut out)?;
        out.into_inner()
            .map_err(|e| e.into_error())?
            .sync_all()?;
        info!(path = %path.display(), records = history.len(), "Dumped history.");
        Ok(())
    }

    pub fn write(&self, history: &History, mut out: impl Write) -> Result<(), DumpError> {
        let mut line = String::new();
        for record in history {
            line.clear();
            self.push_line(record, &mut line)?;
            out.write_all(line.as_bytes())?;
        }
        out.flush()?;
        debug!(format = ?self.format, records = history.len(), "Wrote history.");
        Ok(())
    }

    /// Renders the history into a string.
    pub fn render(&self, history: &History) -> Result<String, DumpError> {
        let mut text = String::new();
        for record in history {
            self.push_line(record, &mut text)?;
        }
        Ok(text)
    }

    fn push_line(&self, record: &HistoryRecord, out: &mut String) -> Result<(), DumpError> {
        match self.format {
            HistoryFormat::Text => out.push_str(&record.to_string()),
            #[cfg(feature = "serde")]
            HistoryFormat::JsonLines => out.push_str(&serde_json::to_string(record)?),
        }
        out.push('\n');
        Ok(())
    }
}
