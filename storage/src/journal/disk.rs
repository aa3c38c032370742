use super::Error;
use crate::{Identifier, Record};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// A flat file holding one JSON object per line.
///
/// The whole file is read on every [Journal::load_all] and rewritten on every [Journal::save_all].
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    /// Create a [Journal] backed by the file at `path`. The file is not touched until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record in the file, in file order.
    ///
    /// Blank lines are ignored and lines that do not decode to a JSON object are skipped. A
    /// missing file is treated as empty.
    pub fn load_all(&self) -> Result<Vec<Record>, Error> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "journal missing: starting empty");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        let mut records = Vec::new();
        for (number, line) in BufReader::new(file).split(b'\n').enumerate() {
            let line = line?;
            let line = line.trim_ascii();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_slice::<Record>(line) {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!(line = number + 1, ?err, "skipping corrupt journal line");
                }
            }
        }
        Ok(records)
    }

    /// Truncate the file and write `records` to it, one per line, in iteration order.
    pub fn save_all<'a>(&self, records: impl IntoIterator<Item = &'a Record>) -> Result<(), Error> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        let mut count = 0usize;
        for record in records {
            serde_json::to_writer(&mut writer, record).map_err(Error::Encode)?;
            writer.write_all(b"\n")?;
            count += 1;
        }
        let file = writer.into_inner().map_err(|err| err.into_error())?;
        file.sync_all()?;
        debug!(path = %self.path.display(), count, "rewrote journal");
        Ok(())
    }

    /// Find the first record whose `field` holds `id`, scanning the file linearly.
    pub fn find_by_id<K: Identifier>(&self, field: &str, id: &K) -> Result<Option<Record>, Error> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|record| K::extract(record, field).as_ref() == Some(id)))
    }

    /// Return every record for which `predicate` holds, scanning the file linearly.
    ///
    /// Records for which `predicate` fails are excluded and the scan continues.
    pub fn filter<F, E>(&self, mut predicate: F) -> Result<Vec<Record>, Error>
    where
        F: FnMut(&Record) -> Result<bool, E>,
        E: std::fmt::Display,
    {
        let mut matched = Vec::new();
        for record in self.load_all()? {
            match predicate(&record) {
                Ok(true) => matched.push(record),
                Ok(false) => {}
                Err(err) => debug!(%err, "predicate failed: excluding record"),
            }
        }
        Ok(matched)
    }
}
