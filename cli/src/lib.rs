//! Interactive menu for an avldb record store.
//!
//! [Shell] reads one command per line from any [BufRead] and writes prompts and results to any
//! [Write], so the same loop drives a terminal session and in-memory tests.

use avldb_storage::{
    store::{Error, Store},
    Identifier, Record,
};
use serde_json::Value;
use std::{
    convert::Infallible,
    io::{self, BufRead, Write},
    str::FromStr,
};
use tracing::debug;

const MENU: &str = "\
=== avldb: JSON records indexed by an AVL tree ===
1. Insert record
2. Get by id
3. Update record
4. Delete record
5. List all
6. Query (field == value)
0. Exit";

/// Interpret text typed at the prompt as a JSON scalar.
///
/// All-digit input becomes an integer, other numeric input a float, and anything else a string.
pub fn parse_scalar(raw: &str) -> Value {
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = raw.parse::<u64>() {
            return Value::from(n);
        }
    }
    if let Some(n) = raw
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
    {
        return Value::Number(n);
    }
    Value::String(raw.to_string())
}

/// Compare a stored field against a queried value.
///
/// Integers compare exactly. When either side is a float, numbers compare by `f64` value.
fn field_equals(stored: &Value, wanted: &Value) -> bool {
    match (stored, wanted) {
        (Value::Number(a), Value::Number(b)) if a.is_f64() || b.is_f64() => {
            match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        }
        _ => stored == wanted,
    }
}

/// A line-oriented menu over a [Store].
pub struct Shell<K: Identifier, R, W> {
    store: Store<K>,
    input: R,
    output: W,
}

impl<K, R, W> Shell<K, R, W>
where
    K: Identifier + FromStr,
    R: BufRead,
    W: Write,
{
    /// Create a [Shell] serving `store`, reading commands from `input` and writing to `output`.
    pub fn new(store: Store<K>, input: R, output: W) -> Self {
        Self {
            store,
            input,
            output,
        }
    }

    /// Consume the shell, returning the store and the output sink.
    pub fn into_parts(self) -> (Store<K>, W) {
        (self.store, self.output)
    }

    /// Serve commands until the user exits or the input ends.
    pub fn run(&mut self) -> io::Result<()> {
        while self.step()? {}
        Ok(())
    }

    /// Serve a single command. Returns `false` once the session is over.
    fn step(&mut self) -> io::Result<bool> {
        writeln!(self.output, "\n{MENU}")?;
        let Some(option) = self.prompt("Select an option: ")? else {
            return Ok(false);
        };
        match option.as_str() {
            "1" => self.insert()?,
            "2" => self.get()?,
            "3" => self.update()?,
            "4" => self.delete()?,
            "5" => self.list()?,
            "6" => self.query()?,
            "0" => {
                writeln!(self.output, "Exiting...")?;
                return Ok(false);
            }
            _ => writeln!(self.output, "Invalid option. Try again.")?,
        }
        Ok(true)
    }

    /// Print `message` and read one trimmed line. Returns `None` at end of input.
    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.output, "{message}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn read_record(&mut self) -> io::Result<Option<Record>> {
        writeln!(self.output, "Enter a JSON object (single line):")?;
        let Some(line) = self.prompt("> ")? else {
            return Ok(None);
        };
        match serde_json::from_str::<Value>(&line) {
            Ok(Value::Object(record)) => Ok(Some(record)),
            Ok(_) | Err(_) => {
                writeln!(self.output, "Invalid JSON object. Try again.")?;
                Ok(None)
            }
        }
    }

    fn read_id(&mut self, message: &str) -> io::Result<Option<K>> {
        let Some(raw) = self.prompt(message)? else {
            return Ok(None);
        };
        match K::from_str(&raw) {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                writeln!(self.output, "Invalid id: {raw}")?;
                Ok(None)
            }
        }
    }

    fn insert(&mut self) -> io::Result<()> {
        let Some(record) = self.read_record()? else {
            return Ok(());
        };
        match self.store.insert(record) {
            Ok(()) => writeln!(self.output, "Record inserted/updated."),
            Err(err) => writeln!(self.output, "Failed to insert: {err}"),
        }
    }

    fn get(&mut self) -> io::Result<()> {
        let Some(id) = self.read_id("Id to look up: ")? else {
            return Ok(());
        };
        match self.store.get(&id) {
            Some(record) => {
                let pretty = serde_json::to_string_pretty(record).map_err(io::Error::from)?;
                writeln!(self.output, "Record found:\n{pretty}")
            }
            None => writeln!(self.output, "No record found with that id."),
        }
    }

    fn update(&mut self) -> io::Result<()> {
        let Some(id) = self.read_id("Id of the record to update: ")? else {
            return Ok(());
        };
        writeln!(self.output, "New record (its id is ignored and kept).")?;
        let Some(record) = self.read_record()? else {
            return Ok(());
        };
        match self.store.update(id, record) {
            Ok(()) => writeln!(self.output, "Record updated."),
            Err(err @ Error::NotFound(_)) => writeln!(self.output, "{err}"),
            Err(err) => writeln!(self.output, "Failed to update: {err}"),
        }
    }

    fn delete(&mut self) -> io::Result<()> {
        let Some(id) = self.read_id("Id of the record to delete: ")? else {
            return Ok(());
        };
        match self.store.delete(&id) {
            Ok(()) => writeln!(self.output, "Record deleted (if it existed)."),
            Err(err) => writeln!(self.output, "Failed to delete: {err}"),
        }
    }

    fn list(&mut self) -> io::Result<()> {
        let records = match self.store.all() {
            Ok(records) => records,
            Err(err) => return writeln!(self.output, "Failed to read records: {err}"),
        };
        if records.is_empty() {
            return writeln!(self.output, "No records.");
        }
        writeln!(self.output, "Records:")?;
        self.print_lines(&records)
    }

    fn query(&mut self) -> io::Result<()> {
        let Some(field) = self.prompt("Field name: ")? else {
            return Ok(());
        };
        let Some(raw) = self.prompt("Value to match: ")? else {
            return Ok(());
        };
        let wanted = parse_scalar(&raw);
        debug!(%field, %wanted, "querying records");
        let found = self.store.find(|record| {
            Ok::<_, Infallible>(
                record
                    .get(&field)
                    .is_some_and(|stored| field_equals(stored, &wanted)),
            )
        });
        let records = match found {
            Ok(records) => records,
            Err(err) => return writeln!(self.output, "Failed to query records: {err}"),
        };
        if records.is_empty() {
            return writeln!(self.output, "No records match.");
        }
        writeln!(self.output, "Matching records:")?;
        self.print_lines(&records)
    }

    fn print_lines(&mut self, records: &[Record]) -> io::Result<()> {
        for record in records {
            let line = serde_json::to_string(record).map_err(io::Error::from)?;
            writeln!(self.output, "{line}")?;
        }
        Ok(())
    }
}
