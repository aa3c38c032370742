use super::{Config, Error};
use crate::{index::Index, journal::Journal, Identifier, Record};
use prometheus_client::{
    metrics::{counter::Counter, gauge::Gauge},
    registry::Registry,
};
use tracing::debug;

/// A record store that answers identifier lookups from an in-memory [Index] and keeps every record
/// in a [Journal].
///
/// Each mutation updates the index first, then reloads the journal, applies the same change to the
/// loaded records, and rewrites the journal in full.
pub struct Store<K: Identifier> {
    cfg: Config,
    journal: Journal,
    index: Index<K, Record>,

    keys: Gauge,
    loads: Counter,
    rewrites: Counter,
}

impl<K: Identifier> Store<K> {
    /// Open the store at `cfg.path` and build the index from the records already persisted there.
    ///
    /// Persisted records without a usable identifier are left in the journal but not indexed.
    pub fn init(registry: &mut Registry, cfg: Config) -> Result<Self, Error<K>> {
        let journal = Journal::new(cfg.path.clone());
        let mut store = Self {
            cfg,
            journal,
            index: Index::new(),

            keys: Gauge::default(),
            loads: Counter::default(),
            rewrites: Counter::default(),
        };
        registry.register(
            "keys",
            "Number of identifiers in the index",
            store.keys.clone(),
        );
        registry.register(
            "loads",
            "Number of full reads of the journal",
            store.loads.clone(),
        );
        registry.register(
            "rewrites",
            "Number of full rewrites of the journal",
            store.rewrites.clone(),
        );

        // Build the index from the journal
        for record in store.load()? {
            match K::extract(&record, &store.cfg.id_field) {
                Some(id) => {
                    store.index.insert(id, record);
                }
                None => {
                    debug!(field = %store.cfg.id_field, "skipping record without identifier")
                }
            }
        }
        store.keys.set(store.index.len() as i64);
        debug!(
            path = %store.journal.path().display(),
            keys = store.index.len(),
            "initialized store"
        );
        Ok(store)
    }

    /// Configuration the store was opened with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Number of identifiers in the index.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the index holds no identifiers.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Read-only view of the identifier index.
    pub fn index(&self) -> &Index<K, Record> {
        &self.index
    }

    /// Insert `record`, overwriting any record with the same identifier.
    pub fn insert(&mut self, record: Record) -> Result<(), Error<K>> {
        let id = K::extract(&record, &self.cfg.id_field)
            .ok_or_else(|| Error::MissingIdentifier(self.cfg.id_field.clone()))?;
        let replaced = self.index.insert(id.clone(), record.clone()).is_some();
        self.keys.set(self.index.len() as i64);

        // Replace the persisted copy (or append a new one)
        let mut records = self.load()?;
        match self.position(&records, &id) {
            Some(i) => records[i] = record,
            None => records.push(record),
        }
        self.rewrite(&records)?;
        debug!(?id, replaced, "inserted record");
        Ok(())
    }

    /// Get the record stored under `id`. Served from the index only.
    pub fn get(&self, id: &K) -> Option<&Record> {
        self.index.get(id)
    }

    /// Replace the record stored under `id` with `record`.
    ///
    /// The identifier field of `record` is overwritten with `id`, whatever the caller supplied.
    pub fn update(&mut self, id: K, mut record: Record) -> Result<(), Error<K>> {
        if !self.index.contains_key(&id) {
            return Err(Error::NotFound(id));
        }
        record.insert(self.cfg.id_field.clone(), id.to_value());
        self.index.insert(id.clone(), record.clone());

        let mut records = self.load()?;
        match self.position(&records, &id) {
            Some(i) => records[i] = record,
            None => {
                debug!(?id, "record missing from journal: appending");
                records.push(record);
            }
        }
        self.rewrite(&records)?;
        debug!(?id, "updated record");
        Ok(())
    }

    /// Delete the record stored under `id`. Deleting an absent identifier is not an error.
    pub fn delete(&mut self, id: &K) -> Result<(), Error<K>> {
        let removed = self.index.remove(id).is_some();
        self.keys.set(self.index.len() as i64);

        let field = &self.cfg.id_field;
        let mut records = self.load()?;
        records.retain(|record| K::extract(record, field).as_ref() != Some(id));
        self.rewrite(&records)?;
        debug!(?id, removed, "deleted record");
        Ok(())
    }

    /// Return every persisted record for which `predicate` holds.
    ///
    /// This scans the journal and never consults the index. Records for which `predicate` returns
    /// an error are excluded.
    pub fn find<F, E>(&self, predicate: F) -> Result<Vec<Record>, Error<K>>
    where
        F: FnMut(&Record) -> Result<bool, E>,
        E: std::fmt::Display,
    {
        self.loads.inc();
        Ok(self.journal.filter(predicate)?)
    }

    /// Return every persisted record, in journal order.
    pub fn all(&self) -> Result<Vec<Record>, Error<K>> {
        self.load()
    }

    fn load(&self) -> Result<Vec<Record>, Error<K>> {
        self.loads.inc();
        Ok(self.journal.load_all()?)
    }

    fn rewrite(&self, records: &[Record]) -> Result<(), Error<K>> {
        self.rewrites.inc();
        Ok(self.journal.save_all(records)?)
    }

    /// Position of the first persisted record carrying `id`.
    fn position(&self, records: &[Record], id: &K) -> Option<usize> {
        records
            .iter()
            .position(|record| K::extract(record, &self.cfg.id_field).as_ref() == Some(id))
    }
}
