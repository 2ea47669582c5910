use log::debug;
use protorm::core::{
    db::{Association, Database, Model, Predicate},
    error::OrmError,
};
use std::{
    any::Any,
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

///
/// Call
/// one storage call, as seen by the backend
///

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Associate {
        table: &'static str,
        field: &'static str,
        op: &'static str,
        children: usize,
    },
    Create(&'static str),
    Delete(&'static str, Predicate),
    FindFirst(&'static str, Predicate),
    Lock(&'static str, Predicate),
    Save(&'static str),
}

///
/// Store
///

#[derive(Default)]
struct Store {
    tables: BTreeMap<&'static str, Vec<Box<dyn Any + Send + Sync>>>,
    calls: Vec<Call>,
}

///
/// MemoryDb
///
/// Shared in-memory tables behind a cloneable handle. Rows are evaluated
/// through `Model::column`, so only readable columns can be filtered on.
///

#[derive(Clone, Default)]
pub struct MemoryDb {
    store: Arc<Mutex<Store>>,
    scopes: Vec<Predicate>,
}

impl MemoryDb {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> Result<MutexGuard<'_, Store>, OrmError> {
        self.store.lock().map_err(OrmError::storage)
    }

    /// Every row of `M`'s table.
    pub fn rows<M: Model>(&self) -> Result<Vec<M>, OrmError> {
        let store = self.store()?;

        Ok(store
            .tables
            .get(M::TABLE_NAME)
            .into_iter()
            .flatten()
            .filter_map(|row| row.downcast_ref::<M>().cloned())
            .collect())
    }

    /// Storage calls issued so far, oldest first.
    pub fn calls(&self) -> Result<Vec<Call>, OrmError> {
        Ok(self.store()?.calls.clone())
    }

    /// Scopes of this handle followed by `predicate`.
    fn filter(&self, predicate: Predicate) -> Predicate {
        self.scopes
            .iter()
            .cloned()
            .fold(predicate, |filter, scope| scope.and(filter))
    }
}

// matching
// rows of table `M` matching `filter`
fn matching<'a, M: Model>(
    store: &'a Store,
    filter: &'a Predicate,
) -> impl Iterator<Item = &'a M> + 'a {
    store
        .tables
        .get(M::TABLE_NAME)
        .into_iter()
        .flatten()
        .filter_map(|row| row.downcast_ref::<M>())
        .filter(move |row| filter.matches(*row))
}

impl Database for MemoryDb {
    fn scope(mut self, predicate: Predicate) -> Self {
        self.scopes.push(predicate);
        self
    }

    fn create<M: Model>(&mut self, row: &mut M) -> Result<(), OrmError> {
        let mut store = self.store()?;
        store.calls.push(Call::Create(M::TABLE_NAME));

        if let Some(key) = row.primary_key().filter(|key| !key.is_zero()) {
            let exists = store
                .tables
                .get(M::TABLE_NAME)
                .into_iter()
                .flatten()
                .filter_map(|r| r.downcast_ref::<M>())
                .any(|r| r.primary_key().as_ref() == Some(&key));

            if exists {
                return Err(OrmError::storage(format!(
                    "duplicate key {key:?} in {}",
                    M::TABLE_NAME
                )));
            }
        }

        store
            .tables
            .entry(M::TABLE_NAME)
            .or_default()
            .push(Box::new(row.clone()));

        Ok(())
    }

    fn find_first<M: Model>(&mut self, predicate: Predicate) -> Result<Option<M>, OrmError> {
        let filter = self.filter(predicate);
        let mut store = self.store()?;
        store.calls.push(Call::FindFirst(M::TABLE_NAME, filter.clone()));

        Ok(matching::<M>(&store, &filter).next().cloned())
    }

    fn lock_for_update<M: Model>(&mut self, predicate: Predicate) -> Result<u64, OrmError> {
        let filter = self.filter(predicate);
        let mut store = self.store()?;
        store.calls.push(Call::Lock(M::TABLE_NAME, filter.clone()));

        Ok(matching::<M>(&store, &filter).count() as u64)
    }

    fn delete<M: Model>(&mut self, predicate: Predicate) -> Result<u64, OrmError> {
        let filter = self.filter(predicate);
        let mut store = self.store()?;
        store.calls.push(Call::Delete(M::TABLE_NAME, filter.clone()));

        let Some(rows) = store.tables.get_mut(M::TABLE_NAME) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|row| !row.downcast_ref::<M>().is_some_and(|row| filter.matches(row)));
        let deleted = (before - rows.len()) as u64;

        debug!("{}: deleted {deleted} rows", M::TABLE_NAME);

        Ok(deleted)
    }

    fn save<M: Model>(&mut self, row: &mut M) -> Result<(), OrmError> {
        let mut store = self.store()?;
        store.calls.push(Call::Save(M::TABLE_NAME));

        let key = row.primary_key();
        let rows = store.tables.entry(M::TABLE_NAME).or_default();
        let existing = rows.iter_mut().find(|r| {
            r.downcast_ref::<M>()
                .is_some_and(|r| key.is_some() && r.primary_key() == key)
        });

        match existing {
            Some(slot) => *slot = Box::new(row.clone()),
            None => rows.push(Box::new(row.clone())),
        }

        Ok(())
    }

    fn associate<M: Model, C: Model>(
        &mut self,
        _owner: &M,
        field: &'static str,
        association: Association<'_, C>,
    ) -> Result<(), OrmError> {
        let (op, children) = match association {
            Association::Clear => ("clear", 0),
            Association::Append(children) => ("append", children.len()),
            Association::Replace(children) => ("replace", children.len()),
        };

        self.store()?.calls.push(Call::Associate {
            table: M::TABLE_NAME,
            field,
            op,
            children,
        });

        Ok(())
    }
}

///
/// TESTS
///
