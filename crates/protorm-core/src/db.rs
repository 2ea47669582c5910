//! Storage contract the generated CRUD operations are written against.
//!
//! protorm does not execute queries. A backend implements [`Database`] over
//! its own connection or transaction handle; generated code only ever issues
//! the calls below.

use crate::{error::OrmError, value::Value};

///
/// Model
///
/// Implemented by every generated storage struct.
///

pub trait Model: Clone + Send + Sync + 'static {
    /// Table the rows of this model live in.
    const TABLE_NAME: &'static str;

    /// Column holding the primary key, if the model has one.
    const PRIMARY_KEY: Option<&'static str>;

    /// Current primary key value.
    fn primary_key(&self) -> Option<Value>;

    /// Read a scalar column by its column name.
    /// Association and array columns return `None`.
    fn column(&self, column: &str) -> Option<Value>;
}

///
/// Association
///
/// Child-set update issued against one association field of a row.
///

#[derive(Debug)]
pub enum Association<'a, C> {
    /// Detach every child.
    Clear,

    /// Add children, keeping the existing ones.
    Append(&'a [C]),

    /// Overwrite the full child set.
    Replace(&'a [C]),
}

///
/// Database
///
/// A cheap-to-clone handle. Scoping returns a new handle so hooks can
/// narrow or rewrite the query before it runs.
///

pub trait Database: Clone + Sized {
    /// Narrow every later call on this handle by an extra predicate.
    #[must_use]
    fn scope(self, predicate: Predicate) -> Self;

    /// Insert a row; the backend may fill generated columns in place.
    fn create<M: Model>(&mut self, row: &mut M) -> Result<(), OrmError>;

    /// First row matching the predicate and the handle's scope.
    fn find_first<M: Model>(&mut self, predicate: Predicate) -> Result<Option<M>, OrmError>;

    /// Row-level lock read (`SELECT … FOR UPDATE`); returns the number of rows locked.
    fn lock_for_update<M: Model>(&mut self, predicate: Predicate) -> Result<u64, OrmError>;

    /// Delete every row matching the predicate and the handle's scope.
    fn delete<M: Model>(&mut self, predicate: Predicate) -> Result<u64, OrmError>;

    /// Insert or update a row by primary key.
    fn save<M: Model>(&mut self, row: &mut M) -> Result<(), OrmError>;

    /// Update the child set of one association field.
    fn associate<M: Model, C: Model>(
        &mut self,
        owner: &M,
        field: &'static str,
        association: Association<'_, C>,
    ) -> Result<(), OrmError>;
}

///
/// Predicate
///

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    And(Vec<Self>),
    Eq(&'static str, Value),
    In(&'static str, Vec<Value>),
    NotIn(&'static str, Vec<Value>),
}

impl Predicate {
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Self::Eq(column, value.into())
    }

    #[must_use]
    pub const fn in_list(column: &'static str, values: Vec<Value>) -> Self {
        Self::In(column, values)
    }

    #[must_use]
    pub const fn not_in(column: &'static str, values: Vec<Value>) -> Self {
        Self::NotIn(column, values)
    }

    /// Conjunction, flattening nested `And`s.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        let mut parts = match self {
            Self::And(parts) => parts,
            single => vec![single],
        };
        match other {
            Self::And(more) => parts.extend(more),
            single => parts.push(single),
        }

        Self::And(parts)
    }

    /// Evaluate against a row through [`Model::column`].
    /// A column the model cannot read never matches.
    ///
    /// Real backends translate predicates into their own queries; this
    /// evaluator exists for in-memory `Database` implementations.
    #[must_use]
    pub fn matches<M: Model>(&self, row: &M) -> bool {
        match self {
            Self::And(parts) => parts.iter().all(|p| p.matches(row)),
            Self::Eq(column, value) => row.column(column).is_some_and(|v| v == *value),
            Self::In(column, values) => row.column(column).is_some_and(|v| values.contains(&v)),
            Self::NotIn(column, values) => {
                row.column(column).is_some_and(|v| !values.contains(&v))
            }
        }
    }

    /// Columns referenced by this predicate, in order.
    #[must_use]
    pub fn columns(&self) -> Vec<&'static str> {
        match self {
            Self::And(parts) => parts.iter().flat_map(Self::columns).collect(),
            Self::Eq(column, _) | Self::In(column, _) | Self::NotIn(column, _) => vec![*column],
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Row {
        id: String,
        owner_id: Option<i64>,
    }

    impl Model for Row {
        const TABLE_NAME: &'static str = "rows";
        const PRIMARY_KEY: Option<&'static str> = Some("id");

        fn primary_key(&self) -> Option<Value> {
            Some(Value::from(self.id.clone()))
        }

        fn column(&self, column: &str) -> Option<Value> {
            match column {
                "id" => Some(Value::from(self.id.clone())),
                "owner_id" => Some(Value::from(self.owner_id)),
                _ => None,
            }
        }
    }

    fn row(id: &str, owner_id: Option<i64>) -> Row {
        Row {
            id: id.to_string(),
            owner_id,
        }
    }

    #[test]
    fn and_flattens_nested_conjunctions() {
        let p = Predicate::eq("a", 1)
            .and(Predicate::eq("b", 2))
            .and(Predicate::eq("c", 3).and(Predicate::eq("d", 4)));

        assert_eq!(p.columns(), vec!["a", "b", "c", "d"]);
        assert!(matches!(p, Predicate::And(ref parts) if parts.len() == 4));
    }

    #[test]
    fn predicates_match_rows_by_column() {
        let r = row("w-1", Some(7));

        assert!(Predicate::eq("id", "w-1").matches(&r));
        assert!(Predicate::eq("owner_id", Some(7_i64)).matches(&r));
        assert!(!Predicate::eq("owner_id", 8_i64).matches(&r));
        assert!(Predicate::in_list("id", vec!["w-0".into(), "w-1".into()]).matches(&r));
        assert!(!Predicate::not_in("id", vec!["w-1".into()]).matches(&r));
        assert!(!Predicate::eq("missing", 1).matches(&r), "unknown columns never match");
    }

    #[test]
    fn null_columns_only_match_null() {
        let r = row("w-2", None);

        assert!(Predicate::eq("owner_id", Value::Null).matches(&r));
        assert!(!Predicate::eq("owner_id", 0_i64).matches(&r));
    }
}
