use derive_more::{Deref, DerefMut, From, IntoIterator};

// array_column
// newtype over a Vec stored as a native array column
macro_rules! array_column {
    ($name:ident, $elem:ty, $sql:literal) => {
        #[doc = concat!("Native `", $sql, "` array column.")]
        #[derive(Clone, Debug, Default, Deref, DerefMut, From, IntoIterator, PartialEq)]
        #[into_iterator(owned, ref, ref_mut)]
        pub struct $name(pub Vec<$elem>);

        impl $name {
            /// Column type used in the rendered tag.
            pub const SQL_TYPE: &'static str = $sql;

            #[must_use]
            pub fn into_inner(self) -> Vec<$elem> {
                self.0
            }
        }

        impl From<$name> for Vec<$elem> {
            fn from(array: $name) -> Self {
                array.0
            }
        }

        impl FromIterator<$elem> for $name {
            fn from_iter<I: IntoIterator<Item = $elem>>(iter: I) -> Self {
                Self(iter.into_iter().collect())
            }
        }
    };
}

array_column!(BoolArray, bool, "bool[]");
array_column!(Float64Array, f64, "float[]");
array_column!(Int64Array, i64, "integer[]");
array_column!(StringArray, String, "text[]");

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrays_wrap_and_unwrap_vectors() {
        let tags = StringArray::from(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(tags.len(), 2, "deref should expose the vector");
        assert_eq!(Vec::from(tags.clone()), vec!["a".to_string(), "b".to_string()]);

        let doubled: Int64Array = Int64Array::from(vec![1, 2]).iter().map(|v| v * 2).collect();
        assert_eq!(doubled.into_inner(), vec![2, 4]);
    }

    #[test]
    fn arrays_report_their_column_type() {
        assert_eq!(BoolArray::SQL_TYPE, "bool[]");
        assert_eq!(Float64Array::SQL_TYPE, "float[]");
        assert_eq!(Int64Array::SQL_TYPE, "integer[]");
        assert_eq!(StringArray::SQL_TYPE, "text[]");
    }
}
