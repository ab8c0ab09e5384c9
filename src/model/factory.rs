//! Variant dispatch tables.

use std::borrow::Borrow;

/// A static discriminator → variant table with an explicit fallback.
///
/// Node constructors select their variant through a table instead of
/// branching on discriminator values themselves.
#[derive(Debug)]
pub struct VariantTable<K: 'static, V: 'static> {
    entries: &'static [(K, V)],
    fallback: V,
}

impl<K, V: Copy> VariantTable<K, V> {
    pub const fn new(entries: &'static [(K, V)], fallback: V) -> Self {
        Self { entries, fallback }
    }

    /// Variant for `key`; the fallback when `key` is absent or unknown.
    pub fn select<Q>(&self, key: Option<&Q>) -> V
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        key.and_then(|key| {
            self.entries
                .iter()
                .find(|(k, _)| k.borrow() == key)
                .map(|(_, v)| *v)
        })
        .unwrap_or(self.fallback)
    }

    /// Discriminator registered for `variant`, if any.
    pub fn key_of(&self, variant: V) -> Option<&'static K>
    where
        V: PartialEq,
    {
        self.entries
            .iter()
            .find(|(_, v)| *v == variant)
            .map(|(k, _)| k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Shape {
        Square,
        Circle,
        Other,
    }

    static SHAPES: VariantTable<&str, Shape> =
        VariantTable::new(&[("Square", Shape::Square), ("Circle", Shape::Circle)], Shape::Other);

    #[test]
    fn test_select_known_and_fallback() {
        assert_eq!(SHAPES.select(Some("Circle")), Shape::Circle);
        assert_eq!(SHAPES.select(Some("Hexagon")), Shape::Other);
        assert_eq!(SHAPES.select::<str>(None), Shape::Other);
    }

    #[test]
    fn test_integer_keys() {
        let table: VariantTable<i64, Shape> = VariantTable::new(&[(1, Shape::Square)], Shape::Other);
        assert_eq!(table.select(Some(&1)), Shape::Square);
        assert_eq!(table.select(Some(&7)), Shape::Other);
        assert_eq!(table.key_of(Shape::Square), Some(&1));
        assert_eq!(table.key_of(Shape::Circle), None);
    }
}
