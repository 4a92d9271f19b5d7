use std::cmp::Ordering;

use crate::{Direction, FieldTable, SortKey, SortSpec, SortValue};

/// Orders `records` according to `spec`.
///
/// The first usable key is primary and later keys only break ties. The sort is
/// stable, so records equal on every key keep their input order. With no usable
/// key (`spec` absent, empty, or every token dropped) the table's default order
/// is applied instead; it is never mixed with requested keys.
pub fn sort<T>(records: Vec<T>, spec: Option<&str>, table: &FieldTable<T>) -> Vec<T> {
    let keys = spec
        .map(|s| SortSpec::parse(s).resolve(table))
        .unwrap_or_default();

    if keys.is_empty() {
        let mut records = records;
        let default_order = table.default_order();
        records.sort_by(|a, b| default_order(a, b));
        return records;
    }

    let mut keyed: Vec<(Vec<SortValue>, T)> = records
        .into_iter()
        .map(|record| {
            let values = keys.iter().map(|k| (k.extract)(&record)).collect();
            (values, record)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| compare(&keys, a, b));
    keyed.into_iter().map(|(_, record)| record).collect()
}

fn compare<T>(keys: &[SortKey<T>], a: &[SortValue], b: &[SortValue]) -> Ordering {
    keys.iter()
        .zip(a.iter().zip(b.iter()))
        .map(|(key, (x, y))| match key.direction {
            Direction::Asc => x.cmp(y),
            Direction::Desc => y.cmp(x),
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Field;

    #[derive(Debug, Clone)]
    struct Item {
        id: i64,
        price: i64,
        name: &'static str,
    }

    static ITEM_FIELDS: FieldTable<Item> = FieldTable::new(
        "Item",
        &[
            Field::new("id", |i: &Item| SortValue::from(i.id)),
            Field::new("price", |i: &Item| SortValue::from(i.price)),
            Field::new("name", |i: &Item| SortValue::from(i.name)),
        ],
        |a: &Item, b: &Item| a.id.cmp(&b.id),
    );

    fn items() -> Vec<Item> {
        vec![
            Item { id: 1, price: 5, name: "b" },
            Item { id: 2, price: 5, name: "a" },
            Item { id: 3, price: 9, name: "z" },
        ]
    }

    fn ids(items: &[Item]) -> Vec<i64> {
        items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn primary_then_tie_break() {
        let sorted = sort(items(), Some("price.desc name.asc"), &ITEM_FIELDS);
        assert_eq!(ids(&sorted), vec![3, 2, 1]);
    }

    #[test]
    fn field_names_ignore_case() {
        let sorted = sort(items(), Some("PRICE.Desc NAME.ASC"), &ITEM_FIELDS);
        assert_eq!(ids(&sorted), vec![3, 2, 1]);
    }

    #[test]
    fn unknown_field_falls_back_to_default() {
        let mut shuffled = items();
        shuffled.reverse();
        let bogus = sort(shuffled.clone(), Some("bogus.asc"), &ITEM_FIELDS);
        let none = sort(shuffled, None, &ITEM_FIELDS);
        assert_eq!(ids(&bogus), vec![1, 2, 3]);
        assert_eq!(ids(&bogus), ids(&none));
    }

    #[test]
    fn bad_direction_behaves_like_empty_spec() {
        let mut shuffled = items();
        shuffled.reverse();
        let sideways = sort(shuffled.clone(), Some("id.sideways"), &ITEM_FIELDS);
        let empty = sort(shuffled, Some(""), &ITEM_FIELDS);
        assert_eq!(ids(&sideways), ids(&empty));
        assert_eq!(ids(&sideways), vec![1, 2, 3]);
    }

    #[test]
    fn default_is_not_applied_once_a_key_is_valid() {
        // Equal prices keep input order (3 before 1), not id order.
        let input = vec![
            Item { id: 3, price: 1, name: "x" },
            Item { id: 1, price: 1, name: "y" },
            Item { id: 2, price: 0, name: "z" },
        ];
        let sorted = sort(input, Some("price.asc"), &ITEM_FIELDS);
        assert_eq!(ids(&sorted), vec![2, 3, 1]);
    }

    #[test]
    fn invalid_tokens_between_valid_ones_are_skipped() {
        let sorted = sort(
            items(),
            Some("price.asc nope.desc name.sideways name.desc"),
            &ITEM_FIELDS,
        );
        assert_eq!(ids(&sorted), vec![1, 2, 3]);
    }

    #[test]
    fn later_keys_never_reorder_earlier_decisions() {
        let sorted = sort(items(), Some("name.asc price.desc"), &ITEM_FIELDS);
        assert_eq!(ids(&sorted), vec![2, 1, 3]);
    }

    #[test]
    fn empty_and_single_inputs() {
        assert!(sort(Vec::<Item>::new(), Some("id.asc"), &ITEM_FIELDS).is_empty());
        let one = sort(vec![items().remove(0)], Some("id.desc"), &ITEM_FIELDS);
        assert_eq!(ids(&one), vec![1]);
    }
}
