use std::collections::{BTreeMap, HashMap};

use super::model::{Column, Dataset, FieldKey, Value};
use super::normalize::is_meaningful_group;

// ---------------------------------------------------------------------------
// Grouped counts
// ---------------------------------------------------------------------------

/// One group of an aggregation: the key tuple and how many records share it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub key: Vec<Value>,
    pub count: usize,
}

impl GroupCount {
    /// Key tuple rendered for labels, e.g. `2019 / G06K`.
    pub fn label(&self) -> String {
        self.key
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// Count records per combination of `keys`, in first-encountered order.
///
/// Nulls form their own group. A column missing from the schema reads as
/// null for every record, so the counts always add up to `dataset.len()`.
pub fn aggregate(dataset: &Dataset, keys: &[Column]) -> Vec<GroupCount> {
    let mut index: HashMap<Vec<Value>, usize> = HashMap::new();
    let mut groups: Vec<GroupCount> = Vec::new();

    for rec in dataset.records() {
        let key: Vec<Value> = keys
            .iter()
            .map(|col| dataset.value(rec, col).unwrap_or(Value::Null))
            .collect();
        match index.get(&key) {
            Some(&i) => groups[i].count += 1,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(GroupCount { key, count: 1 });
            }
        }
    }
    groups
}

/// Order by descending count. Ties keep their input order, so results are
/// deterministic for a given dataset order.
pub fn sort_by_count(counts: &mut [GroupCount]) {
    counts.sort_by(|a, b| b.count.cmp(&a.count));
}

/// The `n` largest groups, descending by count, stable on ties.
pub fn top_n(counts: &[GroupCount], n: usize) -> Vec<GroupCount> {
    let mut sorted = counts.to_vec();
    sort_by_count(&mut sorted);
    sorted.truncate(n);
    sorted
}

/// Frequency of each value of one column, most common first.
pub fn value_counts(dataset: &Dataset, column: &Column, include_null: bool) -> Vec<GroupCount> {
    if !dataset.schema().contains(column) {
        return Vec::new();
    }
    let mut counts: Vec<GroupCount> = aggregate(dataset, std::slice::from_ref(column))
        .into_iter()
        .filter(|g| include_null || !g.key.iter().any(Value::is_null))
        .collect();
    sort_by_count(&mut counts);
    counts
}

// ---------------------------------------------------------------------------
// IPC growth over time
// ---------------------------------------------------------------------------

/// Filing volume per year for one IPC group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSeries {
    pub group: String,
    pub total: usize,
    /// (year, count) sorted by year.
    pub points: Vec<(i64, usize)>,
}

/// Yearly filing counts for the `max_groups` busiest IPC groups.
///
/// Records without a filing year or with a placeholder group are left out.
pub fn growth_series(dataset: &Dataset, max_groups: usize) -> Vec<GroupSeries> {
    let keys = [Column::Field(FieldKey::FilingYear), Column::Field(FieldKey::IpcGroup)];

    let mut per_group: Vec<GroupSeries> = Vec::new();
    let mut slot: HashMap<String, usize> = HashMap::new();
    let mut years: Vec<BTreeMap<i64, usize>> = Vec::new();

    for g in aggregate(dataset, &keys) {
        let (Value::Integer(year), Value::Text(group)) = (&g.key[0], &g.key[1]) else {
            continue;
        };
        if !is_meaningful_group(group) {
            continue;
        }
        let i = *slot.entry(group.clone()).or_insert_with(|| {
            per_group.push(GroupSeries {
                group: group.clone(),
                total: 0,
                points: Vec::new(),
            });
            years.push(BTreeMap::new());
            per_group.len() - 1
        });
        per_group[i].total += g.count;
        *years[i].entry(*year).or_default() += g.count;
    }

    for (series, by_year) in per_group.iter_mut().zip(years) {
        series.points = by_year.into_iter().collect();
    }
    per_group.sort_by(|a, b| b.total.cmp(&a.total));
    per_group.truncate(max_groups);
    per_group
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::normalize::{cell, normalize, RawTable};

    fn dataset(headers: &[&str], rows: &[&[&str]]) -> Dataset {
        normalize(&RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| cell(c)).collect())
                .collect(),
        })
    }

    fn patents() -> Dataset {
        dataset(
            &["Application Number", "Application Date", "Classification", "Country Name (Priority)"],
            &[
                &["1", "2019-01-01", "G06K 9/00", "Germany"],
                &["2", "2019-05-01", "G06K 7/10", "France"],
                &["3", "2020-02-02", "H04L 29/06", "Germany"],
                &["4", "2020-03-03", "G06K", "Germany"],
                &["5", "bad", "H04L", ""],
                &["6", "2021-01-01", "nan", "Japan"],
                &["7", "2021-06-06", "there is none", "Japan"],
            ],
        )
    }

    fn g(key: &str, count: usize) -> GroupCount {
        GroupCount {
            key: vec![Value::Text(key.into())],
            count,
        }
    }

    #[test]
    fn top_n_is_stable_on_ties() {
        let counts = vec![g("A", 5), g("B", 5), g("C", 3), g("D", 1)];
        assert_eq!(top_n(&counts, 3), vec![g("A", 5), g("B", 5), g("C", 3)]);

        let swapped = vec![g("D", 1), g("B", 5), g("C", 3), g("A", 5)];
        assert_eq!(top_n(&swapped, 2), vec![g("B", 5), g("A", 5)]);
        assert!(top_n(&counts, 0).is_empty());
    }

    #[test]
    fn aggregate_counts_sum_to_len() {
        let ds = patents();
        let groups = aggregate(
            &ds,
            &[Column::Field(FieldKey::FilingYear), Column::Field(FieldKey::IpcGroup)],
        );
        assert_eq!(groups.iter().map(|g| g.count).sum::<usize>(), ds.len());
        assert_eq!(
            groups[0],
            GroupCount {
                key: vec![Value::Integer(2019), Value::Text("G06K".into())],
                count: 2
            }
        );
        // record 5 has no parsable date
        assert!(groups
            .iter()
            .any(|g| g.key == vec![Value::Null, Value::Text("H04L".into())]));
    }

    #[test]
    fn missing_classification_gives_one_null_group() {
        let ds = dataset(&["Title"], &[&["a"], &["b"], &["c"]]);
        let groups = aggregate(&ds, &[Column::Field(FieldKey::IpcGroup)]);
        assert_eq!(
            groups,
            vec![GroupCount {
                key: vec![Value::Null],
                count: 3
            }]
        );
    }

    #[test]
    fn aggregate_of_empty_dataset_is_empty() {
        let ds = dataset(&["Title"], &[]);
        assert!(aggregate(&ds, &[Column::Field(FieldKey::Title)]).is_empty());
        assert!(growth_series(&ds, 5).is_empty());
    }

    #[test]
    fn value_counts_sorted_and_null_aware() {
        let ds = patents();
        let col: Column = Column::Field(FieldKey::CountryPriority);
        let counts = value_counts(&ds, &col, false);
        assert_eq!(counts[0], g("Germany", 3));
        assert_eq!(counts[1], g("Japan", 2));
        assert_eq!(counts[2], g("France", 1));
        assert_eq!(counts.len(), 3);

        let with_null = value_counts(&ds, &col, true);
        assert_eq!(with_null.iter().map(|g| g.count).sum::<usize>(), ds.len());

        assert!(value_counts(&ds, &Column::Field(FieldKey::Title), true).is_empty());
    }

    #[test]
    fn growth_series_drops_placeholders() {
        let ds = patents();
        let series = growth_series(&ds, 10);
        let groups: Vec<&str> = series.iter().map(|s| s.group.as_str()).collect();
        assert_eq!(groups, vec!["G06K", "H04L"]);
        assert_eq!(series[0].points, vec![(2019, 2), (2020, 1)]);
        assert_eq!(series[1].points, vec![(2020, 1)]);
        assert_eq!(growth_series(&ds, 1).len(), 1);
    }
}
