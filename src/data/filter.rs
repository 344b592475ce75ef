use std::collections::BTreeMap;

use super::model::{Column, Dataset, PatentRecord};

// ---------------------------------------------------------------------------
// SearchQuery: the full set of search inputs for one filter pass
// ---------------------------------------------------------------------------

/// Per-column search terms plus an optional search across every column.
///
/// Empty terms are ignored, so a default query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub terms: BTreeMap<Column, String>,
    pub global: String,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_term(mut self, column: impl Into<Column>, term: impl Into<String>) -> Self {
        self.terms.insert(column.into(), term.into());
        self
    }

    /// Whether the query would keep every record.
    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.terms.values().all(|t| t.is_empty())
    }

    /// Clear every term, keeping the column slots.
    pub fn reset(&mut self) {
        self.global.clear();
        for term in self.terms.values_mut() {
            term.clear();
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// A search term prepared for case-insensitive matching.
struct Needle(String);

impl Needle {
    fn new(term: &str) -> Self {
        Needle(term.to_lowercase())
    }

    fn found_in(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.0)
    }
}

/// Return indices of records that pass every active term.
///
/// A record passes a column term when the column exists in the schema and
/// the record's value, as text, contains the term ignoring case. Nulls never
/// match. The global term passes when any column (including derived and
/// pass-through ones) matches.
pub fn filtered_indices(dataset: &Dataset, query: &SearchQuery) -> Vec<usize> {
    let active: Vec<(&Column, Needle)> = query
        .terms
        .iter()
        .filter(|(_, term)| !term.is_empty())
        .map(|(col, term)| (col, Needle::new(term)))
        .collect();

    // A term on a column this dataset lacks can never be satisfied.
    if active.iter().any(|(col, _)| !dataset.schema().contains(col)) {
        return Vec::new();
    }

    let global = (!query.global.is_empty()).then(|| Needle::new(&query.global));
    let all_columns = dataset.schema().display_columns();

    dataset
        .records()
        .enumerate()
        .filter(|(_, rec)| {
            active
                .iter()
                .all(|(col, needle)| column_matches(dataset, rec, col, needle))
        })
        .filter(|(_, rec)| match &global {
            Some(needle) => all_columns
                .iter()
                .any(|col| column_matches(dataset, rec, col, needle)),
            None => true,
        })
        .map(|(i, _)| i)
        .collect()
}

fn column_matches(dataset: &Dataset, rec: &PatentRecord, column: &Column, needle: &Needle) -> bool {
    dataset
        .value(rec, column)
        .and_then(|v| v.search_text())
        .is_some_and(|text| needle.found_in(&text))
}

/// Narrow `dataset` to the records matching `query`. The source is untouched.
pub fn filter(dataset: &Dataset, query: &SearchQuery) -> Dataset {
    if query.is_empty() {
        return dataset.clone();
    }
    let indices = filtered_indices(dataset, query);
    log::debug!("Filter kept {} of {} records", indices.len(), dataset.len());
    dataset.subset(&indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::FieldKey;
    use crate::data::normalize::{cell, normalize, RawTable};

    fn dataset() -> Dataset {
        let headers = [
            "Application Number",
            "Title",
            "Application Date",
            "Classification",
            "Country Name (Priority)",
            "Inventor",
        ];
        let rows: [[&str; 6]; 4] = [
            ["EP100", "Optical Lens Array", "2019-03-14", "G02B 3/00", "Germany", "Ada"],
            ["US200", "Wireless handshake", "2020-07-01", "H04L, 29/06", "United States", "Grace"],
            ["EP300", "Lens cleaning robot", "not-a-date", "", "France", ""],
            ["JP400", "Battery anode", "2019-11-30", "H01M 4/00", "", "Linus"],
        ];
        normalize(&RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| cell(c)).collect())
                .collect(),
        })
    }

    fn numbers(ds: &Dataset) -> Vec<String> {
        ds.records()
            .map(|r| r.application_number.clone().unwrap_or_default())
            .collect()
    }

    fn global(term: &str) -> SearchQuery {
        SearchQuery {
            global: term.to_string(),
            ..SearchQuery::default()
        }
    }

    #[test]
    fn empty_query_is_identity() {
        let ds = dataset();
        let q = SearchQuery::new().with_term(FieldKey::Title, "");
        assert!(q.is_empty());
        assert_eq!(numbers(&filter(&ds, &q)), numbers(&ds));
    }

    #[test]
    fn terms_are_case_insensitive_and_anded() {
        let ds = dataset();
        let q = SearchQuery::new().with_term(FieldKey::Title, "LENS");
        assert_eq!(numbers(&filter(&ds, &q)), vec!["EP100", "EP300"]);

        let q = q.with_term(FieldKey::CountryPriority, "germ");
        assert_eq!(numbers(&filter(&ds, &q)), vec!["EP100"]);
    }

    #[test]
    fn dates_and_years_match_their_text_form() {
        let ds = dataset();
        let q = SearchQuery::new().with_term(FieldKey::ApplicationDate, "2019-");
        assert_eq!(numbers(&filter(&ds, &q)), vec!["EP100", "JP400"]);

        let q = SearchQuery::new().with_term(FieldKey::FilingYear, "2020");
        assert_eq!(numbers(&filter(&ds, &q)), vec!["US200"]);
    }

    #[test]
    fn nulls_never_match() {
        let ds = dataset();
        // EP300's date did not parse; its text form must not leak into matches
        let q = SearchQuery::new().with_term(FieldKey::ApplicationDate, "not");
        assert!(filter(&ds, &q).is_empty());

        let q = SearchQuery::new().with_term(FieldKey::IpcGroup, "null");
        assert!(filter(&ds, &q).is_empty());
    }

    #[test]
    fn absent_column_yields_nothing() {
        let ds = dataset();
        let q = SearchQuery::new().with_term(FieldKey::Abstract, "lens");
        assert!(filter(&ds, &q).is_empty());

        let q = SearchQuery::new().with_term(Column::parse("Assignee"), "x");
        assert!(filter(&ds, &q).is_empty());
    }

    #[test]
    fn missing_classification_column_matches_nothing() {
        let ds = normalize(&RawTable {
            headers: vec!["Application Number".into(), "Title".into()],
            rows: vec![
                vec![cell("A1"), cell("Lens")],
                vec![cell("A2"), cell("G06K lens")],
            ],
        });
        let q = SearchQuery::new().with_term(FieldKey::Classification, "G06K");
        assert!(filter(&ds, &q).is_empty());

        // an empty term on the missing column is ignored
        let q = SearchQuery::new()
            .with_term(FieldKey::Classification, "")
            .with_term(FieldKey::Title, "lens");
        assert_eq!(numbers(&filter(&ds, &q)), vec!["A1", "A2"]);
    }

    #[test]
    fn repeated_columns_are_each_searchable() {
        let ds = normalize(&RawTable {
            headers: vec!["Application Number".into(), "Inventor".into(), "Inventor".into()],
            rows: vec![vec![cell("A1"), cell("Ada"), cell("Grace")]],
        });
        assert_eq!(numbers(&filter(&ds, &global("grace"))), vec!["A1"]);

        let q = SearchQuery::new().with_term(Column::parse("Inventor.1"), "grace");
        assert_eq!(numbers(&filter(&ds, &q)), vec!["A1"]);
        let q = SearchQuery::new().with_term(Column::parse("Inventor"), "grace");
        assert!(filter(&ds, &q).is_empty());
    }

    #[test]
    fn extra_columns_are_searchable() {
        let ds = dataset();
        let q = SearchQuery::new().with_term(Column::parse(" Inventor "), "grace");
        assert_eq!(numbers(&filter(&ds, &q)), vec!["US200"]);
    }

    #[test]
    fn global_term_matches_any_column() {
        let ds = dataset();
        let q = global("h04l");
        assert_eq!(numbers(&filter(&ds, &q)), vec!["US200"]);

        let q = global("linus");
        assert_eq!(numbers(&filter(&ds, &q)), vec!["JP400"]);

        let q = global("zzz");
        assert!(filter(&ds, &q).is_empty());
    }

    #[test]
    fn global_term_composes_with_column_terms() {
        let ds = dataset();
        let q = global("lens").with_term(FieldKey::ApplicationNumber, "ep1");
        assert_eq!(numbers(&filter(&ds, &q)), vec!["EP100"]);
    }

    #[test]
    fn filter_is_idempotent_subset() {
        let ds = dataset();
        let q = global("a").with_term(FieldKey::Classification, "h0");
        let once = filter(&ds, &q);
        let twice = filter(&once, &q);
        assert!(once.len() <= ds.len());
        assert_eq!(numbers(&once), numbers(&twice));
        assert!(numbers(&once).iter().all(|n| numbers(&ds).contains(n)));
        // source untouched
        assert_eq!(ds.len(), 4);
    }

    #[test]
    fn reset_clears_terms() {
        let mut q = global("x").with_term(FieldKey::Title, "lens");
        q.reset();
        assert!(q.is_empty());
        assert_eq!(q.terms.len(), 1);
    }
}
