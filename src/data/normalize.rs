use std::collections::HashSet;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use super::model::{Column, Dataset, FieldKey, PatentRecord, Schema};

// ---------------------------------------------------------------------------
// RawTable – what every loader produces
// ---------------------------------------------------------------------------

/// An untyped table straight from a source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Column names as the file spells them (untrimmed).
    pub headers: Vec<String>,
    /// One entry per row, one cell per header; `None` is a missing value.
    pub rows: Vec<Vec<Option<String>>>,
}

/// Cell spellings that mean "no value".
const NULL_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Interpret a raw cell, mapping missing-value markers to `None`.
pub fn cell(raw: &str) -> Option<String> {
    if NULL_TOKENS.contains(&raw) {
        None
    } else {
        Some(raw.to_string())
    }
}

// ---------------------------------------------------------------------------
// normalize
// ---------------------------------------------------------------------------

/// Where each source column ends up in a [`PatentRecord`].
enum Slot {
    Field(FieldKey),
    Extra(usize),
}

/// Turn a raw table into a typed [`Dataset`] with derived fields.
///
/// Never fails: missing columns leave fields empty and unparseable dates
/// become `None`. Repeated column names get a `.1`, `.2`, ... suffix so
/// every source column stays addressable.
pub fn normalize(raw: &RawTable) -> Dataset {
    let mut columns = Vec::with_capacity(raw.headers.len());
    let mut slots = Vec::with_capacity(raw.headers.len());
    let mut used: HashSet<String> = HashSet::new();
    let mut n_extra = 0;

    for header in &raw.headers {
        let column = match Column::parse(header) {
            // Derived columns in the source are recomputed, and a repeated
            // known header only counts once.
            Column::Field(key) if key.is_derived() || columns.contains(&Column::Field(key)) => {
                Column::Extra(unique_name(header.trim(), &used))
            }
            Column::Extra(name) => Column::Extra(unique_name(&name, &used)),
            field => field,
        };
        used.insert(column.name().to_string());
        match &column {
            Column::Field(key) => slots.push(Slot::Field(*key)),
            Column::Extra(_) => {
                slots.push(Slot::Extra(n_extra));
                n_extra += 1;
            }
        }
        columns.push(column);
    }

    let records = raw
        .rows
        .iter()
        .map(|row| {
            let mut rec = PatentRecord {
                extra: vec![None; n_extra],
                ..Default::default()
            };
            for (slot, value) in slots.iter().zip(row) {
                match slot {
                    Slot::Field(key) => assign(&mut rec, *key, value.clone()),
                    Slot::Extra(i) => rec.extra[*i] = value.clone(),
                }
            }
            derive(&mut rec);
            rec
        })
        .collect();

    Dataset::new(Schema::new(columns), records)
}

/// `name`, or the first `name.N` not taken yet.
fn unique_name(name: &str, used: &HashSet<String>) -> String {
    if !used.contains(name) {
        return name.to_string();
    }
    (1..)
        .map(|n| format!("{name}.{n}"))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}

fn assign(rec: &mut PatentRecord, key: FieldKey, value: Option<String>) {
    let date = |v: &Option<String>| v.as_deref().and_then(parse_date);
    match key {
        FieldKey::ApplicationNumber => rec.application_number = value,
        FieldKey::Title => rec.title = value,
        FieldKey::Abstract => rec.abstract_text = value,
        FieldKey::ApplicationDate => rec.application_date = date(&value),
        FieldKey::Classification => rec.classification = value,
        FieldKey::CountryPriority => rec.country_priority = value,
        FieldKey::PriorityNumber => rec.priority_number = value,
        FieldKey::PriorityDate => rec.priority_date = date(&value),
        FieldKey::EarliestPriorityDate => rec.earliest_priority_date = date(&value),
        FieldKey::ApplicationTypeId => rec.application_type_id = value,
        FieldKey::FilingYear | FieldKey::IpcGroup => {}
    }
}

fn derive(rec: &mut PatentRecord) {
    rec.filing_year = rec.application_date.map(|d| d.year());
    rec.ipc_group = rec.classification.as_deref().and_then(ipc_group);
}

// ---------------------------------------------------------------------------
// Derived-field helpers
// ---------------------------------------------------------------------------

/// Leading IPC code of a free-text classification string:
/// first whitespace token, trailing commas removed.
pub fn ipc_group(classification: &str) -> Option<String> {
    let token = classification.split_whitespace().next()?;
    let group = token.trim_end_matches(',').trim();
    if group.is_empty() {
        None
    } else {
        Some(group.to_string())
    }
}

/// Values that show up in the classification column but are not IPC codes.
const PLACEHOLDER_GROUPS: &[&str] = &["nan", "none", "there", "no"];

/// Whether an `ipc_group` is worth charting.
pub fn is_meaningful_group(group: &str) -> bool {
    let g = group.trim();
    !g.is_empty() && !PLACEHOLDER_GROUPS.iter().any(|p| g.eq_ignore_ascii_case(p))
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%m/%d/%Y", "%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y",
    "%d %B %Y", "%B %d, %Y", "%d %b %Y", "%b %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Lenient date parser. Returns `None` for anything it cannot read.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(s, "%Y%m%d").ok();
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| cell(c)).collect())
                .collect(),
        }
    }

    #[test]
    fn ipc_group_takes_leading_code() {
        assert_eq!(ipc_group("G06K 9/00, G06T 7/00").as_deref(), Some("G06K"));
        assert_eq!(ipc_group("  H04L, 29/06").as_deref(), Some("H04L"));
        assert_eq!(ipc_group("   "), None);
        assert_eq!(ipc_group(",,"), None);
    }

    #[test]
    fn placeholder_groups_are_not_meaningful() {
        for g in ["nan", "None", "there", "NO", "", "  "] {
            assert!(!is_meaningful_group(g), "{g:?}");
        }
        assert!(is_meaningful_group("A61K"));
    }

    #[test]
    fn parses_common_date_spellings() {
        let d = NaiveDate::from_ymd_opt(2019, 3, 14);
        for s in [
            "2019-03-14",
            " 2019/03/14 ",
            "20190314",
            "03/14/2019",
            "14/03/2019",
            "14.03.2019",
            "2019-03-14 00:00:00",
            "2019-03-14T08:30:00.250",
            "2019-03-14T08:30:00+02:00",
            "14 March 2019",
            "Mar 14, 2019",
        ] {
            assert_eq!(parse_date(s), d, "{s:?}");
        }
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date("2019-02-30"), None);
    }

    #[test]
    fn derives_year_and_group() {
        let raw = table(
            &["Application Number ", " Application Date", "Classification"],
            &[
                &["A1", "2019-03-14", "G06K 9/00, G06T"],
                &["A2", "not-a-date", ""],
            ],
        );
        let ds = normalize(&raw);
        let a = ds.record(0).unwrap();
        assert_eq!(a.filing_year, Some(2019));
        assert_eq!(a.ipc_group.as_deref(), Some("G06K"));

        let b = ds.record(1).unwrap();
        assert_eq!(b.application_date, None);
        assert_eq!(b.filing_year, None);
        assert_eq!(b.ipc_group, None);
    }

    #[test]
    fn trims_headers_and_keeps_unknown_columns() {
        let raw = table(
            &["  Title  ", "Inventor", "Title"],
            &[&["Widget", "Ada", "dup"]],
        );
        let ds = normalize(&raw);
        let schema = ds.schema();
        assert_eq!(
            schema.columns(),
            &[
                Column::Field(FieldKey::Title),
                Column::Extra("Inventor".into()),
                Column::Extra("Title.1".into()),
            ]
        );
        let r = ds.record(0).unwrap();
        assert_eq!(r.title.as_deref(), Some("Widget"));
        assert_eq!(r.extra, vec![Some("Ada".into()), Some("dup".into())]);
    }

    #[test]
    fn repeated_names_stay_distinct() {
        let raw = table(
            &["Inventor", "Inventor", "Inventor.1", "Filing Year", " Filing Year "],
            &[&["Ada", "Grace", "Linus", "1999", "2001"]],
        );
        let ds = normalize(&raw);
        let names: Vec<&str> = ds.schema().columns().iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec!["Inventor", "Inventor.1", "Inventor.1.1", "Filing Year", "Filing Year.1"]
        );

        let r = ds.record(0).unwrap();
        for (col, expected) in ds.schema().columns().iter().zip(["Ada", "Grace", "Linus", "1999", "2001"]) {
            assert_eq!(ds.value(r, col), Some(Value::Text(expected.into())), "{col}");
        }
        // the derived year is still recomputed, not read from the source
        assert_eq!(r.filing_year, None);
    }

    #[test]
    fn missing_columns_do_not_fail() {
        let raw = table(&["Title"], &[&["Only a title"], &[""]]);
        let ds = normalize(&raw);
        assert_eq!(ds.len(), 2);
        assert!(!ds.schema().contains(&FieldKey::Classification.into()));
        assert_eq!(ds.record(1).unwrap().field(FieldKey::Title), Value::Null);
    }

    #[test]
    fn null_tokens_become_none() {
        assert_eq!(cell("NaN"), None);
        assert_eq!(cell("None"), None);
        assert_eq!(cell(" nan "), Some(" nan ".into()));
    }
}
