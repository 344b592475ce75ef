use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// FieldKey – the known patent columns
// ---------------------------------------------------------------------------

/// Stable identifier for every field a [`PatentRecord`] carries.
///
/// The first ten are read from the source table, the last two are derived
/// during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    ApplicationNumber,
    Title,
    Abstract,
    ApplicationDate,
    Classification,
    CountryPriority,
    PriorityNumber,
    PriorityDate,
    EarliestPriorityDate,
    ApplicationTypeId,
    FilingYear,
    IpcGroup,
}

/// Reads one field of a record as a [`Value`].
pub type Accessor = fn(&PatentRecord) -> Value;

impl FieldKey {
    /// Fields read from the source table, in canonical column order.
    pub const RAW: [FieldKey; 10] = [
        FieldKey::ApplicationNumber,
        FieldKey::Title,
        FieldKey::Abstract,
        FieldKey::ApplicationDate,
        FieldKey::Classification,
        FieldKey::CountryPriority,
        FieldKey::PriorityNumber,
        FieldKey::PriorityDate,
        FieldKey::EarliestPriorityDate,
        FieldKey::ApplicationTypeId,
    ];

    /// Fields computed once by the normalizer.
    pub const DERIVED: [FieldKey; 2] = [FieldKey::FilingYear, FieldKey::IpcGroup];

    /// Column header as it appears in source files (after trimming).
    pub fn header(self) -> &'static str {
        match self {
            FieldKey::ApplicationNumber => "Application Number",
            FieldKey::Title => "Title",
            FieldKey::Abstract => "Abstract",
            FieldKey::ApplicationDate => "Application Date",
            FieldKey::Classification => "Classification",
            FieldKey::CountryPriority => "Country Name (Priority)",
            FieldKey::PriorityNumber => "Priority Number",
            FieldKey::PriorityDate => "Priority Date",
            FieldKey::EarliestPriorityDate => "Earliest Priority Date",
            FieldKey::ApplicationTypeId => "Application Type (ID)",
            FieldKey::FilingYear => "Filing Year",
            FieldKey::IpcGroup => "IPC Group",
        }
    }

    /// Resolve a header to a known field. Surrounding whitespace is ignored.
    pub fn from_header(name: &str) -> Option<FieldKey> {
        let name = name.trim();
        FieldKey::RAW
            .into_iter()
            .chain(FieldKey::DERIVED)
            .find(|k| k.header() == name)
    }

    pub fn is_derived(self) -> bool {
        matches!(self, FieldKey::FilingYear | FieldKey::IpcGroup)
    }

    pub fn is_date(self) -> bool {
        matches!(
            self,
            FieldKey::ApplicationDate | FieldKey::PriorityDate | FieldKey::EarliestPriorityDate
        )
    }

    /// Accessor lookup table entry for this field.
    pub fn accessor(self) -> Accessor {
        match self {
            FieldKey::ApplicationNumber => |r| Value::text(&r.application_number),
            FieldKey::Title => |r| Value::text(&r.title),
            FieldKey::Abstract => |r| Value::text(&r.abstract_text),
            FieldKey::ApplicationDate => |r| Value::date(r.application_date),
            FieldKey::Classification => |r| Value::text(&r.classification),
            FieldKey::CountryPriority => |r| Value::text(&r.country_priority),
            FieldKey::PriorityNumber => |r| Value::text(&r.priority_number),
            FieldKey::PriorityDate => |r| Value::date(r.priority_date),
            FieldKey::EarliestPriorityDate => |r| Value::date(r.earliest_priority_date),
            FieldKey::ApplicationTypeId => |r| Value::text(&r.application_type_id),
            FieldKey::FilingYear => |r| r.filing_year.map_or(Value::Null, |y| Value::Integer(y.into())),
            FieldKey::IpcGroup => |r| Value::text(&r.ipc_group),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ---------------------------------------------------------------------------
// Column – a known field or a pass-through column
// ---------------------------------------------------------------------------

/// A column reference: either one of the known fields or any other column
/// the source file carried.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Field(FieldKey),
    Extra(String),
}

impl Column {
    /// Resolve a (possibly padded) column name.
    pub fn parse(name: &str) -> Column {
        match FieldKey::from_header(name) {
            Some(key) => Column::Field(key),
            None => Column::Extra(name.trim().to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Column::Field(key) => key.header(),
            Column::Extra(name) => name,
        }
    }
}

impl From<FieldKey> for Column {
    fn from(key: FieldKey) -> Self {
        Column::Field(key)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// A typed cell value. `Null` sorts first so null groups lead ordered output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    Null,
    Integer(i64),
    Date(NaiveDate),
    Text(String),
}

impl Value {
    fn text(s: &Option<String>) -> Value {
        s.as_ref().map_or(Value::Null, |s| Value::Text(s.clone()))
    }

    fn date(d: Option<NaiveDate>) -> Value {
        d.map_or(Value::Null, Value::Date)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text form used for searching and export; `None` for nulls.
    pub fn search_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Whether values of this kind have a meaningful min and max.
    pub fn is_ordinal(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Date(_))
    }

    /// Numeric value for averaging; only integers have one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "<null>"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// PatentRecord – one row
// ---------------------------------------------------------------------------

/// One patent filing. Every field is optional on ingestion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatentRecord {
    pub application_number: Option<String>,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub application_date: Option<NaiveDate>,
    pub classification: Option<String>,
    pub country_priority: Option<String>,
    pub priority_number: Option<String>,
    pub priority_date: Option<NaiveDate>,
    pub earliest_priority_date: Option<NaiveDate>,
    pub application_type_id: Option<String>,
    /// Year of `application_date`.
    pub filing_year: Option<i32>,
    /// Leading IPC code of `classification`.
    pub ipc_group: Option<String>,
    /// Cells of the schema's extra columns, in schema order.
    pub extra: Vec<Option<String>>,
}

impl PatentRecord {
    pub fn field(&self, key: FieldKey) -> Value {
        (key.accessor())(self)
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Source columns of a dataset, trimmed, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Schema { columns }
    }

    /// Source columns in file order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Source columns followed by the derived fields.
    pub fn display_columns(&self) -> Vec<Column> {
        let mut cols = self.columns.clone();
        cols.extend(FieldKey::DERIVED.map(Column::Field));
        cols
    }

    /// Whether the dataset can answer questions about `column`.
    /// Derived fields always exist (possibly all-null).
    pub fn contains(&self, column: &Column) -> bool {
        match column {
            Column::Field(key) if key.is_derived() => true,
            other => self.columns.contains(other),
        }
    }

    /// Position of an extra column within [`PatentRecord::extra`].
    pub fn extra_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .filter(|c| matches!(c, Column::Extra(_)))
            .position(|c| c.name() == name)
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// An immutable, ordered set of records sharing one schema.
///
/// Subsets share record storage with their source.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    schema: Arc<Schema>,
    records: Vec<Arc<PatentRecord>>,
}

impl Dataset {
    pub fn new(schema: Schema, records: Vec<PatentRecord>) -> Self {
        Dataset {
            schema: Arc::new(schema),
            records: records.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> impl Iterator<Item = &PatentRecord> {
        self.records.iter().map(|r| r.as_ref())
    }

    pub fn record(&self, index: usize) -> Option<&PatentRecord> {
        self.records.get(index).map(|r| r.as_ref())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// New dataset with the records at `indices`, in the given order.
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            schema: Arc::clone(&self.schema),
            records: indices
                .iter()
                .filter_map(|&i| self.records.get(i).cloned())
                .collect(),
        }
    }

    /// Read `column` from `record`. `None` means the column is not part of
    /// this dataset's schema.
    pub fn value(&self, record: &PatentRecord, column: &Column) -> Option<Value> {
        if !self.schema.contains(column) {
            return None;
        }
        match column {
            Column::Field(key) => Some(record.field(*key)),
            Column::Extra(name) => {
                let idx = self.schema.extra_index(name)?;
                Some(
                    record
                        .extra
                        .get(idx)
                        .cloned()
                        .flatten()
                        .map_or(Value::Null, Value::Text),
                )
            }
        }
    }
}
