use std::sync::Arc;

use arrow::array::{Date32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }

    fn chance(&mut self, percent: u64) -> bool {
        self.next_u64() % 100 < percent
    }
}

const IPC_CODES: &[(&str, &[&str])] = &[
    ("G06K", &["9/00", "9/62", "7/10"]),
    ("G06F", &["3/01", "16/00", "21/62"]),
    ("H04L", &["29/06", "9/32", "12/28"]),
    ("H04W", &["4/00", "12/06"]),
    ("A61K", &["31/00", "9/20"]),
    ("H01M", &["4/00", "10/05"]),
    ("B60L", &["53/00", "58/12"]),
    ("G02B", &["3/00", "27/01"]),
];

const COUNTRIES: &[&str] = &[
    "United States", "Germany", "Japan", "China", "Korea, Republic of", "France",
    "United Kingdom", "Saudi Arabia", "United Arab Emirates",
];

const TITLE_NOUNS: &[&str] = &[
    "apparatus", "method", "system", "device", "composition", "assembly",
];
const TITLE_TOPICS: &[&str] = &[
    "image recognition", "secure handshake", "battery electrode", "optical lens",
    "wireless scheduling", "drug delivery", "vehicle charging", "data compression",
];

/// Messy values seen in real exports.
const JUNK_CLASSIFICATIONS: &[&str] = &["nan", "None", "there", "no"];

struct Filing {
    number: String,
    title: String,
    abstract_text: String,
    application_date: Option<NaiveDate>,
    classification: Option<String>,
    country: Option<String>,
    priority_number: String,
    priority_date: Option<NaiveDate>,
    earliest_priority_date: Option<NaiveDate>,
    application_type: String,
}

fn generate(rng: &mut SimpleRng, n: usize) -> Vec<Filing> {
    let epoch = NaiveDate::from_ymd_opt(2012, 1, 1).expect("valid date");
    (0..n)
        .map(|i| {
            let application_date = epoch + Duration::days(rng.below(12 * 365) as i64);
            let priority_date = application_date - Duration::days(rng.below(365) as i64);

            let (group, subgroups) = *rng.pick(IPC_CODES);
            let mut classification = format!("{group} {}", rng.pick(subgroups));
            if rng.chance(40) {
                let (other, subs) = *rng.pick(IPC_CODES);
                classification.push_str(&format!(", {other} {}", rng.pick(subs)));
            }

            let noun = rng.pick(TITLE_NOUNS);
            let topic = rng.pick(TITLE_TOPICS);
            let country = rng.pick(COUNTRIES);

            Filing {
                number: format!("SA{}{:06}", application_date.year(), i + 1),
                title: format!("{} for {topic}", capitalize(noun)),
                abstract_text: format!(
                    "A {noun} relating to {topic}, wherein the {noun} is configured under IPC {group}."
                ),
                application_date: (!rng.chance(3)).then_some(application_date),
                classification: if rng.chance(4) {
                    Some(rng.pick(JUNK_CLASSIFICATIONS).to_string())
                } else if rng.chance(2) {
                    None
                } else {
                    Some(classification)
                },
                country: (!rng.chance(5)).then(|| country.to_string()),
                priority_number: format!("{}-{:05}", &country[..2].to_uppercase(), rng.below(99999)),
                priority_date: Some(priority_date),
                earliest_priority_date: Some(priority_date - Duration::days(rng.below(60) as i64)),
                application_type: rng.pick(&["1", "2", "3"]).to_string(),
            }
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn fmt_date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

const HEADERS: [&str; 10] = [
    "Application Number",
    "Title",
    "Abstract",
    "Application Date",
    "Classification",
    "Country Name (Priority)",
    "Priority Number",
    "Priority Date",
    "Earliest Priority Date",
    "Application Type (ID)",
];

fn write_csv(filings: &[Filing], path: &str) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create CSV file");
    // Padded headers, as some exports produce them
    writer
        .write_record(HEADERS.iter().map(|h| format!(" {h} ")))
        .expect("Failed to write header");
    for f in filings {
        writer
            .write_record([
                f.number.clone(),
                f.title.clone(),
                f.abstract_text.clone(),
                fmt_date(f.application_date),
                f.classification.clone().unwrap_or_default(),
                f.country.clone().unwrap_or_default(),
                f.priority_number.clone(),
                fmt_date(f.priority_date),
                fmt_date(f.earliest_priority_date),
                f.application_type.clone(),
            ])
            .expect("Failed to write row");
    }
    writer.flush().expect("Failed to flush CSV");
}

fn text_column(filings: &[Filing], get: impl Fn(&Filing) -> Option<&str>) -> StringArray {
    filings.iter().map(get).collect()
}

fn date_column(filings: &[Filing], get: impl Fn(&Filing) -> Option<NaiveDate>) -> Date32Array {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid date");
    filings
        .iter()
        .map(|f| get(f).map(|d| (d - epoch).num_days() as i32))
        .collect()
}

fn write_parquet(filings: &[Filing], path: &str) {
    let schema = Arc::new(Schema::new(
        HEADERS
            .iter()
            .map(|h| {
                let dt = if h.ends_with("Date") {
                    DataType::Date32
                } else {
                    DataType::Utf8
                };
                Field::new(*h, dt, true)
            })
            .collect::<Vec<_>>(),
    ));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(text_column(filings, |f| Some(f.number.as_str()))),
            Arc::new(text_column(filings, |f| Some(f.title.as_str()))),
            Arc::new(text_column(filings, |f| Some(f.abstract_text.as_str()))),
            Arc::new(date_column(filings, |f| f.application_date)),
            Arc::new(text_column(filings, |f| f.classification.as_deref())),
            Arc::new(text_column(filings, |f| f.country.as_deref())),
            Arc::new(text_column(filings, |f| Some(f.priority_number.as_str()))),
            Arc::new(date_column(filings, |f| f.priority_date)),
            Arc::new(date_column(filings, |f| f.earliest_priority_date)),
            Arc::new(text_column(filings, |f| Some(f.application_type.as_str()))),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn main() {
    let n: usize = std::env::args()
        .nth(1)
        .and_then(|a| a.parse().ok())
        .unwrap_or(500);

    let mut rng = SimpleRng::new(42);
    let filings = generate(&mut rng, n);

    write_csv(&filings, "sample_patents.csv");
    write_parquet(&filings, "sample_patents.parquet");

    println!("Wrote {n} filings to sample_patents.csv and sample_patents.parquet");
}
