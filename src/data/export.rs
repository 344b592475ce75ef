use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::Dataset;

/// Write the dataset's source columns as CSV, in source order.
///
/// Dates are written as `YYYY-MM-DD` and nulls as empty cells. Derived
/// fields are left out; loading the output recomputes them.
pub fn write_csv<W: Write>(dataset: &Dataset, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    let columns = dataset.schema().columns();

    writer
        .write_record(columns.iter().map(|c| c.name()))
        .context("writing CSV header")?;

    for (row, rec) in dataset.records().enumerate() {
        let cells = columns.iter().map(|col| {
            dataset
                .value(rec, col)
                .and_then(|v| v.search_text())
                .unwrap_or_default()
        });
        writer
            .write_record(cells)
            .with_context(|| format!("writing CSV row {row}"))?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

/// Export to a file, replacing it if present.
pub fn save_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(dataset, std::io::BufWriter::new(file))
        .with_context(|| format!("exporting to {}", path.display()))?;
    log::info!("Exported {} records to {}", dataset.len(), path.display());
    Ok(())
}
