use anyhow::{bail, Context, Result};
use dted::{BoundingBox, ConstantGeoid, MosaicInterpolator, VoidPolicy};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[allow(clippy::too_many_arguments)]
pub fn run(
    data_dir: Option<PathBuf>,
    cache_size: u64,
    input: PathBuf,
    output: Option<PathBuf>,
    lat_col: String,
    lon_col: String,
    ignore_voids: bool,
    geoid_offset: f64,
) -> Result<()> {
    let catalog = super::catalog(data_dir, cache_size)?;

    let file = File::open(&input).context("Failed to open input file")?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    // Find column indices
    let headers = reader.headers()?.clone();
    let lat_idx = headers
        .iter()
        .position(|h| h == lat_col)
        .with_context(|| format!("Column '{}' not found in CSV", lat_col))?;
    let lon_idx = headers
        .iter()
        .position(|h| h == lon_col)
        .with_context(|| format!("Column '{}' not found in CSV", lon_col))?;

    let records: Vec<_> = reader.records().collect::<Result<_, _>>()?;
    let mut coords = Vec::with_capacity(records.len());
    for (line, record) in records.iter().enumerate() {
        let lat: f64 = record
            .get(lat_idx)
            .context("Missing latitude")?
            .trim()
            .parse()
            .with_context(|| format!("Invalid latitude on record {}", line + 1))?;
        let lon: f64 = record
            .get(lon_idx)
            .context("Missing longitude")?
            .trim()
            .parse()
            .with_context(|| format!("Invalid longitude on record {}", line + 1))?;
        coords.push((lat, lon));
    }

    let Some(bounds) = enclosing_box(&coords) else {
        bail!("No coordinates in {}", input.display());
    };

    let interp = MosaicInterpolator::from_coords_and_list(
        bounds,
        &catalog,
        Arc::new(ConstantGeoid(geoid_offset)),
        VoidPolicy::from_ignore_voids(ignore_voids),
    )
    .context("Failed to load tiles")?;
    tracing::info!(points = coords.len(), tiles = interp.tiles().len(), "processing batch");

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )?
            .progress_chars("#>-"),
    );

    // Prepare output
    let output_path = match output {
        Some(path) => path,
        None => {
            let stem = input
                .file_stem()
                .context("Input path has no file name")?
                .to_string_lossy();
            input.with_file_name(format!("{}_elevation.csv", stem))
        }
    };
    let output_file = File::create(&output_path).context("Failed to create output file")?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(output_file));

    let mut new_headers: Vec<&str> = headers.iter().collect();
    new_headers.push("hae");
    writer.write_record(&new_headers)?;

    for (record, &(lat, lon)) in records.iter().zip(&coords) {
        let covered = interp.tiles().iter().any(|tile| tile.contains(lat, lon));
        let hae = super::format_hae(covered.then(|| interp.get_elevation_hae(lat, lon)));

        let mut new_record: Vec<&str> = record.iter().collect();
        new_record.push(&hae);
        writer.write_record(&new_record)?;

        pb.inc(1);
    }

    pb.finish_with_message("done");
    writer.flush()?;

    println!("Output written to: {}", output_path.display());
    Ok(())
}

/// The smallest box holding every coordinate.
fn enclosing_box(coords: &[(f64, f64)]) -> Option<BoundingBox> {
    let (&(lat, lon), rest) = coords.split_first()?;
    Some(rest.iter().fold(
        BoundingBox::point(lat, lon),
        |b, &(lat, lon)| {
            BoundingBox::new(
                b.min_lat.min(lat),
                b.min_lon.min(lon),
                b.max_lat.max(lat),
                b.max_lon.max(lon),
            )
        },
    ))
}
