use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
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

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

/// (region, country, state) triples; some investors have no state on file.
const LOCATIONS: [(&str, &str, Option<&str>); 8] = [
    ("Americas", "United States", Some("California")),
    ("Americas", "United States", Some("New York")),
    ("Americas", "Canada", Some("Québec")),
    ("Americas", "Brazil", Some("São Paulo")),
    ("Europe", "United Kingdom", Some("London")),
    ("Europe", "Germany", None),
    ("Asia", "Singapore", None),
    ("Asia", "India", Some("Karnataka")),
];
const INDUSTRIES: [&str; 7] = [
    "Software",
    "FinTech",
    "Healthcare",
    "Energy",
    "Consumer Products",
    "Media",
    "AI",
];
const INVESTOR_TYPES: [&str; 4] = ["Venture Capital", "Angel Group", "Corporate", "Accelerator"];
const NAME_PARTS: [&str; 8] = [
    "Summit", "Harbor", "Atlas", "Northwind", "Crescent", "Pioneer", "Bluebird", "Ember",
];

struct Investor {
    name: String,
    updated: NaiveDate,
    industries: String,
    region: &'static str,
    country: &'static str,
    state: Option<&'static str>,
    investor_type: &'static str,
    delta_days: i64,
    total: i64,
    size: f64,
    scores: [u8; 3],
}

/// Quintile (1..=5) of each value by rank; `higher_is_better` flips the scale.
fn quintiles(values: &[f64], higher_is_better: bool) -> Vec<u8> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut out = vec![0u8; values.len()];
    for (rank, &idx) in order.iter().enumerate() {
        let q = (rank * 5 / values.len()) as u8 + 1;
        out[idx] = if higher_is_better { q } else { 6 - q };
    }
    out
}

fn segment_for(scores: [u8; 3]) -> &'static str {
    match scores.iter().map(|&s| s as u32).sum::<u32>() {
        13..=15 => "Champions",
        10..=12 => "Loyal",
        7..=9 => "Potential",
        _ => "At Risk",
    }
}

fn generate(rng: &mut SimpleRng, n: usize) -> Vec<Investor> {
    let first_day = NaiveDate::from_ymd_opt(2022, 1, 1).expect("valid date");
    let mut investors: Vec<Investor> = (0..n)
        .map(|i| {
            let (region, country, state) = *rng.pick(&LOCATIONS);
            let mut picked: Vec<&str> = (0..1 + rng.below(3)).map(|_| *rng.pick(&INDUSTRIES)).collect();
            picked.sort_unstable();
            picked.dedup();
            Investor {
                name: format!("{} {} {i}", rng.pick(&NAME_PARTS), rng.pick(&NAME_PARTS)),
                updated: first_day + Duration::days(rng.below(730) as i64),
                industries: picked.join(", "),
                region,
                country,
                state,
                investor_type: *rng.pick(&INVESTOR_TYPES),
                delta_days: rng.below(1500) as i64,
                total: 1 + rng.below(60) as i64,
                size: ((rng.next_f64() * 49.5 + 0.5) * 100.0).round() / 100.0,
                scores: [0; 3],
            }
        })
        .collect();

    let recency = quintiles(&investors.iter().map(|v| v.delta_days as f64).collect::<Vec<_>>(), false);
    let frequency = quintiles(&investors.iter().map(|v| v.total as f64).collect::<Vec<_>>(), true);
    let monetary = quintiles(&investors.iter().map(|v| v.size).collect::<Vec<_>>(), true);
    for (i, inv) in investors.iter_mut().enumerate() {
        inv.scores = [recency[i], frequency[i], monetary[i]];
    }
    investors
}

const HEADER: [&str; 16] = [
    "Investors",
    "Last Updated Date",
    "Preferred Industry",
    "HQ Global Region",
    "HQ Country/Territory",
    "HQ State/Province",
    "Segment",
    "Primary Investor Type",
    "Recency Score",
    "Frequency Score",
    "Monetary Score",
    "RFM Score",
    "Last Investment Delta",
    "Total Investments",
    "Last Investment Size",
    "Last Investment Type",
];

fn rfm_score(s: [u8; 3]) -> i64 {
    s[0] as i64 * 100 + s[1] as i64 * 10 + s[2] as i64
}

/// CSV in Latin-1, the encoding investor exports arrive in.
fn write_csv(investors: &[Investor], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for inv in investors {
        writer.write_record([
            inv.name.clone(),
            inv.updated.format("%m/%d/%Y").to_string(),
            inv.industries.clone(),
            inv.region.to_string(),
            inv.country.to_string(),
            inv.state.unwrap_or_default().to_string(),
            segment_for(inv.scores).to_string(),
            inv.investor_type.to_string(),
            inv.scores[0].to_string(),
            inv.scores[1].to_string(),
            inv.scores[2].to_string(),
            rfm_score(inv.scores).to_string(),
            inv.delta_days.to_string(),
            inv.total.to_string(),
            format!("{:.2}", inv.size),
            "Seed Round".to_string(),
        ])?;
    }
    let utf8 = String::from_utf8(writer.into_inner().map_err(|e| e.into_error())?)?;
    std::fs::write(path, encoding_rs::mem::encode_latin1_lossy(&utf8))
        .with_context(|| format!("writing {path}"))
}

fn write_parquet(investors: &[Investor], path: &str) -> Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid date");
    let strings = |f: &dyn Fn(&Investor) -> Option<String>| -> ArrayRef {
        Arc::new(StringArray::from(investors.iter().map(f).collect::<Vec<_>>()))
    };
    let score = |i: usize| -> ArrayRef {
        Arc::new(Int64Array::from(
            investors.iter().map(|v| v.scores[i] as i64).collect::<Vec<_>>(),
        ))
    };

    let columns: Vec<ArrayRef> = vec![
        strings(&|v| Some(v.name.clone())),
        Arc::new(Date32Array::from(
            investors
                .iter()
                .map(|v| (v.updated - epoch).num_days() as i32)
                .collect::<Vec<_>>(),
        )),
        strings(&|v| Some(v.industries.clone())),
        strings(&|v| Some(v.region.to_string())),
        strings(&|v| Some(v.country.to_string())),
        strings(&|v| v.state.map(str::to_string)),
        strings(&|v| Some(segment_for(v.scores).to_string())),
        strings(&|v| Some(v.investor_type.to_string())),
        score(0),
        score(1),
        score(2),
        Arc::new(Int64Array::from(
            investors.iter().map(|v| rfm_score(v.scores)).collect::<Vec<_>>(),
        )),
        Arc::new(Int64Array::from(investors.iter().map(|v| v.delta_days).collect::<Vec<_>>())),
        Arc::new(Int64Array::from(investors.iter().map(|v| v.total).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(investors.iter().map(|v| v.size).collect::<Vec<_>>())),
        strings(&|_| Some("Seed Round".to_string())),
    ];

    let fields: Vec<Field> = HEADER
        .iter()
        .zip(&columns)
        .map(|(name, col)| Field::new(*name, col.data_type().clone(), true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);
    let investors = generate(&mut rng, 250);

    write_csv(&investors, "sample_investors.csv")?;
    write_parquet(&investors, "sample_investors.parquet")?;

    println!(
        "Wrote {} investors to sample_investors.csv and sample_investors.parquet",
        investors.len()
    );
    Ok(())
}
