//! Writes `sample_scores.parquet` and `sample_scores.csv`: synthetic skill
//! scores for a handful of models over the scorecard channels, every 6 h out
//! to 14 days.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use skill_scorecard::scorecard::DEFAULT_CHANNELS;

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Error growth: saturating towards climatology with a model-specific rate.
fn rmse(lead_hours: f64, base: f64, rate: f64) -> f64 {
    base * (1.0 + 9.0 * (1.0 - (-rate * lead_hours / 24.0).exp()))
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    // (model, error growth rate)
    let models = [
        ("pangu_6", 0.20),
        ("sfno", 0.18),
        ("graphcast", 0.17),
        ("fcnv2", 0.22),
        ("persistence", 0.60),
    ];
    let lead_times: Vec<f64> = (1..=56).map(|i| i as f64 * 6.0).collect();

    let mut all_model: Vec<&str> = Vec::new();
    let mut all_channel: Vec<&str> = Vec::new();
    let mut all_lead: Vec<f64> = Vec::new();
    let mut all_rmse: Vec<f64> = Vec::new();
    let mut all_acc: Vec<f64> = Vec::new();

    for &(model, rate) in &models {
        for (c, &channel) in DEFAULT_CHANNELS.iter().enumerate() {
            let base = 1.0 + c as f64 * 0.35;
            for &lead in &lead_times {
                let err = rmse(lead, base, rate) * (1.0 + rng.gauss(0.0, 0.01));
                let acc = (1.0 - err / (12.0 * base)).clamp(0.0, 1.0);
                all_model.push(model);
                all_channel.push(channel);
                all_lead.push(lead);
                all_rmse.push(err);
                all_acc.push(acc);
            }
        }
    }

    // Write CSV
    let csv_path = "sample_scores.csv";
    let mut csv_writer = csv::Writer::from_path(csv_path).context("creating CSV output")?;
    csv_writer.write_record(["model", "channel", "lead_time", "acc", "rmse"])?;
    for i in 0..all_model.len() {
        csv_writer.write_record([
            all_model[i].to_string(),
            all_channel[i].to_string(),
            format!("{:.1}", all_lead[i]),
            all_acc[i].to_string(),
            all_rmse[i].to_string(),
        ])?;
    }
    csv_writer.flush()?;

    let row_count = all_model.len();
    let schema = Arc::new(Schema::new(vec![
        Field::new("model", DataType::Utf8, false),
        Field::new("channel", DataType::Utf8, false),
        Field::new("lead_time", DataType::Float64, false),
        Field::new("acc", DataType::Float64, false),
        Field::new("rmse", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(all_model)),
            Arc::new(StringArray::from(all_channel)),
            Arc::new(Float64Array::from(all_lead)),
            Arc::new(Float64Array::from(all_acc)),
            Arc::new(Float64Array::from(all_rmse)),
        ],
    )
    .context("building record batch")?;

    // Write Parquet
    let parquet_path = "sample_scores.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    println!(
        "Wrote {} score rows ({} models × {} channels × {} lead times) to {parquet_path} and {csv_path}",
        row_count,
        models.len(),
        DEFAULT_CHANNELS.len(),
        lead_times.len()
    );
    Ok(())
}
