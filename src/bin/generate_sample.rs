use chrono::{Days, NaiveDate};
use serde::Serialize;

/// One CSV record in the layout the viewer expects.
#[derive(Serialize)]
struct Record {
    #[serde(rename = "Fecha")]
    fecha: String,
    #[serde(rename = "Graph_ID")]
    graph_id: &'static str,
    #[serde(rename = "DP_Number")]
    dp_number: u32,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Displacement_cm")]
    displacement_cm: f64,
    #[serde(rename = "Precipitation_mm")]
    precipitation_mm: f64,
}

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

    /// Uniform in [0, 1).
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Daily rainfall: mostly dry, occasional storms.
fn rainfall(rng: &mut SimpleRng) -> f64 {
    let roll = rng.next_f64();
    if roll < 0.65 {
        0.0
    } else if roll < 0.9 {
        (rng.next_f64() * 8.0 * 10.0).round() / 10.0
    } else {
        (20.0 + rng.next_f64() * 45.0).round()
    }
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);

    let start = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid start date");
    let days = 120u64;

    // Graph_ID → measurement points and their base creep rate (cm/day).
    let figures: [(&str, &[(u32, f64)]); 3] = [
        ("g1", &[(101, 0.02), (102, 0.035)]),
        ("g2", &[(201, 0.01)]),
        ("g3", &[(301, 0.05), (302, 0.015), (303, 0.03)]),
    ];

    let output_path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(output_path)?;
    let mut rows = 0usize;

    for &(graph_id, points) in &figures {
        let rain: Vec<f64> = (0..days).map(|_| rainfall(&mut rng)).collect();

        for &(dp_number, rate) in points.iter() {
            let mut displacement = 0.0;
            for (day, &mm) in rain.iter().enumerate() {
                let date = start + Days::new(day as u64);
                // Rain accelerates creep; small noise on every reading.
                displacement += rate * (1.0 + mm / 10.0) + (rng.next_f64() - 0.5) * 0.01;

                writer.serialize(Record {
                    fecha: date.format("%Y-%m-%d").to_string(),
                    graph_id,
                    dp_number,
                    date: date.format("%Y-%m-%d").to_string(),
                    displacement_cm: (displacement * 1000.0).round() / 1000.0,
                    precipitation_mm: mm,
                })?;
                rows += 1;
            }
        }
    }

    // One malformed date to exercise the missing-date path.
    writer.serialize(Record {
        fecha: "not-a-date".to_string(),
        graph_id: "g1",
        dp_number: 101,
        date: "not-a-date".to_string(),
        displacement_cm: 0.0,
        precipitation_mm: 0.0,
    })?;
    rows += 1;

    writer.flush()?;
    println!("Wrote {rows} rows ({} figures, {days} days) to {output_path}", figures.len());
    Ok(())
}
