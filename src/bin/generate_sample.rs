//! Write a deterministic synthetic `vehicles_us.csv` for demos.
//!
//! usage: generate_sample [OUTPUT.csv] [ROWS]

use anyhow::{Context, Result};

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

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick an item with probability proportional to its weight.
    fn weighted<'a, T>(&mut self, items: &'a [(T, f64)]) -> &'a T {
        let total: f64 = items.iter().map(|(_, w)| w).sum();
        let mut target = self.next_f64() * total;
        for (item, weight) in items {
            if target < *weight {
                return item;
            }
            target -= weight;
        }
        &items[items.len() - 1].0
    }
}

/// (manufacturer, models, relative frequency, price factor)
const MAKERS: &[(&str, &[&str], f64, f64)] = &[
    ("ford", &["f-150", "focus", "escape", "explorer", "mustang"], 12.0, 1.0),
    ("chevrolet", &["silverado 1500", "malibu", "equinox", "tahoe"], 11.0, 1.0),
    ("toyota", &["camry", "corolla", "tacoma", "rav4", "prius"], 6.0, 1.1),
    ("honda", &["civic", "accord", "cr-v", "pilot"], 4.0, 1.05),
    ("ram", &["1500", "2500"], 4.0, 1.3),
    ("jeep", &["wrangler", "grand cherokee", "liberty"], 3.5, 1.1),
    ("nissan", &["altima", "rogue", "frontier"], 3.0, 0.9),
    ("gmc", &["sierra 1500", "acadia", "yukon"], 2.5, 1.25),
    ("subaru", &["outback", "forester", "impreza"], 1.2, 1.0),
    ("hyundai", &["elantra", "sonata", "santa fe"], 1.2, 0.85),
    ("kia", &["soul", "sorento", "optima"], 0.6, 0.85),
    ("bmw", &["x5", "328i", "525i"], 0.5, 1.4),
    ("acura", &["tl", "mdx"], 0.2, 1.1),
    ("mercedes-benz", &["benz c300", "benz e350"], 0.08, 1.5),
];

const CONDITIONS: &[(&str, f64)] = &[
    ("excellent", 48.0),
    ("good", 39.0),
    ("like new", 9.0),
    ("fair", 3.0),
    ("new", 0.3),
    ("salvage", 0.2),
];

const TYPES: &[(&str, f64)] = &[
    ("SUV", 24.0),
    ("truck", 24.0),
    ("sedan", 23.0),
    ("pickup", 13.0),
    ("coupe", 4.0),
    ("wagon", 3.0),
    ("mini-van", 2.0),
    ("hatchback", 2.0),
    ("van", 1.0),
    ("convertible", 1.0),
    ("other", 0.5),
];

fn condition_factor(condition: &str) -> f64 {
    match condition {
        "new" => 1.6,
        "like new" => 1.3,
        "excellent" => 1.1,
        "good" => 1.0,
        "fair" => 0.6,
        _ => 0.35,
    }
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let output_path = args.next().unwrap_or_else(|| "vehicles_us.csv".to_string());
    let rows: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("row count '{n}' is not a number"))?,
        None => 51_525,
    };

    let mut rng = SimpleRng::new(42);
    let makers: Vec<(usize, f64)> = MAKERS
        .iter()
        .enumerate()
        .map(|(i, (_, _, weight, _))| (i, *weight))
        .collect();

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record([
        "price",
        "model_year",
        "model",
        "condition",
        "cylinders",
        "fuel",
        "odometer",
        "transmission",
        "type",
        "manufacturer",
        "date_posted",
    ])?;

    for _ in 0..rows {
        let &maker_idx = rng.weighted(&makers);
        let (manufacturer, models, _, price_factor) = MAKERS[maker_idx];
        let model = models[(rng.next_u64() % models.len() as u64) as usize];
        let condition = *rng.weighted(CONDITIONS);
        let vehicle_type = *rng.weighted(TYPES);

        let year = (2019.0 - rng.gauss(0.0, 6.0).abs()).round().max(1960.0) as i32;
        let age = f64::from(2019 - year);
        let odometer = (age * 12_000.0 + rng.gauss(0.0, 20_000.0)).max(0.0).round();
        let price = (28_000.0 * price_factor * condition_factor(condition) * 0.88f64.powf(age)
            + rng.gauss(0.0, 1_500.0))
        .max(1.0)
        .round();

        let year_cell = if rng.chance(0.07) {
            String::new()
        } else {
            format!("{year}.0")
        };
        let odometer_cell = if rng.chance(0.15) {
            String::new()
        } else {
            format!("{odometer}")
        };

        writer.write_record([
            format!("{price}"),
            year_cell,
            format!("{manufacturer} {model}"),
            condition.to_string(),
            "6.0".to_string(),
            "gas".to_string(),
            odometer_cell,
            "automatic".to_string(),
            vehicle_type.to_string(),
            manufacturer.to_string(),
            "2018-06-23".to_string(),
        ])?;
    }
    writer.flush()?;

    println!("Wrote {rows} listings to {output_path}");
    Ok(())
}
