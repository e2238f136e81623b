use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Days, NaiveDate};
use parquet::arrow::ArrowWriter;

const ROWS: usize = 1000;
const TAX_RATE: f64 = 0.05;

const CITIES: [&str; 3] = ["Yangon", "Mandalay", "Naypyitaw"];
const PRODUCT_LINES: [&str; 6] = [
    "Health and beauty",
    "Electronic accessories",
    "Home and lifestyle",
    "Sports and travel",
    "Food and beverages",
    "Fashion accessories",
];
const CUSTOMER_TYPES: [&str; 2] = ["Member", "Normal"];

/// SplitMix64: one word of state, good enough for sample data.
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)` from the top 53 bits.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * f64::EPSILON / 2.0
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn round_to(v: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (v * f).round() / f
}

struct Sale {
    date: NaiveDate,
    city: &'static str,
    product_line: &'static str,
    customer_type: &'static str,
    unit_price: f64,
    quantity: i64,
    tax: f64,
    total: f64,
    cogs: f64,
    rating: f64,
}

fn generate(rng: &mut SimpleRng, start: NaiveDate) -> Vec<Sale> {
    (0..ROWS)
        .map(|_| {
            let date = start + Days::new(rng.next_u64() % 89);
            let customer_type = rng.pick(&CUSTOMER_TYPES);
            let unit_price = round_to(rng.uniform(10.0, 100.0), 2);
            // members buy a little more per visit
            let max_qty = if customer_type == "Member" { 11 } else { 10 };
            let quantity = (rng.next_u64() % max_qty + 1) as i64;
            let cogs = round_to(unit_price * quantity as f64, 2);
            let tax = round_to(cogs * TAX_RATE, 4);
            Sale {
                date,
                city: rng.pick(&CITIES),
                product_line: rng.pick(&PRODUCT_LINES),
                customer_type,
                unit_price,
                quantity,
                tax,
                total: round_to(cogs + tax, 4),
                cogs,
                rating: round_to(rng.uniform(4.0, 10.0), 1),
            }
        })
        .collect()
}

fn write_csv(path: &str, sales: &[Sale]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV output")?;
    writer.write_record([
        "Date",
        "City",
        "Product line",
        "Customer type",
        "Unit price",
        "Quantity",
        "Tax 5%",
        "Total",
        "cogs",
        "gross income",
        "Rating",
    ])?;
    for s in sales {
        writer.write_record([
            s.date.format("%-m/%-d/%Y").to_string(),
            s.city.to_string(),
            s.product_line.to_string(),
            s.customer_type.to_string(),
            s.unit_price.to_string(),
            s.quantity.to_string(),
            s.tax.to_string(),
            s.total.to_string(),
            s.cogs.to_string(),
            s.tax.to_string(),
            s.rating.to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

fn write_parquet(path: &str, sales: &[Sale]) -> Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("epoch date")?;
    let strings = |f: fn(&Sale) -> &'static str| -> StringArray {
        StringArray::from(sales.iter().map(f).collect::<Vec<_>>())
    };
    let floats = |f: fn(&Sale) -> f64| -> Float64Array {
        Float64Array::from(sales.iter().map(f).collect::<Vec<_>>())
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("Date", DataType::Date32, false),
        Field::new("City", DataType::Utf8, false),
        Field::new("Product line", DataType::Utf8, false),
        Field::new("Customer type", DataType::Utf8, false),
        Field::new("Unit price", DataType::Float64, false),
        Field::new("Quantity", DataType::Int64, false),
        Field::new("Tax 5%", DataType::Float64, false),
        Field::new("Total", DataType::Float64, false),
        Field::new("cogs", DataType::Float64, false),
        Field::new("gross income", DataType::Float64, false),
        Field::new("Rating", DataType::Float64, false),
    ]));

    let dates = Date32Array::from(
        sales
            .iter()
            .map(|s| (s.date - epoch).num_days() as i32)
            .collect::<Vec<_>>(),
    );
    let quantities = Int64Array::from(sales.iter().map(|s| s.quantity).collect::<Vec<_>>());

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(dates),
            Arc::new(strings(|s| s.city)),
            Arc::new(strings(|s| s.product_line)),
            Arc::new(strings(|s| s.customer_type)),
            Arc::new(floats(|s| s.unit_price)),
            Arc::new(quantities),
            Arc::new(floats(|s| s.tax)),
            Arc::new(floats(|s| s.total)),
            Arc::new(floats(|s| s.cogs)),
            Arc::new(floats(|s| s.tax)),
            Arc::new(floats(|s| s.rating)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating Parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating Parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing Parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2019, 1, 1).context("start date")?;
    let sales = generate(&mut rng, start);

    write_csv("data.csv", &sales)?;
    write_parquet("data.parquet", &sales)?;

    println!("Wrote {} sales to data.csv and data.parquet", sales.len());
    Ok(())
}
