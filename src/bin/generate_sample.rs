use std::sync::Arc;

use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// (main category, sub-categories, brands, price range)
const CATALOG: &[(&str, &[&str], &[&str], (f64, f64))] = &[
    (
        "Clothing",
        &["Women's Clothing", "Men's Clothing", "Kids' Clothing"],
        &["Alisha", "Biba", "Roadster"],
        (199.0, 2999.0),
    ),
    (
        "Footwear",
        &["Women's Footwear", "Men's Footwear"],
        &["AW", "Bata", "Sparx"],
        (299.0, 4999.0),
    ),
    (
        "Furniture",
        &["Living Room", "Bedroom"],
        &["FabHomeDecor", "Durian"],
        (4999.0, 45999.0),
    ),
    (
        "Kitchen & Dining",
        &["Cookware", "Mugs"],
        &["Prestige", "Pigeon", "Borosil"],
        (149.0, 5999.0),
    ),
    (
        "Mobiles & Accessories",
        &["Cases & Covers", "Chargers"],
        &["Smartpro", "Ambrane"],
        (99.0, 1999.0),
    ),
];

const ITEMS: &[&str] = &[
    "Cotton Shirt",
    "Solid Shorts",
    "Casual Shoes",
    "Sofa Bed",
    "Steel Mug",
    "Back Cover",
    "Pressure Cooker",
    "Kurta",
];

const RATINGS: &[&str] = &[
    "No rating available",
    "No rating available",
    "3",
    "3.5",
    "4",
    "4.2",
    "5",
];

struct Row {
    id: String,
    crawl_timestamp: Option<String>,
    url: String,
    name: String,
    category_tree: String,
    retail_price: f64,
    discounted_price: Option<f64>,
    rating: String,
    brand: Option<String>,
}

fn generate(rng: &mut SimpleRng, n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| {
            let (main, subs, brands, (lo, hi)) = *rng.pick(CATALOG);
            let sub = rng.pick(subs);
            let brand = rng.pick(brands).to_string();
            let retail = (lo + (hi - lo) * rng.next_f64()).round();
            // Mostly 0-70% off, with a few markups.
            let off = if rng.chance(0.03) { -0.1 } else { 0.7 * rng.next_f64() };
            let discounted = (retail * (1.0 - off)).round();
            let day = 1 + rng.next_u64() % 28;
            let hour = rng.next_u64() % 24;
            let id = format!("p{i:05}");
            Row {
                crawl_timestamp: (!rng.chance(0.02))
                    .then(|| format!("2016-03-{day:02} {hour:02}:15:00 +0000")),
                url: format!("http://www.example.com/{id}"),
                name: format!("{brand} {}", rng.pick(ITEMS)),
                category_tree: format!("[\"{main} >> {sub}\"]"),
                retail_price: retail,
                discounted_price: (!rng.chance(0.01)).then_some(discounted),
                rating: rng.pick(RATINGS).to_string(),
                brand: (!rng.chance(0.02)).then_some(brand),
                id,
            }
        })
        .collect()
}

fn write_csv(rows: &[Row], path: &str) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create CSV file");
    writer
        .write_record([
            "uniq_id",
            "crawl_timestamp",
            "product_url",
            "product_name",
            "product_category_tree",
            "retail_price",
            "discounted_price",
            "product_rating",
            "brand",
        ])
        .expect("Failed to write header");
    for r in rows {
        writer
            .write_record([
                r.id.clone(),
                r.crawl_timestamp.clone().unwrap_or_default(),
                r.url.clone(),
                r.name.clone(),
                r.category_tree.clone(),
                r.retail_price.to_string(),
                r.discounted_price.map(|d| d.to_string()).unwrap_or_default(),
                r.rating.clone(),
                r.brand.clone().unwrap_or_default(),
            ])
            .expect("Failed to write row");
    }
    writer.flush().expect("Failed to flush CSV");
}

fn write_parquet(rows: &[Row], path: &str) {
    let text =
        |f: fn(&Row) -> Option<&str>| StringArray::from(rows.iter().map(f).collect::<Vec<_>>());
    let prices = |f: fn(&Row) -> Option<f64>| {
        Float64Array::from(rows.iter().map(f).collect::<Vec<_>>())
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("uniq_id", DataType::Utf8, false),
        Field::new("crawl_timestamp", DataType::Utf8, true),
        Field::new("product_url", DataType::Utf8, false),
        Field::new("product_name", DataType::Utf8, false),
        Field::new("product_category_tree", DataType::Utf8, false),
        Field::new("retail_price", DataType::Float64, false),
        Field::new("discounted_price", DataType::Float64, true),
        Field::new("product_rating", DataType::Utf8, false),
        Field::new("brand", DataType::Utf8, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(text(|r| Some(r.id.as_str()))),
            Arc::new(text(|r| r.crawl_timestamp.as_deref())),
            Arc::new(text(|r| Some(r.url.as_str()))),
            Arc::new(text(|r| Some(r.name.as_str()))),
            Arc::new(text(|r| Some(r.category_tree.as_str()))),
            Arc::new(prices(|r| Some(r.retail_price))),
            Arc::new(prices(|r| r.discounted_price)),
            Arc::new(text(|r| Some(r.rating.as_str()))),
            Arc::new(text(|r| r.brand.as_deref())),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng, 2000);

    write_csv(&rows, "sample_catalog.csv");
    write_parquet(&rows, "sample_catalog.parquet");

    println!(
        "Wrote {} products to sample_catalog.csv and sample_catalog.parquet",
        rows.len()
    );
}
