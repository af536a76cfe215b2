//! Seeded sample-data source for demos and tests.
//!
//! Tables follow a fixed shape: `Column 1` is an auto-incrementing integer
//! id, `Column 2` a decimal, every further column a short random text.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::spec::{EnumCellValue, SpecDataset, SpecTable};

const C_TEXT_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const N_COLUMN_MIN: usize = 2;
const N_ID_SEED_MAX: i64 = 98;

/// Shape of one generated table: `(name, column_count, record_count)`.
const L_DEFAULT_TABLES: [(&str, usize, usize); 3] =
    [("T One", 4, 2), ("T Two", 5, 4), ("T Three", 7, 6)];

/// Deterministic generator of sample tables and datasets.
#[derive(Debug, Clone)]
pub struct SampleSource {
    rng: StdRng,
}

impl SampleSource {
    /// Source seeded with `seed`; equal seeds produce equal data.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate one table. `column_count` is raised to at least 2.
    pub fn table(&mut self, name: &str, column_count: usize, record_count: usize) -> SpecTable {
        let n_cols = column_count.max(N_COLUMN_MIN);
        let mut table = SpecTable::new(name, (1..=n_cols).map(|idx| format!("Column {idx}")));
        let n_id_seed = self.rng.random_range(0..N_ID_SEED_MAX);

        for n_idx_row in 0..record_count {
            let n_number = self.rng.random_range(0..6 * (n_idx_row + 2));
            let mut l_values = Vec::with_capacity(n_cols);
            l_values.push(EnumCellValue::Integer(n_id_seed + n_idx_row as i64));
            l_values.push(EnumCellValue::Decimal(n_number as f64));
            for n_col in 3..=n_cols {
                let n_len = if n_col % 2 == 0 {
                    derive_text_len(n_number, 7)
                } else {
                    derive_text_len(n_number, 4)
                };
                l_values.push(EnumCellValue::Text(self.random_text(n_len / 2)));
            }
            table.rows.push(l_values);
        }
        table
    }

    /// Generate dataset `Set {index}`.
    ///
    /// `table_count` of 0 or 3 yields the three fixed-shape tables `T One`,
    /// `T Two`, `T Three`; any other count yields `Table k` with
    /// `k * table_count * 2` rows each.
    pub fn dataset(&mut self, index: usize, table_count: usize) -> SpecDataset {
        let l_tables: Vec<SpecTable> = if table_count == 0 || table_count == 3 {
            L_DEFAULT_TABLES
                .iter()
                .map(|(name, n_cols, n_rows)| self.table(name, *n_cols, *n_rows))
                .collect()
        } else {
            (1..=table_count)
                .map(|n_idx| {
                    self.table(&format!("Table {n_idx}"), 4, n_idx * table_count * 2)
                })
                .collect()
        };
        SpecDataset::named(format!("Set {index}"), l_tables)
    }

    /// Generate `set_count` datasets named `Set 1`, `Set 2`, ...
    pub fn datasets(&mut self, set_count: usize, table_count: usize) -> Vec<SpecDataset> {
        (1..=set_count)
            .map(|n_idx| self.dataset(n_idx, table_count))
            .collect()
    }

    fn random_text(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| char::from(C_TEXT_ALPHABET[self.rng.random_range(0..C_TEXT_ALPHABET.len())]))
            .collect()
    }
}

fn derive_text_len(number: usize, modulus: usize) -> usize {
    if number % modulus == 0 {
        number / modulus
    } else {
        number % modulus
    }
}
