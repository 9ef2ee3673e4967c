// Standalone benchmark for the columnar tokenizer
//
// Run: cargo bench --bench tokenize_bench
//
// Measures tokenization throughput across:
//   - Plain numeric tables (the fast path)
//   - Tables with quoted fields
//   - Whitespace-delimited tables with stripping
//   - Various sizes (1K, 10K, 100K rows)

use std::time::{Duration, Instant};

use coltok::{Tokenizer, TokenizerConfig};

/// Generate a plain comma-separated numeric table.
fn generate_plain(num_rows: usize, num_cols: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(num_rows * num_cols * 8);
    for row in 0..num_rows {
        for col in 0..num_cols {
            if col > 0 {
                out.push(b',');
            }
            out.extend_from_slice(format!("{}", row * num_cols + col).as_bytes());
        }
        out.push(b'\n');
    }
    out
}

/// Generate a table where every third field is quoted and contains the
/// delimiter.
fn generate_quoted(num_rows: usize, num_cols: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(num_rows * num_cols * 12);
    for row in 0..num_rows {
        for col in 0..num_cols {
            if col > 0 {
                out.push(b',');
            }
            if col % 3 == 0 {
                out.extend_from_slice(format!("\"v,{row},{col}\"").as_bytes());
            } else {
                out.extend_from_slice(format!("value_{row}_{col}").as_bytes());
            }
        }
        out.push(b'\n');
    }
    out
}

/// Generate a space-delimited table with ragged padding.
fn generate_whitespace(num_rows: usize, num_cols: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(num_rows * num_cols * 10);
    for row in 0..num_rows {
        for col in 0..num_cols {
            if col > 0 {
                for _ in 0..(1 + (row + col) % 3) {
                    out.push(b' ');
                }
            }
            out.extend_from_slice(format!("{}", row + col).as_bytes());
        }
        out.push(b'\n');
    }
    out
}

fn bench_one(name: &str, input: &[u8], config: TokenizerConfig, num_cols: usize, iters: usize) {
    // Warm up.
    let mut t = Tokenizer::new(config);
    t.set_source(input);
    t.tokenize(None, false, num_cols).expect("warmup tokenize failed");
    let rows = t.num_rows();

    let mut total = Duration::ZERO;
    for _ in 0..iters {
        let mut t = Tokenizer::new(config);
        t.set_source(input);
        let start = Instant::now();
        t.tokenize(None, false, num_cols).expect("tokenize failed");
        total += start.elapsed();
        assert_eq!(t.num_rows(), rows);
    }

    let avg = total / iters as u32;
    let mb = input.len() as f64 / (1024.0 * 1024.0);
    let mbps = mb / avg.as_secs_f64();
    println!("{name:<40} {rows:>8} rows  {avg:>10.3?}/iter  {mbps:>8.1} MB/s");
}

fn main() {
    let config = TokenizerConfig {
        comment: Some(b'#'),
        ..Default::default()
    };
    let ws_config = TokenizerConfig {
        delimiter: b' ',
        ..config
    };

    println!("== plain numeric tables ==");
    for &rows in &[1_000usize, 10_000, 100_000] {
        let input = generate_plain(rows, 8);
        bench_one(&format!("plain/{rows}"), &input, config, 8, 20);
    }

    println!("== quoted tables ==");
    for &rows in &[1_000usize, 10_000, 100_000] {
        let input = generate_quoted(rows, 8);
        bench_one(&format!("quoted/{rows}"), &input, config, 8, 20);
    }

    println!("== whitespace-delimited tables ==");
    for &rows in &[1_000usize, 10_000, 100_000] {
        let input = generate_whitespace(rows, 8);
        bench_one(&format!("whitespace/{rows}"), &input, ws_config, 8, 20);
    }
}
