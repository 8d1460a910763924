use anyhow::{Context, Result};
use dbf_stream::DbfReader;

fn main() -> Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .context("usage: dump_dbf <file.dbf>")?;

    let mut reader = DbfReader::open(&path)?;

    println!("📂 {}", path);
    println!("  version:   0x{:02x}", reader.header().version);
    println!("  records:   {}", reader.max_rows());
    println!("  row size:  {} bytes", reader.header().row_size);
    println!("  encoding:  {}", reader.encoding().name());

    println!("\n=== Columns ===");
    for column in reader.column_descriptors() {
        println!(
            "  {:<11} {:?} length {} decimals {}",
            column.name, column.field_type, column.length, column.decimal_count
        );
    }

    println!("\n=== Records ===");
    let mut shown = 0usize;
    for row in reader.rows() {
        match row {
            Ok(row) => {
                let line: Vec<String> = row
                    .iter()
                    .map(|(name, value)| format!("{name}={value}"))
                    .collect();
                println!("  {}", line.join(" | "));
                shown += 1;
            }
            Err(e) => {
                eprintln!("❌ unreadable record: {e}");
            }
        }
    }

    println!("\n🎉 {} records dumped", shown);
    Ok(())
}
