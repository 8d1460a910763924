use anyhow::{Context, Result};
use dbf_stream::{
    DbfReader, DbfResult, DbfRow, FieldBinding, FromRow, TableBinding, resolve_field,
};

/// A typical municipality row out of a public-registry DBF export.
#[derive(Debug, Default)]
struct Municipality {
    code: String,
    name: String,
    population: i64,
    area: f64,
    checksum: String,
}

static MUNICIPALITY_BINDING: TableBinding = TableBinding {
    table: "MUNICIPALITIES",
    fields: &[
        FieldBinding::new("code").column("CODMUN").primary_key(),
        FieldBinding::new("name").column("NOMEMUN"),
        FieldBinding::new("population").column("POPULACAO"),
        FieldBinding::new("area").column("AREA"),
        FieldBinding::new("checksum").ignored(),
    ],
};

impl FromRow for Municipality {
    fn binding() -> &'static TableBinding {
        &MUNICIPALITY_BINDING
    }

    fn from_row(row: &DbfRow) -> DbfResult<Self> {
        let fields = Self::binding().fields;
        Ok(Self {
            code: resolve_field(row, &fields[0])?,
            name: resolve_field(row, &fields[1])?,
            population: resolve_field(row, &fields[2])?,
            area: resolve_field(row, &fields[3])?,
            checksum: Default::default(),
        })
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .context("usage: typed_records <municipalities.dbf>")?;

    let mut reader = DbfReader::open(&path)?;
    println!("📂 {path}: {} records", reader.max_rows());

    let mut ok = 0usize;
    let mut failed = 0usize;
    for record in reader.records::<Municipality>() {
        match record {
            Ok(m) => {
                println!(
                    "  ✅ {} {} (pop {}, {} km²)",
                    m.code, m.name, m.population, m.area
                );
                ok += 1;
            }
            Err(e) => {
                eprintln!("  ❌ {e}");
                failed += 1;
            }
        }
    }

    println!("\n🎉 {ok} mapped, {failed} failed");
    Ok(())
}
