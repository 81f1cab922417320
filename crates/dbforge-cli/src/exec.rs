use crate::cli::ExecArgs;
use crate::config;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use dbforge::{DriverRegistry, QueryOutcome, QueryResult, RowIndex};
use std::io::Read;

pub fn run(args: ExecArgs) -> anyhow::Result<()> {
    let sql = if args.sql.trim().is_empty() {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| anyhow::anyhow!("failed to read stdin: {e}"))?;
        buf
    } else {
        args.sql
    };
    let sql = sql.trim();
    if sql.is_empty() {
        anyhow::bail!("no SQL provided (pass it as arguments or pipe it to stdin)");
    }

    let config = config::load(&args.config, args.database)?;
    let registry = DriverRegistry::with_builtin();
    if !registry.contains(&config.driver) {
        anyhow::bail!(
            "driver '{}' is not available in this build (available: {})",
            config.driver,
            registry.names().join(", ")
        );
    }
    let driver = registry.open(&config)?;

    match driver.query(sql)? {
        QueryOutcome::Rows(mut rows) => {
            println!("{}", render_rows(rows.as_mut()));
            println!("({} rows)", rows.row_count());
        }
        QueryOutcome::Done { affected_rows } => {
            println!("OK, {affected_rows} rows affected");
        }
    }
    Ok(())
}

fn render_rows(rows: &mut dyn QueryResult) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            rows.column_names()
                .iter()
                .map(|name| Cell::new(name).add_attribute(Attribute::Bold)),
        );

    while let Some(row) = rows.fetch_row(RowIndex::Num) {
        table.add_row(row.values().iter().map(|cell| match cell {
            Some(text) => Cell::new(text),
            None => Cell::new("NULL").fg(Color::DarkGrey),
        }));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbforge::MemoryResult;

    #[test]
    fn table_shows_nulls() {
        let mut result = MemoryResult::new(["id", "email"]).with_row(["1", "a@example.com"]);
        result.push_row(vec![Some("2".to_string()), None]);

        let rendered = render_rows(&mut result).to_string();
        assert!(rendered.contains("email"));
        assert!(rendered.contains("a@example.com"));
        assert!(rendered.contains("NULL"));
    }
}
