// Canonical reference data seeding from CSV.
//
// Expected header: code,name,parent_code (parent_code empty for provinces).
// Each level loads in one transaction: a bad row anywhere in the file leaves
// the level exactly as it was, so scoped joins never see a partial set.

use idnb_core::Level;
use rusqlite::{params, Connection};

use crate::error::StoreError;

/// Delete all canonical data, children first so references stay valid.
pub fn clear_all(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "BEGIN;
         DELETE FROM villages;
         DELETE FROM districts;
         DELETE FROM regencies;
         DELETE FROM provinces;
         COMMIT;",
    )?;
    Ok(())
}

/// Load canonical areas for one level from CSV text. Returns rows inserted.
pub fn seed_level(conn: &Connection, level: Level, csv_data: &str) -> Result<usize, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| StoreError::Csv(e.to_string()))?
        .clone();
    let idx = |name: &str| -> Result<usize, StoreError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| StoreError::Csv(format!("missing column '{name}'")))
    };
    let code_idx = idx("code")?;
    let name_idx = idx("name")?;
    let parent_idx = if level == Level::Province {
        None
    } else {
        Some(idx("parent_code")?)
    };

    let sql = if level == Level::Province {
        format!("INSERT INTO {} (code, name) VALUES (?1, ?2)", level.table())
    } else {
        format!(
            "INSERT INTO {} (code, name, parent_code) VALUES (?1, ?2, ?3)",
            level.table()
        )
    };

    conn.execute("BEGIN TRANSACTION", [])?;
    let result = insert_rows(conn, level, &sql, &mut reader, code_idx, name_idx, parent_idx);
    match result {
        Ok(n) => {
            conn.execute("COMMIT", [])?;
            Ok(n)
        }
        Err(e) => {
            let _ = conn.execute("ROLLBACK", []);
            Err(e)
        }
    }
}

fn insert_rows(
    conn: &Connection,
    level: Level,
    sql: &str,
    reader: &mut csv::Reader<&[u8]>,
    code_idx: usize,
    name_idx: usize,
    parent_idx: Option<usize>,
) -> Result<usize, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let mut inserted = 0usize;

    for record in reader.records() {
        let record = record.map_err(|e| StoreError::Csv(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let code = record.get(code_idx).unwrap_or("").trim();
        let name = record.get(name_idx).unwrap_or("").trim();
        // Widths count the dot separators too ("31.75.02" is 8 chars)
        if code.len() != level.code_width() {
            return Err(StoreError::InvalidSeedRow {
                line,
                reason: format!(
                    "code '{code}' is not {} chars wide for {level}",
                    level.code_width()
                ),
            });
        }
        if name.is_empty() {
            return Err(StoreError::InvalidSeedRow {
                line,
                reason: "empty name".into(),
            });
        }

        match parent_idx {
            None => stmt.execute(params![code, name])?,
            Some(pi) => {
                let parent = record.get(pi).unwrap_or("").trim();
                if parent.is_empty() {
                    return Err(StoreError::InvalidSeedRow {
                        line,
                        reason: format!("missing parent_code for {level}"),
                    });
                }
                stmt.execute(params![code, name, parent])?
            }
        };
        inserted += 1;
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas;
    use crate::schema::open_memory;

    #[test]
    fn seed_provinces_and_children() {
        let conn = open_memory().unwrap();
        let n = seed_level(&conn, Level::Province, "code,name\n31,DKI Jakarta\n32,Jawa Barat\n")
            .unwrap();
        assert_eq!(n, 2);

        let n = seed_level(
            &conn,
            Level::Regency,
            "code,name,parent_code\n31.75,Kota Jakarta Timur,31\n",
        )
        .unwrap();
        assert_eq!(n, 1);
        assert_eq!(areas::count(&conn, Level::Regency).unwrap(), 1);
    }

    #[test]
    fn seed_rejects_bad_code_width() {
        let conn = open_memory().unwrap();
        let err = seed_level(&conn, Level::Province, "code,name\n123,Too Wide\n").unwrap_err();
        assert!(matches!(err, StoreError::InvalidSeedRow { .. }));
        // Transaction rolled back: nothing inserted
        assert_eq!(areas::count(&conn, Level::Province).unwrap(), 0);
    }

    #[test]
    fn seed_rejects_missing_parent() {
        let conn = open_memory().unwrap();
        seed_level(&conn, Level::Province, "code,name\n31,DKI Jakarta\n").unwrap();
        let err = seed_level(
            &conn,
            Level::Regency,
            "code,name,parent_code\n31.75,Kota Jakarta Timur,\n",
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::InvalidSeedRow { .. }));
    }

    #[test]
    fn failed_seed_leaves_the_level_empty_even_on_large_files() {
        let conn = open_memory().unwrap();
        seed_level(&conn, Level::Province, "code,name\n31,DKI Jakarta\n").unwrap();
        seed_level(
            &conn,
            Level::Regency,
            "code,name,parent_code\n31.75,Kota Jakarta Timur,31\n",
        )
        .unwrap();
        seed_level(
            &conn,
            Level::District,
            "code,name,parent_code\n31.75.02,Makasar,31.75\n",
        )
        .unwrap();

        // Well over a thousand valid rows, then one broken row at the end
        let mut csv = String::from("code,name,parent_code\n");
        for i in 0..1500 {
            csv.push_str(&format!("31.75.02.{i:04},Desa {i},31.75.02\n"));
        }
        csv.push_str("bad,Broken,31.75.02\n");

        let err = seed_level(&conn, Level::Village, &csv).unwrap_err();
        assert!(matches!(err, StoreError::InvalidSeedRow { .. }));
        assert_eq!(areas::count(&conn, Level::Village).unwrap(), 0);
    }

    #[test]
    fn clear_all_empties_every_level() {
        let conn = open_memory().unwrap();
        seed_level(&conn, Level::Province, "code,name\n31,DKI Jakarta\n").unwrap();
        seed_level(
            &conn,
            Level::Regency,
            "code,name,parent_code\n31.75,Kota Jakarta Timur,31\n",
        )
        .unwrap();
        clear_all(&conn).unwrap();
        assert_eq!(areas::count(&conn, Level::Province).unwrap(), 0);
        assert_eq!(areas::count(&conn, Level::Regency).unwrap(), 0);
    }
}
