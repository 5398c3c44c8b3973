// Read-only queries against the canonical reference hierarchy.

use idnb_core::{CanonicalArea, Level};
use rusqlite::{Connection, OptionalExtension, Row};

use crate::error::StoreError;

/// Select list for one level. Provinces have no parent_code column.
fn columns(level: Level, alias: &str) -> String {
    if level == Level::Province {
        format!("{alias}.code, {alias}.name, NULL")
    } else {
        format!("{alias}.code, {alias}.name, {alias}.parent_code")
    }
}

fn area_from_row(row: &Row<'_>) -> rusqlite::Result<CanonicalArea> {
    Ok(CanonicalArea {
        code: row.get(0)?,
        name: row.get(1)?,
        parent_code: row.get(2)?,
    })
}

/// Case-insensitive exact code lookup at one level.
pub fn find_by_code(
    conn: &Connection,
    level: Level,
    code: &str,
) -> Result<Option<CanonicalArea>, StoreError> {
    let sql = format!(
        "SELECT {} FROM {} t WHERE t.code = ?1 COLLATE NOCASE LIMIT 1",
        columns(level, "t"),
        level.table()
    );
    let area = conn
        .query_row(&sql, [code], area_from_row)
        .optional()?;
    Ok(area)
}

/// Single best case-insensitive name-prefix match at one level.
///
/// "Best" is the shortest matching name (closest to the prefix), ties broken
/// by code, so the result never depends on table iteration order.
pub fn find_by_name_prefix(
    conn: &Connection,
    level: Level,
    prefix: &str,
) -> Result<Option<CanonicalArea>, StoreError> {
    let sql = format!(
        "SELECT {} FROM {} t WHERE t.name LIKE ?1 \
         ORDER BY LENGTH(t.name), t.code LIMIT 1",
        columns(level, "t"),
        level.table()
    );
    let pattern = format!("{prefix}%");
    let area = conn
        .query_row(&sql, [pattern], area_from_row)
        .optional()?;
    Ok(area)
}

/// Scoped candidate query: join level L to every ancestor level up to
/// province, filtering each ancestor's name by a case-insensitive substring
/// match against the corresponding raw parent name, and L's own name against
/// `raw_name`. Returns every area whose full ancestor-name chain plausibly
/// matches, ordered by code.
///
/// A missing raw name anywhere in the chain yields no candidates: the parent
/// join condition is how the hierarchy invariant is enforced, so it is never
/// weakened to a partial chain.
pub fn find_candidates(
    conn: &Connection,
    level: Level,
    raw_name: Option<&str>,
    parent_raw_names: &[Option<&str>],
) -> Result<Vec<CanonicalArea>, StoreError> {
    let ancestors = level.ancestors();
    debug_assert_eq!(parent_raw_names.len(), ancestors.len());

    let Some(raw_name) = raw_name else {
        return Ok(Vec::new());
    };
    if parent_raw_names.iter().any(|n| n.is_none()) {
        return Ok(Vec::new());
    }

    let mut sql = format!(
        "SELECT {} FROM {} l0",
        columns(level, "l0"),
        level.table()
    );

    // Join upward: l0 -> immediate parent -> ... -> province.
    let mut prev = "l0".to_string();
    for (i, ancestor) in ancestors.iter().enumerate().rev() {
        sql.push_str(&format!(
            " JOIN {} a{i} ON {prev}.parent_code = a{i}.code",
            ancestor.table()
        ));
        prev = format!("a{i}");
    }

    sql.push_str(" WHERE l0.name LIKE ?1");
    let mut params: Vec<String> = vec![format!("%{raw_name}%")];
    for (i, name) in parent_raw_names.iter().enumerate() {
        sql.push_str(&format!(" AND a{i}.name LIKE ?{}", i + 2));
        params.push(format!("%{}%", name.unwrap()));
    }
    sql.push_str(" ORDER BY l0.code");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        rusqlite::params_from_iter(params.iter()),
        area_from_row,
    )?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Number of canonical areas at one level.
pub fn count(conn: &Connection, level: Level) -> Result<i64, StoreError> {
    let sql = format!("SELECT COUNT(*) FROM {}", level.table());
    let n = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::open_memory;

    fn seed_jakarta(conn: &Connection) {
        conn.execute_batch(
            "INSERT INTO provinces (code, name) VALUES
                ('31', 'DKI Jakarta'),
                ('32', 'Jawa Barat');
             INSERT INTO regencies (code, name, parent_code) VALUES
                ('31.71', 'Kota Jakarta Pusat', '31'),
                ('31.74', 'Kota Jakarta Selatan', '31'),
                ('31.75', 'Kota Jakarta Timur', '31'),
                ('32.01', 'Kabupaten Bogor', '32');
             INSERT INTO districts (code, name, parent_code) VALUES
                ('31.75.02', 'Makasar', '31.75'),
                ('32.01.01', 'Nanggung', '32.01');
             INSERT INTO villages (code, name, parent_code) VALUES
                ('31.75.02.1003', 'Kebon Pala', '31.75.02'),
                ('32.01.01.2001', 'Malasari', '32.01.01');",
        )
        .unwrap();
    }

    #[test]
    fn find_by_code_is_case_insensitive() {
        let conn = open_memory().unwrap();
        seed_jakarta(&conn);
        conn.execute(
            "INSERT INTO regencies (code, name, parent_code) VALUES ('31.7x', 'Test', '31')",
            [],
        )
        .unwrap();
        let area = find_by_code(&conn, Level::Regency, "31.7X").unwrap().unwrap();
        assert_eq!(area.code, "31.7x");
        assert!(find_by_code(&conn, Level::Regency, "99.99").unwrap().is_none());
    }

    #[test]
    fn name_prefix_prefers_shortest_match() {
        let conn = open_memory().unwrap();
        conn.execute_batch(
            "INSERT INTO provinces (code, name) VALUES
                ('53', 'Nusa Tenggara Timur'),
                ('52', 'Nusa Tenggara Barat'),
                ('99', 'Nusa');",
        )
        .unwrap();
        let area = find_by_name_prefix(&conn, Level::Province, "nusa").unwrap().unwrap();
        assert_eq!(area.code, "99");
    }

    #[test]
    fn candidates_scoped_by_full_ancestor_chain() {
        let conn = open_memory().unwrap();
        seed_jakarta(&conn);
        let hits = find_candidates(
            &conn,
            Level::Village,
            Some("PALA"),
            &[Some("JAKARTA"), Some("TIMUR"), Some("MAKASAR")],
        )
        .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "31.75.02.1003");
        assert_eq!(hits[0].parent_code.as_deref(), Some("31.75.02"));

        // Wrong province scope: no candidates even though the village name matches
        let hits = find_candidates(
            &conn,
            Level::Village,
            Some("PALA"),
            &[Some("JAWA"), Some("TIMUR"), Some("MAKASAR")],
        )
        .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn missing_parent_name_yields_no_candidates() {
        let conn = open_memory().unwrap();
        seed_jakarta(&conn);
        let hits = find_candidates(
            &conn,
            Level::Regency,
            Some("JAKARTA"),
            &[None],
        )
        .unwrap();
        assert!(hits.is_empty());

        let hits = find_candidates(&conn, Level::Regency, None, &[Some("JAKARTA")]).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn candidates_ordered_by_code() {
        let conn = open_memory().unwrap();
        seed_jakarta(&conn);
        let hits = find_candidates(
            &conn,
            Level::Regency,
            Some("JAKARTA"),
            &[Some("JAKARTA")],
        )
        .unwrap();
        let codes: Vec<_> = hits.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["31.71", "31.74", "31.75"]);
    }
}
