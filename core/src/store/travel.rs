//! Store methods for travel statistics.

use super::{now_stamp, IngestStore};
use crate::{
    error::IngestResult,
    sources::travel::TravelRecord,
    types::{Direction, Month, Year},
};
use rusqlite::{params, types::Type, OptionalExtension, Row};

fn travel_from_row(row: &Row<'_>) -> rusqlite::Result<TravelRecord> {
    let code: String = row.get(3)?;
    let direction = code
        .parse::<Direction>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into()))?;
    Ok(TravelRecord {
        year:         row.get(0)?,
        month:        row.get(1)?,
        country:      row.get(2)?,
        direction,
        departures:   row.get(4)?,
        region:       row.get(5)?,
        country_name: row.get(6)?,
        ratio:        row.get(7)?,
    })
}

const TRAVEL_COLUMNS: &str =
    "year, month, country, direction, departures, region, country_name, ratio";

impl IngestStore {
    /// Insert or overwrite the row for `(year, month, country, direction)`.
    /// A `None` region/country_name keeps whatever was stored before.
    pub fn upsert_travel(&self, record: &TravelRecord) -> IngestResult<()> {
        self.conn.execute(
            "INSERT INTO travel_stat (
                year, month, country, direction, departures,
                region, country_name, ratio, updated_at
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)
            ON CONFLICT(year, month, country, direction) DO UPDATE SET
                departures   = excluded.departures,
                region       = COALESCE(excluded.region, travel_stat.region),
                country_name = COALESCE(excluded.country_name, travel_stat.country_name),
                ratio        = excluded.ratio,
                updated_at   = excluded.updated_at",
            params![
                record.year,
                record.month,
                record.country,
                record.direction.code(),
                record.departures,
                record.region,
                record.country_name,
                record.ratio,
                now_stamp(),
            ],
        )?;
        Ok(())
    }

    pub fn travel_stat(
        &self,
        year:      Year,
        month:     Month,
        country:   &str,
        direction: Direction,
    ) -> IngestResult<Option<TravelRecord>> {
        let record = self.conn.query_row(
            &format!(
                "SELECT {TRAVEL_COLUMNS} FROM travel_stat
                 WHERE year = ?1 AND month = ?2 AND country = ?3 AND direction = ?4"
            ),
            params![year, month, country, direction.code()],
            travel_from_row,
        ).optional()?;
        Ok(record)
    }

    pub fn travel_stats(&self) -> IngestResult<Vec<TravelRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRAVEL_COLUMNS} FROM travel_stat
             ORDER BY year ASC, month ASC, country ASC, direction ASC"
        ))?;
        let rows = stmt.query_map([], travel_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn travel_count(&self) -> IngestResult<i64> {
        self.count("travel_stat")
    }
}
