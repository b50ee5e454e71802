use super::models::{NewPickup, PickupSchedule};
use super::{DbPool, DbPoolEnum};

pub async fn create_pickup(pool: &DbPool, new: NewPickup) -> anyhow::Result<PickupSchedule> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => sqlite::create_pickup(&*p.get()?, &new),
        DbPoolEnum::Oracle(p) => oracle::create_pickup(&*p.get()?, &new),
    })
    .await?
}

pub async fn list_pickups(pool: &DbPool) -> anyhow::Result<Vec<PickupSchedule>> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => sqlite::list_pickups(&*p.get()?),
        DbPoolEnum::Oracle(p) => oracle::list_pickups(&*p.get()?),
    })
    .await?
}

pub async fn get_pickup(pool: &DbPool, id: i64) -> anyhow::Result<Option<PickupSchedule>> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => sqlite::get_pickup(&*p.get()?, id),
        DbPoolEnum::Oracle(p) => oracle::get_pickup(&*p.get()?, id),
    })
    .await?
}

pub async fn delete_pickup(pool: &DbPool, id: i64) -> anyhow::Result<bool> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => sqlite::delete_pickup(&*p.get()?, id),
        DbPoolEnum::Oracle(p) => oracle::delete_pickup(&*p.get()?, id),
    })
    .await?
}

pub async fn count_pickups(pool: &DbPool) -> anyhow::Result<i64> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => sqlite::count_pickups(&*p.get()?),
        DbPoolEnum::Oracle(p) => oracle::count_pickups(&*p.get()?),
    })
    .await?
}

#[derive(Debug, Clone)]
struct RawPickup {
    id: i64,
    scheduled_time: Option<String>,
    status: Option<String>,
    food_item_id: Option<i64>,
    charity_id: Option<i64>,
}

const COLUMNS: &str = "id, scheduled_time, status, food_item_id, charity_id";

pub(crate) mod sqlite {
    use super::super::models::{NewPickup, PickupSchedule};
    use super::super::{food, text_to_ts, ts_to_text, users};
    use super::{RawPickup, COLUMNS};
    use rusqlite::{params, Connection, OptionalExtension};

    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<RawPickup> {
        Ok(RawPickup {
            id: row.get(0)?,
            scheduled_time: row.get(1)?,
            status: row.get(2)?,
            food_item_id: row.get(3)?,
            charity_id: row.get(4)?,
        })
    }

    fn hydrate(conn: &Connection, raw: RawPickup) -> anyhow::Result<PickupSchedule> {
        Ok(PickupSchedule {
            id: raw.id,
            scheduled_time: text_to_ts(raw.scheduled_time),
            status: raw.status,
            food_item: raw
                .food_item_id
                .map(|id| food::sqlite::get_food_item(conn, id))
                .transpose()?
                .flatten(),
            charity: raw
                .charity_id
                .map(|id| users::sqlite::get_user(conn, id))
                .transpose()?
                .flatten(),
        })
    }

    pub(crate) fn create_pickup(conn: &Connection, new: &NewPickup) -> anyhow::Result<PickupSchedule> {
        conn.execute(
            "INSERT INTO pickup_schedules (scheduled_time, status, food_item_id, charity_id) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                ts_to_text(new.scheduled_time),
                new.status,
                new.food_item_id,
                new.charity_id
            ],
        )?;
        let raw = RawPickup {
            id: conn.last_insert_rowid(),
            scheduled_time: ts_to_text(new.scheduled_time),
            status: new.status.clone(),
            food_item_id: new.food_item_id,
            charity_id: new.charity_id,
        };
        hydrate(conn, raw)
    }

    pub(crate) fn list_pickups(conn: &Connection) -> anyhow::Result<Vec<PickupSchedule>> {
        let mut stmt =
            conn.prepare(&format!("SELECT {COLUMNS} FROM pickup_schedules ORDER BY id"))?;
        let raws = stmt
            .query_map([], from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        raws.into_iter().map(|raw| hydrate(conn, raw)).collect()
    }

    pub(crate) fn get_pickup(conn: &Connection, id: i64) -> anyhow::Result<Option<PickupSchedule>> {
        let raw = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM pickup_schedules WHERE id = ?1"),
                params![id],
                from_row,
            )
            .optional()?;
        raw.map(|raw| hydrate(conn, raw)).transpose()
    }

    pub(crate) fn delete_pickup(conn: &Connection, id: i64) -> anyhow::Result<bool> {
        let deleted = conn.execute("DELETE FROM pickup_schedules WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    pub(crate) fn count_pickups(conn: &Connection) -> anyhow::Result<i64> {
        Ok(conn.query_row("SELECT COUNT(*) FROM pickup_schedules", [], |row| row.get(0))?)
    }
}

pub(crate) mod oracle {
    use super::super::models::{NewPickup, PickupSchedule};
    use super::super::{food, text_to_ts, ts_to_text, users};
    use super::{RawPickup, COLUMNS};
    use r2d2_oracle::oracle::sql_type::OracleType;
    use r2d2_oracle::oracle::{Connection, Error as OracleError, Row};

    fn from_row(row: &Row) -> anyhow::Result<RawPickup> {
        Ok(RawPickup {
            id: row.get(0)?,
            scheduled_time: row.get(1)?,
            status: row.get(2)?,
            food_item_id: row.get(3)?,
            charity_id: row.get(4)?,
        })
    }

    fn hydrate(conn: &Connection, raw: RawPickup) -> anyhow::Result<PickupSchedule> {
        Ok(PickupSchedule {
            id: raw.id,
            scheduled_time: text_to_ts(raw.scheduled_time),
            status: raw.status,
            food_item: raw
                .food_item_id
                .map(|id| food::oracle::get_food_item(conn, id))
                .transpose()?
                .flatten(),
            charity: raw
                .charity_id
                .map(|id| users::oracle::get_user(conn, id))
                .transpose()?
                .flatten(),
        })
    }

    pub(crate) fn create_pickup(conn: &Connection, new: &NewPickup) -> anyhow::Result<PickupSchedule> {
        let scheduled_time = ts_to_text(new.scheduled_time);
        let result = (|| {
            let mut stmt = conn
                .statement(
                    "INSERT INTO pickup_schedules \
                     (scheduled_time, status, food_item_id, charity_id) \
                     VALUES (:scheduled_time, :status, :food_item_id, :charity_id) \
                     RETURNING id INTO :id",
                )
                .build()?;
            stmt.execute_named(&[
                ("scheduled_time", &scheduled_time),
                ("status", &new.status),
                ("food_item_id", &new.food_item_id),
                ("charity_id", &new.charity_id),
                ("id", &OracleType::Int64),
            ])?;
            stmt.returned_values("id")?
                .into_iter()
                .next()
                .ok_or_else(|| anyhow::anyhow!("insert returned no id"))
        })();
        match result {
            Ok(id) => {
                let pickup = hydrate(
                    conn,
                    RawPickup {
                        id,
                        scheduled_time,
                        status: new.status.clone(),
                        food_item_id: new.food_item_id,
                        charity_id: new.charity_id,
                    },
                )?;
                conn.commit()?;
                Ok(pickup)
            }
            Err(e) => {
                let _ = conn.rollback();
                Err(e)
            }
        }
    }

    pub(crate) fn list_pickups(conn: &Connection) -> anyhow::Result<Vec<PickupSchedule>> {
        let rows = conn.query(
            &format!("SELECT {COLUMNS} FROM pickup_schedules ORDER BY id"),
            &[],
        )?;
        let mut raws = Vec::new();
        for row in rows {
            raws.push(from_row(&row?)?);
        }
        raws.into_iter().map(|raw| hydrate(conn, raw)).collect()
    }

    pub(crate) fn get_pickup(conn: &Connection, id: i64) -> anyhow::Result<Option<PickupSchedule>> {
        match conn.query_row(
            &format!("SELECT {COLUMNS} FROM pickup_schedules WHERE id = :1"),
            &[&id],
        ) {
            Ok(row) => Ok(Some(hydrate(conn, from_row(&row)?)?)),
            Err(OracleError::NoDataFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn delete_pickup(conn: &Connection, id: i64) -> anyhow::Result<bool> {
        let result = conn.execute("DELETE FROM pickup_schedules WHERE id = :1", &[&id]);
        match result {
            Ok(stmt) => {
                let deleted = stmt.row_count()? > 0;
                conn.commit()?;
                Ok(deleted)
            }
            Err(e) => {
                let _ = conn.rollback();
                Err(e.into())
            }
        }
    }

    pub(crate) fn count_pickups(conn: &Connection) -> anyhow::Result<i64> {
        Ok(conn.query_row_as::<i64>("SELECT COUNT(*) FROM pickup_schedules", &[])?)
    }
}
