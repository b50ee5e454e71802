use super::models::{DonationLog, DonationLogPatch};
use super::{DbPool, DbPoolEnum};

/// A donation log row as stored: reference ids plus RFC 3339 timestamp text.
/// `id: None` marks an in-flight record constructed during a claim that has
/// not been persisted yet.
#[derive(Debug, Clone)]
pub(crate) struct RawLog {
    pub id: Option<i64>,
    pub donor_id: Option<i64>,
    pub charity_id: Option<i64>,
    pub food_item_id: Option<i64>,
    pub donated_at: Option<String>,
    pub claimed_at: Option<String>,
}

pub async fn create_donation_log(
    pool: &DbPool,
    patch: DonationLogPatch,
) -> anyhow::Result<DonationLog> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => sqlite::create_donation_log(&*p.get()?, &patch),
        DbPoolEnum::Oracle(p) => oracle::create_donation_log(&*p.get()?, &patch),
    })
    .await?
}

/// Partial update: every field the patch supplies overwrites the stored one,
/// a missing field leaves it unchanged. Returns `None` when `id` is unknown.
pub async fn update_donation_log(
    pool: &DbPool,
    id: i64,
    patch: DonationLogPatch,
) -> anyhow::Result<Option<DonationLog>> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => {
            let mut conn = p.get()?;
            sqlite::update_donation_log(&mut conn, id, &patch)
        }
        DbPoolEnum::Oracle(p) => oracle::update_donation_log(&*p.get()?, id, &patch),
    })
    .await?
}

pub async fn list_donation_logs(pool: &DbPool) -> anyhow::Result<Vec<DonationLog>> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => sqlite::list_donation_logs(&*p.get()?),
        DbPoolEnum::Oracle(p) => oracle::list_donation_logs(&*p.get()?),
    })
    .await?
}

pub async fn count_donation_logs(pool: &DbPool) -> anyhow::Result<i64> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => sqlite::count_donation_logs(&*p.get()?),
        DbPoolEnum::Oracle(p) => oracle::count_donation_logs(&*p.get()?),
    })
    .await?
}

pub async fn count_claimed_donations(pool: &DbPool) -> anyhow::Result<i64> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => sqlite::count_claimed_donations(&*p.get()?),
        DbPoolEnum::Oracle(p) => oracle::count_claimed_donations(&*p.get()?),
    })
    .await?
}

pub async fn total_food_quantity(pool: &DbPool) -> anyhow::Result<i64> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => sqlite::total_food_quantity(&*p.get()?),
        DbPoolEnum::Oracle(p) => oracle::total_food_quantity(&*p.get()?),
    })
    .await?
}

/// Atomically claims a food item for a charity. At most one claim ever
/// succeeds per food item: the decision and the write happen in a single
/// transaction that holds an exclusive lock on the item's donation log row
/// (or, when none exists yet, on the food item row itself), so concurrent
/// attempts serialize and re-evaluate the claimed check on fresh state.
///
/// All rejection causes return `Ok(None)` with no state change: unknown food
/// item, unknown charity, or an existing claim.
pub async fn claim_food(
    pool: &DbPool,
    food_item_id: i64,
    charity_id: i64,
) -> anyhow::Result<Option<DonationLog>> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => {
            let mut conn = p.get()?;
            sqlite::claim_food(&mut conn, food_item_id, charity_id)
        }
        DbPoolEnum::Oracle(p) => oracle::claim_food(&*p.get()?, food_item_id, charity_id),
    })
    .await?
}

const COLUMNS: &str = "id, donor_id, charity_id, food_item_id, donated_at, claimed_at";

const QUANTITY_SQL: &str = "SELECT COALESCE(SUM(f.quantity), 0) \
     FROM donation_logs d JOIN food_items f ON f.id = d.food_item_id";

pub(crate) mod sqlite {
    use super::super::models::{DonationLog, DonationLogPatch};
    use super::super::{food, now_text, text_to_ts, ts_to_text, users};
    use super::{RawLog, COLUMNS, QUANTITY_SQL};
    use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<RawLog> {
        Ok(RawLog {
            id: row.get(0)?,
            donor_id: row.get(1)?,
            charity_id: row.get(2)?,
            food_item_id: row.get(3)?,
            donated_at: row.get(4)?,
            claimed_at: row.get(5)?,
        })
    }

    fn get_raw(conn: &Connection, id: i64) -> anyhow::Result<Option<RawLog>> {
        Ok(conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM donation_logs WHERE id = ?1"),
                params![id],
                from_row,
            )
            .optional()?)
    }

    fn insert_raw(conn: &Connection, raw: &RawLog) -> anyhow::Result<i64> {
        conn.execute(
            "INSERT INTO donation_logs \
             (donor_id, charity_id, food_item_id, donated_at, claimed_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                raw.donor_id,
                raw.charity_id,
                raw.food_item_id,
                raw.donated_at,
                raw.claimed_at
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn hydrate(conn: &Connection, raw: RawLog) -> anyhow::Result<DonationLog> {
        Ok(DonationLog {
            id: raw.id.unwrap_or_default(),
            donor: raw
                .donor_id
                .map(|id| users::sqlite::get_user(conn, id))
                .transpose()?
                .flatten(),
            charity: raw
                .charity_id
                .map(|id| users::sqlite::get_user(conn, id))
                .transpose()?
                .flatten(),
            food_item: raw
                .food_item_id
                .map(|id| food::sqlite::get_food_item(conn, id))
                .transpose()?
                .flatten(),
            donated_at: text_to_ts(raw.donated_at),
            claimed_at: text_to_ts(raw.claimed_at),
        })
    }

    pub(crate) fn create_donation_log(
        conn: &Connection,
        patch: &DonationLogPatch,
    ) -> anyhow::Result<DonationLog> {
        let raw = RawLog {
            id: None,
            donor_id: patch.donor_id,
            charity_id: patch.charity_id,
            food_item_id: patch.food_item_id,
            donated_at: Some(ts_to_text(patch.donated_at).unwrap_or_else(now_text)),
            claimed_at: ts_to_text(patch.claimed_at),
        };
        let id = insert_raw(conn, &raw)?;
        hydrate(conn, RawLog { id: Some(id), ..raw })
    }

    pub(crate) fn update_donation_log(
        conn: &mut Connection,
        id: i64,
        patch: &DonationLogPatch,
    ) -> anyhow::Result<Option<DonationLog>> {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let Some(existing) = get_raw(&tx, id)? else {
            return Ok(None);
        };

        let merged = RawLog {
            id: Some(id),
            donor_id: patch.donor_id.or(existing.donor_id),
            charity_id: patch.charity_id.or(existing.charity_id),
            food_item_id: patch.food_item_id.or(existing.food_item_id),
            donated_at: ts_to_text(patch.donated_at).or(existing.donated_at),
            claimed_at: ts_to_text(patch.claimed_at).or(existing.claimed_at),
        };
        tx.execute(
            "UPDATE donation_logs SET donor_id = ?1, charity_id = ?2, food_item_id = ?3, \
             donated_at = ?4, claimed_at = ?5 WHERE id = ?6",
            params![
                merged.donor_id,
                merged.charity_id,
                merged.food_item_id,
                merged.donated_at,
                merged.claimed_at,
                id
            ],
        )?;
        let updated = hydrate(&tx, merged)?;
        tx.commit()?;
        Ok(Some(updated))
    }

    pub(crate) fn list_donation_logs(conn: &Connection) -> anyhow::Result<Vec<DonationLog>> {
        let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM donation_logs ORDER BY id"))?;
        let raws = stmt
            .query_map([], from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        raws.into_iter().map(|raw| hydrate(conn, raw)).collect()
    }

    pub(crate) fn count_donation_logs(conn: &Connection) -> anyhow::Result<i64> {
        Ok(conn.query_row("SELECT COUNT(*) FROM donation_logs", [], |row| row.get(0))?)
    }

    pub(crate) fn count_claimed_donations(conn: &Connection) -> anyhow::Result<i64> {
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM donation_logs WHERE claimed_at IS NOT NULL",
            [],
            |row| row.get(0),
        )?)
    }

    pub(crate) fn total_food_quantity(conn: &Connection) -> anyhow::Result<i64> {
        Ok(conn.query_row(QUANTITY_SQL, [], |row| row.get(0))?)
    }

    // SQLite has no row-level locks; an IMMEDIATE transaction takes the
    // database write lock up front, which serializes claim attempts just the
    // same. Blocked writers wait on the busy handler and then re-read.
    pub(crate) fn claim_food(
        conn: &mut Connection,
        food_item_id: i64,
        charity_id: i64,
    ) -> anyhow::Result<Option<DonationLog>> {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing = tx
            .query_row(
                &format!("SELECT {COLUMNS} FROM donation_logs WHERE food_item_id = ?1"),
                params![food_item_id],
                from_row,
            )
            .optional()?;

        let raw = match existing {
            Some(raw) => raw,
            None => {
                let Some(item) = food::sqlite::get_food_item(&tx, food_item_id)? else {
                    return Ok(None);
                };
                // Donor is inferred from the item's stored donor id, but only
                // when that user actually resolves; absence is not fatal.
                let donor_id = match item.donor_id {
                    Some(did) => users::sqlite::get_user(&tx, did)?.map(|u| u.id),
                    None => None,
                };
                RawLog {
                    id: None,
                    donor_id,
                    charity_id: None,
                    food_item_id: Some(food_item_id),
                    donated_at: None,
                    claimed_at: None,
                }
            }
        };

        // The linchpin check: only valid because the write lock is held.
        if raw.charity_id.is_some() && raw.claimed_at.is_some() {
            return Ok(None);
        }

        if users::sqlite::get_user(&tx, charity_id)?.is_none() {
            return Ok(None);
        }

        let claimed_at = now_text();
        let id = match raw.id {
            Some(id) => {
                tx.execute(
                    "UPDATE donation_logs SET charity_id = ?1, claimed_at = ?2 WHERE id = ?3",
                    params![charity_id, claimed_at, id],
                )?;
                id
            }
            None => insert_raw(
                &tx,
                &RawLog {
                    charity_id: Some(charity_id),
                    claimed_at: Some(claimed_at),
                    ..raw
                },
            )?,
        };

        let saved = get_raw(&tx, id)?
            .ok_or_else(|| anyhow::anyhow!("donation log missing after claim"))?;
        let saved = hydrate(&tx, saved)?;
        tx.commit()?;
        Ok(Some(saved))
    }
}

pub(crate) mod oracle {
    use super::super::models::{DonationLog, DonationLogPatch, FoodItem};
    use super::super::{food, now_text, text_to_ts, ts_to_text, users};
    use super::{RawLog, COLUMNS, QUANTITY_SQL};
    use r2d2_oracle::oracle::sql_type::OracleType;
    use r2d2_oracle::oracle::{Connection, Error as OracleError, Row};

    fn from_row(row: &Row) -> anyhow::Result<RawLog> {
        Ok(RawLog {
            id: row.get(0)?,
            donor_id: row.get(1)?,
            charity_id: row.get(2)?,
            food_item_id: row.get(3)?,
            donated_at: row.get(4)?,
            claimed_at: row.get(5)?,
        })
    }

    fn get_raw(conn: &Connection, id: i64) -> anyhow::Result<Option<RawLog>> {
        match conn.query_row(
            &format!("SELECT {COLUMNS} FROM donation_logs WHERE id = :1"),
            &[&id],
        ) {
            Ok(row) => Ok(Some(from_row(&row)?)),
            Err(OracleError::NoDataFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn insert_raw(conn: &Connection, raw: &RawLog) -> anyhow::Result<i64> {
        let mut stmt = conn
            .statement(
                "INSERT INTO donation_logs \
                 (donor_id, charity_id, food_item_id, donated_at, claimed_at) \
                 VALUES (:donor_id, :charity_id, :food_item_id, :donated_at, :claimed_at) \
                 RETURNING id INTO :id",
            )
            .build()?;
        stmt.execute_named(&[
            ("donor_id", &raw.donor_id),
            ("charity_id", &raw.charity_id),
            ("food_item_id", &raw.food_item_id),
            ("donated_at", &raw.donated_at),
            ("claimed_at", &raw.claimed_at),
            ("id", &OracleType::Int64),
        ])?;
        stmt.returned_values("id")?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("insert returned no id"))
    }

    fn hydrate(conn: &Connection, raw: RawLog) -> anyhow::Result<DonationLog> {
        Ok(DonationLog {
            id: raw.id.unwrap_or_default(),
            donor: raw
                .donor_id
                .map(|id| users::oracle::get_user(conn, id))
                .transpose()?
                .flatten(),
            charity: raw
                .charity_id
                .map(|id| users::oracle::get_user(conn, id))
                .transpose()?
                .flatten(),
            food_item: raw
                .food_item_id
                .map(|id| food::oracle::get_food_item(conn, id))
                .transpose()?
                .flatten(),
            donated_at: text_to_ts(raw.donated_at),
            claimed_at: text_to_ts(raw.claimed_at),
        })
    }

    pub(crate) fn create_donation_log(
        conn: &Connection,
        patch: &DonationLogPatch,
    ) -> anyhow::Result<DonationLog> {
        let raw = RawLog {
            id: None,
            donor_id: patch.donor_id,
            charity_id: patch.charity_id,
            food_item_id: patch.food_item_id,
            donated_at: Some(ts_to_text(patch.donated_at).unwrap_or_else(now_text)),
            claimed_at: ts_to_text(patch.claimed_at),
        };
        let result = insert_raw(conn, &raw);
        match result {
            Ok(id) => {
                let log = hydrate(conn, RawLog { id: Some(id), ..raw })?;
                conn.commit()?;
                Ok(log)
            }
            Err(e) => {
                let _ = conn.rollback();
                Err(e)
            }
        }
    }

    pub(crate) fn update_donation_log(
        conn: &Connection,
        id: i64,
        patch: &DonationLogPatch,
    ) -> anyhow::Result<Option<DonationLog>> {
        let result = (|| {
            let Some(existing) = get_raw(conn, id)? else {
                return Ok(None);
            };
            let merged = RawLog {
                id: Some(id),
                donor_id: patch.donor_id.or(existing.donor_id),
                charity_id: patch.charity_id.or(existing.charity_id),
                food_item_id: patch.food_item_id.or(existing.food_item_id),
                donated_at: ts_to_text(patch.donated_at).or(existing.donated_at),
                claimed_at: ts_to_text(patch.claimed_at).or(existing.claimed_at),
            };
            conn.execute(
                "UPDATE donation_logs SET donor_id = :1, charity_id = :2, food_item_id = :3, \
                 donated_at = :4, claimed_at = :5 WHERE id = :6",
                &[
                    &merged.donor_id,
                    &merged.charity_id,
                    &merged.food_item_id,
                    &merged.donated_at,
                    &merged.claimed_at,
                    &id,
                ],
            )?;
            Ok(Some(hydrate(conn, merged)?))
        })();
        match result {
            Ok(Some(log)) => {
                conn.commit()?;
                Ok(Some(log))
            }
            Ok(None) => {
                conn.rollback()?;
                Ok(None)
            }
            Err(e) => {
                let _ = conn.rollback();
                Err(e)
            }
        }
    }

    pub(crate) fn list_donation_logs(conn: &Connection) -> anyhow::Result<Vec<DonationLog>> {
        let rows = conn.query(
            &format!("SELECT {COLUMNS} FROM donation_logs ORDER BY id"),
            &[],
        )?;
        let mut raws = Vec::new();
        for row in rows {
            raws.push(from_row(&row?)?);
        }
        raws.into_iter().map(|raw| hydrate(conn, raw)).collect()
    }

    pub(crate) fn count_donation_logs(conn: &Connection) -> anyhow::Result<i64> {
        Ok(conn.query_row_as::<i64>("SELECT COUNT(*) FROM donation_logs", &[])?)
    }

    pub(crate) fn count_claimed_donations(conn: &Connection) -> anyhow::Result<i64> {
        Ok(conn.query_row_as::<i64>(
            "SELECT COUNT(*) FROM donation_logs WHERE claimed_at IS NOT NULL",
            &[],
        )?)
    }

    pub(crate) fn total_food_quantity(conn: &Connection) -> anyhow::Result<i64> {
        Ok(conn.query_row_as::<i64>(QUANTITY_SQL, &[])?)
    }

    fn get_food_item_for_update(
        conn: &Connection,
        id: i64,
    ) -> anyhow::Result<Option<FoodItem>> {
        match conn.query_row(
            "SELECT id, name, quantity, pickup_location, expiry_time, donor_phone, donor_id \
             FROM food_items WHERE id = :1 FOR UPDATE",
            &[&id],
        ) {
            Ok(row) => Ok(Some(FoodItem {
                id: row.get(0)?,
                name: row.get(1)?,
                quantity: row.get(2)?,
                pickup_location: row.get(3)?,
                expiry_time: row.get(4)?,
                donor_phone: row.get(5)?,
                donor_id: row.get(6)?,
            })),
            Err(OracleError::NoDataFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn claim_food(
        conn: &Connection,
        food_item_id: i64,
        charity_id: i64,
    ) -> anyhow::Result<Option<DonationLog>> {
        let outcome = claim_food_locked(conn, food_item_id, charity_id);
        match outcome {
            Ok(Some(log)) => {
                conn.commit()?;
                Ok(Some(log))
            }
            Ok(None) => {
                conn.rollback()?;
                Ok(None)
            }
            Err(e) => {
                let _ = conn.rollback();
                Err(e)
            }
        }
    }

    fn get_log_for_update(
        conn: &Connection,
        food_item_id: i64,
    ) -> anyhow::Result<Option<RawLog>> {
        match conn.query_row(
            &format!("SELECT {COLUMNS} FROM donation_logs WHERE food_item_id = :1 FOR UPDATE"),
            &[&food_item_id],
        ) {
            Ok(row) => Ok(Some(from_row(&row)?)),
            Err(OracleError::NoDataFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // Row lock on the donation log (or on the food item when no log exists
    // yet) is held until commit/rollback; concurrent claims for the same
    // item block here and then see the fresh claimed state.
    fn claim_food_locked(
        conn: &Connection,
        food_item_id: i64,
        charity_id: i64,
    ) -> anyhow::Result<Option<DonationLog>> {
        let raw = match get_log_for_update(conn, food_item_id)? {
            Some(raw) => raw,
            None => {
                let Some(item) = get_food_item_for_update(conn, food_item_id)? else {
                    return Ok(None);
                };
                // A FOR UPDATE on a row that does not exist locks nothing, so
                // a competing claim may have inserted the log while this one
                // waited on the item lock. Re-read now that the lock is held.
                match get_log_for_update(conn, food_item_id)? {
                    Some(raw) => raw,
                    None => {
                        let donor_id = match item.donor_id {
                            Some(did) => users::oracle::get_user(conn, did)?.map(|u| u.id),
                            None => None,
                        };
                        RawLog {
                            id: None,
                            donor_id,
                            charity_id: None,
                            food_item_id: Some(food_item_id),
                            donated_at: None,
                            claimed_at: None,
                        }
                    }
                }
            }
        };

        if raw.charity_id.is_some() && raw.claimed_at.is_some() {
            return Ok(None);
        }

        if users::oracle::get_user(conn, charity_id)?.is_none() {
            return Ok(None);
        }

        let claimed_at = now_text();
        let id = match raw.id {
            Some(id) => {
                conn.execute(
                    "UPDATE donation_logs SET charity_id = :1, claimed_at = :2 WHERE id = :3",
                    &[&charity_id, &claimed_at, &id],
                )?;
                id
            }
            None => insert_raw(
                conn,
                &RawLog {
                    charity_id: Some(charity_id),
                    claimed_at: Some(claimed_at),
                    ..raw
                },
            )?,
        };

        let saved = get_raw(conn, id)?
            .ok_or_else(|| anyhow::anyhow!("donation log missing after claim"))?;
        Ok(Some(hydrate(conn, saved)?))
    }
}
