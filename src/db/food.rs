use super::models::FoodItem;
use super::{DbPool, DbPoolEnum};

pub async fn add_food_item(pool: &DbPool, item: &FoodItem) -> anyhow::Result<FoodItem> {
    let pool = pool.clone();
    let item = item.clone();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => sqlite::add_food_item(&*p.get()?, &item),
        DbPoolEnum::Oracle(p) => oracle::add_food_item(&*p.get()?, &item),
    })
    .await?
}

pub async fn list_food_items(pool: &DbPool) -> anyhow::Result<Vec<FoodItem>> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => sqlite::list_food_items(&*p.get()?),
        DbPoolEnum::Oracle(p) => oracle::list_food_items(&*p.get()?),
    })
    .await?
}

/// Food items with no successful claim recorded against them: no donation
/// log row referencing the item has both a charity and a claim timestamp.
pub async fn list_available_food_items(pool: &DbPool) -> anyhow::Result<Vec<FoodItem>> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => sqlite::list_available_food_items(&*p.get()?),
        DbPoolEnum::Oracle(p) => oracle::list_available_food_items(&*p.get()?),
    })
    .await?
}

pub async fn get_food_item(pool: &DbPool, id: i64) -> anyhow::Result<Option<FoodItem>> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => sqlite::get_food_item(&*p.get()?, id),
        DbPoolEnum::Oracle(p) => oracle::get_food_item(&*p.get()?, id),
    })
    .await?
}

/// Removes the item's donation logs first, then the item itself, in one
/// transaction; donation logs reference food items and must not be orphaned.
/// Returns whether the item existed.
pub async fn delete_food_item(pool: &DbPool, id: i64) -> anyhow::Result<bool> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => {
            let mut conn = p.get()?;
            sqlite::delete_food_item(&mut conn, id)
        }
        DbPoolEnum::Oracle(p) => oracle::delete_food_item(&*p.get()?, id),
    })
    .await?
}

const AVAILABLE_WHERE: &str = "NOT EXISTS (\
     SELECT 1 FROM donation_logs d \
     WHERE d.food_item_id = f.id \
       AND d.charity_id IS NOT NULL \
       AND d.claimed_at IS NOT NULL)";

pub(crate) mod sqlite {
    use super::super::models::FoodItem;
    use super::AVAILABLE_WHERE;
    use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

    const COLUMNS: &str = "id, name, quantity, pickup_location, expiry_time, donor_phone, donor_id";

    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<FoodItem> {
        Ok(FoodItem {
            id: row.get(0)?,
            name: row.get(1)?,
            quantity: row.get(2)?,
            pickup_location: row.get(3)?,
            expiry_time: row.get(4)?,
            donor_phone: row.get(5)?,
            donor_id: row.get(6)?,
        })
    }

    pub(crate) fn add_food_item(conn: &Connection, item: &FoodItem) -> anyhow::Result<FoodItem> {
        conn.execute(
            "INSERT INTO food_items \
             (name, quantity, pickup_location, expiry_time, donor_phone, donor_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                item.name,
                item.quantity,
                item.pickup_location,
                item.expiry_time,
                item.donor_phone,
                item.donor_id
            ],
        )?;
        Ok(FoodItem {
            id: conn.last_insert_rowid(),
            ..item.clone()
        })
    }

    pub(crate) fn list_food_items(conn: &Connection) -> anyhow::Result<Vec<FoodItem>> {
        let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM food_items ORDER BY id"))?;
        let items = stmt
            .query_map([], from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub(crate) fn list_available_food_items(conn: &Connection) -> anyhow::Result<Vec<FoodItem>> {
        let sql = format!(
            "SELECT f.id, f.name, f.quantity, f.pickup_location, f.expiry_time, \
             f.donor_phone, f.donor_id FROM food_items f WHERE {AVAILABLE_WHERE} ORDER BY f.id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map([], from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub(crate) fn get_food_item(conn: &Connection, id: i64) -> anyhow::Result<Option<FoodItem>> {
        Ok(conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM food_items WHERE id = ?1"),
                params![id],
                from_row,
            )
            .optional()?)
    }

    pub(crate) fn delete_food_item(conn: &mut Connection, id: i64) -> anyhow::Result<bool> {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "DELETE FROM donation_logs WHERE food_item_id = ?1",
            params![id],
        )?;
        let deleted = tx.execute("DELETE FROM food_items WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(deleted > 0)
    }
}

pub(crate) mod oracle {
    use super::super::models::FoodItem;
    use super::AVAILABLE_WHERE;
    use r2d2_oracle::oracle::sql_type::OracleType;
    use r2d2_oracle::oracle::{Connection, Error as OracleError, Row};

    const COLUMNS: &str = "id, name, quantity, pickup_location, expiry_time, donor_phone, donor_id";

    fn from_row(row: &Row) -> anyhow::Result<FoodItem> {
        Ok(FoodItem {
            id: row.get(0)?,
            name: row.get(1)?,
            quantity: row.get(2)?,
            pickup_location: row.get(3)?,
            expiry_time: row.get(4)?,
            donor_phone: row.get(5)?,
            donor_id: row.get(6)?,
        })
    }

    pub(crate) fn add_food_item(conn: &Connection, item: &FoodItem) -> anyhow::Result<FoodItem> {
        let mut stmt = conn
            .statement(
                "INSERT INTO food_items \
                 (name, quantity, pickup_location, expiry_time, donor_phone, donor_id) \
                 VALUES (:name, :quantity, :pickup_location, :expiry_time, :donor_phone, :donor_id) \
                 RETURNING id INTO :id",
            )
            .build()?;
        stmt.execute_named(&[
            ("name", &item.name),
            ("quantity", &item.quantity),
            ("pickup_location", &item.pickup_location),
            ("expiry_time", &item.expiry_time),
            ("donor_phone", &item.donor_phone),
            ("donor_id", &item.donor_id),
            ("id", &OracleType::Int64),
        ])?;
        let id: i64 = stmt
            .returned_values("id")?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("insert returned no id"))?;
        conn.commit()?;
        Ok(FoodItem { id, ..item.clone() })
    }

    pub(crate) fn list_food_items(conn: &Connection) -> anyhow::Result<Vec<FoodItem>> {
        let rows = conn.query(&format!("SELECT {COLUMNS} FROM food_items ORDER BY id"), &[])?;
        let mut items = Vec::new();
        for row in rows {
            items.push(from_row(&row?)?);
        }
        Ok(items)
    }

    pub(crate) fn list_available_food_items(conn: &Connection) -> anyhow::Result<Vec<FoodItem>> {
        let sql = format!(
            "SELECT f.id, f.name, f.quantity, f.pickup_location, f.expiry_time, \
             f.donor_phone, f.donor_id FROM food_items f WHERE {AVAILABLE_WHERE} ORDER BY f.id"
        );
        let rows = conn.query(&sql, &[])?;
        let mut items = Vec::new();
        for row in rows {
            items.push(from_row(&row?)?);
        }
        Ok(items)
    }

    pub(crate) fn get_food_item(conn: &Connection, id: i64) -> anyhow::Result<Option<FoodItem>> {
        match conn.query_row(
            &format!("SELECT {COLUMNS} FROM food_items WHERE id = :1"),
            &[&id],
        ) {
            Ok(row) => Ok(Some(from_row(&row)?)),
            Err(OracleError::NoDataFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn delete_food_item(conn: &Connection, id: i64) -> anyhow::Result<bool> {
        let result = (|| {
            conn.execute(
                "DELETE FROM donation_logs WHERE food_item_id = :1",
                &[&id],
            )?;
            conn.execute("DELETE FROM food_items WHERE id = :1", &[&id])
        })();
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
}
