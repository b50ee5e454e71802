use super::models::User;
use super::{DbPool, DbPoolEnum};

pub async fn create_user(pool: &DbPool, user: &User) -> anyhow::Result<User> {
    let pool = pool.clone();
    let user = user.clone();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => sqlite::create_user(&*p.get()?, &user),
        DbPoolEnum::Oracle(p) => oracle::create_user(&*p.get()?, &user),
    })
    .await?
}

pub async fn username_taken(pool: &DbPool, username: &str) -> anyhow::Result<bool> {
    let pool = pool.clone();
    let username = username.to_string();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => sqlite::username_taken(&*p.get()?, &username),
        DbPoolEnum::Oracle(p) => oracle::username_taken(&*p.get()?, &username),
    })
    .await?
}

pub async fn email_taken(pool: &DbPool, email: &str) -> anyhow::Result<bool> {
    let pool = pool.clone();
    let email = email.to_string();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => sqlite::email_taken(&*p.get()?, &email),
        DbPoolEnum::Oracle(p) => oracle::email_taken(&*p.get()?, &email),
    })
    .await?
}

pub async fn list_users(pool: &DbPool) -> anyhow::Result<Vec<User>> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => sqlite::list_users(&*p.get()?),
        DbPoolEnum::Oracle(p) => oracle::list_users(&*p.get()?),
    })
    .await?
}

pub async fn get_user(pool: &DbPool, id: i64) -> anyhow::Result<Option<User>> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => sqlite::get_user(&*p.get()?, id),
        DbPoolEnum::Oracle(p) => oracle::get_user(&*p.get()?, id),
    })
    .await?
}

pub async fn get_user_by_email(pool: &DbPool, email: &str) -> anyhow::Result<Option<User>> {
    let pool = pool.clone();
    let email = email.to_string();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => sqlite::get_user_by_email(&*p.get()?, &email),
        DbPoolEnum::Oracle(p) => oracle::get_user_by_email(&*p.get()?, &email),
    })
    .await?
}

pub async fn count_users(pool: &DbPool) -> anyhow::Result<i64> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || match pool.as_ref() {
        DbPoolEnum::Sqlite(p) => sqlite::count_users(&*p.get()?),
        DbPoolEnum::Oracle(p) => oracle::count_users(&*p.get()?),
    })
    .await?
}

/// Looks up by exact email and compares the password by direct equality.
/// Both inputs are trimmed to avoid whitespace issues. Plaintext comparison
/// is a known weakness; nothing hashes these passwords.
pub async fn authenticate_user(
    pool: &DbPool,
    email: &str,
    password: &str,
) -> anyhow::Result<Option<User>> {
    let email = email.trim().to_string();
    let password = password.trim().to_string();

    let user = get_user_by_email(pool, &email).await?;
    Ok(user.filter(|u| u.password == password))
}

pub(crate) mod sqlite {
    use super::User;
    use rusqlite::{params, Connection, OptionalExtension};

    const COLUMNS: &str = "id, name, username, email, phone, password, user_role";

    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            username: row.get(2)?,
            email: row.get(3)?,
            phone: row.get(4)?,
            password: row.get(5)?,
            role: row.get(6)?,
        })
    }

    pub(crate) fn create_user(conn: &Connection, user: &User) -> anyhow::Result<User> {
        conn.execute(
            "INSERT INTO users (name, username, email, phone, password, user_role) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.name,
                user.username,
                user.email,
                user.phone,
                user.password,
                user.role
            ],
        )?;
        Ok(User {
            id: conn.last_insert_rowid(),
            ..user.clone()
        })
    }

    pub(crate) fn username_taken(conn: &Connection, username: &str) -> anyhow::Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?1",
            params![username],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub(crate) fn email_taken(conn: &Connection, email: &str) -> anyhow::Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub(crate) fn list_users(conn: &Connection) -> anyhow::Result<Vec<User>> {
        let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM users ORDER BY id"))?;
        let users = stmt
            .query_map([], from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    pub(crate) fn get_user(conn: &Connection, id: i64) -> anyhow::Result<Option<User>> {
        Ok(conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                from_row,
            )
            .optional()?)
    }

    pub(crate) fn get_user_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<User>> {
        Ok(conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                from_row,
            )
            .optional()?)
    }

    pub(crate) fn count_users(conn: &Connection) -> anyhow::Result<i64> {
        Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
    }
}

pub(crate) mod oracle {
    use super::User;
    use r2d2_oracle::oracle::sql_type::OracleType;
    use r2d2_oracle::oracle::{Connection, Error as OracleError, Row};

    const COLUMNS: &str = "id, name, username, email, phone, password, user_role";

    fn from_row(row: &Row) -> anyhow::Result<User> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            username: row.get(2)?,
            email: row.get(3)?,
            phone: row.get(4)?,
            password: row.get(5)?,
            role: row.get(6)?,
        })
    }

    pub(crate) fn create_user(conn: &Connection, user: &User) -> anyhow::Result<User> {
        let mut stmt = conn
            .statement(
                "INSERT INTO users (name, username, email, phone, password, user_role) \
                 VALUES (:name, :username, :email, :phone, :password, :user_role) \
                 RETURNING id INTO :id",
            )
            .build()?;
        stmt.execute_named(&[
            ("name", &user.name),
            ("username", &user.username),
            ("email", &user.email),
            ("phone", &user.phone),
            ("password", &user.password),
            ("user_role", &user.role),
            ("id", &OracleType::Int64),
        ])?;
        let id: i64 = stmt
            .returned_values("id")?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("insert returned no id"))?;
        conn.commit()?;
        Ok(User { id, ..user.clone() })
    }

    pub(crate) fn username_taken(conn: &Connection, username: &str) -> anyhow::Result<bool> {
        let count = conn
            .query_row_as::<i64>("SELECT COUNT(*) FROM users WHERE username = :1", &[&username])?;
        Ok(count > 0)
    }

    pub(crate) fn email_taken(conn: &Connection, email: &str) -> anyhow::Result<bool> {
        let count =
            conn.query_row_as::<i64>("SELECT COUNT(*) FROM users WHERE email = :1", &[&email])?;
        Ok(count > 0)
    }

    pub(crate) fn list_users(conn: &Connection) -> anyhow::Result<Vec<User>> {
        let rows = conn.query(&format!("SELECT {COLUMNS} FROM users ORDER BY id"), &[])?;
        let mut users = Vec::new();
        for row in rows {
            users.push(from_row(&row?)?);
        }
        Ok(users)
    }

    pub(crate) fn get_user(conn: &Connection, id: i64) -> anyhow::Result<Option<User>> {
        match conn.query_row(&format!("SELECT {COLUMNS} FROM users WHERE id = :1"), &[&id]) {
            Ok(row) => Ok(Some(from_row(&row)?)),
            Err(OracleError::NoDataFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn get_user_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<User>> {
        match conn.query_row(
            &format!("SELECT {COLUMNS} FROM users WHERE email = :1"),
            &[&email],
        ) {
            Ok(row) => Ok(Some(from_row(&row)?)),
            Err(OracleError::NoDataFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn count_users(conn: &Connection) -> anyhow::Result<i64> {
        Ok(conn.query_row_as::<i64>("SELECT COUNT(*) FROM users", &[])?)
    }
}
