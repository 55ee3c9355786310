use chrono::NaiveDateTime;
use lunara::config::{Admin, Database, DbPoolConfig};
use lunara::database::migrations;
use lunara::types::id::{marker::UserMarker, Id};
use lunara::types::Sensitive;
use lunara::App;
use sqlx::{Connection as _, Executor as _, PgConnection};
use std::future::Future;
use std::num::{NonZeroU32, NonZeroU64};
use std::time::{SystemTime, UNIX_EPOCH};

/// Runs `callback` against a freshly created database on the server
/// behind `DATABASE_URL`, then drops that database again.
///
/// When `DATABASE_URL` is not set the test is skipped with a notice
/// so the suite stays green without a running Postgres. A test that
/// panics leaves its `_lunara_test_*` database behind; clean those
/// up manually.
pub async fn with_test_app<F, Fut>(callback: F)
where
    F: FnOnce(App) -> Fut,
    Fut: Future<Output = ()>,
{
    let Ok(base_url) = std::env::var("DATABASE_URL") else {
        eprintln!("skipping: DATABASE_URL is not set");
        return;
    };

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();

    let db_name = generate_db_name();
    let mut admin_conn = PgConnection::connect(&base_url)
        .await
        .expect("failed to connect to the database behind DATABASE_URL");

    admin_conn
        .execute(format!(r#"CREATE DATABASE "{db_name}""#).as_str())
        .await
        .expect("failed to create test database");

    let test_url = replace_db_name(&base_url, &db_name);

    let mut setup_conn = PgConnection::connect(&test_url)
        .await
        .expect("failed to connect to the test database");
    migrations::run_pending(&mut setup_conn)
        .await
        .expect("failed to apply migrations");
    setup_conn
        .close()
        .await
        .expect("failed to close setup connection");

    let app = App::new(test_config(&test_url))
        .await
        .expect("failed to initialize App");

    callback(app.clone()).await;
    app.shutdown().await;

    admin_conn
        .execute(format!(r#"DROP DATABASE "{db_name}""#).as_str())
        .await
        .expect("failed to drop test database");
    admin_conn.close().await.ok();
}

fn generate_db_name() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock went backwards")
        .as_nanos();

    format!("_lunara_test_{}_{nanos}", std::process::id())
}

fn replace_db_name(base_url: &str, db_name: &str) -> String {
    let mut url = url::Url::parse(base_url).expect("DATABASE_URL must be a valid URL");
    url.set_path(db_name);
    url.to_string()
}

fn test_config(url: &str) -> Admin {
    Admin {
        db: Database {
            primary: DbPoolConfig {
                min_idle: None,
                pool_size: NonZeroU32::new(2).expect("pool size must be nonzero"),
                url: Sensitive::new(url.to_string()),
            },
            enforce_tls: false,
            timeout_secs: NonZeroU64::new(5).expect("timeout must be nonzero"),
        },
    }
}

pub async fn insert_user(
    app: &App,
    chat_id: i64,
    username: Option<&str>,
    registration_date: Option<NaiveDateTime>,
) -> Id<UserMarker> {
    let mut conn = app.db_write().await.expect("failed to acquire connection");

    sqlx::query_scalar::<_, Id<UserMarker>>(
        r#"INSERT INTO "users" (chat_id, username, registration_date)
           VALUES ($1, $2, $3) RETURNING id"#,
    )
    .bind(chat_id)
    .bind(username)
    .bind(registration_date)
    .fetch_one(&mut *conn)
    .await
    .expect("failed to insert user")
}

pub async fn insert_cycle(
    app: &App,
    user_id: Id<UserMarker>,
    date: chrono::NaiveDate,
    is_menstruation: bool,
) {
    let mut conn = app.db_write().await.expect("failed to acquire connection");

    sqlx::query(r#"INSERT INTO "cycles" (user_id, date, is_menstruation) VALUES ($1, $2, $3)"#)
        .bind(user_id)
        .bind(date)
        .bind(is_menstruation)
        .execute(&mut *conn)
        .await
        .expect("failed to insert cycle");
}

pub async fn insert_activity(app: &App, user_id: Id<UserMarker>, date: chrono::NaiveDate) {
    let mut conn = app.db_write().await.expect("failed to acquire connection");

    sqlx::query(r#"INSERT INTO "sexual_activities" (user_id, date) VALUES ($1, $2)"#)
        .bind(user_id)
        .bind(date)
        .execute(&mut *conn)
        .await
        .expect("failed to insert activity");
}

pub async fn count_cycles(app: &App, user_id: Id<UserMarker>) -> i64 {
    let mut conn = app.db_read().await.expect("failed to acquire connection");

    sqlx::query_scalar::<_, i64>(r#"SELECT count(*) FROM "cycles" WHERE user_id = $1"#)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await
        .expect("failed to count cycles")
}

pub async fn count_activities(app: &App, user_id: Id<UserMarker>) -> i64 {
    let mut conn = app.db_read().await.expect("failed to acquire connection");

    sqlx::query_scalar::<_, i64>(r#"SELECT count(*) FROM "sexual_activities" WHERE user_id = $1"#)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await
        .expect("failed to count activities")
}
