use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify schema.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    agora_db::health_check(&pool).await.unwrap();

    let roles: Vec<String> = sqlx::query_scalar("SELECT name FROM roles ORDER BY name")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(roles, vec!["admin".to_string(), "user".to_string()]);
}

/// The moderations view is queryable on an empty database.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_moderations_view_exists(pool: PgPool) {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM moderations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}
