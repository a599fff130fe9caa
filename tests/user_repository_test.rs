use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use noticeboard::{
    auth::AuthService,
    domain::{Role, User},
    repository::{SqliteUserRepository, UserRepository},
};

async fn setup() -> anyhow::Result<SqliteUserRepository> {
    let pool = SqlitePool::connect(":memory:").await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(SqliteUserRepository::new(pool))
}

fn make_user(email: &str, roles: Vec<Role>) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        name: "Test User".to_string(),
        email: email.to_string(),
        password_hash: "not-a-real-hash".to_string(),
        roles,
        student_id: None,
        department: Some("CS".to_string()),
        is_verified: true,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_user_crud_and_role_roundtrip() -> anyhow::Result<()> {
    let repo = setup().await?;

    let user = make_user("staff@example.com", vec![Role::Staff, Role::Admin]);
    let created = repo.create(user.clone()).await?;
    assert_eq!(created.email, "staff@example.com");
    assert_eq!(created.roles, vec![Role::Staff, Role::Admin]);

    let by_id = repo.find_by_id(user.id).await?;
    assert!(by_id.is_some());

    let by_email = repo.find_by_email("staff@example.com").await?;
    assert_eq!(by_email.unwrap().id, user.id);

    assert!(repo.find_by_email("nobody@example.com").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_password_hashing() -> anyhow::Result<()> {
    let password = "my_secure_password";
    let hash = AuthService::hash_password(password).await?;

    assert!(AuthService::verify_password(password, &hash).await?);
    assert!(!AuthService::verify_password("wrong_password", &hash).await?);

    Ok(())
}
