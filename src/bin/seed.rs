use chrono::Utc;
use clap::Parser;
use fake::faker::lorem::en::{Paragraph, Sentence};
use fake::Fake;
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

use noticeboard::{
    auth::AuthService,
    domain::{lifecycle, Identity, Notice, NoticeCategory, NoticeStatus, Role, User},
    repository::{
        NoticeRepository, SqliteNoticeRepository, SqliteUserRepository, UserRepository,
    },
};

#[derive(Parser)]
#[command(about = "Seed the notice board database with demo accounts and notices")]
struct Args {
    #[arg(long, default_value = "sqlite:noticeboard.db?mode=rwc")]
    database_url: String,

    #[arg(long, default_value = "admin123")]
    admin_password: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("Starting database seeding...");

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&args.database_url)
        .await?;

    println!("Running migrations...");
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    let user_repo = SqliteUserRepository::new(db_pool.clone());
    let notice_repo = SqliteNoticeRepository::new(db_pool.clone());

    println!("Creating accounts...");

    let admin = create_user(
        &user_repo,
        "Admin User",
        "admin@campus.local",
        &args.admin_password,
        vec![Role::Admin],
    )
    .await?;
    println!("  admin@campus.local / {}", args.admin_password);

    let staff = create_user(
        &user_repo,
        "Priya Staffer",
        "staff@campus.local",
        "staff123",
        vec![Role::Staff],
    )
    .await?;
    println!("  staff@campus.local / staff123");

    create_user(
        &user_repo,
        "Sam Student",
        "student@campus.local",
        "student123",
        vec![Role::Student],
    )
    .await?;
    println!("  student@campus.local / student123");

    println!("Creating notices...");

    let admin_identity = admin.identity();
    let staff_identity = staff.identity();

    // One notice per lifecycle state so every view has something to show.
    let mut published = demo_notice(&admin_identity, NoticeCategory::Academic);
    published.status = NoticeStatus::Published;
    lifecycle::stamp_creation(&mut published, &admin_identity);
    notice_repo.create(published).await?;

    notice_repo
        .create(demo_notice(&staff_identity, NoticeCategory::Events))
        .await?;

    let mut pending = demo_notice(&staff_identity, NoticeCategory::Exam);
    pending.status = NoticeStatus::PendingApproval;
    notice_repo.create(pending).await?;

    let mut rejected = demo_notice(&staff_identity, NoticeCategory::Clubs);
    rejected.status = NoticeStatus::PendingApproval;
    lifecycle::reject(&mut rejected, &admin_identity, Some("Needs a venue confirmed"))?;
    notice_repo.create(rejected).await?;

    println!("Done.");
    Ok(())
}

async fn create_user(
    repo: &SqliteUserRepository,
    name: &str,
    email: &str,
    password: &str,
    roles: Vec<Role>,
) -> anyhow::Result<User> {
    if let Some(existing) = repo.find_by_email(email).await? {
        println!("  {} already exists, skipping", email);
        return Ok(existing);
    }

    let now = Utc::now();
    let user = repo
        .create(User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: AuthService::hash_password(password).await?,
            roles,
            student_id: None,
            department: None,
            is_verified: true,
            created_at: now,
            updated_at: now,
        })
        .await?;

    Ok(user)
}

fn demo_notice(creator: &Identity, category: NoticeCategory) -> Notice {
    let now = Utc::now();
    Notice {
        id: Uuid::new_v4(),
        title: Sentence(3..7).fake(),
        description: Paragraph(2..4).fake(),
        category,
        file_url: None,
        file_storage_id: None,
        status: NoticeStatus::Draft,
        created_by: creator.user_id,
        approved_by: None,
        approved_at: None,
        rejected_by: None,
        rejected_at: None,
        rejection_reason: None,
        date_posted: now,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
