use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use noticeboard::{
    domain::{
        Notice, NoticeCategory, NoticeQuery, NoticeStatus, Pagination, VisibilityScope,
    },
    repository::{NoticeRepository, SqliteNoticeRepository},
};

fn make_notice(
    created_by: Uuid,
    status: NoticeStatus,
    category: NoticeCategory,
    title: &str,
    age_hours: i64,
) -> Notice {
    let now = Utc::now();
    Notice {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: format!("{} description", title),
        category,
        file_url: None,
        file_storage_id: None,
        status,
        created_by,
        approved_by: None,
        approved_at: None,
        rejected_by: None,
        rejected_at: None,
        rejection_reason: None,
        date_posted: now - Duration::hours(age_hours),
        is_active: true,
        created_at: now - Duration::hours(age_hours),
        updated_at: now,
    }
}

fn query(scope: VisibilityScope) -> NoticeQuery {
    NoticeQuery {
        scope,
        status: None,
        category: None,
        search: None,
        pagination: Pagination::default(),
    }
}

async fn setup() -> anyhow::Result<SqliteNoticeRepository> {
    let pool = SqlitePool::connect(":memory:").await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(SqliteNoticeRepository::new(pool))
}

#[tokio::test]
async fn test_notice_crud() -> anyhow::Result<()> {
    let repo = setup().await?;
    let author = Uuid::new_v4();

    let notice = make_notice(
        author,
        NoticeStatus::Draft,
        NoticeCategory::General,
        "Canteen menu",
        0,
    );
    let created = repo.create(notice.clone()).await?;
    assert_eq!(created.id, notice.id);
    assert_eq!(created.status, NoticeStatus::Draft);
    assert_eq!(created.created_by, author);

    let found = repo.find_by_id(notice.id).await?;
    assert!(found.is_some());

    let mut updated = created.clone();
    updated.title = "Canteen menu (updated)".to_string();
    updated.status = NoticeStatus::PendingApproval;
    let stored = repo.update(notice.id, updated).await?;
    assert_eq!(stored.title, "Canteen menu (updated)");
    assert_eq!(stored.status, NoticeStatus::PendingApproval);

    repo.delete(notice.id).await?;
    assert!(repo.find_by_id(notice.id).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_audit_fields_roundtrip() -> anyhow::Result<()> {
    let repo = setup().await?;
    let author = Uuid::new_v4();
    let reviewer = Uuid::new_v4();

    let mut notice = make_notice(
        author,
        NoticeStatus::Rejected,
        NoticeCategory::Clubs,
        "Chess club",
        0,
    );
    notice.rejected_by = Some(reviewer);
    notice.rejected_at = Some(Utc::now());
    notice.rejection_reason = Some("No venue booked".to_string());

    let created = repo.create(notice).await?;
    assert_eq!(created.rejected_by, Some(reviewer));
    assert!(created.rejected_at.is_some());
    assert_eq!(created.rejection_reason.as_deref(), Some("No venue booked"));
    assert!(created.approved_by.is_none());

    Ok(())
}

#[tokio::test]
async fn test_visibility_scopes() -> anyhow::Result<()> {
    let repo = setup().await?;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    repo.create(make_notice(
        alice,
        NoticeStatus::Published,
        NoticeCategory::Academic,
        "Semester dates",
        3,
    ))
    .await?;
    repo.create(make_notice(
        alice,
        NoticeStatus::Draft,
        NoticeCategory::Events,
        "Hack night",
        2,
    ))
    .await?;
    repo.create(make_notice(
        bob,
        NoticeStatus::PendingApproval,
        NoticeCategory::Sports,
        "Football trials",
        1,
    ))
    .await?;

    let published = repo.list(&query(VisibilityScope::PublishedOnly)).await?;
    assert_eq!(published.len(), 1);

    let alices_view = repo.list(&query(VisibilityScope::PublishedOrOwn(alice))).await?;
    assert_eq!(alices_view.len(), 2);

    let bobs_own = repo.list(&query(VisibilityScope::Own(bob))).await?;
    assert_eq!(bobs_own.len(), 1);
    assert_eq!(bobs_own[0].created_by, bob);

    let everything = repo.list(&query(VisibilityScope::All)).await?;
    assert_eq!(everything.len(), 3);
    assert_eq!(repo.count(&query(VisibilityScope::All)).await?, 3);

    Ok(())
}

#[tokio::test]
async fn test_filters_and_search() -> anyhow::Result<()> {
    let repo = setup().await?;
    let author = Uuid::new_v4();

    repo.create(make_notice(
        author,
        NoticeStatus::Published,
        NoticeCategory::Exam,
        "Midterm schedule",
        2,
    ))
    .await?;
    repo.create(make_notice(
        author,
        NoticeStatus::Published,
        NoticeCategory::Library,
        "New journals available",
        1,
    ))
    .await?;

    let mut by_category = query(VisibilityScope::All);
    by_category.category = Some(NoticeCategory::Exam);
    let found = repo.list(&by_category).await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].category, NoticeCategory::Exam);

    let mut by_status = query(VisibilityScope::All);
    by_status.status = Some(NoticeStatus::Draft);
    assert!(repo.list(&by_status).await?.is_empty());

    let mut by_search = query(VisibilityScope::All);
    by_search.search = Some("journals".to_string());
    let found = repo.list(&by_search).await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "New journals available");

    Ok(())
}

#[tokio::test]
async fn test_ordering_and_pagination() -> anyhow::Result<()> {
    let repo = setup().await?;
    let author = Uuid::new_v4();

    for (title, age) in [("oldest", 30), ("middle", 20), ("newest", 10)] {
        repo.create(make_notice(
            author,
            NoticeStatus::Published,
            NoticeCategory::General,
            title,
            age,
        ))
        .await?;
    }

    let all = repo.list(&query(VisibilityScope::All)).await?;
    let titles: Vec<_> = all.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["newest", "middle", "oldest"]);

    let mut paged = query(VisibilityScope::All);
    paged.pagination = Pagination { page: 2, limit: 2 };
    let second_page = repo.list(&paged).await?;
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].title, "oldest");

    let mut unlimited = query(VisibilityScope::All);
    unlimited.pagination = Pagination::all();
    assert_eq!(repo.list(&unlimited).await?.len(), 3);

    Ok(())
}
