use anyhow::Result;
use chrono::Utc;
use guardpost::config::DatabaseConfig;
use guardpost::db::models::{
    Incident, IncidentPriority, IncidentType, Round, RoundStatus, Shift, User, UserRole,
};
use guardpost::db::{DatabaseService, Stores};
use guardpost::Error;
use uuid::Uuid;

/// Stores on the database named by `TEST_DATABASE_URL`, or `None` to skip
async fn stores() -> Result<Option<Stores>> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        println!("Skipping PostgreSQL test. Set TEST_DATABASE_URL to run.");
        return Ok(None);
    };

    let database = DatabaseService::new(&DatabaseConfig {
        url,
        ..DatabaseConfig::default()
    })
    .await?;
    Ok(Some(Stores::postgres(database.pool)))
}

fn user(role: UserRole) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        name: "Test user".to_string(),
        email: format!("{}@example.com", Uuid::new_v4()),
        password_hash: "not-a-real-hash".to_string(),
        role,
        phone: None,
        department: None,
        active: true,
        created_at: now,
        updated_at: now,
        last_login: None,
    }
}

#[tokio::test]
async fn test_duplicate_email_case_insensitive() -> Result<()> {
    let Some(stores) = stores().await? else {
        return Ok(());
    };

    let first = stores.users.create(&user(UserRole::Patrol)).await?;
    let mut duplicate = user(UserRole::Patrol);
    duplicate.email = first.email.to_uppercase();

    let err = stores.users.create(&duplicate).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::AlreadyExists(_))));
    Ok(())
}

#[tokio::test]
async fn test_one_active_shift_per_patroller() -> Result<()> {
    let Some(stores) = stores().await? else {
        return Ok(());
    };

    let guard = stores.users.create(&user(UserRole::Patrol)).await?;
    let shift = |location: &str| Shift {
        id: Uuid::new_v4(),
        patroller_id: guard.id,
        patroller_name: guard.name.clone(),
        location: location.to_string(),
        started_at: Utc::now(),
        ended_at: None,
        notes: None,
    };

    let first = stores.shifts.create(&shift("Gate A")).await?;
    let err = stores.shifts.create(&shift("Dock")).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Conflict(_))));

    assert!(stores.shifts.end(&first.id, Utc::now()).await?.is_some());
    assert!(stores.shifts.end(&first.id, Utc::now()).await?.is_none());
    stores.shifts.create(&shift("Dock")).await?;
    Ok(())
}

#[tokio::test]
async fn test_one_started_round_per_patroller() -> Result<()> {
    let Some(stores) = stores().await? else {
        return Ok(());
    };

    let guard = stores.users.create(&user(UserRole::Patrol)).await?;
    let round = || {
        let now = Utc::now();
        Round {
            id: Uuid::new_v4(),
            patroller_id: guard.id,
            patroller_name: guard.name.clone(),
            visited_locations: vec!["Gate A".to_string()],
            notes: None,
            status: RoundStatus::Started,
            started_at: now,
            finished_at: None,
            created_at: now,
        }
    };

    let first = stores.rounds.create(&round()).await?;
    let err = stores.rounds.create(&round()).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Conflict(_))));

    assert!(stores.rounds.finish(&first.id, Utc::now()).await?.is_some());
    stores.rounds.create(&round()).await?;
    Ok(())
}

#[tokio::test]
async fn test_resolve_is_conditional() -> Result<()> {
    let Some(stores) = stores().await? else {
        return Ok(());
    };

    let reporter = stores.users.create(&user(UserRole::Patrol)).await?;
    let supervisor = stores.users.create(&user(UserRole::Supervisor)).await?;
    let incident = stores
        .incidents
        .create(&Incident {
            id: Uuid::new_v4(),
            location: "Gate A".to_string(),
            incident_type: IncidentType::SuspiciousActivity,
            priority: IncidentPriority::High,
            description: "Loitering".to_string(),
            photos: Vec::new(),
            reporter_id: reporter.id,
            reporter_name: reporter.name.clone(),
            created_at: Utc::now(),
            resolved: false,
            resolution_notes: None,
            resolved_by: None,
            resolved_at: None,
        })
        .await?;

    let resolved = stores
        .incidents
        .resolve(&incident.id, &supervisor.id, "Left the site", Utc::now())
        .await?
        .expect("first resolve wins");
    assert!(resolved.resolved);

    let second = stores
        .incidents
        .resolve(&incident.id, &supervisor.id, "Overwrite", Utc::now())
        .await?;
    assert!(second.is_none());

    let photo = stores.incidents.add_photo(&incident.id, "/uploads/x.jpg").await?;
    assert_eq!(photo.map(|i| i.photos), Some(vec!["/uploads/x.jpg".to_string()]));
    Ok(())
}
