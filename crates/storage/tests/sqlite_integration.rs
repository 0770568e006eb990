use olympiad_core::model::{MatchSetId, Role, SessionUser, UserId};
use storage::repository::{
    KeyValueStore, ProgressRepository, SavedProgress, SessionRecord, SessionRecordRepository,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_progress_round_trips_and_clears() {
    let repo = connect("memdb_progress").await;
    let exam = MatchSetId::new(12);
    let progress = SavedProgress {
        answers: vec![Some(0), None, Some(3)],
        marked: vec![false, true, false],
        current: 2,
    };

    repo.save_progress(exam, &progress).await.expect("save");
    let loaded = repo.load_progress(exam).await.expect("load");
    assert_eq!(loaded, Some(progress.clone()));

    let updated = SavedProgress {
        answers: vec![Some(1), None, Some(3)],
        ..progress
    };
    repo.save_progress(exam, &updated).await.expect("overwrite");
    assert_eq!(
        repo.load_progress(exam).await.expect("reload"),
        Some(updated)
    );

    repo.clear_progress(exam).await.expect("clear");
    assert_eq!(repo.load_progress(exam).await.expect("after clear"), None);
    assert_eq!(
        repo.get_value("mocktest_12_answers").await.expect("raw"),
        None
    );
}

#[tokio::test]
async fn sqlite_progress_is_scoped_per_exam() {
    let repo = connect("memdb_scoped").await;
    let first = SavedProgress {
        answers: vec![Some(2)],
        marked: vec![true],
        current: 0,
    };
    repo.save_progress(MatchSetId::new(1), &first)
        .await
        .expect("save");
    assert_eq!(
        repo.load_progress(MatchSetId::new(2)).await.expect("load"),
        None
    );
    repo.clear_progress(MatchSetId::new(2))
        .await
        .expect("clear other");
    assert!(
        repo.load_progress(MatchSetId::new(1))
            .await
            .expect("load first")
            .is_some()
    );
}

#[tokio::test]
async fn sqlite_session_record_lifecycle() {
    let repo = connect("memdb_session").await;
    assert_eq!(repo.load_user().await.expect("empty"), None);

    let user = SessionUser::new(UserId::new(8), "Head", "head@school.in", Role::School);
    repo.save_user(&SessionRecord::from_user(&user))
        .await
        .expect("save");
    let record = repo.load_user().await.expect("load").expect("present");
    assert_eq!(record.into_user().expect("valid"), user);

    repo.clear_user().await.expect("clear");
    assert_eq!(repo.load_user().await.expect("cleared"), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    repo.set_value("k", "v").await.expect("write after migrate");
    assert_eq!(repo.get_value("k").await.expect("read").as_deref(), Some("v"));
}

#[tokio::test]
async fn sqlite_concurrent_saves_never_mix_snapshots() {
    let repo = connect("memdb_batch").await;
    let exam = MatchSetId::new(5);
    let snapshots: Vec<SavedProgress> = (0..4)
        .map(|step| SavedProgress {
            answers: vec![Some(step), Some(step)],
            marked: vec![step % 2 == 0, true],
            current: step,
        })
        .collect();

    let (a, b, c, d) = tokio::join!(
        repo.save_progress(exam, &snapshots[0]),
        repo.save_progress(exam, &snapshots[1]),
        repo.save_progress(exam, &snapshots[2]),
        repo.save_progress(exam, &snapshots[3]),
    );
    for result in [a, b, c, d] {
        result.expect("save");
    }

    let loaded = repo
        .load_progress(exam)
        .await
        .expect("load")
        .expect("present");
    assert!(snapshots.contains(&loaded));

    repo.remove_values(&["mocktest_5_answers", "mocktest_5_marked"])
        .await
        .expect("batch remove");
    assert_eq!(
        repo.get_value("mocktest_5_current")
            .await
            .expect("raw")
            .as_deref(),
        Some(loaded.current.to_string().as_str())
    );
}
