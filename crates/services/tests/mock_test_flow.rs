use std::sync::Arc;

use olympiad_core::model::{ExamSession, MatchSetId, Question, QuestionId, UserId};
use olympiad_core::time::fixed_clock;
use services::{LoadError, MockTestService, Phase, SubmitError, TickOutcome};
use storage::repository::{InMemoryRepository, ProgressRepository, SavedProgress, StorageError};

const EXAM: MatchSetId = MatchSetId::new(11);
const STUDENT: UserId = UserId::new(3);

fn exam(questions: u64) -> ExamSession {
    let qs = (1..=questions)
        .map(|id| {
            Question::new(
                QuestionId::new(id),
                format!("What is {id} + {id}?"),
                vec![
                    (id * 2).to_string(),
                    (id * 2 + 1).to_string(),
                    (id * 3).to_string(),
                    "None".to_string(),
                ],
            )
            .with_correct_answer(Some(0))
        })
        .collect();
    ExamSession::new(EXAM, "Olympiad Mock 1", "Maths", None, Some(1), qs).unwrap()
}

fn service(questions: u64) -> (MockTestService, InMemoryRepository) {
    let repo = InMemoryRepository::new();
    repo.insert_match_set(exam(questions)).unwrap();
    let shared = Arc::new(repo.clone());
    (MockTestService::new(fixed_clock(), shared.clone(), shared), repo)
}

#[tokio::test]
async fn answer_survives_reload_through_local_storage() {
    let (svc, _) = service(4);
    let mut session = svc.load(EXAM, STUDENT).await.unwrap();
    assert!(!session.was_restored());
    svc.start(&mut session).await.unwrap();

    session.select_answer(2, 3).unwrap();
    session.toggle_review(1).unwrap();
    session.go_to(2).unwrap();
    svc.persist(session.exam_id(), &session.progress()).await;
    session.go_to(0).unwrap();
    svc.persist(session.exam_id(), &session.progress()).await;

    let reloaded = svc.load(EXAM, STUDENT).await.unwrap();
    assert!(reloaded.was_restored());
    assert_eq!(reloaded.sheet().answer(2), Some(3));
    assert!(reloaded.sheet().is_marked(1));
    assert_eq!(reloaded.current_index(), 0);
    assert_eq!(reloaded.sheet().len(), 4);
}

#[tokio::test]
async fn timer_expiry_submits_exactly_once() {
    let (svc, repo) = service(3);
    let mut session = svc.load(EXAM, STUDENT).await.unwrap();
    svc.start(&mut session).await.unwrap();
    session.select_answer(0, 0).unwrap();

    for _ in 0..180 {
        if session.tick() == TickOutcome::Expired {
            let attempt = svc.submit(&mut session).await.unwrap();
            assert!(attempt.automatic);
            assert_eq!(attempt.time_spent_seconds, 60);
        }
    }

    assert_eq!(session.phase(), Phase::Submitted);
    assert_eq!(repo.submissions().unwrap().len(), 1);
    assert!(matches!(
        svc.submit(&mut session).await,
        Err(SubmitError::AlreadySubmitted)
    ));
}

#[tokio::test]
async fn confirmation_reports_unanswered_as_m_minus_n() {
    let (svc, _) = service(10);
    let mut session = svc.load(EXAM, STUDENT).await.unwrap();
    svc.start(&mut session).await.unwrap();
    for question in [0, 4, 7] {
        session.select_answer(question, 1).unwrap();
    }
    let summary = session.submit_summary();
    assert_eq!(summary.answered, 3);
    assert_eq!(summary.not_answered, 7);
}

#[tokio::test]
async fn failed_submit_keeps_progress_for_retry() {
    let (svc, repo) = service(2);
    let mut session = svc.load(EXAM, STUDENT).await.unwrap();
    svc.start(&mut session).await.unwrap();
    session.select_answer(0, 0).unwrap();
    session.select_answer(1, 2).unwrap();
    svc.persist(session.exam_id(), &session.progress()).await;

    repo.set_offline(true);
    let err = svc.submit(&mut session).await.unwrap_err();
    assert!(matches!(err, SubmitError::Api(StorageError::Connection(_))));
    assert_eq!(session.phase(), Phase::InProgress);
    assert!(session.submit_error().is_some());
    assert!(repo.load_progress(EXAM).await.unwrap().is_some());

    repo.set_offline(false);
    let attempt = svc.submit(&mut session).await.unwrap();
    assert_eq!(attempt.result.correct_answers, 1);
    assert_eq!(attempt.result.incorrect_answers, 1);
    assert_eq!(session.phase(), Phase::Submitted);
    assert_eq!(repo.load_progress(EXAM).await.unwrap(), None);
    assert_eq!(svc.completed_attempt(EXAM), Some(attempt));
}

#[tokio::test]
async fn mismatched_progress_is_discarded() {
    let (svc, repo) = service(3);
    repo.save_progress(
        EXAM,
        &SavedProgress {
            answers: vec![Some(0); 5],
            marked: vec![false; 5],
            current: 4,
        },
    )
    .await
    .unwrap();

    let session = svc.load(EXAM, STUDENT).await.unwrap();
    assert!(!session.was_restored());
    assert_eq!(session.sheet().answered_count(), 0);
    assert_eq!(repo.load_progress(EXAM).await.unwrap(), None);
}

#[tokio::test]
async fn unknown_exam_and_offline_load_are_load_errors() {
    let (svc, repo) = service(1);
    let missing = MatchSetId::new(99);
    assert_eq!(
        svc.load(missing, STUDENT).await.unwrap_err(),
        LoadError::NotFound(missing)
    );
    repo.set_offline(true);
    assert!(matches!(
        svc.load(EXAM, STUDENT).await,
        Err(LoadError::Api(StorageError::Connection(_)))
    ));
}

#[tokio::test]
async fn progress_with_unknown_option_is_discarded() {
    let (svc, repo) = service(3);
    repo.save_progress(
        EXAM,
        &SavedProgress {
            answers: vec![Some(9), None, Some(1)],
            marked: vec![false, true, false],
            current: 2,
        },
    )
    .await
    .unwrap();

    let mut session = svc.load(EXAM, STUDENT).await.unwrap();
    assert!(!session.was_restored());
    assert_eq!(session.current_index(), 0);
    assert_eq!(repo.load_progress(EXAM).await.unwrap(), None);

    svc.start(&mut session).await.unwrap();
    assert_eq!(session.submit_summary().not_answered, 3);
}

#[tokio::test]
async fn late_persist_after_submit_is_dropped() {
    let (svc, repo) = service(2);
    let mut session = svc.load(EXAM, STUDENT).await.unwrap();
    svc.start(&mut session).await.unwrap();
    session.select_answer(0, 1).unwrap();
    let stale = session.progress();

    svc.submit(&mut session).await.unwrap();
    svc.persist(EXAM, &stale).await;
    assert_eq!(repo.load_progress(EXAM).await.unwrap(), None);

    let mut retake = svc.load(EXAM, STUDENT).await.unwrap();
    assert!(!retake.was_restored());
    svc.start(&mut retake).await.unwrap();
    retake.select_answer(1, 2).unwrap();
    svc.persist(EXAM, &retake.progress()).await;
    let saved = repo.load_progress(EXAM).await.unwrap().unwrap();
    assert_eq!(saved.answers, vec![None, Some(2)]);
}

#[tokio::test]
async fn concurrent_persists_leave_one_whole_snapshot() {
    let (svc, repo) = service(3);
    let mut session = svc.load(EXAM, STUDENT).await.unwrap();
    svc.start(&mut session).await.unwrap();

    let mut snapshots = Vec::new();
    for question in 0..3 {
        session.select_answer(question, question).unwrap();
        session.go_to(question).unwrap();
        snapshots.push(session.progress());
    }
    tokio::join!(
        svc.persist(EXAM, &snapshots[0]),
        svc.persist(EXAM, &snapshots[1]),
        svc.persist(EXAM, &snapshots[2]),
    );

    let saved = repo.load_progress(EXAM).await.unwrap().unwrap();
    assert!(snapshots.contains(&saved));
}
