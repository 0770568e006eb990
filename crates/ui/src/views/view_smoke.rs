use std::time::Duration;

use olympiad_core::model::{
    BlogDraft, ExamResult, ExamSession, MatchSetDraft, MatchSetId, NewUserDraft, Question,
    QuestionId, Role, SalesPersonDraft, SchoolDraft, TaskDraft, UpcomingExamDraft,
};

use super::test_harness::{ViewKind, setup_view_harness, user};

fn school_draft(name: &str) -> SchoolDraft {
    SchoolDraft {
        name: name.to_string(),
        address: "12 Hill Road".to_string(),
        email: "office@greenfield.edu".to_string(),
        admin_name: "R. Mehta".to_string(),
        phone: "9876543210".to_string(),
        city: "Pune".to_string(),
        state: String::new(),
    }
}

fn exam(id: u64) -> ExamSession {
    timed_exam(id, 30)
}

fn timed_exam(id: u64, minutes: u32) -> ExamSession {
    let questions = (1..=3)
        .map(|q| {
            Question::new(
                QuestionId::new(q),
                format!("Question {q}?"),
                vec!["Alpha".into(), "Beta".into(), "Gamma".into(), "Delta".into()],
            )
            .with_correct_answer(Some(0))
        })
        .collect();
    ExamSession::new(
        MatchSetId::new(id),
        "Science Olympiad Mock",
        "Science",
        None,
        Some(minutes),
        questions,
    )
    .unwrap()
}

#[tokio::test(flavor = "current_thread")]
async fn schools_view_lists_schools_with_admin_actions() {
    let admin = user(Role::Admin);
    let mut harness = setup_view_harness(ViewKind::Schools, Some(admin.clone()));
    harness
        .services
        .schools()
        .create(&admin, school_draft("Greenfield High"))
        .await
        .expect("create school");

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert_eq!(html.matches("Greenfield High").count(), 1, "{html}");
    assert!(html.contains("Add School"), "missing add button in {html}");
    assert!(html.contains("Delete"), "missing delete in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn schools_view_hides_delete_from_sales() {
    let admin = user(Role::Admin);
    let mut harness = setup_view_harness(ViewKind::Schools, Some(user(Role::Salesman)));
    harness
        .services
        .schools()
        .create(&admin, school_draft("Riverside Public"))
        .await
        .expect("create school");

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Riverside Public"), "missing row in {html}");
    assert!(html.contains("Deactivate"), "missing status toggle in {html}");
    assert!(!html.contains(">Delete<"), "sales must not delete in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn schools_view_offers_retry_when_offline() {
    let mut harness = setup_view_harness(ViewKind::Schools, Some(user(Role::Admin)));
    harness.repo.set_offline(true);

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Try Again"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn users_view_hides_admin_actions_from_schools() {
    let admin = user(Role::Admin);
    let mut harness = setup_view_harness(ViewKind::Users, Some(user(Role::School)));
    harness
        .services
        .users()
        .create(
            &admin,
            NewUserDraft {
                name: "Asha Rao".to_string(),
                email: "asha@example.com".to_string(),
                phone: "9123456780".to_string(),
                school: "Greenfield High".to_string(),
                user_class: "8".to_string(),
                password: "secret123".to_string(),
            },
        )
        .await
        .expect("create user");

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Asha Rao"), "missing row in {html}");
    assert!(html.contains("Export CSV"), "missing export in {html}");
    assert!(html.contains("Edit"), "schools may edit in {html}");
    assert!(!html.contains("Add User"), "schools must not add in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn blogs_view_renders_featured_card() {
    let admin = user(Role::Admin);
    let mut harness = setup_view_harness(ViewKind::Blogs, Some(admin.clone()));
    harness
        .services
        .blogs()
        .create(
            &admin,
            BlogDraft {
                title: "Preparing for the Maths Olympiad".to_string(),
                content: "Practice **every** day.".to_string(),
                author: "Team".to_string(),
                category: "Tips".to_string(),
                featured: true,
                ..BlogDraft::default()
            },
            None,
        )
        .await
        .expect("create blog");

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Preparing for the Maths Olympiad"), "missing title in {html}");
    assert!(html.contains("badge-featured"), "missing badge in {html}");
    assert!(html.contains("Practice every day."), "missing excerpt in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_shows_stats_and_grades() {
    let student = user(Role::Student);
    let mut harness = setup_view_harness(ViewKind::Results, Some(student.clone()));
    harness
        .repo
        .insert_results(
            student.id(),
            vec![ExamResult {
                exam_title: "Maths Round 1".to_string(),
                subject: "Maths".to_string(),
                date: None,
                time: None,
                percentage: Some(92.0),
                certificate_url: None,
            }],
        )
        .expect("seed results");

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Maths Round 1"), "missing row in {html}");
    assert!(html.contains("92%"), "missing average in {html}");
    assert!(html.contains("grade-high"), "missing grade class in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn mock_test_list_links_to_tests() {
    let mut harness = setup_view_harness(ViewKind::MockTests, Some(user(Role::Student)));
    harness.repo.insert_match_set(exam(7)).expect("seed exam");

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Science Olympiad Mock"), "missing title in {html}");
    assert!(html.contains("3 questions"), "missing count in {html}");
    assert!(html.contains("Start Test"), "missing start link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn mock_test_view_opens_on_instructions() {
    let mut harness = setup_view_harness(ViewKind::MockTest(7), Some(user(Role::Student)));
    harness.repo.insert_match_set(exam(7)).expect("seed exam");

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Instructions"), "missing instructions in {html}");
    assert!(html.contains("30 minutes"), "missing duration in {html}");
    assert!(html.contains("Start Test"), "missing start button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn mock_test_view_reports_unknown_exam() {
    let mut harness = setup_view_harness(ViewKind::MockTest(404), Some(user(Role::Student)));

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("does not exist"), "missing not-found in {html}");
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn expired_exam_submits_once_and_unlocks_navigation() {
    let mut harness = setup_view_harness(ViewKind::StartedExam(9), Some(user(Role::Student)));
    harness.repo.insert_match_set(timed_exam(9, 1)).expect("seed exam");

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("nav-locked"), "nav should be locked in {html}");
    assert!(!html.contains("href=\"/mock-tests\""), "nav link left open in {html}");

    for _ in 0..90 {
        tokio::time::advance(Duration::from_secs(1)).await;
        harness.settle().await;
    }
    assert_eq!(harness.repo.submissions().expect("submissions").len(), 1);

    for _ in 0..30 {
        tokio::time::advance(Duration::from_secs(1)).await;
        harness.settle().await;
    }
    assert_eq!(harness.repo.submissions().expect("submissions").len(), 1);
    let html = harness.render();
    assert!(html.contains("navigated to /mock-tests/9/result"), "no result redirect in {html}");
    assert!(!html.contains("nav-locked"), "nav still locked in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn admin_dashboard_counts_records() {
    let admin = user(Role::Admin);
    let mut harness = setup_view_harness(ViewKind::AdminDashboard, Some(admin.clone()));
    harness
        .services
        .schools()
        .create(&admin, school_draft("Greenfield High"))
        .await
        .expect("create school");

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Total Schools"), "missing card in {html}");
    assert!(html.contains("Manage Blogs"), "missing link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn login_view_renders_form() {
    let mut harness = setup_view_harness(ViewKind::Login, None);

    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Email or Phone"), "missing identifier in {html}");
    assert!(html.contains("Remember me"), "missing remember in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn sales_team_view_renders_heading_for_admin() {
    let mut harness = setup_view_harness(ViewKind::SalesTeam, Some(user(Role::Admin)));

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Sales Team"), "missing heading in {html}");
    assert!(html.contains("No sales people registered yet."), "missing empty state in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn mock_test_admin_lists_authored_tests() {
    let admin = user(Role::Admin);
    let mut harness = setup_view_harness(ViewKind::MockTestAdmin, Some(admin.clone()));
    harness
        .services
        .mock_test_admin()
        .create(
            &admin,
            MatchSetDraft {
                title: "Algebra Sprint".into(),
                subject: "Maths".into(),
                date: "2023-12-01".into(),
                ..MatchSetDraft::default()
            },
        )
        .await
        .expect("create mock test");

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Algebra Sprint"), "missing row in {html}");
    assert!(html.contains("60 min"), "missing default duration in {html}");
    assert!(html.contains("Add Questions"), "missing authoring action in {html}");
    assert!(html.contains("Create Mock Test"), "missing create button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn exams_board_marks_recommended_exams() {
    let admin = user(Role::Admin);
    let mut harness = setup_view_harness(ViewKind::Exams, Some(admin.clone()));
    let exams = harness.services.exams();
    let created = exams
        .create(
            &admin,
            UpcomingExamDraft {
                title: "National Science Olympiad".into(),
                subject: "Science".into(),
                date: "2023-12-10".into(),
                time: "09:30".into(),
                ..UpcomingExamDraft::default()
            },
        )
        .await
        .expect("create exam");
    exams
        .toggle_recommended(&admin, &created)
        .await
        .expect("recommend exam");

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("National Science Olympiad"), "missing card in {html}");
    assert!(html.contains("badge-recommended"), "missing badge in {html}");
    assert!(html.contains("Unrecommend"), "missing toggle in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn task_board_flags_overdue_work() {
    let admin = user(Role::Admin);
    let mut harness = setup_view_harness(ViewKind::Tasks, Some(admin.clone()));
    let person = harness
        .services
        .sales_team()
        .register(
            &admin,
            SalesPersonDraft {
                name: "Ravi".into(),
                email: "ravi@sales.in".into(),
                password: "secret1".into(),
            },
        )
        .await
        .expect("register salesman");
    harness
        .services
        .tasks()
        .assign(
            &admin,
            TaskDraft {
                title: "Visit Green Valley".into(),
                assignee: Some(person.id),
                due_date: "2023-11-01".into(),
                ..TaskDraft::default()
            },
        )
        .await
        .expect("assign task");

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Task Management"), "missing heading in {html}");
    assert!(html.contains("Visit Green Valley"), "missing task in {html}");
    assert!(html.contains("badge-overdue"), "missing overdue badge in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn sales_task_board_hides_assignment() {
    let mut harness = setup_view_harness(ViewKind::Tasks, Some(user(Role::Salesman)));

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("My Tasks"), "missing heading in {html}");
    assert!(!html.contains("Assign Task"), "sales must not assign in {html}");
    assert!(html.contains("No tasks found."), "missing empty state in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn register_view_offers_active_schools() {
    let admin = user(Role::Admin);
    let mut harness = setup_view_harness(ViewKind::Register, None);
    let school = harness
        .services
        .schools()
        .create(&admin, school_draft("Greenfield High"))
        .await
        .expect("create school");
    harness
        .services
        .schools()
        .toggle_status(&admin, &school.id)
        .await
        .expect("activate school");

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Create your account"), "missing heading in {html}");
    assert!(html.contains("Greenfield High, 12 Hill Road"), "missing school option in {html}");
    assert!(html.contains("My school is not listed"), "missing manual option in {html}");
}

async fn publish(harness: &super::test_harness::ViewHarness, title: &str, category: &str) {
    let admin = user(Role::Admin);
    harness
        .services
        .blogs()
        .create(
            &admin,
            BlogDraft {
                title: title.to_string(),
                content: "Sleep **early** the night before.".to_string(),
                author: "Team".to_string(),
                category: category.to_string(),
                ..BlogDraft::default()
            },
            None,
        )
        .await
        .expect("create blog");
}

#[tokio::test(flavor = "current_thread")]
async fn public_blog_list_links_posts_by_slug() {
    let mut harness = setup_view_harness(ViewKind::BlogList, None);
    publish(&harness, "Exam Day Checklist", "Guides").await;

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("href=\"/blogs/exam-day-checklist\""), "missing post link in {html}");
    assert!(html.contains("Guides"), "missing category chip in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn public_blog_post_renders_markdown_and_related() {
    let mut harness = setup_view_harness(ViewKind::BlogPost("exam-day-checklist"), None);
    publish(&harness, "Exam Day Checklist", "Guides").await;
    publish(&harness, "Revision Timetables", "Guides").await;

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("<strong>early</strong>"), "missing markdown in {html}");
    assert!(html.contains("Related Articles"), "missing related in {html}");
    assert!(html.contains("Revision Timetables"), "missing related post in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn public_blog_post_reports_unknown_slug() {
    let mut harness = setup_view_harness(ViewKind::BlogPost("missing"), None);

    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("does not exist"), "missing not-found in {html}");
}
