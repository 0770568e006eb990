use olympiad_core::model::{
    ActiveStatus, BlogDraft, BlogId, MatchSetDraft, NewUserDraft, RecommendationFilter,
    RegistrationDraft, Role, SalesPersonDraft, SchoolChoice, SchoolDraft, SessionUser, TaskDraft,
    TaskStatus, TaskUpdate, UpcomingExamDraft, UpcomingExamFilter, UserId,
};
use services::{
    AppServices, Clock, DashboardError, ListState, MockTestAdminService, QUESTION_TEMPLATE_CSV,
};
use storage::repository::{InMemoryRepository, Storage};

fn user(role: Role) -> SessionUser {
    SessionUser::new(UserId::new(1), "Test", "test@example.com", role)
}

fn services() -> (AppServices, InMemoryRepository) {
    let repo = InMemoryRepository::new();
    let storage = Storage::from_in_memory(&repo);
    (AppServices::new(&storage, Clock::default_clock()), repo)
}

fn school_draft(name: &str) -> SchoolDraft {
    SchoolDraft {
        name: name.into(),
        address: "12 MG Road".into(),
        email: format!("{}@school.in", name.to_lowercase().replace(' ', "")),
        admin_name: "R. Iyer".into(),
        phone: "9876543210".into(),
        city: "Pune".into(),
        state: String::new(),
    }
}

#[tokio::test]
async fn created_school_appears_once_in_next_list() {
    let (app, _) = services();
    let sales = user(Role::Salesman);
    let schools = app.schools();

    let mut list = ListState::new();
    let ticket = list.begin_fetch();
    list.finish_fetch(ticket, schools.list(&sales, false).await.unwrap());
    assert!(list.is_empty());

    let created = schools
        .create(&sales, school_draft("Green Valley"))
        .await
        .unwrap();
    assert_eq!(created.status, ActiveStatus::Inactive);
    list.apply_created(created);

    let ticket = list.begin_fetch();
    list.finish_fetch(ticket, schools.list(&sales, false).await.unwrap());
    let matching = list
        .items()
        .iter()
        .filter(|school| school.name == "Green Valley")
        .count();
    assert_eq!(matching, 1);
}

#[tokio::test]
async fn deleted_blog_is_not_restored_by_stale_refetch() {
    let (app, _) = services();
    let admin = user(Role::Admin);
    let blogs = app.blogs();
    let draft = BlogDraft {
        title: "Exam tips".into(),
        content: "# Sleep well".into(),
        author: "Admin".into(),
        category: "Guides".into(),
        ..BlogDraft::default()
    };
    let blog = blogs.create(&admin, draft, None).await.unwrap();

    let mut list = ListState::new();
    let ticket = list.begin_fetch();
    list.finish_fetch(ticket, blogs.list().await.unwrap());
    assert_eq!(list.len(), 1);

    // Background refetch starts before the delete and lands after it.
    let background = list.begin_fetch();
    let stale_rows = blogs.list().await.unwrap();
    blogs.remove(&admin, &blog.id).await.unwrap();
    list.apply_removed(&blog.id);
    assert!(!list.finish_fetch(background, stale_rows.clone()));
    assert!(list.is_empty());

    // Even a fresh fetch carrying the old row keeps it hidden.
    let ticket = list.begin_fetch();
    list.finish_fetch(ticket, stale_rows);
    assert!(list.is_empty());
}

#[tokio::test]
async fn roles_gate_mutations_before_any_request() {
    let (app, repo) = services();
    repo.set_offline(true);

    let err = app
        .schools()
        .create(&user(Role::School), school_draft("Blue Bell"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DashboardError::Forbidden("Only admin or sales users can add schools")
    );

    let err = app
        .blogs()
        .remove(&user(Role::Salesman), &BlogId::new("1"))
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::Forbidden(_)));

    assert!(matches!(
        app.sales_team().list(&user(Role::Student)).await,
        Err(DashboardError::Forbidden(_))
    ));
}

#[tokio::test]
async fn invalid_sales_draft_lists_every_message() {
    let (app, _) = services();
    let err = app
        .sales_team()
        .register(
            &user(Role::Admin),
            SalesPersonDraft {
                name: String::new(),
                email: "not-an-email".into(),
                password: "123".into(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.user_message(),
        "Name is required. Please enter a valid email address. Password must be at least 6 characters long"
    );
}

#[tokio::test]
async fn sales_status_toggle_round_trips() {
    let (app, _) = services();
    let admin = user(Role::Admin);
    let team = app.sales_team();
    let person = team
        .register(
            &admin,
            SalesPersonDraft {
                name: "Kiran".into(),
                email: "kiran@sales.in".into(),
                password: "secret1".into(),
            },
        )
        .await
        .unwrap();
    let next = person.status.toggled();
    team.set_status(&admin, person.id, next).await.unwrap();
    let listed = team.list(&admin).await.unwrap();
    assert_eq!(listed[0].status, ActiveStatus::Active);
}

#[tokio::test]
async fn school_users_can_edit_but_not_delete() {
    let (app, _) = services();
    let admin = user(Role::Admin);
    let school = user(Role::School);
    let users = app.users();
    let created = users
        .create(
            &admin,
            NewUserDraft {
                name: "Asha".into(),
                email: "asha@student.in".into(),
                password: "secret1".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut update = created.to_update();
    update.user_class = "9".into();
    let updated = users.update(&school, created.id, update).await.unwrap();
    assert_eq!(updated.user_class.as_deref(), Some("9"));

    assert!(matches!(
        users.remove(&school, created.id).await,
        Err(DashboardError::Forbidden(_))
    ));
}

#[tokio::test]
async fn authored_mock_test_is_playable_and_removable() {
    let (app, _) = services();
    let admin = user(Role::Admin);
    let admin_tests = app.mock_test_admin();

    let created = admin_tests
        .create(
            &admin,
            MatchSetDraft {
                title: "Maths Mock 1".into(),
                subject: "Maths".into(),
                date: "2026-11-01".into(),
                ..MatchSetDraft::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(created.duration_minutes, 60);
    assert_eq!(created.question_count, 0);

    let mut list = ListState::new();
    list.apply_created(created.clone());

    let import = MockTestAdminService::parse_question_csv(QUESTION_TEMPLATE_CSV).unwrap();
    admin_tests
        .upload_questions(&admin, created.id, &import.questions)
        .await
        .unwrap();

    let ticket = list.begin_fetch();
    list.finish_fetch(ticket, admin_tests.list(&admin).await.unwrap());
    assert_eq!(list.items()[0].question_count, 2);

    let session = app
        .mock_tests()
        .load(created.id, UserId::new(9))
        .await
        .unwrap();
    assert_eq!(session.exam().question_count(), 2);
    assert_eq!(session.exam().questions()[0].correct_answer(), Some(2));

    admin_tests.remove(&admin, created.id).await.unwrap();
    list.apply_removed(&created.id);
    assert!(list.is_empty());
    assert!(admin_tests.list(&admin).await.unwrap().is_empty());
}

#[tokio::test]
async fn mock_test_authoring_is_admin_only_and_needs_questions() {
    let (app, _) = services();
    let admin_tests = app.mock_test_admin();
    assert!(matches!(
        admin_tests.list(&user(Role::Salesman)).await,
        Err(DashboardError::Forbidden(_))
    ));

    let created = admin_tests
        .create(
            &user(Role::Admin),
            MatchSetDraft {
                title: "Empty".into(),
                subject: "GK".into(),
                date: "2026-11-01".into(),
                duration_minutes: "45".into(),
            },
        )
        .await
        .unwrap();
    let err = admin_tests
        .upload_questions(&user(Role::Admin), created.id, &[])
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Add at least one question before uploading");
}

#[tokio::test]
async fn exam_board_recommends_edits_and_deletes() {
    let (app, _) = services();
    let admin = user(Role::Admin);
    let exams = app.exams();
    let draft = UpcomingExamDraft {
        title: "National Science Olympiad".into(),
        subject: "Science".into(),
        date: "2026-11-20".into(),
        time: "09:30".into(),
        ..UpcomingExamDraft::default()
    };
    let created = exams.create(&admin, draft).await.unwrap();
    assert!(!created.recommended);

    let toggled = exams.toggle_recommended(&admin, &created).await.unwrap();
    assert!(toggled.recommended);
    let listed = exams.list(&admin).await.unwrap();
    assert_eq!(listed, vec![toggled.clone()]);

    let recommended = UpcomingExamFilter {
        search: "science".into(),
        recommendation: RecommendationFilter::Recommended,
    };
    assert_eq!(recommended.apply(&listed).len(), 1);

    let mut edit = toggled.to_draft();
    edit.time = "14:00".into();
    let updated = exams.update(&admin, &toggled.id, edit).await.unwrap();
    assert_eq!(updated.time, "14:00");
    assert!(updated.recommended);

    exams.remove(&admin, &updated.id).await.unwrap();
    assert!(exams.list(&admin).await.unwrap().is_empty());
    assert!(matches!(
        exams.list(&user(Role::School)).await,
        Err(DashboardError::Forbidden(_))
    ));
}

#[tokio::test]
async fn assigned_task_reaches_only_its_salesman() {
    let (app, _) = services();
    let admin = user(Role::Admin);
    let team = app.sales_team();
    let mut people = Vec::new();
    for (name, email) in [("Ravi", "ravi@sales.in"), ("Meera", "meera@sales.in")] {
        let person = team
            .register(
                &admin,
                SalesPersonDraft {
                    name: name.into(),
                    email: email.into(),
                    password: "secret1".into(),
                },
            )
            .await
            .unwrap();
        people.push(person);
    }

    let tasks = app.tasks();
    let created = tasks
        .assign(
            &admin,
            TaskDraft {
                title: "Visit Green Valley".into(),
                assignee: Some(people[0].id),
                due_date: "2026-12-01".into(),
                ..TaskDraft::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(created.assigned_to.name, "Ravi");
    assert_eq!(created.assigned_by, "Test");

    let ravi = SessionUser::new(
        UserId::new(people[0].id.value()),
        "Ravi",
        "ravi@sales.in",
        Role::Salesman,
    );
    let meera = SessionUser::new(
        UserId::new(people[1].id.value()),
        "Meera",
        "meera@sales.in",
        Role::Salesman,
    );
    assert_eq!(tasks.list(&ravi).await.unwrap().len(), 1);
    assert!(tasks.list(&meera).await.unwrap().is_empty());
    assert_eq!(tasks.list(&admin).await.unwrap().len(), 1);

    let mut list = ListState::new();
    list.apply_created(created.clone());
    let done = tasks
        .apply_update(
            &ravi,
            &created,
            &TaskUpdate {
                status: TaskStatus::Completed,
                priority: None,
                comment: "Principal agreed".into(),
            },
        )
        .unwrap();
    list.apply_updated(done);
    assert_eq!(list.items()[0].status, TaskStatus::Completed);
    assert_eq!(list.items()[0].comments.len(), 1);

    assert!(matches!(
        tasks.assign(&ravi, TaskDraft::default()).await,
        Err(DashboardError::Forbidden(_))
    ));
}

#[tokio::test]
async fn public_registration_checks_password_and_school() {
    let (app, _) = services();
    let users = app.users();
    let draft = RegistrationDraft {
        name: "Asha".into(),
        email: "asha@student.in".into(),
        phone: "9876543210".into(),
        user_class: "8".into(),
        password: "longenough".into(),
        confirm_password: "different1".into(),
        school: SchoolChoice::Unselected,
    };
    let err = users.register(draft.clone()).await.unwrap_err();
    let errors = err.field_errors().unwrap();
    assert_eq!(errors.message_for("confirm_password"), Some("Passwords do not match"));
    assert!(errors.message_for("school").is_some());

    let account = users
        .register(RegistrationDraft {
            confirm_password: "longenough".into(),
            school: SchoolChoice::Other {
                name: "green valley".into(),
                address: "pune".into(),
            },
            ..draft
        })
        .await
        .unwrap();
    assert_eq!(account.school.as_deref(), Some("GREEN VALLEY, PUNE"));
    let listed = users.list(&user(Role::Admin)).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn sign_up_picker_lists_only_active_schools() {
    let (app, _) = services();
    let admin = user(Role::Admin);
    let schools = app.schools();
    let pending = schools
        .create(&user(Role::Salesman), school_draft("Hill Side"))
        .await
        .unwrap();
    let approved = schools
        .create(&user(Role::Salesman), school_draft("Lake View"))
        .await
        .unwrap();
    schools.toggle_status(&admin, &approved.id).await.unwrap();

    let directory = schools.active_directory().await.unwrap();
    let names: Vec<_> = directory.iter().map(|school| school.name.as_str()).collect();
    assert_eq!(names, vec!["Lake View"]);
    assert_ne!(pending.id, approved.id);
}
