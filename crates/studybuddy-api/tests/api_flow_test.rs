use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{TimeDelta, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use studybuddy_api::auth::{AppState, AppStateInner, create_token};
use studybuddy_api::router;
use studybuddy_db::Database;
use studybuddy_matcher::Matcher;
use studybuddy_otp::{ManualClock, MemoryMailer, OtpConfig, OtpVerifier};
use studybuddy_types::models::StudentProfile;
use studybuddy_types::vocabulary::Vocabulary;

const SECRET: &str = "test-secret";
const ALICE: &str = "alice@gapp.nthu.edu.tw";

struct Harness {
    app: Router,
    state: AppState,
    mailer: Arc<MemoryMailer>,
    clock: Arc<ManualClock>,
}

fn harness() -> Harness {
    let mailer = Arc::new(MemoryMailer::new());
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let otp = OtpVerifier::new(mailer.clone(), clock.clone(), OtpConfig::default());
    let state: AppState = Arc::new(AppStateInner {
        db: Arc::new(Database::open_in_memory().unwrap()),
        otp: Arc::new(otp),
        matcher: Matcher::default(),
        vocabulary: Vocabulary::default(),
        jwt_secret: SECRET.into(),
        email_domain: ".nthu.edu.tw".into(),
        match_limit: 3,
    });
    Harness {
        app: router(state.clone()),
        state,
        mailer,
        clock,
    }
}

impl Harness {
    async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = self.app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn send_code(&self, email: &str, purpose: &str) -> String {
        let (status, _) = self
            .call("POST", "/otp/send", None, Some(json!({ "email": email, "purpose": purpose })))
            .await;
        assert_eq!(status, StatusCode::OK);
        self.mailer.last_code_for(email).unwrap()
    }

    async fn verify_code(&self, email: &str, purpose: &str, code: &str) -> (StatusCode, Value) {
        self.call(
            "POST",
            "/otp/verify",
            None,
            Some(json!({ "email": email, "purpose": purpose, "code": code })),
        )
        .await
    }

    fn seed(&self, n: u128, courses: &[&str], spots: &[&str], times: &[&str]) -> StudentProfile {
        let student = StudentProfile {
            id: Uuid::from_u128(n),
            name: format!("Student {n}"),
            email: format!("s{n}@gapp.nthu.edu.tw"),
            college: "College of Science".into(),
            department: "Department of Physics".into(),
            courses: courses.iter().map(|s| s.to_string()).collect(),
            study_spots: spots.iter().map(|s| s.to_string()).collect(),
            study_times: times.iter().map(|s| s.to_string()).collect(),
            created_at: Utc::now(),
        };
        assert!(self.state.db.create_student(&student).unwrap());
        student
    }
}

fn registration_body(email: &str) -> Value {
    json!({
        "email": email,
        "name": "Alice",
        "college": "College of Electrical Engineering and Computer Science",
        "department": "Department of Computer Science",
        "courses": ["CS101", "MATH201"],
        "study_spots": ["Library"],
        "study_times": ["Morning (9-12 PM)"],
    })
}

#[tokio::test]
async fn registration_requires_a_verified_code() {
    let h = harness();

    let (status, body) = h
        .call("POST", "/auth/register", None, Some(registration_body(ALICE)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("not verified"));

    let code = h.send_code(ALICE, "registration").await;
    let (status, _) = h.verify_code(ALICE, "registration", &code).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = h
        .call("POST", "/auth/register", None, Some(registration_body("  Alice@GAPP.nthu.edu.tw")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = h.call("GET", "/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], ALICE);
    assert_eq!(me["courses"], json!(["CS101", "MATH201"]));

    // The consumed challenge is cleared, so a second registration is refused.
    let (status, _) = h
        .call("POST", "/auth/register", None, Some(registration_body(ALICE)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn otp_errors_are_distinguishable() {
    let h = harness();

    let (status, _) = h.verify_code(ALICE, "registration", "123456").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let code = h.send_code(ALICE, "registration").await;
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let (status, body) = h.verify_code(ALICE, "registration", wrong).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "verification code does not match");

    let (status, _) = h.verify_code(ALICE, "registration", "12ab56").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    h.clock.advance(TimeDelta::minutes(11));
    let (status, body) = h.verify_code(ALICE, "registration", &code).await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["error"], "verification code has expired");

    let code = h.send_code(ALICE, "registration").await;
    assert_eq!(h.verify_code(ALICE, "registration", &code).await.0, StatusCode::OK);
    assert_eq!(h.verify_code(ALICE, "registration", &code).await.0, StatusCode::CONFLICT);
}

#[tokio::test]
async fn send_rejects_foreign_domains_and_delivery_failures() {
    let h = harness();

    let (status, _) = h
        .call("POST", "/otp/send", None, Some(json!({ "email": "bob@gmail.com" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    h.mailer.set_failing(true);
    let (status, body) = h
        .call("POST", "/otp/send", None, Some(json!({ "email": ALICE })))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(!body["error"].as_str().unwrap().contains("connection refused"));
    assert!(h.mailer.sent().is_empty());
}

#[tokio::test]
async fn login_needs_an_account_and_a_login_code() {
    let h = harness();
    let student = h.seed(1, &["CS101"], &["Library"], &["Weekend Morning"]);

    let (status, _) = h
        .call("POST", "/otp/send", None, Some(json!({ "email": "ghost@gapp.nthu.edu.tw", "purpose": "login" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = h
        .call("POST", "/otp/send", None, Some(json!({ "email": student.email, "purpose": "registration" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let code = h.send_code(&student.email, "login").await;

    // A login code does not verify the registration flow.
    let (status, _) = h.verify_code(&student.email, "registration", &code).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h
        .call("POST", "/auth/login", None, Some(json!({ "email": student.email })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(h.verify_code(&student.email, "login", &code).await.0, StatusCode::OK);
    let (status, body) = h
        .call("POST", "/auth/login", None, Some(json!({ "email": student.email })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["student_id"], student.id.to_string());
    assert!(body["token"].is_string());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn one_login_code_yields_one_session() {
    let h = harness();
    let student = h.seed(1, &["CS101"], &["Library"], &["Weekend Morning"]);
    let login = json!({ "email": student.email });

    for _ in 0..20 {
        let code = h.send_code(&student.email, "login").await;
        assert_eq!(h.verify_code(&student.email, "login", &code).await.0, StatusCode::OK);

        let (a, b) = tokio::join!(
            h.call("POST", "/auth/login", None, Some(login.clone())),
            h.call("POST", "/auth/login", None, Some(login.clone())),
        );
        let mut statuses = [a.0, b.0];
        statuses.sort();
        assert_eq!(statuses, [StatusCode::OK, StatusCode::FORBIDDEN]);
    }
}

#[tokio::test]
async fn rejected_registration_form_keeps_the_verification() {
    let h = harness();
    let code = h.send_code(ALICE, "registration").await;
    assert_eq!(h.verify_code(ALICE, "registration", &code).await.0, StatusCode::OK);

    let mut bad = registration_body(ALICE);
    bad["study_spots"] = json!(["Rooftop"]);
    let (status, _) = h.call("POST", "/auth/register", None, Some(bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h
        .call("POST", "/auth/register", None, Some(registration_body(ALICE)))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let h = harness();
    let student = h.seed(1, &["CS101"], &["Library"], &["Weekend Morning"]);

    assert_eq!(h.call("GET", "/students", None, None).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(
        h.call("GET", "/students", Some("not-a-jwt"), None).await.0,
        StatusCode::UNAUTHORIZED
    );

    let forged = create_token("other-secret", &student).unwrap();
    assert_eq!(
        h.call("GET", "/students", Some(&forged), None).await.0,
        StatusCode::UNAUTHORIZED
    );

    let token = create_token(SECRET, &student).unwrap();
    let (status, body) = h.call("GET", "/students", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn matches_are_ranked_and_limited() {
    let h = harness();
    let subject = h.seed(1, &["CS101", "MATH201"], &["Library"], &["Morning (9-12 PM)"]);
    h.seed(2, &["CS101", "MATH201"], &["Library"], &["Evening (6-9 PM)"]);
    h.seed(3, &["CS101", "MATH201"], &["Library"], &["Morning (9-12 PM)"]);
    h.seed(4, &["CS101"], &["Moonlight Area"], &["Night (9-12 AM)"]);
    h.seed(5, &["PHYS101"], &["Moonlight Area"], &["Night (9-12 AM)"]);
    h.seed(6, &["MATH201"], &[], &[]);
    let token = create_token(SECRET, &subject).unwrap();

    let (status, body) = h
        .call("GET", &format!("/matches/{}", subject.id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["target_student"], "Student 1");
    assert_eq!(body["total_checked"], 5);

    let matches = body["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 3);
    assert_eq!(matches[0]["candidate_id"], Uuid::from_u128(3).to_string());
    assert_eq!(matches[0]["similarity"], 100);
    assert_eq!(matches[1]["candidate_id"], Uuid::from_u128(2).to_string());
    assert_eq!(matches[1]["similarity"], 80);
    assert_eq!(matches[1]["shared_times"], json!([]));

    let (_, body) = h
        .call("GET", &format!("/matches/{}?limit=0", subject.id), Some(&token), None)
        .await;
    let ids: Vec<&str> = body["matches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["candidate_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 4);
    assert!(!ids.contains(&Uuid::from_u128(5).to_string().as_str()));

    let (status, _) = h
        .call("GET", &format!("/matches/{}", Uuid::from_u128(77)), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn corrupt_stored_profile_is_a_server_error() {
    let h = harness();
    let subject = h.seed(1, &["CS101"], &["Library"], &["Weekend Morning"]);
    h.seed(2, &["CS101", "CS101"], &["Library"], &["Weekend Morning"]);
    let token = create_token(SECRET, &subject).unwrap();

    let (status, body) = h
        .call("GET", &format!("/matches/{}", subject.id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal server error");
}

#[tokio::test]
async fn profile_updates_are_validated() {
    let h = harness();
    let student = h.seed(1, &["CS101"], &["Library"], &["Weekend Morning"]);
    let token = create_token(SECRET, &student).unwrap();

    let (status, _) = h
        .call(
            "PUT",
            "/me/profile",
            Some(&token),
            Some(json!({ "courses": ["EE200"], "study_spots": ["Narnia"], "study_times": ["Weekend Morning"] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = h
        .call(
            "PUT",
            "/me/profile",
            Some(&token),
            Some(json!({ "courses": ["EE200", "EE200"], "study_spots": ["Library"], "study_times": ["Weekend Evening"] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["courses"], json!(["EE200"]));
    assert_eq!(body["study_times"], json!(["Weekend Evening"]));
}

#[tokio::test]
async fn options_expose_the_vocabulary() {
    let h = harness();

    let (status, body) = h.call("GET", "/options", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["study_spots"].as_array().unwrap().contains(&json!("Library")));

    let (_, body) = h
        .call("GET", "/options/departments/College%20of%20Arts", None, None)
        .await;
    assert_eq!(body["departments"].as_array().unwrap().len(), 3);

    let (_, body) = h.call("GET", "/options/departments/Nowhere", None, None).await;
    assert_eq!(body["departments"], json!([]));
}
