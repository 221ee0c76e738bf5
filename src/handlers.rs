use super::*;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::web;

/// Mounts the account routes under `/auth`.
pub fn routes<D>(cfg: &mut web::ServiceConfig)
where
    D: UserDirectory + 'static,
{
    cfg.service(
        web::scope("/auth")
            .route("/signup", web::post().to(signup::<D>))
            .route("/signin", web::post().to(signin::<D>))
            .route("/signout", web::post().to(signout))
            .route("/whoami", web::get().to(whoami::<D>))
            .route("", web::get().to(find::<D>))
            .route("/{id}", web::get().to(lookup::<D>))
            .route("/{id}", web::patch().to(update::<D>))
            .route("/{id}", web::delete().to(remove::<D>)),
    );
}

pub async fn signup<D>(
    auth: web::Data<AuthService<D>>,
    sessions: web::Data<Sessions>,
    req: web::Json<Credentials>,
) -> HttpResponse
where
    D: UserDirectory,
{
    let email = req.email.trim();
    if !plausible(email) {
        return HttpResponse::BadRequest().body("invalid email");
    }
    match auth.signup(email, &req.password).await {
        Ok(user) => signed_in(&sessions, &user),
        Err(e) => failure(e),
    }
}

pub async fn signin<D>(
    auth: web::Data<AuthService<D>>,
    sessions: web::Data<Sessions>,
    req: web::Json<Credentials>,
) -> HttpResponse
where
    D: UserDirectory,
{
    match auth.signin(req.email.trim(), &req.password).await {
        Ok(user) => signed_in(&sessions, &user),
        Err(e) => failure(e),
    }
}

pub async fn signout() -> HttpResponse {
    HttpResponse::Ok()
        .cookie(Sessions::clear())
        .json(serde_json::json!({ "status": "signed_out" }))
}

pub async fn whoami<D>(
    auth: web::Data<AuthService<D>>,
    sessions: web::Data<Sessions>,
    req: HttpRequest,
) -> HttpResponse
where
    D: UserDirectory,
{
    let Some(id) = sessions.read(&req) else {
        return HttpResponse::Forbidden().body("not signed in");
    };
    match auth.lookup(id).await {
        Ok(Some(ref user)) => HttpResponse::Ok().json(UserInfo::from(user)),
        // account removed while the session was live
        Ok(None) => HttpResponse::Forbidden()
            .cookie(Sessions::clear())
            .body("not signed in"),
        Err(e) => failure(e),
    }
}

pub async fn find<D>(auth: web::Data<AuthService<D>>, query: web::Query<EmailQuery>) -> HttpResponse
where
    D: UserDirectory,
{
    match auth.find(query.email.trim()).await {
        Ok(users) => HttpResponse::Ok().json(users.iter().map(UserInfo::from).collect::<Vec<_>>()),
        Err(e) => failure(e),
    }
}

pub async fn lookup<D>(auth: web::Data<AuthService<D>>, path: web::Path<String>) -> HttpResponse
where
    D: UserDirectory,
{
    let Ok(id) = path.parse::<ID<User>>() else {
        return HttpResponse::BadRequest().body("invalid user id");
    };
    match auth.lookup(id).await {
        Ok(Some(ref user)) => HttpResponse::Ok().json(UserInfo::from(user)),
        Ok(None) => failure(AuthError::UserNotFound),
        Err(e) => failure(e),
    }
}

pub async fn update<D>(
    auth: web::Data<AuthService<D>>,
    path: web::Path<String>,
    req: web::Json<UserPatch>,
) -> HttpResponse
where
    D: UserDirectory,
{
    let Ok(id) = path.parse::<ID<User>>() else {
        return HttpResponse::BadRequest().body("invalid user id");
    };
    let patch = UserPatch {
        email: req.email.as_deref().map(str::trim).map(str::to_string),
    };
    if patch.email.as_deref().is_some_and(|e| !plausible(e)) {
        return HttpResponse::BadRequest().body("invalid email");
    }
    match auth.update(id, &patch).await {
        Ok(Some(ref user)) => HttpResponse::Ok().json(UserInfo::from(user)),
        Ok(None) => failure(AuthError::UserNotFound),
        Err(e) => failure(e),
    }
}

pub async fn remove<D>(auth: web::Data<AuthService<D>>, path: web::Path<String>) -> HttpResponse
where
    D: UserDirectory,
{
    let Ok(id) = path.parse::<ID<User>>() else {
        return HttpResponse::BadRequest().body("invalid user id");
    };
    match auth.remove(id).await {
        Ok(Some(ref user)) => HttpResponse::Ok().json(UserInfo::from(user)),
        Ok(None) => failure(AuthError::UserNotFound),
        Err(e) => failure(e),
    }
}

fn signed_in(sessions: &Sessions, user: &User) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(sessions.issue(user.id()))
        .json(UserInfo::from(user))
}

/// Caller mistakes get their message back; faults are logged and kept opaque.
fn failure(e: AuthError) -> HttpResponse {
    match e {
        AuthError::EmailInUse | AuthError::InvalidCredential => {
            HttpResponse::BadRequest().body(e.to_string())
        }
        AuthError::UserNotFound => HttpResponse::NotFound().body(e.to_string()),
        AuthError::Timeout => HttpResponse::ServiceUnavailable().body(e.to_string()),
        e => {
            log::error!("request failed: {}", e);
            HttpResponse::InternalServerError().body("internal error")
        }
    }
}

/// One `@` with something on either side and a dot in the domain.
fn plausible(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::App;
    use actix_web::cookie::Cookie;
    use actix_web::cookie::Key;
    use actix_web::dev::ServiceResponse;
    use actix_web::http::StatusCode;
    use actix_web::test as http;

    macro_rules! app {
        ($auth:expr) => {
            http::init_service(
                App::new()
                    .app_data(web::Data::new($auth))
                    .app_data(web::Data::new(Sessions::new(Key::generate())))
                    .configure(routes::<Memory>),
            )
            .await
        };
    }

    fn credentials(email: &str, password: &str) -> serde_json::Value {
        serde_json::json!({ "email": email, "password": password })
    }

    fn session(resp: &ServiceResponse) -> Option<Cookie<'static>> {
        resp.response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .map(|c| c.into_owned())
    }

    #[test]
    fn plausible_emails() {
        assert!(plausible("a@x.com"));
        assert!(plausible("first.last@mail.example.org"));
        assert!(!plausible("a.x.com"));
        assert!(!plausible("@x.com"));
        assert!(!plausible("a@"));
        assert!(!plausible("a@x"));
        assert!(!plausible("a@@x.com"));
        assert!(!plausible("a b@x.com"));
    }

    #[actix_web::test]
    async fn signup_signs_in_and_hides_password() {
        let app = app!(AuthService::new(Memory::default(), Scrypt));
        let req = http::TestRequest::post()
            .uri("/auth/signup")
            .set_json(credentials("a@x.com", "P@ss1"))
            .to_request();
        let resp = http::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = session(&resp).unwrap();
        let body: serde_json::Value = http::read_body_json(resp).await;
        assert_eq!(body["email"], "a@x.com");
        assert!(body.get("password").is_none());
        let req = http::TestRequest::get()
            .uri("/auth/whoami")
            .cookie(cookie)
            .to_request();
        let me: UserInfo = http::call_and_read_body_json(&app, req).await;
        assert_eq!(me.email, "a@x.com");
        assert_eq!(me.id, body["id"]);
    }

    #[actix_web::test]
    async fn signup_twice_is_rejected() {
        let app = app!(AuthService::new(Memory::default(), Scrypt));
        for (expected, password) in [(StatusCode::OK, "P@ss1"), (StatusCode::BAD_REQUEST, "Other!2")] {
            let req = http::TestRequest::post()
                .uri("/auth/signup")
                .set_json(credentials("a@x.com", password))
                .to_request();
            assert_eq!(http::call_service(&app, req).await.status(), expected);
        }
    }

    #[actix_web::test]
    async fn signup_rejects_bad_email() {
        let app = app!(AuthService::new(Memory::default(), Scrypt));
        let req = http::TestRequest::post()
            .uri("/auth/signup")
            .set_json(credentials("not-an-email", "P@ss1"))
            .to_request();
        let resp = http::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(session(&resp).is_none());
    }

    #[actix_web::test]
    async fn signin_outcomes() {
        let auth = AuthService::new(Memory::default(), Scrypt);
        auth.signup("a@x.com", "P@ss1").await.unwrap();
        let app = app!(auth);
        for (email, password, expected) in [
            ("a@x.com", "P@ss1", StatusCode::OK),
            ("a@x.com", "wrong", StatusCode::BAD_REQUEST),
            ("nobody@x.com", "anything", StatusCode::NOT_FOUND),
        ] {
            let req = http::TestRequest::post()
                .uri("/auth/signin")
                .set_json(credentials(email, password))
                .to_request();
            let resp = http::call_service(&app, req).await;
            assert_eq!(resp.status(), expected, "{} {}", email, password);
            assert_eq!(session(&resp).is_some(), expected == StatusCode::OK);
        }
    }

    #[actix_web::test]
    async fn signin_on_corrupt_record_is_opaque() {
        let memory = Memory::default();
        memory.create("a@x.com", "Azxcv@123").await.unwrap();
        let app = app!(AuthService::new(memory, Scrypt));
        let req = http::TestRequest::post()
            .uri("/auth/signin")
            .set_json(credentials("a@x.com", "Azxcv@123"))
            .to_request();
        let resp = http::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = http::read_body(resp).await;
        assert_eq!(body, "internal error");
    }

    #[actix_web::test]
    async fn whoami_without_session() {
        let app = app!(AuthService::new(Memory::default(), Scrypt));
        let req = http::TestRequest::get().uri("/auth/whoami").to_request();
        assert_eq!(http::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn signout_clears_session() {
        let app = app!(AuthService::new(Memory::default(), Scrypt));
        let req = http::TestRequest::post().uri("/auth/signout").to_request();
        let resp = http::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = session(&resp).unwrap();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(actix_web::cookie::time::Duration::ZERO));
    }

    #[actix_web::test]
    async fn find_lookup_update_remove() {
        let auth = AuthService::new(Memory::default(), Scrypt);
        let user = auth.signup("a@x.com", "P@ss1").await.unwrap();
        auth.signup("b@x.com", "P@ss1").await.unwrap();
        let app = app!(auth);
        let uri = format!("/auth/{}", user.id());

        let req = http::TestRequest::get().uri("/auth?email=a@x.com").to_request();
        let found: Vec<UserInfo> = http::call_and_read_body_json(&app, req).await;
        assert_eq!(found, vec![UserInfo::from(&user)]);

        let req = http::TestRequest::get().uri(&uri).to_request();
        let one: UserInfo = http::call_and_read_body_json(&app, req).await;
        assert_eq!(one, UserInfo::from(&user));

        let req = http::TestRequest::patch()
            .uri(&uri)
            .set_json(serde_json::json!({ "email": "b@x.com" }))
            .to_request();
        assert_eq!(http::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = http::TestRequest::patch()
            .uri(&uri)
            .set_json(serde_json::json!({ "email": "c@x.com", "password": "ignored" }))
            .to_request();
        let patched: UserInfo = http::call_and_read_body_json(&app, req).await;
        assert_eq!(patched.email, "c@x.com");

        let req = http::TestRequest::post()
            .uri("/auth/signin")
            .set_json(credentials("c@x.com", "P@ss1"))
            .to_request();
        assert_eq!(http::call_service(&app, req).await.status(), StatusCode::OK);

        let req = http::TestRequest::delete().uri(&uri).to_request();
        assert_eq!(http::call_service(&app, req).await.status(), StatusCode::OK);
        let req = http::TestRequest::delete().uri(&uri).to_request();
        assert_eq!(http::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
        let req = http::TestRequest::get().uri(&uri).to_request();
        assert_eq!(http::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn garbage_ids_are_bad_requests() {
        let app = app!(AuthService::new(Memory::default(), Scrypt));
        let req = http::TestRequest::get().uri("/auth/not-a-uuid").to_request();
        assert_eq!(http::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn session_of_removed_user_is_dropped() {
        let app = app!(AuthService::new(Memory::default(), Scrypt));
        let req = http::TestRequest::post()
            .uri("/auth/signup")
            .set_json(credentials("a@x.com", "P@ss1"))
            .to_request();
        let resp = http::call_service(&app, req).await;
        let cookie = session(&resp).unwrap();
        let me: UserInfo = http::read_body_json(resp).await;
        let req = http::TestRequest::delete()
            .uri(&format!("/auth/{}", me.id))
            .to_request();
        assert_eq!(http::call_service(&app, req).await.status(), StatusCode::OK);
        let req = http::TestRequest::get()
            .uri("/auth/whoami")
            .cookie(cookie)
            .to_request();
        assert_eq!(http::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }
}
