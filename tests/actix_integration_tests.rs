#![cfg(feature = "actix")]

mod common;

use actix_web::http::{StatusCode, header};
use actix_web::middleware::from_fn;
use actix_web::{App, HttpResponse, test, web};
use better_auth_bridge::{
    ActixAdapter, AuthEngine, BetterAuthModule, CurrentUser, CurrentUserSession, HttpMethod,
    ModuleOptions, OptionalUserSession, Reflector, RouteTarget, StandardResponse,
    require_session,
};
use better_auth_engine::BetterAuth;
use common::*;
use serde_json::{Value, json};

async fn me(CurrentUser(user): CurrentUser) -> HttpResponse {
    HttpResponse::Ok().body(format!(
        "Hello {} from authenticated route!",
        user.email.unwrap_or_default()
    ))
}

async fn whoami(OptionalUserSession(session): OptionalUserSession) -> HttpResponse {
    HttpResponse::Ok().body(
        session
            .map(|session| session.user.id)
            .unwrap_or_else(|| "anonymous".to_string()),
    )
}

async fn unguarded(CurrentUserSession(session): CurrentUserSession) -> HttpResponse {
    HttpResponse::Ok().body(session.user.id)
}

/// Auth routes plus guarded `/me` and `/public`, and an unguarded accessor route.
fn routes<E: AuthEngine>(module: BetterAuthModule<E>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        module
            .configure(&mut ActixAdapter::new(cfg))
            .expect("actix-web is supported");
        cfg.service(
            web::resource("/me")
                .wrap(from_fn(require_session::<E, _>))
                .route(web::get().to(me)),
        )
        .service(
            web::resource("/public")
                .wrap(from_fn(require_session::<E, _>))
                .route(web::get().to(whoami)),
        )
        .service(web::resource("/unguarded").route(web::get().to(unguarded)));
    }
}

async fn fake_module(
    config: FakeConfig,
    logger: &std::sync::Arc<CaptureLogger>,
) -> BetterAuthModule<FakeEngine> {
    BetterAuthModule::<FakeEngine>::for_root(
        fake_options(config, logger).skip_auth_metadata_key("PUBLIC"),
    )
    .reflector(Reflector::new().set_metadata(
        RouteTarget::new(HttpMethod::Get, "/public"),
        "PUBLIC",
        true,
    ))
    .build()
    .await
    .unwrap()
}

#[actix_web::test]
async fn sign_up_sign_in_and_reach_protected_route_with_bearer() {
    let module = BetterAuthModule::<BetterAuth>::for_root(ModuleOptions::new(engine_config()))
        .build()
        .await
        .unwrap();
    let app = test::init_service(App::new().configure(routes(module))).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/sign-up/email")
        .set_json(sign_up_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "code": "UNAUTHORIZED", "message": "Unauthorized" }));

    let req = test::TestRequest::post()
        .uri("/api/auth/sign-in/email")
        .set_json(sign_in_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let token = resp
        .headers()
        .get("set-auth-token")
        .expect("bearer token header")
        .to_str()
        .unwrap()
        .to_string();

    let req = test::TestRequest::get()
        .uri("/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(body, "Hello test@x.com from authenticated route!".as_bytes());
}

#[actix_web::test]
async fn skip_flag_bypasses_the_lookup() {
    let logger = CaptureLogger::new();
    let module = fake_module(FakeConfig::default(), &logger).await;
    let engine = module.auth().clone();
    let app = test::init_service(App::new().configure(routes(module))).await;

    let req = test::TestRequest::get().uri("/public").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "anonymous".as_bytes());
    assert_eq!(engine.session_lookups(), 0);

    let req = test::TestRequest::get()
        .uri("/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", VALID_TOKEN)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(engine.session_lookups(), 1);
}

#[actix_web::test]
async fn forwards_requests_and_every_set_cookie() {
    let logger = CaptureLogger::new();
    let mut canned = StandardResponse::new(201);
    canned.headers.append("set-cookie", "a=1; Path=/");
    canned.headers.append("set-cookie", "b=2; Path=/");
    let config = FakeConfig {
        response: Some(canned),
        ..FakeConfig::default()
    };
    let module = fake_module(config, &logger).await;
    let engine = module.auth().clone();
    let app = test::init_service(App::new().configure(routes(module))).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/custom/path?x=1")
        .insert_header((header::CONTENT_TYPE, "text/plain"))
        .set_payload("hello")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let cookies: Vec<&str> = resp
        .headers()
        .get_all(header::SET_COOKIE)
        .map(|value| value.to_str().unwrap())
        .collect();
    assert_eq!(cookies, vec!["a=1; Path=/", "b=2; Path=/"]);

    let seen = engine.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, HttpMethod::Post);
    assert_eq!(seen[0].path(), "/api/auth/custom/path");
    assert_eq!(seen[0].url.query(), Some("x=1"));
    assert_eq!(seen[0].body.as_deref(), Some("hello"));
}

#[actix_web::test]
async fn handler_failure_yields_generic_reply() {
    let logger = CaptureLogger::new();
    let config = FakeConfig {
        fail_handler: true,
        ..FakeConfig::default()
    };
    let module = fake_module(config, &logger).await;
    let app = test::init_service(App::new().configure(routes(module))).await;

    let req = test::TestRequest::get()
        .uri("/api/auth/get-session")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "AUTH_FAILURE");
    assert!(logger.contains(Level::Error, "Better Auth handler failed"));
}

#[actix_web::test]
async fn accessor_without_guard_is_a_server_error() {
    let logger = CaptureLogger::new();
    let module = fake_module(FakeConfig::default(), &logger).await;
    let app = test::init_service(App::new().configure(routes(module))).await;

    let req = test::TestRequest::get().uri("/unguarded").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "SESSION_CONTEXT_MISSING");
}
