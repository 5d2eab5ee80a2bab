//! Hook discovery and splicing against an engine built by the module.

mod common;

use better_auth_bridge::{
    AuthEngine, AuthError, BetterAuthModule, HookMethod, HookPhase, HookProvider, HttpMethod,
    ModuleError, StandardRequest, create_auth_middleware,
};
use common::*;
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<String>>>;

struct Audit {
    log: Log,
    methods: Vec<(&'static str, Option<&'static str>, Option<&'static str>)>,
}

impl HookProvider for Audit {
    fn hook_methods(self: Arc<Self>) -> Vec<HookMethod> {
        self.methods
            .iter()
            .map(|(name, before, after)| {
                let log = self.log.clone();
                let label = *name;
                let mut method = HookMethod::from_fn(label, move |ctx| {
                    let log = log.clone();
                    Box::pin(async move {
                        log.lock()
                            .unwrap()
                            .push(format!("{} {} {}", label, ctx.phase(), ctx.path));
                        Ok(())
                    })
                });
                if let Some(path) = before {
                    method = method.before(*path);
                }
                if let Some(path) = after {
                    method = method.after(*path);
                }
                method
            })
            .collect()
    }
}

fn get(path: &str) -> StandardRequest {
    StandardRequest::parse(HttpMethod::Get, &format!("http://localhost{}", path)).unwrap()
}

#[tokio::test]
async fn matching_methods_run_in_phase_and_registration_order() {
    let logger = CaptureLogger::new();
    let log = Log::default();
    let module = BetterAuthModule::<FakeEngine>::for_root(fake_options(
        FakeConfig::default(),
        &logger,
    ))
    .provider(Audit {
        log: log.clone(),
        methods: vec![
            ("audit", Some("/sign-up/email"), Some("/sign-up/email")),
            ("other", Some("/sign-in/email"), None),
            ("late", None, Some("/sign-up/email")),
        ],
    })
    .build()
    .await
    .unwrap();

    module
        .auth()
        .handler(get("/api/auth/sign-up/email"))
        .await
        .unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "audit before /sign-up/email",
            "audit after /sign-up/email",
            "late after /sign-up/email",
        ]
    );

    log.lock().unwrap().clear();
    module.auth().handler(get("/api/auth/get-session")).await.unwrap();
    assert!(log.lock().unwrap().is_empty());
    assert!(logger.contains(Level::Debug, "Spliced 4 hook registration(s)"));
}

#[tokio::test]
async fn providers_run_in_registration_order() {
    let logger = CaptureLogger::new();
    let log = Log::default();
    let module = BetterAuthModule::<FakeEngine>::for_root(fake_options(
        FakeConfig::default(),
        &logger,
    ))
    .provider(Audit {
        log: log.clone(),
        methods: vec![("first", Some("/x"), None)],
    })
    .shared_provider(Arc::new(Audit {
        log: log.clone(),
        methods: vec![("second", Some("/x"), None)],
    }))
    .build()
    .await
    .unwrap();

    module.auth().handler(get("/api/auth/x")).await.unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec!["first before /x", "second before /x"]
    );
}

#[tokio::test]
async fn before_hook_error_short_circuits_the_engine() {
    let logger = CaptureLogger::new();

    struct Deny;
    impl HookProvider for Deny {
        fn hook_methods(self: Arc<Self>) -> Vec<HookMethod> {
            vec![
                HookMethod::new(
                    "deny",
                    create_auth_middleware(|_ctx| {
                        Box::pin(async move { Err::<(), _>(AuthError::forbidden("nope")) })
                    }),
                )
                .before("/sign-up/email"),
            ]
        }
    }

    let module = BetterAuthModule::<FakeEngine>::for_root(fake_options(
        FakeConfig::default(),
        &logger,
    ))
    .provider(Deny)
    .build()
    .await
    .unwrap();

    let response = module
        .auth()
        .handler(get("/api/auth/sign-up/email"))
        .await
        .unwrap();
    assert_eq!(response.status, 403);

    let response = module
        .auth()
        .handler(get("/api/auth/sign-in/email"))
        .await
        .unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn engines_without_hook_slots_are_left_alone() {
    let logger = CaptureLogger::new();
    let log = Log::default();
    let config = FakeConfig {
        no_hooks: true,
        ..FakeConfig::default()
    };
    let module = BetterAuthModule::<FakeEngine>::for_root(fake_options(config, &logger))
        .provider(Audit {
            log: log.clone(),
            methods: vec![("audit", Some("/sign-up/email"), None)],
        })
        .build()
        .await
        .unwrap();

    assert!(module.auth().hooks().is_none());
    module
        .auth()
        .handler(get("/api/auth/sign-up/email"))
        .await
        .unwrap();
    assert!(log.lock().unwrap().is_empty());
    assert!(logger.contains(Level::Debug, "1 hook registration(s) ignored"));
}

#[tokio::test]
async fn relative_hook_paths_fail_startup() {
    let logger = CaptureLogger::new();
    let result = BetterAuthModule::<FakeEngine>::for_root(fake_options(
        FakeConfig::default(),
        &logger,
    ))
    .provider(Audit {
        log: Log::default(),
        methods: vec![("broken", None, Some("sign-up/email"))],
    })
    .build()
    .await;

    match result {
        Err(ModuleError::InvalidHookPath { method, path }) => {
            assert_eq!(method, "broken");
            assert_eq!(path, "sign-up/email");
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("relative hook path was accepted"),
    }
}

#[tokio::test]
async fn engine_construction_errors_surface() {
    let result = BetterAuthModule::<better_auth_engine::BetterAuth>::for_root(
        better_auth_bridge::ModuleOptions::new(better_auth_engine::AuthConfig::new("short")),
    )
    .build()
    .await;

    assert!(matches!(result, Err(ModuleError::Engine(_))));
}

#[test]
fn hook_method_reports_its_paths() {
    let method = HookMethod::from_fn("m", |_ctx| Box::pin(async move { Ok(()) }))
        .before("/a")
        .after("/b");
    assert_eq!(method.name(), "m");
    assert_eq!(method.path(HookPhase::Before), Some("/a"));
    assert_eq!(method.path(HookPhase::After), Some("/b"));
}
