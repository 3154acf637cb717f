//! End-to-end resolution properties across a tenant resolver and its parent.
//!
//! Uses in-memory artifacts and counting stubs from `test_support` so lookups
//! and parent delegations can be observed directly.

use std::io::Read as _;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use stratum::test_support::{
    CountingArtifact, CountingUpstream, FailingArtifact, artifact_dir, memory_artifact,
    shared_environment,
};
use stratum::{
    Artifact, ArtifactSet, Definition, DirArtifact, FrameworkPattern, ResolveError, Resolver,
    SharedEnvironment, Upstream, VersionSelector,
};

fn framework_filter_resolver(parent: Arc<dyn Upstream>) -> Resolver {
    Resolver::builder(ArtifactSet::new(vec![
        memory_artifact("/jobs/7/framework-1.12.jar", &["META-INF/services/x"]),
        memory_artifact("/jobs/7/framework-1.14.jar", &["META-INF/services/x"]),
        memory_artifact("/jobs/7/other.jar", &["META-INF/services/x"]),
    ]))
    .parent(parent)
    .framework(FrameworkPattern::new(r"framework-(?P<version>.+)\.jar").expect("pattern"))
    .selector(VersionSelector::new(r"1\.12").expect("selector"))
    .build()
}

#[test]
fn shim_filter_hides_other_framework_builds() {
    let resolver = framework_filter_resolver(shared_environment("/shared", &[]));
    let origins: Vec<String> = resolver
        .resolve_all("META-INF/services/x")
        .iter()
        .map(|c| c.origin().to_string())
        .collect();
    assert_eq!(origins, vec!["/jobs/7/framework-1.12.jar", "/jobs/7/other.jar"]);
}

#[test]
fn resolve_all_puts_local_before_parent() {
    let parent = Arc::new(SharedEnvironment::new(ArtifactSet::new(vec![
        memory_artifact("/shared/b.jar", &["app.conf"]),
        memory_artifact("/shared/a.jar", &["app.conf"]),
    ])));
    let resolver = Resolver::builder(ArtifactSet::new(vec![
        memory_artifact("/jobs/7/z.jar", &["app.conf"]),
        memory_artifact("/jobs/7/y.jar", &["app.conf"]),
    ]))
    .parent(parent)
    .build();

    let origins: Vec<String> = resolver
        .resolve_all("app.conf")
        .iter()
        .map(|c| c.origin().to_string())
        .collect();
    assert_eq!(
        origins,
        vec!["/jobs/7/z.jar", "/jobs/7/y.jar", "/shared/b.jar", "/shared/a.jar"]
    );
}

#[test]
fn parent_candidates_are_filtered_with_child_selector() {
    let parent = Arc::new(SharedEnvironment::new(ArtifactSet::new(vec![
        memory_artifact("/shared/framework-1.14.jar", &["META-INF/services/x"]),
        memory_artifact("/shared/framework-1.12.jar", &["META-INF/services/x"]),
    ])));
    let resolver = framework_filter_resolver(parent);
    let origins: Vec<String> = resolver
        .resolve_all("META-INF/services/x")
        .iter()
        .map(|c| c.origin().to_string())
        .collect();
    assert_eq!(
        origins,
        vec![
            "/jobs/7/framework-1.12.jar",
            "/jobs/7/other.jar",
            "/shared/framework-1.12.jar"
        ]
    );
}

#[test]
fn candidates_expose_bytes() {
    let resolver = Resolver::builder(ArtifactSet::new(vec![memory_artifact(
        "/jobs/7/app.jar",
        &["app.conf"],
    )]))
    .build();
    let candidates = resolver.resolve_all("app.conf");
    let mut contents = String::new();
    candidates[0]
        .open()
        .expect("open")
        .read_to_string(&mut contents)
        .expect("read");
    assert_eq!(contents, "/jobs/7/app.jar");
}

#[test]
fn reserved_namespace_never_resolves_locally() {
    let parent = Arc::new(CountingUpstream::new(shared_environment(
        "/shared",
        &["org/apache/log4j/Logger.class"],
    )));
    let resolver = Resolver::builder(ArtifactSet::new(vec![memory_artifact(
        "/jobs/7/app.jar",
        &["org/apache/log4j/Logger.class"],
    )]))
    .parent(parent.clone())
    .build();

    let def = resolver
        .resolve_one("org.apache.log4j.Logger")
        .expect("resolve");
    assert_eq!(def.origin, "/shared");
    assert_eq!(parent.calls(), 1);
}

#[test]
fn parent_failure_passes_through_unchanged() {
    let resolver = Resolver::builder(ArtifactSet::empty())
        .parent(shared_environment("/shared", &[]))
        .build();
    match resolver.resolve_one("com.acme.Missing") {
        Err(ResolveError::NotFound { name }) => assert_eq!(name, "com.acme.Missing"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn parent_definition_identity_is_shared_with_child() {
    let shared = Arc::new(SharedEnvironment::new(ArtifactSet::new(vec![
        memory_artifact("/shared", &["com/acme/Util.class"]),
    ])));
    let a = Resolver::builder(ArtifactSet::empty())
        .tenant("a")
        .parent(shared.clone())
        .build();
    let b = Resolver::builder(ArtifactSet::empty())
        .tenant("b")
        .parent(shared.clone())
        .build();

    let from_a = a.resolve_one("com.acme.Util").expect("a");
    let from_b = b.resolve_one("com.acme.Util").expect("b");
    assert!(Definition::same(&from_a, &from_b));
}

#[test]
fn nested_resolvers_chain_child_first() {
    let root = shared_environment("/shared", &["com/acme/Base.class"]);
    let middle = Arc::new(
        Resolver::builder(ArtifactSet::new(vec![memory_artifact(
            "/platform",
            &["com/acme/Base.class", "com/acme/Platform.class"],
        )]))
        .parent(root)
        .build(),
    );
    let leaf = Resolver::builder(ArtifactSet::new(vec![memory_artifact(
        "/jobs/7",
        &["com/acme/Job.class"],
    )]))
    .parent(middle)
    .build();

    assert_eq!(leaf.resolve_one("com.acme.Job").expect("job").origin, "/jobs/7");
    assert_eq!(leaf.resolve_one("com.acme.Base").expect("base").origin, "/platform");
    assert_eq!(
        leaf.resolve_one("com.acme.Platform").expect("platform").origin,
        "/platform"
    );
}

#[test]
fn empty_resolver_without_parent_finds_nothing() {
    let resolver = Resolver::builder(ArtifactSet::empty()).build();
    for name in ["com.acme.Job", "java.lang.Object", "org.slf4j.Logger"] {
        assert!(resolver.resolve_one(name).expect_err("missing").is_not_found());
    }
    assert!(resolver.resolve_all("app.conf").is_empty());
    assert!(resolver.resolve_all("com/acme/Job.class").is_empty());
}

#[test]
fn concurrent_resolution_looks_up_once() {
    let artifact = Arc::new(CountingArtifact::with_delay(
        memory_artifact("/jobs/7/app.jar", &["com/acme/Job.class"]),
        Duration::from_millis(25),
    ));
    let resolver = Arc::new(
        Resolver::builder(ArtifactSet::new(vec![artifact.clone() as Arc<dyn Artifact>])).build(),
    );

    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                resolver.resolve_one("com.acme.Job")
            })
        })
        .collect();

    let defs: Vec<Arc<Definition>> = handles
        .into_iter()
        .map(|h| h.join().expect("join").expect("resolve"))
        .collect();
    assert_eq!(artifact.lookups(), 1);
    assert!(defs.windows(2).all(|w| Definition::same(&w[0], &w[1])));
}

#[test]
fn concurrent_misses_delegate_to_parent_once() {
    let parent = Arc::new(CountingUpstream::new(shared_environment(
        "/shared",
        &["com/acme/Util.class"],
    )));
    let resolver = Arc::new(
        Resolver::builder(ArtifactSet::empty())
            .parent(parent.clone())
            .build(),
    );

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                resolver.resolve_one("com.acme.Util").map(|_| ())
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("join").expect("resolve");
    }
    assert_eq!(parent.calls(), 1);
}

#[test]
fn io_failure_is_distinct_from_not_found() {
    let resolver = Resolver::builder(ArtifactSet::new(vec![Arc::new(
        FailingArtifact::new(
            "/jobs/7/broken",
            std::io::ErrorKind::PermissionDenied,
        ),
    ) as Arc<dyn Artifact>]))
    .parent(shared_environment("/shared", &["com/acme/Job.class"]))
    .build();

    let err = resolver.resolve_one("com.acme.Job").expect_err("io");
    assert!(matches!(err, ResolveError::Io { .. }));
    let again = resolver.resolve_one("com.acme.Job").expect_err("memoized");
    match (err, again) {
        (ResolveError::Io { source: a, .. }, ResolveError::Io { source: b, .. }) => {
            assert!(Arc::ptr_eq(&a, &b));
        }
        _ => panic!("expected io failures"),
    }
}

#[test]
fn resolve_resource_walks_the_chain_child_first() {
    let shared_dir = artifact_dir(&[
        ("log4j.properties", "shared"),
        ("core.conf", "shared-core"),
    ])
    .expect("shared dir");
    let job_dir = artifact_dir(&[("log4j.properties", "job")]).expect("job dir");

    let parent = Arc::new(SharedEnvironment::new(ArtifactSet::from_dirs([shared_dir.path()])));
    let resolver = Resolver::builder(ArtifactSet::new(vec![
        Arc::new(DirArtifact::new(job_dir.path())) as Arc<dyn Artifact>,
    ]))
    .parent(parent)
    .build();

    let mut contents = String::new();
    resolver
        .resolve_resource("log4j.properties")
        .expect("resolve")
        .expect("present")
        .open()
        .expect("open")
        .read_to_string(&mut contents)
        .expect("read");
    assert_eq!(contents, "job");

    let fallback = resolver
        .resolve_resource("core.conf")
        .expect("resolve")
        .expect("present");
    assert_eq!(fallback.origin(), shared_dir.path().to_string_lossy());
    assert!(resolver.resolve_resource("absent.conf").expect("resolve").is_none());
}

#[test]
fn resolve_resource_stops_at_first_local_hit() {
    let first = Arc::new(CountingArtifact::new(memory_artifact("/jobs/7/a", &["app.conf"])));
    let second = Arc::new(CountingArtifact::new(memory_artifact("/jobs/7/b", &["app.conf"])));
    let parent = Arc::new(CountingUpstream::new(shared_environment("/shared", &["app.conf"])));
    let resolver = Resolver::builder(ArtifactSet::new(vec![
        first.clone() as Arc<dyn Artifact>,
        second.clone() as Arc<dyn Artifact>,
    ]))
    .parent(parent.clone())
    .build();

    for _ in 0..2 {
        let candidate = resolver
            .resolve_resource("app.conf")
            .expect("resolve")
            .expect("present");
        assert_eq!(candidate.origin(), "/jobs/7/a");
    }
    assert_eq!(first.lookups(), 2);
    assert_eq!(second.lookups(), 0);
    assert_eq!(parent.calls(), 0);
}

#[test]
fn resolve_resource_reports_io_failure() {
    let resolver = Resolver::builder(ArtifactSet::new(vec![Arc::new(FailingArtifact::new(
        "/jobs/7/broken",
        std::io::ErrorKind::PermissionDenied,
    )) as Arc<dyn Artifact>]))
    .parent(shared_environment("/shared", &["app.conf"]))
    .build();

    match resolver.resolve_resource("app.conf") {
        Err(ResolveError::Io { origin, .. }) => assert_eq!(origin, "/jobs/7/broken"),
        other => panic!("unexpected {other:?}"),
    }
}
