//! Resolution behavior: implicit construction, recursion, deferred
//! handles, and failure reporting.

mod common;

use common::{
    Database, Exporter, Greeting, Job, Metrics, Pool, Repository, Worker,
};
use wirecore::{Container, Deferred, ResolveError, TypeKey};

#[test]
fn resolves_unregistered_type_with_a_zero_arg_constructor() {
    common::init_tracing();
    let container = Container::new();

    let metrics = container.resolve::<Metrics>().unwrap();
    assert_eq!(metrics, Metrics::default());
}

#[test]
fn resolves_registered_factory_value() {
    let container = Container::new();
    container.register(|_| Ok(String::from("hello")));

    assert_eq!(container.resolve::<String>().unwrap(), "hello");
}

#[test]
fn constructor_parameters_resolve_recursively() {
    let container = Container::new();
    container.register(|_| Ok(String::from("postgres://localhost")));

    let repo = container.resolve::<Repository>().unwrap();
    assert_eq!(repo.db.url, "postgres://localhost");
}

#[test]
fn registered_value_flows_into_a_single_param_constructor() {
    let container = Container::new();
    container.register(|_| Ok(String::from("hello")));

    let greeting = container.resolve::<Greeting>().unwrap();
    assert_eq!(greeting.text, "hello");
}

#[test]
fn factories_can_resolve_their_own_dependencies() {
    let container = Container::new();
    container.register(|_| Ok(String::from("db://primary")));
    container.register(|c| Ok(Database::new(c.resolve::<String>()? + "/override")));

    let repo = container.resolve::<Repository>().unwrap();
    assert_eq!(repo.db.url, "db://primary/override");
}

#[test]
fn defaulted_parameters_use_their_declared_expression() {
    let container = Container::new();
    container.register(|_| Ok(String::from("sync")));

    let job = container.resolve::<Job>().unwrap();
    assert_eq!(job.name, "sync");
    assert_eq!(job.retries, 3);
}

#[test]
fn fully_defaulted_constructors_need_no_registrations() {
    let container = Container::new();

    let pool = container.resolve::<Pool>().unwrap();
    assert_eq!(pool.size, 8);
    assert_eq!(pool.label, "pool");
}

#[test]
fn optional_dependencies_degrade_to_none() {
    let container = Container::new();

    let worker = container.resolve::<Worker>().unwrap();
    assert!(worker.audit.is_none());
}

#[test]
fn optional_dependencies_fill_when_registered() {
    let container = Container::new();
    container.register(|_| {
        Ok(common::AuditSink {
            tag: String::from("ops"),
        })
    });

    let worker = container.resolve::<Worker>().unwrap();
    assert_eq!(worker.audit.unwrap().tag, "ops");
}

#[test]
fn unregistered_unplanned_type_fails_with_its_name() {
    let container = Container::new();

    let err = container.resolve::<String>().unwrap_err();
    assert!(err.to_string().contains("String"));
}

#[test]
fn tied_constructors_fail_with_an_ambiguity_naming_the_type() {
    let container = Container::new();
    container.register(|_| Ok(String::from("endpoint")));

    let err = container.resolve::<Exporter>().unwrap_err();
    assert!(err.to_string().contains("Exporter"));

    let source = std::error::Error::source(&err).expect("underlying cause");
    assert!(source.to_string().contains("ambiguous"));
}

#[test]
fn ambiguity_survives_even_when_all_parameters_are_resolvable() {
    let container = Container::new();
    container.register(|_| Ok(String::from("endpoint")));
    container.register(|_| Ok(Database::new(String::from("db"))));

    assert!(container.resolve::<Exporter>().is_err());
}

#[test]
fn resolve_by_key_is_equivalent_to_typed_resolution() {
    let container = Container::new();
    container.register(|_| Ok(String::from("hello")));

    let boxed = container.resolve_by_key(&TypeKey::of::<Greeting>()).unwrap();
    let greeting = boxed.downcast::<Greeting>().unwrap();
    assert_eq!(greeting.text, "hello");
}

#[test]
fn strategy_supplies_a_value_and_unmatched_types_fall_through() {
    let container = Container::new();
    container.add_strategy(|key| key.is::<i32>().then(|| wirecore::factory(|_| Ok(42i32))));

    assert_eq!(container.resolve::<i32>().unwrap(), 42);
    assert!(container.resolve::<String>().is_err());
}

#[test]
fn deferred_resolves_for_registered_types() {
    let container = Container::new();
    container.register(|_| Ok(String::from("later")));

    let deferred = container.resolve::<Deferred<String>>().unwrap();
    assert_eq!(deferred.resolve().unwrap(), "later");
}

#[test]
fn deferred_resolves_for_plan_registry_types_without_registration() {
    let container = Container::new();
    container.register(|_| Ok(String::from("hello")));

    let deferred = container.resolve::<Deferred<Greeting>>().unwrap();
    assert_eq!(deferred.resolve().unwrap().text, "hello");
}

#[test]
fn deferred_performs_a_fresh_resolution_each_call() {
    let container = Container::new();
    container.register(|_| Ok(String::from("first")));

    let deferred = container.resolve::<Deferred<Greeting>>().unwrap();
    assert_eq!(deferred.resolve().unwrap().text, "first");

    container.register(|_| Ok(String::from("second")));
    assert_eq!(deferred.resolve().unwrap().text, "second");
}

#[test]
fn the_container_resolves_itself() {
    let container = Container::new();
    container.register(|_| Ok(String::from("hello")));

    let handle = container.resolve::<Container>().unwrap();
    assert_eq!(handle.resolve::<Greeting>().unwrap().text, "hello");
}

#[test]
fn custom_failure_handler_replaces_the_error() {
    let container = Container::new();
    container.on_failed_resolve(|key, _| {
        Some(ResolveError::Factory {
            type_name: key.name(),
            message: String::from("completely out of alignment"),
        })
    });

    let err = container.resolve::<String>().unwrap_err();
    assert!(err.to_string().contains("out of alignment"));
}

#[test]
fn suppressing_handler_turns_failures_into_absence() {
    let container = Container::new();
    container.on_failed_resolve(|_, _| None);

    assert!(container.resolve_optional::<String>().is_none());
    assert!(matches!(
        container.resolve::<String>().unwrap_err(),
        ResolveError::Suppressed { .. }
    ));
}
