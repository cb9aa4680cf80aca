//! Shared fixture types for the integration suites.
#![allow(dead_code)]

use std::sync::Once;

use wirecore::{constructible, implementation};

/// Initialize test logging once per binary; respects `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Zero-dependency type; resolvable with no registrations at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics {
    pub samples: u32,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Database {
    pub url: String,
}

impl Database {
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

#[derive(Debug)]
pub struct Repository {
    pub db: Database,
}

impl Repository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Greeting {
    pub text: String,
}

impl Greeting {
    pub fn new(text: String) -> Self {
        Self { text }
    }
}

/// Required first parameter, defaulted second.
#[derive(Debug)]
pub struct Job {
    pub name: String,
    pub retries: u32,
}

impl Job {
    pub fn new(name: String, retries: u32) -> Self {
        Self { name, retries }
    }
}

/// Every parameter defaulted; resolvable with no registrations.
#[derive(Debug)]
pub struct Pool {
    pub size: u32,
    pub label: String,
}

impl Pool {
    pub fn with_defaults(size: u32, label: String) -> Self {
        Self { size, label }
    }
}

/// Never given a constructor plan; resolvable only when registered.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditSink {
    pub tag: String,
}

/// Optional dependency on an unplanned type.
#[derive(Debug)]
pub struct Worker {
    pub audit: Option<AuditSink>,
}

impl Worker {
    pub fn new(audit: Option<AuditSink>) -> Self {
        Self { audit }
    }
}

/// Two constructors tied at the maximum parameter count.
#[derive(Debug)]
pub struct Exporter {
    pub target: String,
}

impl Exporter {
    pub fn with_endpoints(primary: String, fallback: String) -> Self {
        let _ = fallback;
        Self { target: primary }
    }

    pub fn with_deps(db: Database, metrics: Metrics) -> Self {
        let _ = metrics;
        Self { target: db.url }
    }
}

/// Longest constructor wants primitives; a shorter one does not.
#[derive(Debug)]
pub struct Gateway {
    pub origin: String,
}

impl Gateway {
    pub fn detailed(host: String, port: u16) -> Self {
        Self {
            origin: format!("{host}:{port}"),
        }
    }

    pub fn from_metrics(metrics: Metrics) -> Self {
        let _ = metrics;
        Self {
            origin: String::from("internal"),
        }
    }
}

pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

#[derive(Debug)]
pub struct FixedClock {
    pub at: u64,
}

impl FixedClock {
    pub fn new() -> Self {
        Self {
            at: 1_700_000_000_000,
        }
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.at
    }
}

pub trait Codec: Send + Sync {
    fn name(&self) -> &'static str;
}

#[derive(Debug)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn new() -> Self {
        JsonCodec
    }
}

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }
}

#[derive(Debug)]
pub struct YamlCodec;

impl YamlCodec {
    pub fn new() -> Self {
        YamlCodec
    }
}

impl Codec for YamlCodec {
    fn name(&self) -> &'static str {
        "yaml"
    }
}

constructible! {
    Metrics {
        new();
    }
    Database {
        new(url: String);
    }
    Repository {
        new(db: Database);
    }
    Greeting {
        new(text: String);
    }
    Job {
        new(name: String, retries: u32 = 3);
    }
    Pool {
        with_defaults(size: u32 = 8, label: String = String::from("pool"));
    }
    Worker {
        new(audit: Option<AuditSink>);
    }
    Exporter {
        with_endpoints(primary: String, fallback: String);
        with_deps(db: Database, metrics: Metrics);
    }
    Gateway {
        detailed(host: String, port: u16);
        from_metrics(metrics: Metrics);
    }
    FixedClock {
        new();
    }
    JsonCodec {
        new();
    }
    YamlCodec {
        new();
    }
}

implementation! {
    dyn Clock => FixedClock;
    dyn Codec => JsonCodec;
    dyn Codec => YamlCodec;
}
