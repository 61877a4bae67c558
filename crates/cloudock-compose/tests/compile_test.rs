//! Integration tests for the topology compiler.
//!
//! These tests drive the full pipeline over the built-in tables:
//! 1. Validate requested versions against the constraint table
//! 2. Resolve the PHP extension set
//! 3. Assemble services, volumes, and the dependency chain
//! 4. Render the topology as a compose document

#![allow(clippy::expect_used, clippy::unwrap_used)]

use cloudock_common::types::{ApplicationVersion, ServiceName};
use cloudock_compose::compiler::Compiler;
use cloudock_compose::cron::CronJob;
use cloudock_compose::error::ConfigurationError;
use cloudock_compose::extension::ExtensionConfig;
use cloudock_compose::request::{CompileRequest, ServiceRequest};
use cloudock_compose::validator::{ValidationError, Validator};

fn request(app: &str, services: ServiceRequest) -> CompileRequest {
    let application = ApplicationVersion::parse(app).expect("application version");
    CompileRequest {
        services,
        composer_cache: "~/.cache/composer".to_string(),
        ..CompileRequest::new(application)
    }
}

fn compiler() -> Compiler {
    Compiler::builtin().expect("built-in tables")
}

// ── Validation ───────────────────────────────────────────────────────

#[test]
fn scenario_a_versions_are_compatible() {
    let validator = Validator::builtin().expect("validator");
    let application = ApplicationVersion::parse("2.2.4").unwrap();
    let errors = validator.validate(
        &application,
        [
            ("mysql", "10.0"),
            ("nginx", "1.9"),
            ("varnish", "4.5"),
            ("redis", "5.0"),
            ("elasticsearch", "2.4.2"),
            ("rabbitmq", "3.5"),
        ],
    );
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
}

#[test]
fn scenario_b_search_too_new() {
    let services = ServiceRequest::new().with(ServiceName::Elasticsearch, "6.7");
    let err = compiler()
        .compile(&request("2.5.0", services))
        .expect_err("must fail");
    let errors = err.validation_errors();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], ValidationError::VersionMismatch { .. }));
    assert_eq!(errors[0].service(), "elasticsearch");
}

#[test]
fn scenario_c_runtime_too_old() {
    let services = ServiceRequest::new().with(ServiceName::Php, "5.6");
    let err = compiler()
        .compile(&request("2.1.4", services))
        .expect_err("must fail");
    let errors = err.validation_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].service(), "php");
    assert!(errors[0].to_string().contains("\"5.6\""));
}

#[test]
fn scenario_d_unknown_service() {
    let validator = Validator::builtin().expect("validator");
    let application = ApplicationVersion::parse("2.3.0").unwrap();
    let errors = validator.validate(&application, [("nonexistent", "1.0")]);
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], ValidationError::UnsupportedService { .. }));
    assert_eq!(errors[0].service(), "nonexistent");
}

#[test]
fn every_incompatibility_is_reported() {
    let services = ServiceRequest::new()
        .with(ServiceName::Php, "7.0.13")
        .with(ServiceName::Mysql, "11.0")
        .with(ServiceName::Nginx, "0.9")
        .with(ServiceName::Redis, "3.1")
        .with(ServiceName::Elasticsearch, "6.5")
        .with(ServiceName::Rabbitmq, "3.5");
    let err = compiler()
        .compile(&request("2.2.4", services))
        .expect_err("must fail");
    let failed: Vec<&str> = err
        .validation_errors()
        .iter()
        .map(ValidationError::service)
        .collect();
    assert_eq!(failed, vec!["mysql", "nginx", "redis", "elasticsearch"]);
}

// ── Topology shape ───────────────────────────────────────────────────

#[test]
fn scenario_e_minimal_topology() {
    let topology = compiler()
        .compile(&request("2.3.4", ServiceRequest::new()))
        .expect("compile");
    let names: Vec<&str> = topology.service_names().collect();
    assert_eq!(
        names,
        vec!["db", "fpm", "build", "deploy", "web", "varnish", "tls", "generic"]
    );
    for optional in ["redis", "elasticsearch", "rabbitmq", "node", "cron"] {
        assert!(!topology.contains(optional), "{optional} must be absent");
    }
}

#[test]
fn requested_services_are_present() {
    let services = ServiceRequest::new()
        .with(ServiceName::Redis, "5.0")
        .with(ServiceName::Elasticsearch, "6.5")
        .with(ServiceName::Rabbitmq, "3.7")
        .with(ServiceName::Node, "10.0");
    let topology = compiler()
        .compile(&request("2.3.4", services))
        .expect("compile");

    assert_eq!(topology.service("redis").unwrap().image, "redis:5.0");
    assert_eq!(
        topology.service("elasticsearch").unwrap().image,
        "magento/magento-cloud-docker-elasticsearch:6.5"
    );
    assert_eq!(topology.service("rabbitmq").unwrap().image, "rabbitmq:3.7");
    assert_eq!(topology.service("node").unwrap().image, "node:10.0");

    let build = topology.service("build").unwrap();
    assert_eq!(
        build.depends_on,
        vec!["db", "redis", "elasticsearch", "node", "rabbitmq"]
    );
}

#[test]
fn empty_versions_are_not_requested() {
    let services = ServiceRequest::new().with(ServiceName::Redis, "  ");
    let topology = compiler()
        .compile(&request("2.3.4", services))
        .expect("compile");
    assert!(!topology.contains("redis"));
}

#[test]
fn dependency_chain_links_each_tier_to_the_previous() {
    let topology = compiler()
        .compile(&request("2.3.4", ServiceRequest::new()))
        .expect("compile");
    let chain = ["db", "fpm", "web", "varnish", "tls"];
    for pair in chain.windows(2) {
        let service = topology.service(pair[1]).unwrap();
        assert_eq!(service.depends_on, vec![pair[0]], "{} dependencies", pair[1]);
    }
    let order = topology.startup_order().expect("order");
    let position = |name: &str| order.iter().position(|n| n == name).unwrap();
    for pair in chain.windows(2) {
        assert!(position(pair[0]) < position(pair[1]));
    }
}

#[test]
fn runtime_defaults_apply() {
    let topology = compiler()
        .compile(&request("2.3.4", ServiceRequest::new()))
        .expect("compile");
    assert_eq!(
        topology.service("fpm").unwrap().image,
        "magento/magento-cloud-docker-php:7.2-fpm"
    );
    assert_eq!(
        topology.service("build").unwrap().image,
        "magento/magento-cloud-docker-php:7.2-cli"
    );
    assert_eq!(topology.service("db").unwrap().image, "mariadb:10.2");
    assert_eq!(
        topology.service("web").unwrap().image,
        "magento/magento-cloud-docker-nginx:latest"
    );
}

#[test]
fn application_services_share_the_base_environment() {
    let topology = compiler()
        .compile(&request("2.3.4", ServiceRequest::new()))
        .expect("compile");
    for name in ["fpm", "build", "deploy", "web"] {
        let service = topology.service(name).unwrap();
        assert_eq!(service.extends.as_deref(), Some("generic"));
        assert_eq!(
            service.environment.get("MAGENTO_ROOT").map(String::as_str),
            Some("/app")
        );
        assert!(service.environment.contains_key("PHP_EXTENSIONS"));
        assert_eq!(service.env_file, vec!["./.docker/config.env"]);
    }
    assert!(topology.service("db").unwrap().extends.is_none());
}

#[test]
fn helper_volumes_differ_in_mode() {
    let topology = compiler()
        .compile(&request("2.3.4", ServiceRequest::new()))
        .expect("compile");
    let build = topology.service("build").unwrap();
    let deploy = topology.service("deploy").unwrap();
    assert!(build.volumes.contains(&"magento:/app:rw".to_string()));
    assert!(deploy.volumes.contains(&"magento:/app:ro".to_string()));
    assert!(
        build
            .volumes
            .contains(&"~/.cache/composer:/root/.composer/cache:delegated".to_string())
    );
    assert_eq!(build.hostname.as_deref(), Some("build.magento2.docker"));
}

#[test]
fn named_volumes_are_declared() {
    let topology = compiler()
        .compile(&request("2.3.4", ServiceRequest::new()))
        .expect("compile");
    let names: Vec<&str> = topology.volumes().keys().map(String::as_str).collect();
    assert_eq!(names[0], "magento");
    assert!(names.contains(&"magento-vendor"));
    assert!(names.contains(&"magento-media"));
    assert_eq!(
        topology.volumes()["magento"]
            .driver_opts
            .get("device")
            .map(String::as_str),
        Some("${PWD}")
    );
}

// ── Extensions ───────────────────────────────────────────────────────

#[test]
fn extension_set_reaches_the_base_environment() {
    let mut req = request("2.3.4", ServiceRequest::new());
    req.extensions = ExtensionConfig {
        enabled: vec!["xsl".to_string()],
        disabled: vec!["sockets".to_string()],
    };
    let topology = compiler().compile(&req).expect("compile");
    let value = topology
        .service("generic")
        .unwrap()
        .environment
        .get("PHP_EXTENSIONS")
        .cloned()
        .unwrap();
    let members: Vec<&str> = value.split(' ').collect();
    assert!(members.contains(&"xsl"));
    assert!(members.contains(&"bcmath"));
    assert!(!members.contains(&"sockets"));
}

#[test]
fn unknown_extension_aborts_compilation() {
    let mut req = request("2.3.4", ServiceRequest::new());
    req.extensions.enabled.push("nonexistent_ext".to_string());
    let err = compiler().compile(&req).expect_err("must fail");
    assert_eq!(
        err,
        ConfigurationError::UnsupportedExtension {
            name: "nonexistent_ext".to_string()
        }
    );
}

#[test]
fn extension_outside_runtime_range_aborts_compilation() {
    let mut req = request("2.3.4", ServiceRequest::new().with(ServiceName::Php, "7.2"));
    req.extensions.enabled.push("mcrypt".to_string());
    let err = compiler().compile(&req).expect_err("must fail");
    assert!(matches!(
        err,
        ConfigurationError::ExtensionVersionMismatch { ref name, .. } if name == "mcrypt"
    ));
}

#[test]
fn disabling_an_enabled_extension_wins() {
    let mut req = request("2.3.4", ServiceRequest::new());
    req.extensions.enabled.push("mcrypt".to_string());
    req.extensions.disabled.push("mcrypt".to_string());
    assert!(compiler().compile(&req).is_ok());
}

// ── Cron ─────────────────────────────────────────────────────────────

#[test]
fn cron_service_carries_the_crontab() {
    let mut req = request("2.3.4", ServiceRequest::new());
    req.crons = vec![CronJob {
        name: "magento".to_string(),
        spec: "* * * * *".to_string(),
        cmd: "php bin/magento cron:run".to_string(),
    }];
    let topology = compiler().compile(&req).expect("compile");
    let cron = topology.service("cron").expect("cron present");
    assert_eq!(cron.command.as_deref(), Some("run-cron"));
    assert_eq!(
        cron.environment.get("CRONTAB").map(String::as_str),
        Some(
            "* * * * * root cd /app && /usr/local/bin/php bin/magento cron:run >> /app/var/log/cron.log"
        )
    );
    let names: Vec<&str> = topology.service_names().collect();
    assert_eq!(names[names.len() - 2..], ["cron", "generic"]);
}

// ── Rendering ────────────────────────────────────────────────────────

#[test]
fn compilation_is_deterministic() {
    let services = ServiceRequest::new()
        .with(ServiceName::Redis, "5.0")
        .with(ServiceName::Php, "7.3");
    let first = compiler()
        .compile(&request("2.3.4", services.clone()))
        .expect("compile");
    let second = compiler()
        .compile(&request("2.3.4", services))
        .expect("compile");
    assert_eq!(first, second);
    assert_eq!(
        serde_yaml::to_string(&first).unwrap(),
        serde_yaml::to_string(&second).unwrap()
    );
}

#[test]
fn renders_a_compose_document() {
    let topology = compiler()
        .compile(&request("2.3.4", ServiceRequest::new()))
        .expect("compile");
    let value = serde_json::to_value(&topology).expect("serialize");
    assert_eq!(value["version"], "2");
    assert_eq!(value["services"]["fpm"]["extends"]["service"], "generic");
    assert_eq!(value["services"]["generic"]["image"], "alpine");
    assert_eq!(value["services"]["fpm"]["depends_on"][0], "db");
    assert_eq!(value["services"]["db"]["ports"][0], 3306);
    assert_eq!(value["volumes"]["magento"]["driver_opts"]["o"], "bind");
    assert!(value["services"]["db"].get("name").is_none());
    assert!(value["volumes"]["magento-vendor"].is_object());
}
