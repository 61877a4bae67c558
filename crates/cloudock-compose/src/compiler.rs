//! Service topology compilation.
//!
//! Turns a sparse [`CompileRequest`] into a complete [`Topology`]:
//! backing services that were requested, the runtime/web chain
//! `db → fpm → web → varnish → tls`, the build/deploy/cron helpers, the
//! shared `generic` base, and the named volumes. Either the whole topology
//! is produced or an error is returned.

use std::collections::BTreeMap;

use cloudock_common::constants::{
    APP_DIR, BASE_IMAGE_VERSION, CONFIG_ENV_FILE, DEFAULT_NGINX_VERSION, DEFAULT_TLS_VERSION,
    DEFAULT_VARNISH_VERSION,
};
use cloudock_common::types::{ServiceName, parse_version};

use crate::cron;
use crate::error::{ConfigurationError, Result};
use crate::extension::{ExtensionCatalog, PhpExtensionSet};
use crate::factory::{self, ServiceDefinition, ServiceKind, ServiceOptions};
use crate::request::CompileRequest;
use crate::topology::{Topology, TopologyBuilder, VolumeDefinition};
use crate::validator::Validator;

/// Name of the shared base service every application container is composed with.
pub const BASE_SERVICE: &str = "generic";

/// Entrypoint token of the cron helper image.
pub const CRON_COMMAND: &str = "run-cron";

/// Application subdirectories backed by their own named volume:
/// `(volume suffix, path under the application root, writable-flag applies)`.
const APP_SUBDIRS: [(&str, &str, bool); 7] = [
    ("vendor", "/vendor", true),
    ("generated", "/generated", true),
    ("setup", "/setup", true),
    ("var", "/var", false),
    ("etc", "/app/etc", false),
    ("static", "/pub/static", false),
    ("media", "/pub/media", false),
];

/// Workspace volume holding the application source.
const WORKSPACE_VOLUME: &str = "magento";

/// Backing services included only when requested: `(request key, topology name, kind)`.
const OPTIONAL_SERVICES: [(ServiceName, &str, ServiceKind); 4] = [
    (ServiceName::Redis, "redis", ServiceKind::Redis),
    (ServiceName::Elasticsearch, "elasticsearch", ServiceKind::Elasticsearch),
    (ServiceName::Node, "node", ServiceKind::Node),
    (ServiceName::Rabbitmq, "rabbitmq", ServiceKind::RabbitMq),
];

/// Compiles requests into topologies.
#[derive(Debug, Clone)]
pub struct Compiler {
    validator: Validator,
    extensions: ExtensionCatalog,
}

impl Compiler {
    /// Creates a compiler from a validator and an extension catalog.
    #[must_use]
    pub const fn new(validator: Validator, extensions: ExtensionCatalog) -> Self {
        Self {
            validator,
            extensions,
        }
    }

    /// Creates a compiler over the built-in constraint table and catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in table fails to load.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(Validator::builtin()?, ExtensionCatalog::builtin()?))
    }

    /// Compiles `request` into a topology.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Validation`] with every incompatibility
    /// when the requested versions are not legal together, or an extension
    /// error when the effective extension set is invalid. No topology is
    /// produced in either case.
    pub fn compile(&self, request: &CompileRequest) -> Result<Topology> {
        let php = request
            .services
            .get(ServiceName::Php)
            .unwrap_or(request.defaults.php.as_str());
        let mysql = request
            .services
            .get(ServiceName::Mysql)
            .unwrap_or(request.defaults.mysql.as_str());
        tracing::info!(
            application = %request.application,
            php,
            mysql,
            "compiling service topology"
        );

        let errors = self
            .validator
            .validate(&request.application, validation_entries(request, php));
        if !errors.is_empty() {
            return Err(ConfigurationError::Validation(errors));
        }

        let php_version = parse_version(php).ok_or_else(|| ConfigurationError::InvalidVersion {
            value: php.to_string(),
        })?;
        let extensions = self.extensions.resolve(&php_version, &request.extensions)?;
        let base = base_service(&extensions);

        let mut topology = TopologyBuilder::new();
        topology.insert("db", database(mysql));
        insert_backing_services(&mut topology, request);
        let cli_depends = topology.names();
        tracing::debug!(?cli_depends, "helper services depend on backing services");

        insert_application_tier(&mut topology, request, php, &cli_depends, &base);
        if !request.crons.is_empty() {
            let scheduler = cron_service(php, &cli_depends, request);
            topology.insert("cron", scheduler.composed_with(&base));
        }
        topology.insert(BASE_SERVICE, base);
        insert_volumes(&mut topology);

        let topology = topology.build()?;
        tracing::info!(
            services = topology.services().len(),
            volumes = topology.volumes().len(),
            "service topology compiled"
        );
        Ok(topology)
    }
}

/// Validation input: the resolved runtime first, then every other
/// requested service in request order.
fn validation_entries<'a>(request: &'a CompileRequest, php: &'a str) -> Vec<(&'a str, &'a str)> {
    std::iter::once((ServiceName::Php.as_str(), php))
        .chain(
            request
                .services
                .entries()
                .into_iter()
                .filter(|(name, _)| *name != ServiceName::Php)
                .map(|(name, version)| (name.as_str(), version)),
        )
        .collect()
}

/// Adds the optional backing services that were requested.
fn insert_backing_services(topology: &mut TopologyBuilder, request: &CompileRequest) {
    for (key, name, kind) in OPTIONAL_SERVICES {
        let Some(version) = request.services.get(key) else {
            continue;
        };
        let options = if kind == ServiceKind::Node {
            ServiceOptions::new().volumes(app_volumes(false))
        } else {
            ServiceOptions::new()
        };
        topology.insert(name, factory::create(kind, version, options));
    }
}

/// Adds the runtime, the build/deploy helpers, and the web chain in front of it.
fn insert_application_tier(
    topology: &mut TopologyBuilder,
    request: &CompileRequest,
    php: &str,
    cli_depends: &[String],
    base: &ServiceDefinition,
) {
    topology.insert(
        "fpm",
        factory::create(
            ServiceKind::PhpFpm,
            php,
            ServiceOptions::new()
                .ports([9000])
                .depends_on(["db"])
                .extends(BASE_SERVICE)
                .volumes(app_volumes(true)),
        )
        .composed_with(base),
    );
    let build = cli_service(php, false, cli_depends, "build.magento2.docker", request);
    topology.insert("build", build.composed_with(base));
    let deploy = cli_service(php, true, cli_depends, "deploy.magento2.docker", request);
    topology.insert("deploy", deploy.composed_with(base));
    topology.insert(
        "web",
        factory::create(
            ServiceKind::Nginx,
            request
                .services
                .get(ServiceName::Nginx)
                .unwrap_or(DEFAULT_NGINX_VERSION),
            ServiceOptions::new()
                .hostname("web.magento2.docker")
                .depends_on(["fpm"])
                .extends(BASE_SERVICE)
                .volumes(app_volumes(true)),
        )
        .composed_with(base),
    );
    topology.insert(
        "varnish",
        factory::create(
            ServiceKind::Varnish,
            DEFAULT_VARNISH_VERSION,
            ServiceOptions::new().depends_on(["web"]),
        ),
    );
    topology.insert(
        "tls",
        factory::create(
            ServiceKind::Tls,
            DEFAULT_TLS_VERSION,
            ServiceOptions::new().depends_on(["varnish"]),
        ),
    );
}

/// The cron helper: a read-only CLI container running the flattened crontab.
fn cron_service(
    php: &str,
    cli_depends: &[String],
    request: &CompileRequest,
) -> ServiceDefinition {
    let mut scheduler = cli_service(php, true, cli_depends, "cron.magento2.docker", request);
    let _ = scheduler
        .environment
        .insert("CRONTAB".to_string(), cron::crontab(&request.crons));
    scheduler.command = Some(CRON_COMMAND.to_string());
    scheduler
}

/// Declares the workspace bind volume and one volume per application subdirectory.
fn insert_volumes(topology: &mut TopologyBuilder) {
    topology.volume(WORKSPACE_VOLUME, VolumeDefinition::bind("${PWD}"));
    for (suffix, _, _) in APP_SUBDIRS {
        topology.volume(
            &format!("{WORKSPACE_VOLUME}-{suffix}"),
            VolumeDefinition::default(),
        );
    }
}

fn database(version: &str) -> ServiceDefinition {
    factory::create(
        ServiceKind::Db,
        version,
        ServiceOptions::new()
            .ports([3306])
            .volumes([
                "/var/lib/mysql",
                "./.docker/mysql/docker-entrypoint-initdb.d:/docker-entrypoint-initdb.d",
            ])
            .env("MYSQL_ROOT_PASSWORD", "magento2")
            .env("MYSQL_DATABASE", "magento2")
            .env("MYSQL_USER", "magento2")
            .env("MYSQL_PASSWORD", "magento2"),
    )
}

fn cli_service(
    php: &str,
    read_only: bool,
    depends: &[String],
    hostname: &str,
    request: &CompileRequest,
) -> ServiceDefinition {
    let mut volumes = app_volumes(read_only);
    volumes.push(format!(
        "{}:/root/.composer/cache:delegated",
        request.composer_cache
    ));
    volumes.push("./.docker/mnt:/mnt".to_string());
    volumes.push("./.docker/tmp:/tmp".to_string());

    factory::create(
        ServiceKind::PhpCli,
        php,
        ServiceOptions::new()
            .hostname(hostname)
            .depends_on(depends.iter().cloned())
            .extends(BASE_SERVICE)
            .volumes(volumes),
    )
}

/// Mounts of the workspace and per-subdirectory volumes under [`APP_DIR`].
fn app_volumes(read_only: bool) -> Vec<String> {
    let flag = if read_only { ":ro" } else { ":rw" };
    let mut volumes = vec![format!("{WORKSPACE_VOLUME}:{APP_DIR}{flag}")];
    volumes.extend(APP_SUBDIRS.iter().map(|(suffix, path, writable_flag)| {
        let mode = if *writable_flag { flag } else { ":delegated" };
        format!("{WORKSPACE_VOLUME}-{suffix}:{APP_DIR}{path}{mode}")
    }));
    volumes
}

/// Platform variables every application container receives.
fn platform_variables() -> BTreeMap<String, String> {
    [
        ("PHP_MEMORY_LIMIT", "2048M"),
        ("UPLOAD_MAX_FILESIZE", "64M"),
        ("MAGENTO_ROOT", APP_DIR),
        ("PHP_IDE_CONFIG", "serverName=magento_cloud_docker"),
        ("XDEBUG_CONFIG", "remote_host=host.docker.internal"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn base_service(extensions: &PhpExtensionSet) -> ServiceDefinition {
    let mut options = ServiceOptions::new();
    options.environment = platform_variables();
    let mut base = factory::create(
        ServiceKind::Base,
        BASE_IMAGE_VERSION,
        options.env("PHP_EXTENSIONS", extensions.to_env_value()),
    );
    base.env_file = vec![CONFIG_ENV_FILE.to_string()];
    base
}
