//! System-wide constants, default versions, and well-known file names.

/// Mount point of the application inside every application container.
pub const APP_DIR: &str = "/app";

/// Runtime version used when neither a request nor the application config names one.
pub const DEFAULT_PHP_VERSION: &str = "7.2";

/// Database version used when none is requested.
pub const DEFAULT_DB_VERSION: &str = "10.2";

/// Web tier version used when none is requested.
pub const DEFAULT_NGINX_VERSION: &str = "latest";

/// Caching proxy version (not configurable).
pub const DEFAULT_VARNISH_VERSION: &str = "latest";

/// TLS terminator version (not configurable).
pub const DEFAULT_TLS_VERSION: &str = "latest";

/// Image version of the shared base service.
pub const BASE_IMAGE_VERSION: &str = "latest";

/// Compose document format version emitted for the topology.
pub const COMPOSE_FORMAT_VERSION: &str = "2";

/// Application configuration file, relative to the project root.
pub const APP_CONFIG_FILE: &str = ".magento.app.yaml";

/// Services configuration file, relative to the project root.
pub const SERVICES_CONFIG_FILE: &str = ".magento/services.yaml";

/// Composer lock file, relative to the project root.
pub const COMPOSER_LOCK_FILE: &str = "composer.lock";

/// Default output path of the rendered compose document.
pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.yml";

/// Environment file shared by every application container.
pub const CONFIG_ENV_FILE: &str = "./.docker/config.env";

/// Composer packages whose version identifies the application version.
pub const APPLICATION_PACKAGES: [&str; 3] = [
    "magento/magento2-base",
    "magento/product-community-edition",
    "magento/product-enterprise-edition",
];

/// Preferred composer cache location, relative to `$HOME`.
pub const COMPOSER_CACHE_DIR: &str = ".cache/composer";

/// Legacy composer cache location used when the preferred one is absent.
pub const LEGACY_COMPOSER_CACHE: &str = "~/.composer/cache";
