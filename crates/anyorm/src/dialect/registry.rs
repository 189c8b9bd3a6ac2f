//! Name → dialect lookup.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use super::{Ansi, Dialect, MySql, Oracle, Postgres, SqlServer, Sqlite};

/// Constructs a dialect instance on lookup.
pub type DialectFactory = Arc<dyn Fn() -> Arc<dyn Dialect> + Send + Sync>;

/// Case-insensitive registry of dialect factories.
///
/// Lookups of unknown names fall back to [`Ansi`] and never fail. Registering
/// an existing name replaces its factory.
pub struct DialectRegistry {
    factories: RwLock<HashMap<String, DialectFactory>>,
}

impl DialectRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
        }
    }

    /// A registry preloaded with the built-in backends and their aliases.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register_type::<Postgres>(&["postgres", "postgresql", "pg", "cockroachdb"]);
        registry.register_type::<MySql>(&["mysql", "mariadb"]);
        registry.register_type::<Sqlite>(&["sqlite", "sqlite3"]);
        registry.register_type::<SqlServer>(&["sqlserver", "mssql"]);
        registry.register_type::<Oracle>(&["oracle"]);
        registry.register_type::<Ansi>(&["ansi"]);
        registry
    }

    fn register_type<D: Dialect + Default + 'static>(&self, names: &[&str]) {
        let factory: DialectFactory = Arc::new(|| Arc::new(D::default()));
        for name in names {
            self.register(name, factory.clone());
        }
    }

    /// Register (or replace) the factory for `name`.
    pub fn register(&self, name: &str, factory: DialectFactory) {
        self.factories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_lowercase(), factory);
    }

    /// Resolve `name`, falling back to the ANSI dialect when it is unknown.
    pub fn lookup(&self, name: &str) -> Arc<dyn Dialect> {
        let factory = self
            .factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&name.to_lowercase())
            .cloned();
        match factory {
            Some(factory) => factory(),
            None => {
                tracing::debug!(target: "anyorm.dialect", name, "unknown dialect, using ansi");
                Arc::new(Ansi)
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&name.to_lowercase())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl Default for DialectRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for DialectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialectRegistry")
            .field("names", &self.names())
            .finish()
    }
}

static GLOBAL: LazyLock<DialectRegistry> = LazyLock::new(DialectRegistry::with_builtins);

/// The process-wide registry, preloaded with the built-in backends.
pub fn global() -> &'static DialectRegistry {
    &GLOBAL
}

/// Look up a dialect in the process-wide registry.
pub fn lookup(name: &str) -> Arc<dyn Dialect> {
    GLOBAL.lookup(name)
}

/// Register a dialect factory in the process-wide registry.
pub fn register(name: &str, factory: DialectFactory) {
    GLOBAL.register(name, factory);
}
