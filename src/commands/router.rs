//! Alias based routing table.
//!
//! A [`Router`] binds several alias tokens to one value. It is used twice:
//! the [`Commander`](crate::commands::Commander) routes a server alias to its
//! [`ServerModule`](crate::servers::ServerModule), and each module routes a
//! command alias to its [`Command`](crate::commands::command::Command).

use std::{collections::HashMap, fmt};

/// Error raised while building a [`Router`].
///
/// Routers are built once at startup, so these errors are configuration errors.
#[derive(Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// The alias is already bound to another value
    DuplicateAlias(String),
    /// A value was registered without any alias
    NoAlias,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RegistryError::DuplicateAlias(alias) => write!(f, "alias '{}' is registered twice", alias),
            RegistryError::NoAlias => write!(f, "a value must be registered with at least one alias"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Routing table from case-sensitive alias tokens to values.
///
/// Aliases can be written in any script, `top` and `топ` may both route to the
/// same value. Every alias routes to exactly one value.
///
/// # Examples
///
/// ```
/// # use scorebot::commands::router::Router;
/// let mut router = Router::new();
/// router.register(&["top", "топ"], 1).unwrap();
///
/// assert_eq!(router.route("топ"), Some(&1));
/// assert!(router.register(&["top"], 2).is_err());
/// ```
#[derive(Debug)]
pub struct Router<T> {
    /// Alias to index in `values`
    aliases: HashMap<String, usize>,
    /// Registered values, in registration order
    values: Vec<T>,
}

impl<T> Router<T> {
    /// Creates an empty router.
    pub fn new() -> Self {
        Router {
            aliases: HashMap::new(),
            values: Vec::new(),
        }
    }

    /// Binds `value` to every alias of `aliases`.
    ///
    /// Nothing is registered when an error is returned.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NoAlias`] if `aliases` is empty
    /// - [`RegistryError::DuplicateAlias`] if an alias is already bound, or
    ///   appears twice in `aliases`
    pub fn register<S: AsRef<str>>(&mut self, aliases: &[S], value: T) -> Result<(), RegistryError> {
        if aliases.is_empty() {
            return Err(RegistryError::NoAlias);
        }

        let mut seen: Vec<&str> = Vec::with_capacity(aliases.len());
        for alias in aliases.iter().map(AsRef::as_ref) {
            if self.aliases.contains_key(alias) || seen.contains(&alias) {
                return Err(RegistryError::DuplicateAlias(alias.to_owned()));
            }
            seen.push(alias);
        }

        let index = self.values.len();
        self.values.push(value);
        for alias in seen {
            self.aliases.insert(alias.to_owned(), index);
        }

        Ok(())
    }

    /// Returns the value bound to `alias`.
    pub fn route(&self, alias: &str) -> Option<&T> {
        self.aliases.get(alias).map(|index| &self.values[*index])
    }

    /// Iterates over the registered values in registration order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    /// Number of registered values.
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}
