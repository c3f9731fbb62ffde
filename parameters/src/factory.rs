//! # Configured Instances
//!
//! Builds objects whose concrete type is named by a parameter value.
//!
//! Types are not discovered at runtime. Every constructible type is
//! registered up front in a [`TypeRegistry`] under an identifier, together
//! with the capabilities (trait objects) it can be handed out as. The
//! registry is attached to a store with [`Parameters::with_registry`] and
//! travels with every store derived from it.

use crate::parameters::{LIST_SEPARATOR, Parameters};
use convert::split_list;
use errors::{ConversionError, ParameterError};
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

const TYPE_IDENTIFIER: &str = "a resolvable type identifier";

type BuildFn = Arc<dyn Fn(&Parameters) -> Result<Box<dyn Any>, ParameterError> + Send + Sync>;
type CastFn = Arc<dyn Fn(Box<dyn Any>) -> Option<Box<dyn Any>> + Send + Sync>;

/// Construction entry point taking the parameter store.
///
/// This is the preferred construction path: when a registration has both a
/// constructor and a factory, the constructor wins.
pub trait FromParameters: Sized {
    fn from_parameters(params: &Parameters) -> Result<Self, ParameterError>;
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Type identifier already registered: {identifier}")]
    AlreadyRegistered { identifier: String },

    #[error("Invalid registration: {reason}")]
    InvalidRegistration { reason: String }
}

struct Cast {
    capability: &'static str,
    apply: CastFn
}

/// Type-erased registration as stored in the registry.
struct Registration {
    type_name: &'static str,
    constructor: Option<BuildFn>,
    factory: Option<(String, BuildFn)>,
    casts: HashMap<TypeId, Cast>
}

/// Describes how to build a `T` from parameters and which capabilities a
/// `T` can be handed out as.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Builder for one entry of a [`TypeRegistry`]. `T` itself is always an
/// available capability; trait objects are added with
/// [`TypeRegistration::implements`].
///
/// ## Usage
/// ```rust
/// use parameters::{FromParameters, ParameterError, Parameters, TypeRegistration, TypeRegistry};
/// use std::sync::Arc;
///
/// trait Scorer {
///     fn score(&self, x: f64) -> f64;
/// }
///
/// struct Scaled {
///     factor: f64,
/// }
///
/// impl Scorer for Scaled {
///     fn score(&self, x: f64) -> f64 {
///         x * self.factor
///     }
/// }
///
/// impl FromParameters for Scaled {
///     fn from_parameters(params: &Parameters) -> Result<Self, ParameterError> {
///         Ok(Self { factor: params.get_positive_double("scaled.factor")? })
///     }
/// }
///
/// let mut registry = TypeRegistry::new();
/// registry
///     .register(
///         TypeRegistration::<Scaled>::new("scorers.Scaled")
///             .with_constructor()
///             .implements::<dyn Scorer>(|scaled| Box::new(scaled)),
///     )
///     .unwrap();
///
/// let params = Parameters::from_pairs([("scorer", "scorers.Scaled"), ("scaled.factor", "2.5")])
///     .unwrap()
///     .with_registry(Arc::new(registry));
///
/// let scorer = params.get_configured_instance::<dyn Scorer>("scorer").unwrap();
/// assert_eq!(scorer.score(2.0), 5.0);
/// ```
pub struct TypeRegistration<T> {
    identifier: String,
    registration: Registration,
    _marker: PhantomData<fn() -> T>
}

impl<T: 'static> TypeRegistration<T> {
    pub fn new(identifier: impl Into<String>) -> Self {
        let mut casts = HashMap::new();
        casts.insert(
            TypeId::of::<T>(),
            Cast {
                capability: type_name::<T>(),
                apply: Arc::new(|built: Box<dyn Any>| {
                    built
                        .downcast::<T>()
                        .ok()
                        .map(|concrete| Box::new(concrete) as Box<dyn Any>)
                })
            }
        );
        Self {
            identifier: identifier.into(),
            registration: Registration {
                type_name: type_name::<T>(),
                constructor: None,
                factory: None,
                casts
            },
            _marker: PhantomData
        }
    }

    /// Builds through [`FromParameters`].
    pub fn with_constructor(mut self) -> Self
    where
        T: FromParameters,
    {
        self.registration.constructor = Some(Arc::new(|params: &Parameters| {
            T::from_parameters(params).map(|built| Box::new(built) as Box<dyn Any>)
        }));
        self
    }

    /// Builds through a named factory function. Only used when no
    /// constructor is registered.
    pub fn with_factory<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&Parameters) -> Result<T, ParameterError> + Send + Sync + 'static,
    {
        let build: BuildFn = Arc::new(move |params: &Parameters| {
            factory(params).map(|built| Box::new(built) as Box<dyn Any>)
        });
        self.registration.factory = Some((name.into(), build));
        self
    }

    /// Declares that a `T` can be handed out as a `C`, typically a trait
    /// object such as `dyn Tokenizer`.
    pub fn implements<C>(mut self, cast: fn(T) -> Box<C>) -> Self
    where
        C: ?Sized + 'static,
    {
        self.registration.casts.insert(
            TypeId::of::<C>(),
            Cast {
                capability: type_name::<C>(),
                apply: Arc::new(move |built: Box<dyn Any>| {
                    built
                        .downcast::<T>()
                        .ok()
                        .map(|concrete| Box::new(cast(*concrete)) as Box<dyn Any>)
                })
            }
        );
        self
    }
}

/// Identifier to registration lookup used by the configured-instance
/// accessors. Built once at startup and shared behind an `Arc`.
#[derive(Default)]
pub struct TypeRegistry {
    registrations: HashMap<String, Registration>
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            registrations: HashMap::new()
        }
    }

    pub fn register<T: 'static>(
        &mut self,
        registration: TypeRegistration<T>,
    ) -> Result<(), RegistryError> {
        let identifier = registration.identifier;
        if identifier.trim().is_empty() {
            return Err(RegistryError::InvalidRegistration {
                reason: "Empty identifier".to_string()
            });
        }
        if identifier.trim() != identifier {
            return Err(RegistryError::InvalidRegistration {
                reason: format!("Identifier '{identifier}' has surrounding whitespace")
            });
        }
        if identifier.contains(LIST_SEPARATOR) {
            return Err(RegistryError::InvalidRegistration {
                reason: format!("Identifier '{identifier}' contains a list separator")
            });
        }
        if self.registrations.contains_key(&identifier) {
            return Err(RegistryError::AlreadyRegistered { identifier });
        }
        debug!(identifier = %identifier, type_name = registration.registration.type_name, "Registered type");
        self.registrations
            .insert(identifier, registration.registration);
        Ok(())
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.registrations.contains_key(identifier)
    }

    /// Registered identifiers in sorted order.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut identifiers: Vec<&str> = self.registrations.keys().map(String::as_str).collect();
        identifiers.sort_unstable();
        identifiers
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("identifiers", &self.identifiers())
            .finish()
    }
}

impl Parameters {
    /// Builds the type named by the value of `key` and hands it out as a `C`.
    ///
    /// # M-CANONICAL-DOCS
    ///
    /// ## Purpose
    /// Lets configuration choose an implementation by name. The chosen type
    /// receives this store and resolves its own parameters from it.
    ///
    /// ## Behavior
    /// The constructor path is tried before the factory path. Every call
    /// builds a new instance.
    ///
    /// ## Errors
    /// - `Conversion` when no registry is attached or the identifier is
    ///   not registered
    /// - `Validation` when the type has no construction path or cannot be
    ///   handed out as a `C`
    /// - Any error raised by the type's own parameter resolution, unchanged
    pub fn get_configured_instance<C>(&self, key: &str) -> Result<Box<C>, ParameterError>
    where
        C: ?Sized + 'static,
    {
        let identifier = self.raw(key)?.trim();
        self.construct::<C>(key, identifier)
    }

    pub fn get_optional_configured_instance<C>(
        &self,
        key: &str,
    ) -> Result<Option<Box<C>>, ParameterError>
    where
        C: ?Sized + 'static,
    {
        self.optional(key, Self::get_configured_instance::<C>)
    }

    /// One instance per comma-separated identifier, in order. The first
    /// failure aborts the whole list.
    pub fn get_configured_instances<C>(&self, key: &str) -> Result<Vec<Box<C>>, ParameterError>
    where
        C: ?Sized + 'static,
    {
        split_list(self.raw(key)?, LIST_SEPARATOR)
            .iter()
            .map(|identifier| self.construct::<C>(key, identifier))
            .collect()
    }

    fn construct<C>(&self, key: &str, identifier: &str) -> Result<Box<C>, ParameterError>
    where
        C: ?Sized + 'static,
    {
        let registry = self.registry().ok_or_else(|| {
            ParameterError::conversion(
                self.full_name(key),
                identifier,
                TYPE_IDENTIFIER,
                ConversionError::other("no type registry is attached to these parameters")
            )
        })?;
        let registration = registry.registrations.get(identifier).ok_or_else(|| {
            ParameterError::conversion(
                self.full_name(key),
                identifier,
                TYPE_IDENTIFIER,
                ConversionError::UnknownType {
                    identifier: identifier.to_string()
                }
            )
        })?;

        let built = if let Some(constructor) = &registration.constructor {
            debug!(parameter = %self.full_name(key), identifier, "Constructing configured instance");
            constructor(self)?
        } else if let Some((name, factory)) = &registration.factory {
            debug!(parameter = %self.full_name(key), identifier, factory = %name, "Building configured instance through factory");
            factory(self)?
        } else {
            return Err(ParameterError::validation(
                self.full_name(key),
                identifier,
                format!(
                    "`{}` has neither a parameter constructor nor a parameter factory",
                    registration.type_name
                )
            ));
        };

        let cast = registration.casts.get(&TypeId::of::<C>()).ok_or_else(|| {
            ParameterError::validation(
                self.full_name(key),
                identifier,
                format!(
                    "cannot cast `{}` to `{}`",
                    registration.type_name,
                    type_name::<C>()
                )
            )
        })?;

        (cast.apply)(built)
            .and_then(|handed_out| handed_out.downcast::<Box<C>>().ok())
            .map(|boxed| *boxed)
            .ok_or_else(|| ParameterError::Internal {
                message: format!(
                    "registration for '{identifier}' built a value that is not a `{}`",
                    cast.capability
                )
            })
    }
}
