//! Parameter schemas attached to routes.
//!
//! A [`ParamSchema`] maps each [`ParamOrigin`] to the properties declared for
//! it. Each [`PropertySchema`] names a value kind, whether the property is
//! required, and an optional custom [`PropertyValidator`] that runs after the
//! kind check.

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::error::Outcome;
use crate::future::BoxFuture;
use crate::request::ParamOrigin;

/// The value kind a property must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// JSON string.
    String,
    /// Integral JSON number.
    Integer,
    /// Any JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
    /// Anything (no kind check).
    Any,
}

impl PropertyKind {
    /// Returns the kind name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Any => "any",
        }
    }
}

/// A user-declared check run after the kind check.
pub trait PropertyValidator: Send + Sync + 'static {
    /// Validates one property value.
    fn validate<'a>(&'a self, value: &'a Value) -> BoxFuture<'a, Outcome<()>>;
}

/// A [`PropertyValidator`] built from a synchronous closure.
///
/// ```
/// use lyra_core::{ApiError, FnPropertyValidator};
///
/// let positive = FnPropertyValidator::new(|value: &serde_json::Value| match value.as_i64() {
///     Some(n) if n > 0 => Ok(()),
///     _ => Err(ApiError::validation("must be positive")),
/// });
/// # let _ = positive;
/// ```
pub struct FnPropertyValidator<F> {
    func: F,
}

impl<F> FnPropertyValidator<F> {
    /// Creates a validator from a closure.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> PropertyValidator for FnPropertyValidator<F>
where
    F: Fn(&Value) -> Outcome<()> + Send + Sync + 'static,
{
    fn validate<'a>(&'a self, value: &'a Value) -> BoxFuture<'a, Outcome<()>> {
        let result = (self.func)(value);
        Box::pin(async move { result })
    }
}

/// A [`PropertyValidator`] built from an async closure.
pub struct AsyncPropertyValidator<F> {
    func: F,
}

impl<F> AsyncPropertyValidator<F> {
    /// Creates a validator from an async closure.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F, Fut> PropertyValidator for AsyncPropertyValidator<F>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome<()>> + Send + 'static,
{
    fn validate<'a>(&'a self, value: &'a Value) -> BoxFuture<'a, Outcome<()>> {
        Box::pin((self.func)(value.clone()))
    }
}

/// Declaration of a single property.
#[derive(Clone)]
pub struct PropertySchema {
    /// Expected value kind.
    pub kind: PropertyKind,
    /// Whether the property must be present.
    pub required: bool,
    /// Custom validator run after the kind check.
    pub validator: Option<Arc<dyn PropertyValidator>>,
}

impl PropertySchema {
    /// Declares an optional property of the given kind.
    #[must_use]
    pub const fn new(kind: PropertyKind) -> Self {
        Self {
            kind,
            required: false,
            validator: None,
        }
    }

    /// Declares a string property.
    #[must_use]
    pub const fn string() -> Self {
        Self::new(PropertyKind::String)
    }

    /// Declares an integer property.
    #[must_use]
    pub const fn integer() -> Self {
        Self::new(PropertyKind::Integer)
    }

    /// Declares a number property.
    #[must_use]
    pub const fn number() -> Self {
        Self::new(PropertyKind::Number)
    }

    /// Declares a boolean property.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::new(PropertyKind::Boolean)
    }

    /// Declares an array property.
    #[must_use]
    pub const fn array() -> Self {
        Self::new(PropertyKind::Array)
    }

    /// Declares an object property.
    #[must_use]
    pub const fn object() -> Self {
        Self::new(PropertyKind::Object)
    }

    /// Declares a property of any kind.
    #[must_use]
    pub const fn any() -> Self {
        Self::new(PropertyKind::Any)
    }

    /// Marks the property as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attaches a custom validator.
    #[must_use]
    pub fn validate_with(mut self, validator: impl PropertyValidator) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }
}

impl fmt::Debug for PropertySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySchema")
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

impl PartialEq for PropertySchema {
    fn eq(&self, other: &Self) -> bool {
        let same_validator = match (&self.validator, &other.validator) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        self.kind == other.kind && self.required == other.required && same_validator
    }
}

/// Properties declared for one origin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OriginSchema {
    /// Declared properties, in declaration order.
    pub properties: IndexMap<String, PropertySchema>,
}

/// Parameter schema of a route: origin → property name → declaration.
///
/// ```
/// use lyra_core::{ParamOrigin, ParamSchema, PropertySchema};
///
/// let schema = ParamSchema::new()
///     .property(ParamOrigin::Path, "id", PropertySchema::integer().required())
///     .property(ParamOrigin::Query, "expand", PropertySchema::boolean());
///
/// assert!(schema.get(&ParamOrigin::Path, "id").is_some());
/// assert!(schema.get(&ParamOrigin::Body, "id").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSchema {
    origins: IndexMap<ParamOrigin, OriginSchema>,
}

impl ParamSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a property.
    #[must_use]
    pub fn property(
        mut self,
        origin: ParamOrigin,
        name: impl Into<String>,
        schema: PropertySchema,
    ) -> Self {
        self.origins
            .entry(origin)
            .or_default()
            .properties
            .insert(name.into(), schema);
        self
    }

    /// Returns the declarations for one origin.
    #[must_use]
    pub fn origin(&self, origin: &ParamOrigin) -> Option<&OriginSchema> {
        self.origins.get(origin)
    }

    /// Returns one property declaration.
    #[must_use]
    pub fn get(&self, origin: &ParamOrigin, name: &str) -> Option<&PropertySchema> {
        self.origins
            .get(origin)
            .and_then(|o| o.properties.get(name))
    }

    /// Iterates over every declared `(origin, name, schema)`.
    pub fn iter(&self) -> impl Iterator<Item = (&ParamOrigin, &str, &PropertySchema)> {
        self.origins.iter().flat_map(|(origin, o)| {
            o.properties
                .iter()
                .map(move |(name, schema)| (origin, name.as_str(), schema))
        })
    }

    /// Returns true if nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.origins.values().all(|o| o.properties.is_empty())
    }
}
