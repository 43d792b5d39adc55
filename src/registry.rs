use std::{
    any::{Any, type_name},
    collections::{HashMap, hash_map},
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use tracing::{info, warn};

use crate::{
    ConfigurationError, MethodDescriptor, MethodFn, Params,
    utils::{is_exported, is_identifier, short_type_name},
};

pub(crate) const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// Collects the methods of one receiver before it is registered.
///
/// ```
/// use jsondispatch::{Server, ServiceBuilder};
///
/// struct Arith;
/// impl Arith {
///     fn add(&self, a: f64, b: f64) -> Result<f64, String> {
///         Ok(a + b)
///     }
/// }
///
/// let server = Server::new();
/// server
///     .register(ServiceBuilder::new(Arith).method("Add", Arith::add))
///     .unwrap();
/// ```
pub struct ServiceBuilder<S> {
    receiver: Arc<S>,
    name: Option<String>,
    methods: Vec<MethodDescriptor>,
}

impl<S> ServiceBuilder<S>
where
    S: Send + Sync + 'static,
{
    pub fn new(receiver: S) -> Self {
        Self::from_arc(Arc::new(receiver))
    }
    pub fn from_arc(receiver: Arc<S>) -> Self {
        Self {
            receiver,
            name: None,
            methods: Vec::new(),
        }
    }

    /// Registers the service under `name` instead of the receiver's type name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn method<A, F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        A: Params,
        F: MethodFn<S, A>,
    {
        let m = MethodDescriptor::new(name.into(), self.receiver.clone(), f);
        self.methods.push(m);
        self
    }

    fn resolve_name(&self) -> Result<String, ConfigurationError> {
        let type_name = type_name::<S>();
        let name = match &self.name {
            Some(name) => name.as_str(),
            None => short_type_name(type_name),
        };
        if name.is_empty() || (self.name.is_none() && !is_identifier(name)) {
            return Err(ConfigurationError::UnnamedService { type_name });
        }
        if self.name.is_none() && !is_exported(name) {
            return Err(ConfigurationError::NotExported { name: name.into() });
        }
        if name.contains('.') {
            return Err(ConfigurationError::InvalidName { name: name.into() });
        }
        Ok(name.into())
    }

    fn build(self) -> Result<Service, ConfigurationError> {
        let name = self.resolve_name()?;
        let mut methods = HashMap::new();
        for m in self.methods {
            if m.name().is_empty() || m.name().contains('.') {
                warn!(
                    target: REGISTRY_TARGET,
                    service = %name,
                    method = m.name(),
                    "method name is not routable, skipping"
                );
                continue;
            }
            match methods.entry(m.name().to_string()) {
                hash_map::Entry::Occupied(e) => {
                    return Err(ConfigurationError::DuplicateMethod {
                        service: name,
                        method: e.key().clone(),
                    });
                }
                hash_map::Entry::Vacant(e) => {
                    e.insert(m);
                }
            }
        }
        if methods.is_empty() {
            return Err(ConfigurationError::NoEligibleMethods { name });
        }
        Ok(Service {
            name,
            receiver: self.receiver,
            methods,
        })
    }
}

/// A named group of methods bound to one receiver.
pub struct Service {
    name: String,
    receiver: Arc<dyn Any + Send + Sync>,
    methods: HashMap<String, MethodDescriptor>,
}

impl Service {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }
    pub fn methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.values()
    }
    /// The receiver, if it is of type `T`.
    pub fn receiver<T: Any>(&self) -> Option<&T> {
        self.receiver.downcast_ref()
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("name", &self.name)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// The set of registered services, shared by every dispatched request.
#[derive(Debug, Default)]
pub struct Registry {
    services: RwLock<HashMap<String, Arc<Service>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S>(&self, builder: ServiceBuilder<S>) -> Result<(), ConfigurationError>
    where
        S: Send + Sync + 'static,
    {
        let result = self.insert(builder);
        if let Err(e) = &result {
            warn!(target: REGISTRY_TARGET, "{e}");
        }
        result
    }
    fn insert<S>(&self, builder: ServiceBuilder<S>) -> Result<(), ConfigurationError>
    where
        S: Send + Sync + 'static,
    {
        let service = builder.build()?;
        let mut services = self.services.write().unwrap_or_else(PoisonError::into_inner);
        match services.entry(service.name.clone()) {
            hash_map::Entry::Occupied(e) => Err(ConfigurationError::DuplicateService {
                name: e.key().clone(),
            }),
            hash_map::Entry::Vacant(e) => {
                info!(
                    target: REGISTRY_TARGET,
                    service = %service.name,
                    methods = service.methods.len(),
                    "registered service"
                );
                e.insert(Arc::new(service));
                Ok(())
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<Service>> {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Names of the registered services, sorted.
    pub fn service_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}
