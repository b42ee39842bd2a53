use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::{FutureExt, future::BoxFuture};
use serde_json::Value;

use super::error::ServiceError;
use super::schema::{command_name, split_command_name, ArgSchema, CommandDescriptor};
use super::traits::ServiceFunction;

type Handler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, ServiceError>> + Send + Sync>;

/// A service function backed by a closure and an explicit descriptor.
pub struct FnService {
    service: String,
    function: String,
    descriptor: CommandDescriptor,
    handler: Handler,
}

impl FnService {
    /// Fails when the descriptor name is not `<service>-<function>`.
    pub fn new<F, Fut>(descriptor: CommandDescriptor, handler: F) -> Result<Self, ServiceError>
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ServiceError>> + Send + 'static,
    {
        let (service, function) = descriptor
            .split_name()
            .map(|(s, f)| (s.to_string(), f.to_string()))
            .ok_or_else(|| ServiceError::InvalidCommandName(descriptor.name.clone()))?;

        Ok(Self {
            service,
            function,
            descriptor,
            handler: Arc::new(move |input| handler(input).boxed()),
        })
    }
}

#[async_trait::async_trait]
impl ServiceFunction for FnService {
    fn service(&self) -> &str {
        &self.service
    }

    fn name(&self) -> &str {
        &self.function
    }

    fn description(&self) -> &str {
        &self.descriptor.description
    }

    fn args(&self) -> Vec<ArgSchema> {
        Vec::new()
    }

    fn parameters(&self) -> Value {
        self.descriptor.parameters.clone()
    }

    fn descriptor(&self) -> CommandDescriptor {
        self.descriptor.clone()
    }

    async fn run(&self, input: Value) -> Result<Value, ServiceError> {
        (self.handler)(input).await
    }
}

/// Services bound to an agent: service name → function name → callable.
/// Names are validated when a function is registered, not when it is called.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    services: BTreeMap<String, BTreeMap<String, Arc<dyn ServiceFunction>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under its own service and name. Returns &mut Self for chaining.
    pub fn register(&mut self, function: Arc<dyn ServiceFunction>) -> Result<&mut Self, ServiceError> {
        let full_name = command_name(function.service(), function.name());
        if split_command_name(&full_name).is_none() {
            return Err(ServiceError::InvalidCommandName(full_name));
        }

        let functions = self.services.entry(function.service().to_string()).or_default();
        if functions.contains_key(function.name()) {
            return Err(ServiceError::DuplicateFunction(full_name));
        }
        functions.insert(function.name().to_string(), function);
        Ok(self)
    }

    /// Register a closure under the descriptor's `<service>-<function>` name.
    pub fn register_fn<F, Fut>(&mut self, descriptor: CommandDescriptor, handler: F) -> Result<&mut Self, ServiceError>
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ServiceError>> + Send + 'static,
    {
        self.register(Arc::new(FnService::new(descriptor, handler)?))
    }

    pub fn contains_service(&self, service: &str) -> bool {
        self.services.contains_key(service)
    }

    pub fn get(&self, service: &str, function: &str) -> Option<Arc<dyn ServiceFunction>> {
        self.services.get(service)?.get(function).cloned()
    }

    /// Descriptors of every registered function, ordered by service then function.
    pub fn descriptors(&self) -> Vec<CommandDescriptor> {
        self.services
            .values()
            .flat_map(|functions| functions.values())
            .map(|function| function.descriptor())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.services.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .services
            .iter()
            .flat_map(|(service, functions)| functions.keys().map(move |function| command_name(service, function)))
            .collect();
        f.debug_struct("ServiceRegistry").field("functions", &names).finish()
    }
}
