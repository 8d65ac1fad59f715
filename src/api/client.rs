use std::sync::Arc;

use tokio::sync::OnceCell;

use super::auth::{Authenticator, AuthenticatorRegistry};
use super::binding::{Binding, JsonBinding};
use super::constants::fields;
use super::definition::DefinitionResolver;
use super::error::{ODataError, Result};
use super::logging::{ApiLogger, MonitoringConfig, OperationContext};
use super::models::{EndpointConfig, ServiceDefinition, TypeRegistry};
use super::operations::{
    AssociationMode, AssociationReconciler, Dispatcher, ForeignKeyRewriter, Function,
    RequestRewriter, ResponseDecoder,
};
use super::query::target::{TargetBuilder, body_field};
use super::schema::{Record, Value};
use super::transport::{ReqwestTransport, Transport};

/// Per-call context passed explicitly into every operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallContext {
    /// Opaque session id forwarded to the transport
    pub transaction_id: Option<String>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transaction(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: Some(transaction_id.into()),
        }
    }
}

/// OData client: turns function calls into requests against one service
pub struct ODataClient {
    id: String,
    endpoint: EndpointConfig,
    resolver: Arc<dyn DefinitionResolver>,
    definition: OnceCell<Arc<ServiceDefinition>>,
    transport: Arc<dyn Transport>,
    binding: Arc<dyn Binding>,
    authenticator: Option<Arc<dyn Authenticator>>,
    rewriter: Option<Arc<dyn RequestRewriter>>,
    registry: Option<Arc<dyn TypeRegistry>>,
    entity_sets: Vec<String>,
    logger: ApiLogger,
}

pub struct ODataClientBuilder {
    id: String,
    resolver: Arc<dyn DefinitionResolver>,
    endpoint: EndpointConfig,
    transport: Option<Arc<dyn Transport>>,
    binding: Option<Arc<dyn Binding>>,
    authenticator: Option<Arc<dyn Authenticator>>,
    authenticators: Option<AuthenticatorRegistry>,
    rewriter: Option<Arc<dyn RequestRewriter>>,
    registry: Option<Arc<dyn TypeRegistry>>,
    entity_sets: Vec<String>,
    monitoring: MonitoringConfig,
}

impl ODataClientBuilder {
    pub fn endpoint(mut self, endpoint: EndpointConfig) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn binding(mut self, binding: Arc<dyn Binding>) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Authenticator used regardless of the security type
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Registry to pick the authenticator of the configured security type from
    pub fn authenticators(mut self, registry: AuthenticatorRegistry) -> Self {
        self.authenticators = Some(registry);
        self
    }

    pub fn rewriter(mut self, rewriter: Arc<dyn RequestRewriter>) -> Self {
        self.rewriter = Some(rewriter);
        self
    }

    pub fn type_registry(mut self, registry: Arc<dyn TypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Entity sets whose functions are exposed as services
    pub fn entity_sets(mut self, entity_sets: Vec<String>) -> Self {
        self.entity_sets = entity_sets;
        self
    }

    pub fn monitoring(mut self, monitoring: MonitoringConfig) -> Self {
        self.monitoring = monitoring;
        self
    }

    pub fn build(self) -> Result<ODataClient> {
        self.endpoint.validate()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };
        let authenticator = self.authenticator.or_else(|| {
            let security_type = self.endpoint.security_type.as_deref()?;
            self.authenticators.as_ref()?.resolve(security_type)
        });
        if let (Some(security_type), None) = (&self.endpoint.security_type, &authenticator) {
            log::warn!(
                "Client '{}' uses security type '{}' but has no authenticator for it",
                self.id,
                security_type
            );
        }

        Ok(ODataClient {
            id: self.id,
            endpoint: self.endpoint,
            resolver: self.resolver,
            definition: OnceCell::new(),
            transport,
            binding: self.binding.unwrap_or_else(|| Arc::new(JsonBinding::new())),
            authenticator,
            rewriter: self.rewriter,
            registry: self.registry,
            entity_sets: self.entity_sets,
            logger: ApiLogger::new(self.monitoring),
        })
    }
}

impl ODataClient {
    pub fn builder(id: impl Into<String>, resolver: Arc<dyn DefinitionResolver>) -> ODataClientBuilder {
        ODataClientBuilder {
            id: id.into(),
            resolver,
            endpoint: EndpointConfig::default(),
            transport: None,
            binding: None,
            authenticator: None,
            authenticators: None,
            rewriter: None,
            registry: None,
            entity_sets: Vec::new(),
            monitoring: MonitoringConfig::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    pub fn entity_sets(&self) -> &[String] {
        &self.entity_sets
    }

    /// The service definition, resolved on first use and shared afterwards
    pub async fn definition(&self) -> Result<Arc<ServiceDefinition>> {
        let definition = self
            .definition
            .get_or_try_init(|| async {
                log::info!("Resolving service definition for client '{}'", self.id);
                self.resolver.resolve().await.map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(definition))
    }

    /// Run the function `name` declared on `context`
    pub async fn run_named(
        &self,
        context: &str,
        name: &str,
        input: Option<&Record>,
        call: &CallContext,
    ) -> Result<Option<Record>> {
        let definition = self.definition().await?;
        let function = definition.find_function(context, name).ok_or_else(|| {
            ODataError::schema(format!("no function '{}' on '{}'", name, context))
        })?;
        self.run(function, input, call).await
    }

    /// Execute a function call and decode its result
    pub async fn run(
        &self,
        function: &Function,
        input: Option<&Record>,
        call: &CallContext,
    ) -> Result<Option<Record>> {
        let definition = self.definition().await?;
        let transaction_id = call.transaction_id.clone().or_else(|| {
            input
                .and_then(|i| i.value(fields::TRANSACTION_ID))
                .and_then(Value::scalar_string)
        });
        let operation = self.logger.start_operation(
            &function.qualified_name(),
            function.method.as_str(),
            transaction_id.as_deref(),
        );

        let result = self.execute(&definition, function, input, &operation).await;
        match &result {
            Ok(_) => self.logger.complete_operation(&operation, None, None),
            Err(e) => self
                .logger
                .complete_operation(&operation, e.status_code(), Some(e.to_string())),
        }
        result
    }

    fn dispatcher<'a>(&'a self, definition: &'a ServiceDefinition) -> Dispatcher<'a> {
        Dispatcher {
            client_id: &self.id,
            definition,
            endpoint: &self.endpoint,
            transport: self.transport.as_ref(),
            authenticator: self.authenticator.as_deref(),
            rewriter: self.rewriter.as_deref(),
            logger: &self.logger,
        }
    }

    async fn execute(
        &self,
        definition: &ServiceDefinition,
        function: &Function,
        input: Option<&Record>,
        operation: &OperationContext,
    ) -> Result<Option<Record>> {
        let dispatcher = self.dispatcher(definition);
        let targets = TargetBuilder::new(definition, &self.endpoint);

        if let Some(mode) = AssociationMode::from_method(function.method) {
            let target = targets.association_target(function, input)?;
            AssociationReconciler::new(&dispatcher)
                .reconcile(mode, &target, operation)
                .await?;
            return Ok(Some(function.output.new_instance()));
        }

        let target = targets.entity_target(function, input)?;

        let body = body_field(&function.input).and_then(|field| {
            let schema = field.value_type.as_complex()?;
            let record = input?.value(&field.name)?.as_record()?;
            Some((schema, record.clone()))
        });
        let request = match body {
            Some((schema, mut record)) => {
                if function.method.writes_entity() {
                    ForeignKeyRewriter::new(definition)
                        .with_registry(self.registry.as_deref())
                        .rewrite(&mut record, schema)?;
                }
                let bytes = self.binding.marshal(&record, schema)?;
                dispatcher.entity_request(function.method, target, Some((self.binding.content_type(), bytes)))
            }
            None => dispatcher.entity_request(function.method, target, None),
        };

        let response = dispatcher.execute(request, operation).await?;
        ResponseDecoder::new(self.binding.as_ref()).decode(function, &response)
    }
}
