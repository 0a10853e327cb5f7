//! Production specification builder.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use halprobe_config::Config;
use halprobe_invoker::{CallbackChannel, DriverKey, DriverRegistry, FunctionInvoker, TargetComponent};
use halprobe_types::{
    CallTarget, FunctionResult, FunctionSpecDescription, InterfaceSpecification, LoadRequest,
};
use tracing::{debug, info};

use super::{
    CallError, ComponentQuery, LoadError, SPEC_TARGET, SpecificationBuilder,
    find_component_specification,
};

/// Session-independent inputs of a builder.
#[derive(Debug, Clone)]
pub(crate) struct BuilderSettings {
    pub(crate) spec_dir: Utf8PathBuf,
    pub(crate) service_name: String,
    pub(crate) callbacks: CallbackChannel,
}

impl BuilderSettings {
    pub(crate) fn from_config(config: &Config) -> Self {
        let callbacks = config
            .callback_socket()
            .map_or_else(CallbackChannel::disconnected, CallbackChannel::socket);
        Self {
            spec_dir: config.spec_dir().to_path_buf(),
            service_name: config.service_name().to_owned(),
            callbacks,
        }
    }
}

struct LoadedComponent {
    path: String,
    key: DriverKey,
    spec: InterfaceSpecification,
    driver: Box<dyn FunctionInvoker>,
}

/// Loads components from specification files and drives them through the
/// daemon's driver registry.
pub(crate) struct ComponentSpecificationBuilder {
    settings: BuilderSettings,
    registry: Arc<DriverRegistry>,
    loaded: Option<LoadedComponent>,
}

impl ComponentSpecificationBuilder {
    pub(crate) const fn new(settings: BuilderSettings, registry: Arc<DriverRegistry>) -> Self {
        Self {
            settings,
            registry,
            loaded: None,
        }
    }

    fn is_loaded(&self, path: &str, key: &DriverKey) -> bool {
        !path.is_empty()
            && self
                .loaded
                .as_ref()
                .is_some_and(|loaded| loaded.path == path && loaded.key == *key)
    }

    fn target_for(
        &self,
        query: &ComponentQuery,
        request: &LoadRequest,
    ) -> Result<TargetComponent, LoadError> {
        if query.class().is_service() {
            return Ok(TargetComponent::service(&self.settings.service_name));
        }
        if !Utf8Path::new(&request.path).exists() {
            return Err(LoadError::MissingTarget {
                path: request.path.clone(),
            });
        }
        Ok(TargetComponent::library(
            &request.path,
            &self.settings.service_name,
        ))
    }
}

impl SpecificationBuilder for ComponentSpecificationBuilder {
    fn load_component(&mut self, request: &LoadRequest) -> Result<(), LoadError> {
        let query = ComponentQuery::from_request(request)?;
        let spec = find_component_specification(&self.settings.spec_dir, &query)?;
        let key = DriverKey::for_interface(&spec);
        if self.is_loaded(&request.path, &key) {
            debug!(
                target: SPEC_TARGET,
                driver = %key,
                path = %request.path,
                "component already loaded; skipping"
            );
            return Ok(());
        }
        let target = self.target_for(&query, request)?;
        let driver = self.registry.open(&key, &target)?;
        info!(
            target: SPEC_TARGET,
            driver = %key,
            path = %request.path,
            functions = spec.functions.len(),
            "component loaded"
        );
        self.loaded = Some(LoadedComponent {
            path: request.path.clone(),
            key,
            spec,
            driver,
        });
        Ok(())
    }

    fn invoke_function(
        &mut self,
        call: &FunctionSpecDescription,
    ) -> Result<FunctionResult, CallError> {
        let loaded = self.loaded.as_mut().ok_or(CallError::NothingLoaded)?;
        if call.target == CallTarget::Attribute {
            let value = loaded.driver.attribute(&call.name)?;
            return Ok(FunctionResult {
                name: call.name.clone(),
                results: vec![value],
                elapsed_ns: 0,
                verified: None,
            });
        }

        let invocation = loaded.driver.call(call, &self.settings.callbacks)?;
        let verified = call.verification().map(|expectation| {
            match loaded.driver.verify(&expectation, &invocation.results) {
                Ok(()) => true,
                Err(error) => {
                    info!(
                        target: SPEC_TARGET,
                        function = %call.name,
                        error = %error,
                        "result verification failed"
                    );
                    false
                }
            }
        });
        Ok(FunctionResult {
            name: call.name.clone(),
            elapsed_ns: invocation.elapsed_ns(),
            results: invocation.results,
            verified,
        })
    }

    fn interface_specification(&self) -> Option<InterfaceSpecification> {
        self.loaded.as_ref().map(|loaded| loaded.spec.clone())
    }
}
