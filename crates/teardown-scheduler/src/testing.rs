//! Test helpers: an in-memory provider that records every call.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex};
use teardown_core::provider::{
    BucketCleaner, ImageRepoCleaner, ParamGetter, RoleDeleter, RolesetDeleter, StackDeleter,
    StackLister, StackWaiter,
};
use teardown_core::stack::filter_by_type;
use teardown_core::{Error, Resource, Result, Stack, StackType};

/// Provider double. Calls are recorded as `"<operation>:<argument>"`;
/// any recorded call listed via [`RecordingProvider::failing`] returns a
/// provider error.
#[derive(Default)]
pub(crate) struct RecordingProvider {
    inventory: Vec<Stack>,
    resources: HashMap<String, Vec<Resource>>,
    final_status: HashMap<String, Stack>,
    params: HashMap<String, String>,
    failing: HashSet<String>,
    deleted: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stack(mut self, stack: Stack) -> Self {
        self.inventory.push(stack);
        self
    }

    pub fn with_resources(mut self, stack: &str, resources: Vec<Resource>) -> Self {
        self.resources.insert(stack.to_string(), resources);
        self
    }

    /// Pin what `await_final_status` reports for a stack.
    pub fn with_final_status(mut self, stack: &str, status: &str, reason: &str) -> Self {
        self.final_status.insert(
            stack.to_string(),
            Stack::new(stack, status).with_reason(reason),
        );
        self
    }

    pub fn with_param(mut self, name: &str, value: &str) -> Self {
        self.params.insert(name.to_string(), value.to_string());
        self
    }

    pub fn failing(mut self, call: &str) -> Self {
        self.failing.insert(call.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls starting with `prefix`.
    pub fn calls_to(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    fn record(&self, call: String) -> Result<()> {
        let fails = self.failing.contains(&call);
        self.calls.lock().unwrap().push(call.clone());
        if fails {
            Err(Error::provider("TestFailure", format!("{call} failed")))
        } else {
            Ok(())
        }
    }

    fn is_deleted(&self, name: &str) -> bool {
        self.deleted.lock().unwrap().contains(name)
    }
}

#[async_trait]
impl StackLister for RecordingProvider {
    async fn list_stacks(&self, stack_type: StackType) -> Result<Vec<Stack>> {
        self.record(format!("list_stacks:{stack_type}"))?;
        let live: Vec<Stack> = self
            .inventory
            .iter()
            .filter(|s| !self.is_deleted(&s.name))
            .cloned()
            .collect();
        Ok(filter_by_type(&live, stack_type))
    }

    async fn get_resources_for_stack(&self, stack: &Stack) -> Result<Vec<Resource>> {
        self.record(format!("get_resources:{}", stack.name))?;
        Ok(self.resources.get(&stack.name).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl StackDeleter for RecordingProvider {
    async fn delete_stack(&self, name: &str) -> Result<()> {
        self.record(format!("delete_stack:{name}"))?;
        self.deleted.lock().unwrap().insert(name.to_string());
        Ok(())
    }
}

#[async_trait]
impl StackWaiter for RecordingProvider {
    async fn await_final_status(&self, name: &str) -> Option<Stack> {
        let _ = self.record(format!("await:{name}"));
        if let Some(stack) = self.final_status.get(name) {
            return Some(stack.clone());
        }
        if self.is_deleted(name) {
            return None;
        }
        self.inventory.iter().find(|s| s.name == name).cloned()
    }
}

#[async_trait]
impl BucketCleaner for RecordingProvider {
    async fn delete_bucket_objects(&self, bucket: &str) -> Result<()> {
        self.record(format!("delete_bucket_objects:{bucket}"))
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.record(format!("delete_bucket:{bucket}"))
    }
}

#[async_trait]
impl ImageRepoCleaner for RecordingProvider {
    async fn delete_images_from_repo(&self, repo: &str) -> Result<()> {
        self.record(format!("delete_images:{repo}"))
    }
}

#[async_trait]
impl RoleDeleter for RecordingProvider {
    async fn delete_roles_for_namespace(&self, namespace: &str) -> Result<()> {
        self.record(format!("delete_roles:{namespace}"))
    }
}

#[async_trait]
impl RolesetDeleter for RecordingProvider {
    async fn delete_environment_roleset(&self, environment: &str) -> Result<()> {
        self.record(format!("delete_environment_roleset:{environment}"))
    }

    async fn delete_service_roleset(&self, environment: &str, service: &str) -> Result<()> {
        self.record(format!("delete_service_roleset:{environment}/{service}"))
    }

    async fn delete_pipeline_roleset(&self, service: &str) -> Result<()> {
        self.record(format!("delete_pipeline_roleset:{service}"))
    }
}

#[async_trait]
impl ParamGetter for RecordingProvider {
    async fn get_param(&self, name: &str) -> Result<String> {
        self.record(format!("get_param:{name}"))?;
        self.params
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }
}

/// In-memory sink for log output.
#[derive(Clone, Default)]
pub(crate) struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Route log output on the current thread into a buffer until the guard drops.
pub(crate) fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}
