//! Pipeline plugin model.
//!
//! The host dispatches a registered plugin when an operation on an entity
//! reaches a pipeline stage, handing it the message's input/output
//! parameter bags plus optional before/after snapshots of the affected
//! record. A plugin declares `(stage, message, entity)` bindings up front;
//! on invocation every matching binding runs in registration order against
//! a per-invocation `LocalContext` that scopes tracing and data access.

use std::collections::BTreeMap;

use log::{debug, error};

use crate::error::PluginResult;
use crate::names;
use crate::record::{AttributeValue, EntityReference, Record};
use crate::service::RecordService;

/// Named points in the host's transactional processing of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    PreValidation,
    PreOperation,
    PostOperation,
}

/// The host-supplied invocation context: what happened, to what, with what
/// parameters.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub stage: PipelineStage,
    pub message_name: String,
    pub primary_entity_name: String,
    pub input_parameters: BTreeMap<String, AttributeValue>,
    pub output_parameters: BTreeMap<String, AttributeValue>,
    /// Record snapshots taken before the operation, keyed by image name.
    pub pre_images: BTreeMap<String, Record>,
    /// Record snapshots taken after the operation, keyed by image name.
    pub post_images: BTreeMap<String, Record>,
}

impl ExecutionContext {
    pub fn new(
        stage: PipelineStage,
        message_name: impl Into<String>,
        primary_entity_name: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            message_name: message_name.into(),
            primary_entity_name: primary_entity_name.into(),
            input_parameters: BTreeMap::new(),
            output_parameters: BTreeMap::new(),
            pre_images: BTreeMap::new(),
            post_images: BTreeMap::new(),
        }
    }

    pub fn with_input(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.input_parameters.insert(name.into(), value);
        self
    }
}

/// Capability-scoped handle passed to plugin actions: the invocation
/// context, data access, and a trace sink. Built once per invocation and
/// dropped on exit, so nothing outlives the pipeline transaction.
pub struct LocalContext<'a> {
    pub ctx: &'a mut ExecutionContext,
    pub service: &'a dyn RecordService,
}

impl LocalContext<'_> {
    /// The `Target` input parameter as an entity reference, if present and
    /// reference-shaped.
    pub fn target_reference(&self) -> Option<EntityReference> {
        match self.ctx.input_parameters.get(names::parameters::TARGET)? {
            AttributeValue::Reference(r) => Some(r.clone()),
            _ => None,
        }
    }

    pub fn set_output(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.ctx.output_parameters.insert(name.into(), value);
    }

    pub fn pre_image(&self, name: &str) -> Option<&Record> {
        self.ctx.pre_images.get(name)
    }

    pub fn post_image(&self, name: &str) -> Option<&Record> {
        self.ctx.post_images.get(name)
    }

    pub fn trace(&self, message: &str) {
        debug!(
            "[{}/{}] {}",
            self.ctx.message_name, self.ctx.primary_entity_name, message
        );
    }
}

pub type PluginAction = Box<dyn Fn(&mut LocalContext) -> PluginResult<()> + Send + Sync>;

/// One `(stage, message, entity) -> action` registration. Empty message or
/// entity filters act as wildcards.
pub struct EventBinding {
    pub stage: PipelineStage,
    pub message: String,
    pub entity: String,
    pub action: PluginAction,
}

impl EventBinding {
    fn matches(&self, stage: PipelineStage, message: &str, entity: &str) -> bool {
        stage == self.stage
            && (self.message.is_empty() || self.message.eq_ignore_ascii_case(message))
            && (self.entity.is_empty() || self.entity.eq_ignore_ascii_case(entity))
    }
}

/// A pipeline plugin: a named, fixed set of event bindings.
///
/// Bindings are populated at construction and never change afterwards; the
/// host may invoke the same plugin concurrently across unrelated
/// transactions, so actions must not rely on shared mutable state.
pub struct Plugin {
    name: String,
    bindings: Vec<EventBinding>,
}

impl Plugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register an action for a `(stage, message, entity)` combination.
    /// Pass an empty message or entity to match any.
    pub fn register(
        mut self,
        stage: PipelineStage,
        message: impl Into<String>,
        entity: impl Into<String>,
        action: PluginAction,
    ) -> Self {
        self.bindings.push(EventBinding {
            stage,
            message: message.into(),
            entity: entity.into(),
            action,
        });
        self
    }

    /// Dispatch an invocation: run every binding matching the context's
    /// `(stage, message, primary entity)` in registration order. An action
    /// error is traced and then propagated unchanged: that is the
    /// platform's transaction-abort signal, not something to handle here.
    pub fn execute(
        &self,
        ctx: &mut ExecutionContext,
        service: &dyn RecordService,
    ) -> PluginResult<()> {
        let stage = ctx.stage;
        let message = ctx.message_name.clone();
        let entity = ctx.primary_entity_name.clone();
        let mut local = LocalContext { ctx, service };

        for binding in &self.bindings {
            if !binding.matches(stage, &message, &entity) {
                continue;
            }
            debug!(
                "{}: running action for {:?}/{}/{}",
                self.name, stage, message, entity
            );
            if let Err(err) = (binding.action)(&mut local) {
                error!("{}: action failed: {}", self.name, err);
                return Err(err);
            }
        }
        Ok(())
    }
}
