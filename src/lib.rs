//! Server-side pipeline extensions for the MCA CRM solution.
//!
//! The platform invokes registered plugins when record operations reach a
//! pipeline stage. This crate provides the plugin model (`plugin`), the
//! lead-to-quote qualification mapper with cross-entity option-set
//! reconciliation (`qualify`, `stringmap`), the blocking Web API client the
//! plugins talk to the data service through (`webapi`), and the
//! country/state visibility resolver backing the address forms
//! (`visibility`). Name constants mirroring platform metadata live in
//! `names`.

pub mod config;
pub mod error;
pub mod names;
pub mod plugin;
pub mod qualify;
pub mod qualify_plugin;
pub mod query;
pub mod record;
pub mod service;
pub mod stringmap;
pub mod visibility;
pub mod webapi;

pub use error::{PluginError, PluginResult};
pub use plugin::{ExecutionContext, LocalContext, PipelineStage, Plugin};
pub use record::{AttributeValue, EntityReference, OptionValue, Record};
pub use service::{RecordService, ServiceError, ServiceResult};
