//! # WeldMaster Product Storage
//!
//! In-memory model of a weld inspection product and its JSON document:
//! - Product → seam series → seams (and linked seams) → seam intervals
//! - Graph references and the shared pool of filter parameter sets
//! - Quality error definitions on every task level
//! - Duplication with identical or fresh ids, change tracking
//! - Document loading and atomic saving, lazy parameter set loading
//! - Structural change events and storage configuration

pub mod attributes;
pub mod change_tracker;
pub mod color_map;
pub mod config;
pub mod copy_mode;
pub mod error;
pub mod events;
pub mod filter_parameter;
pub mod graph_reference;
pub mod json;
pub mod linked_seam;
pub mod loader;
pub mod measure_task;
pub mod parameter;
pub mod parameter_set;
pub mod product;
pub mod quality_error;
pub mod reference_curve;
pub mod seam;
pub mod seam_interval;
pub mod seam_series;
pub mod uuid_utils;

pub use attributes::{Attribute, AttributeCatalog, AttributeList};
pub use change_tracker::{Change, ChangeLog};
pub use color_map::ColorMap;
pub use config::StorageConfig;
pub use copy_mode::CopyMode;
pub use error::{Error, Result};
pub use events::{EventBus, StorageEvent};
pub use filter_parameter::FilterParameter;
pub use graph_reference::GraphReference;
pub use linked_seam::LinkedSeam;
pub use loader::ParameterSetLoader;
pub use measure_task::MeasureTask;
pub use parameter::{DataType, Parameter};
pub use parameter_set::ParameterSet;
pub use product::{LengthUnit, MeasureTaskRef, ParameterSetPool, Product, TriggerMode, TriggerSource};
pub use quality_error::{IntervalError, ProductError, SeamError, SeamSeriesError};
pub use reference_curve::ReferenceCurve;
pub use seam::{Seam, SeamCopy};
pub use seam_interval::{IntervalRef, SeamInterval};
pub use seam_series::{SeamEntry, SeamRef, SeamSeries};
