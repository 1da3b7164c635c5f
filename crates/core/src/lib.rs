// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wfe-core: data model for the network-automation workflow execution
//! engine — services, workflows, edges, runs, and results — plus the
//! shared primitives (ids, clock, config, secrets) the rest of the
//! workspace builds on.

pub mod macros;

pub mod clock;
pub mod config;
pub mod device;
pub mod edge;
pub mod error;
pub mod id;
pub mod registry;
pub mod result;
pub mod run;
pub mod secret;
pub mod service;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{Config, MailConfig};
pub use device::{Device, DeviceId, DeviceSet};
pub use edge::{Edge, EdgeId, EdgeSubtype};
pub use error::EngineError;
pub use id::short;
pub use registry::RunRegistry;
pub use result::{ExecutionResult, ResultId};
pub use run::{DeviceSummary, Outcome, Run, RunStatus, Runtime, Trigger};
pub use secret::{SecretError, SecretString};
pub use service::{
    Direction, Iteration, Notification, PostprocessingMode, PrePost, RetryPolicy, RunMethod,
    Service, ServiceId, ServiceKind, SkipRule, SkipValue, Validation, ValidationCondition,
    ValidationMethod, WorkflowGraph, END_SCOPED_NAME, PLACEHOLDER_SCOPED_NAME, START_SCOPED_NAME,
};

#[cfg(any(test, feature = "test-support"))]
pub use run::RunBuilder;
#[cfg(any(test, feature = "test-support"))]
pub use service::ServiceBuilder;
