// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod audit;
mod database;
mod logging;
mod objects;
mod policy;

pub use audit::{AuditConfig, AuditConfigLayer, FileFormat, FileSinkConfig, FileSinkConfigLayer};
pub use database::{DatabaseConfig, DatabaseConfigLayer, REDACTED};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use objects::{ObjectsConfig, ObjectsConfigLayer};
pub use policy::{PolicyConfig, PolicyConfigLayer};
