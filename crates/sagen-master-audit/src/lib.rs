// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit records for privilege violations and policy reloads, and the sinks
//! that receive them.

pub mod error;
pub mod event;
pub mod pipeline;
pub mod sink;

pub use error::{AuditError, AuditResult, AuditSinkError};
pub use event::{
	AuditEventType, AuditFacility, AuditLogBuilder, AuditLogEntry, AuditSeverity, UnknownSeverity,
};
pub use pipeline::AuditService;
pub use sink::file::FileAuditSink;
pub use sink::memory::MemoryAuditSink;
pub use sink::tracing::TracingAuditSink;
pub use sink::AuditSink;

pub use sagen_master_config::{AuditConfig, FileFormat, FileSinkConfig};
