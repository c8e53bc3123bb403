//! Job-mode parameter metadata
//!
//! When an invocation is redirected to asynchronous or remote execution the
//! dispatcher accepts an extra fixed parameter set. This module only describes
//! its shape; nothing here binds or acts on those parameters.

use serde::Serialize;

/// Declared type of a job-mode parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobParameterType {
    Switch,
    Bool,
    String,
    StringArray,
    UInt32,
    Credential,
    Authentication,
    SessionOption,
    Hashtable,
    Object,
}

/// Ordered (name, type) pairs understood by the job dispatcher
pub static JOB_PARAMETERS: &[(&str, JobParameterType)] = &[
    ("AsJob", JobParameterType::Switch),
    ("JobName", JobParameterType::String),
    ("InputObject", JobParameterType::Object),
    ("ComputerName", JobParameterType::StringArray),
    ("Credential", JobParameterType::Credential),
    ("ConnectionRetryCount", JobParameterType::UInt32),
    ("ConnectionRetryIntervalSec", JobParameterType::UInt32),
    ("RunningTimeoutSec", JobParameterType::UInt32),
    ("ElapsedTimeoutSec", JobParameterType::UInt32),
    ("Persist", JobParameterType::Bool),
    ("Authentication", JobParameterType::Authentication),
    ("ApplicationName", JobParameterType::String),
    ("Port", JobParameterType::UInt32),
    ("UseSsl", JobParameterType::Switch),
    ("ConfigurationName", JobParameterType::String),
    ("ConnectionUri", JobParameterType::StringArray),
    ("AllowRedirection", JobParameterType::Switch),
    ("SessionOption", JobParameterType::SessionOption),
    ("CertificateThumbprint", JobParameterType::String),
    ("PrivateMetadata", JobParameterType::Hashtable),
];

/// Type of a job-mode parameter (case-insensitive)
pub fn job_parameter_type(name: &str) -> Option<JobParameterType> {
    JOB_PARAMETERS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, t)| *t)
}
