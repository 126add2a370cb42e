#![doc = "jira2pdf: export Jira issues into partitioned PDF reports."]

//! Pipeline: load configuration, page through the Jira search endpoint per
//! project, render the configured field selection per issue, partition each
//! project's issue list, and write one PDF per partition.

pub mod cli;
pub mod client;
pub mod config;
pub mod export;
pub mod issue;
pub mod load_config;
pub mod partition;
pub mod pdf;
pub mod render;
