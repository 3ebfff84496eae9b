// Dacapo - near-duplicate removal for two-staff piano score corpora
// Main library entry point

pub mod config;
pub mod corpus;
pub mod dedup;
pub mod report;
