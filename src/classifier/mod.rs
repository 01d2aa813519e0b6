/// Date/time function and keyword detection.
pub mod date_functions;
/// Inner join shape detection (explicit, bare, and comma joins).
pub mod joins;
/// JSON operator, function, and cast detection.
pub mod json_operations;
/// Combines detector verdicts into the native execution decision.
pub mod native_execution;
/// Detection result records, offsets, signals, and routing policy.
pub mod patterns;
/// Token vocabularies the detectors match against, extendable from JSON.
pub mod vocabulary;
