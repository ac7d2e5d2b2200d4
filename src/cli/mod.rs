//! CLI infrastructure for the apprentice toolkit
//!
//! This module provides the command-line interface for training advised
//! learners, evaluating saved policies, and comparing training runs.

pub mod commands;
pub mod output;
