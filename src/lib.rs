//! Pipewright - Conversation-Driven Pipeline Configuration
//!
//! This crate implements a workflow state engine that collects the
//! configuration for a fixed three-stage data pipeline (source → transform
//! → destination) through a multi-turn conversation with a generative
//! language model.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
