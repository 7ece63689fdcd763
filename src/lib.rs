//! Civic Secretary - Conversational assistant for local civic engagement
//!
//! This crate implements a single-session chat engine that helps residents
//! report local issues, find or create their local civic instance, browse top
//! issues and explore issue categories. Free text is classified into intents,
//! required details are collected through slot filling, and completed intents
//! hand off to the host application through a navigator.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
