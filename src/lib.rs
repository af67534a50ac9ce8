//! Apptivia - Performance Scoring & Coaching Recommendation Engine
//!
//! Scores sales reps against weighted metric targets, tracks trends, levels,
//! streaks and skill mastery, and recommends coaching playbooks for lagging
//! metrics. Every computation is memoized per scope and concurrent identical
//! requests share one store read.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
