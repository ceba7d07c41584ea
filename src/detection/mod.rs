// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! Detection module - sensor report evaluation and delayed verification
//!
//! Every detector category goes through the same evaluator; categories
//! only differ in what [`DetectorCategory`](crate::sensors::DetectorCategory)
//! allows them to do (verification, closure tracking).

mod evaluator;
mod verification;

pub use verification::VerificationEntry;
