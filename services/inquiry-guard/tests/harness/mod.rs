// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for form abuse simulation.
//!
//! Drives the validator with scripted submission patterns and collects the
//! resulting dispositions to check the scoring controls hold up.

pub mod attacks;
pub mod generators;
pub mod metrics;
