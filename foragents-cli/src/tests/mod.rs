//! Shared test harness modules for the forAgents CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;
use crate::trending::*;

mod helpers;
