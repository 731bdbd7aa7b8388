//! Shared test harness modules for the Milkrun CLI.

use super::*;

mod helpers;
mod route_unit;
