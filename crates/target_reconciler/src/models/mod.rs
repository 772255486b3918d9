// SPDX-License-Identifier: Apache-2.0

pub(crate) mod config;
pub(crate) mod report;
pub(crate) mod repo;
pub(crate) mod target;
