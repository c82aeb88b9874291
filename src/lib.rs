// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod config;
pub mod constants;
pub mod context;
pub mod deletion;
pub mod error;
pub mod identity;
pub mod kubernetes;
pub mod poll;
pub mod server;

#[cfg(test)]
pub mod test_utils;
