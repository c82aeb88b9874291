// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes API access for namespace deletion.

pub mod namespaces;

pub use namespaces::KubeNamespaces;
