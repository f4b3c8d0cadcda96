// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Controllers driving the refresh loop.

pub mod secret;

pub use secret::SecretReconciler;
