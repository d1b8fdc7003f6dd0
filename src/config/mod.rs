// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Configuration module for duckchat
//!
//! `ClientConfig` holds the plain transport values the chat core accepts;
//! `Settings` is the user-facing settings file the CLI resolves them from.

pub mod client;
pub mod settings;

pub use client::{ClientConfig, DEFAULT_BASE_URL};
pub use settings::*;
