// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Model catalog
//!
//! Maps the public model identifiers to the ids the chat endpoint expects.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Models offered by the chat endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Model {
    #[default]
    Gpt4oMini,
    Llama33Instruct70B,
    Claude3Haiku,
    O3Mini,
    MistralSmall3,
}

/// An unrecognized model id that was replaced by the default
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("model '{requested}' is unavailable, using '{substituted}'")]
pub struct UnknownModel {
    pub requested: String,
    pub substituted: Model,
}

impl Model {
    /// Every model, in catalog order
    pub const ALL: [Model; 5] = [
        Model::Gpt4oMini,
        Model::Llama33Instruct70B,
        Model::Claude3Haiku,
        Model::O3Mini,
        Model::MistralSmall3,
    ];

    /// Public identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Llama33Instruct70B => "llama-3.3-70b",
            Model::Claude3Haiku => "claude-3-haiku",
            Model::O3Mini => "o3-mini",
            Model::MistralSmall3 => "mistral-small-3",
        }
    }

    /// Identifier sent to the chat endpoint
    pub fn upstream_id(&self) -> &'static str {
        match self {
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Llama33Instruct70B => "meta-llama/Llama-3.3-70B-Instruct-Turbo",
            Model::Claude3Haiku => "claude-3-haiku-20240307",
            Model::O3Mini => "o3-mini",
            Model::MistralSmall3 => "mistralai/Mistral-Small-24B-Instruct-2501",
        }
    }

    /// Resolve a public identifier, falling back to the default model.
    ///
    /// The second element is set when the fallback was taken.
    pub fn resolve(requested: &str) -> (Model, Option<UnknownModel>) {
        match requested.parse::<Model>() {
            Ok(model) => (model, None),
            Err(unknown) => (unknown.substituted, Some(unknown)),
        }
    }
}

impl FromStr for Model {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::ALL
            .into_iter()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| UnknownModel {
                requested: s.to_string(),
                substituted: Model::default(),
            })
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
