// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraktorError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to read {0}: {1}")]
    StoreRead(String, #[source] kube::Error),

    #[error("Failed to restart {kind} {namespace}/{name}: {source}")]
    StoreWrite {
        kind: String,
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Invalid label selector: {0}")]
    SelectorParse(String),
}

pub type Result<T> = std::result::Result<T, TraktorError>;
