// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for local app state on disk.
//!
//! The store module reads/writes the config folder (connections, auto-deploy
//! flags, panel layout, deployment history) used by the TUI and the publish
//! layer.

pub mod config_folder;

pub use config_folder::{
    AutoDeployFlags, ConfigFolder, LayoutState, StoreError, WriteDurability, HISTORY_LIMIT,
};
