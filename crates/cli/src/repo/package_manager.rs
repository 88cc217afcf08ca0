// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JavaScript package manager detection.
//!
//! Picks the package manager from lock files so that the fallback Jest
//! command runs through the same tool the workspace installs with.
//! Detection order (first match wins):
//! 1. `bun.lock` / `bun.lockb` (Bun)
//! 2. `pnpm-lock.yaml` (pnpm)
//! 3. `yarn.lock` (Yarn)
//! 4. `package-lock.json` or nothing (npm)

use std::path::Path;

/// JavaScript package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageManager {
    #[default]
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

impl PackageManager {
    /// Detect the package manager from lock files in the workspace root.
    pub async fn detect(root: &Path) -> Self {
        if exists(&root.join("bun.lock")).await || exists(&root.join("bun.lockb")).await {
            return Self::Bun;
        }
        if exists(&root.join("pnpm-lock.yaml")).await {
            return Self::Pnpm;
        }
        if exists(&root.join("yarn.lock")).await {
            return Self::Yarn;
        }
        Self::Npm
    }

    /// Prefix for executing a package binary (npx, bunx, ...).
    pub fn exec_command(&self) -> &'static [&'static str] {
        match self {
            PackageManager::Npm => &["npx"],
            PackageManager::Pnpm => &["pnpm", "exec"],
            PackageManager::Yarn => &["yarn"],
            PackageManager::Bun => &["bunx"],
        }
    }

    /// Shell command line running `tool` (with `args`) through this manager.
    pub fn exec_line(&self, tool: &str, args: &[&str]) -> String {
        self.exec_command()
            .iter()
            .copied()
            .chain(std::iter::once(tool))
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
#[path = "package_manager_tests.rs"]
mod tests;
