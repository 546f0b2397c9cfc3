use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::foundation::error::{ReelError, ReelResult};

/// Where encoded frame bytes come from.
///
/// Implementations are called from loader worker threads, so they must be shareable. A fetch
/// may block; the loader bounds how long it is willing to wait.
pub trait FrameSource: Send + Sync {
    /// Fetch the encoded bytes of the frame at 1-based `position`.
    fn fetch(&self, position: u32) -> ReelResult<Vec<u8>>;

    /// Human-readable location of `position`, for logs.
    fn describe(&self, position: u32) -> String {
        format!("frame {position}")
    }
}

/// File name of one frame: `<template>-<NNN>.<ext>`, index zero-padded to three digits.
pub fn frame_file_name(template: &str, position: u32, extension: &str) -> String {
    format!("{template}-{position:03}.{extension}")
}

/// Frames served from a directory laid out as `<dir>/<template>-<NNN>.<ext>`.
#[derive(Clone, Debug)]
pub struct DirFrameSource {
    dir: PathBuf,
    template: String,
    extension: String,
}

impl DirFrameSource {
    pub fn new(
        dir: impl Into<PathBuf>,
        template: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            template: template.into(),
            extension: extension.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, position: u32) -> PathBuf {
        self.dir
            .join(frame_file_name(&self.template, position, &self.extension))
    }
}

impl FrameSource for DirFrameSource {
    fn fetch(&self, position: u32) -> ReelResult<Vec<u8>> {
        let path = self.path_for(position);
        let bytes =
            std::fs::read(&path).with_context(|| format!("read frame '{}'", path.display()))?;
        Ok(bytes)
    }

    fn describe(&self, position: u32) -> String {
        self.path_for(position).display().to_string()
    }
}

/// Frames held in memory, keyed by 1-based position. Missing positions fail to fetch.
#[derive(Clone, Debug, Default)]
pub struct MemoryFrameSource {
    frames: HashMap<u32, Vec<u8>>,
}

impl MemoryFrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, position: u32, bytes: Vec<u8>) {
        self.frames.insert(position, bytes);
    }

    pub fn with_frame(mut self, position: u32, bytes: Vec<u8>) -> Self {
        self.insert(position, bytes);
        self
    }
}

impl FrameSource for MemoryFrameSource {
    fn fetch(&self, position: u32) -> ReelResult<Vec<u8>> {
        self.frames
            .get(&position)
            .cloned()
            .ok_or_else(|| ReelError::load(format!("no in-memory bytes for frame {position}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
