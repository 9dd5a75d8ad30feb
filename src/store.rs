// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Persisted curve state.
//!
//! Two JSON documents back the daemon: `config.json` holds the fan curve
//! configuration, `curve.json` holds the last sampled curve snapshot.
//! Both are fully overwritten as pretty-printed JSON on every update.
//! The in-memory curve is shared between the HTTP handlers and the
//! delivery loop behind a reader/writer lock.

use crate::curve::{self, FanCurve, SampledCurve};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// File name of the persisted curve configuration.
pub const CONFIG_FILE: &str = "config.json";

/// File name of the persisted sampled-curve snapshot.
pub const CURVE_FILE: &str = "curve.json";

// ---------------------------------------------------------------------------
// Typed JSON documents
// ---------------------------------------------------------------------------

/// A typed JSON document bound to one backing file.
pub struct DocumentFile<T> {
    path: PathBuf,
    _kind: PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> DocumentFile<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _kind: PhantomData,
        }
    }

    /// Load and parse the document.
    pub fn load(&self) -> io::Result<T> {
        let contents = fs::read_to_string(&self.path)?;
        serde_json::from_str(&contents).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Failed to parse {}: {e}", self.path.display()),
            )
        })
    }

    /// Overwrite the document with pretty-printed JSON, creating parent
    /// directories if needed.
    pub fn save(&self, value: &T) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(value).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Failed to serialize {}: {e}", self.path.display()),
            )
        })?;

        fs::write(&self.path, contents)
    }
}

// ---------------------------------------------------------------------------
// Shared curve state
// ---------------------------------------------------------------------------

/// Owner of the current fan curve.
///
/// Readers (the delivery loop, the speed and config endpoints) may run
/// concurrently; a writer (the curve-update endpoint) holds the lock
/// across the whole replace-and-persist sequence so no tick observes a
/// half-applied update.
pub struct CurveStore {
    curve: RwLock<FanCurve>,
    config_doc: DocumentFile<FanCurve>,
    snapshot_doc: DocumentFile<SampledCurve>,
}

impl CurveStore {
    /// Open the store, loading the persisted curve. A missing or corrupt
    /// document falls back to the default curve, which is persisted so
    /// the first config read already has a backing file.
    pub fn open(state_dir: &Path) -> Self {
        let config_doc = DocumentFile::new(state_dir.join(CONFIG_FILE));
        let snapshot_doc = DocumentFile::new(state_dir.join(CURVE_FILE));

        let curve = match config_doc.load() {
            Ok(curve) => {
                log::info!("Loaded fan curve from {}", state_dir.join(CONFIG_FILE).display());
                curve
            }
            Err(e) => {
                log::warn!("Could not load fan curve: {e}, using default curve");
                let curve = curve::default_curve();
                if let Err(e) = config_doc.save(&curve) {
                    log::error!("Could not persist default curve: {e}");
                }
                curve
            }
        };

        Self {
            curve: RwLock::new(curve),
            config_doc,
            snapshot_doc,
        }
    }

    /// Clone of the current curve.
    pub async fn get(&self) -> FanCurve {
        self.curve.read().await.clone()
    }

    /// Replace the current curve, persist it, and persist a freshly
    /// sampled snapshot. Returns the sampled curve for the API response.
    /// On persistence failure the in-memory curve is left unchanged.
    pub async fn set(&self, curve: FanCurve) -> io::Result<SampledCurve> {
        let mut current = self.curve.write().await;

        self.config_doc.save(&curve)?;
        let sampled = curve.sample();
        self.snapshot_doc.save(&sampled)?;

        *current = curve;
        Ok(sampled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{ControlPoint, InterpolationMode};

    fn temp_state_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "fancurved-store-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_open_empty_dir_persists_default() {
        let dir = temp_state_dir("default");
        let store = CurveStore::open(&dir);

        let curve = store.get().await;
        assert_eq!(curve, curve::default_curve());
        assert!(dir.join(CONFIG_FILE).exists());
    }

    #[tokio::test]
    async fn test_set_then_get_round_trip() {
        let dir = temp_state_dir("roundtrip");
        let store = CurveStore::open(&dir);

        let curve = FanCurve::new(
            vec![
                ControlPoint { temperature: 40.0, fan_speed: 30.0 },
                ControlPoint { temperature: 70.0, fan_speed: 90.0 },
            ],
            InterpolationMode::HardCut,
        );
        let sampled = store.set(curve.clone()).await.unwrap();
        assert_eq!(sampled.curve_data.len(), 101);
        assert_eq!(sampled.control_points, curve.points);
        assert_eq!(store.get().await, curve);
    }

    #[tokio::test]
    async fn test_set_survives_reopen() {
        let dir = temp_state_dir("reopen");
        let curve = FanCurve::new(
            vec![ControlPoint { temperature: 55.0, fan_speed: 60.0 }],
            InterpolationMode::Gradual,
        );

        {
            let store = CurveStore::open(&dir);
            store.set(curve.clone()).await.unwrap();
        }

        let store = CurveStore::open(&dir);
        assert_eq!(store.get().await, curve);
    }

    #[tokio::test]
    async fn test_snapshot_document_is_readable() {
        let dir = temp_state_dir("snapshot");
        let store = CurveStore::open(&dir);
        store.set(curve::default_curve()).await.unwrap();

        let doc: DocumentFile<SampledCurve> = DocumentFile::new(dir.join(CURVE_FILE));
        let snapshot = doc.load().unwrap();
        assert_eq!(snapshot.curve_data.len(), 101);
        assert_eq!(snapshot.control_points, curve::default_curve().points);
    }

    #[test]
    fn test_corrupt_document_is_invalid_data() {
        let dir = temp_state_dir("corrupt");
        fs::write(dir.join(CONFIG_FILE), "not json").unwrap();

        let doc: DocumentFile<FanCurve> = DocumentFile::new(dir.join(CONFIG_FILE));
        let err = doc.load().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
