//! In-memory collaborators shared by unit tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::catalog::{BranchSet, DeviceDescriptor, RemoteCatalog, SupportedDevice};
use crate::error::{Error, Result};
use crate::sync::Synchronizer;

/// A catalog answering from fixed tables and recording branch queries.
#[derive(Default)]
pub struct FakeCatalog {
    devices: Option<Vec<SupportedDevice>>,
    metadata: HashMap<(String, String), DeviceDescriptor>,
    branches: HashMap<String, Vec<String>>,
    branch_queries: RefCell<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, descriptor: DeviceDescriptor) -> Self {
        self.devices.get_or_insert_with(Vec::new).push(SupportedDevice {
            codename: descriptor.codename.clone(),
            manufacturer: descriptor.manufacturer.clone(),
            relative_path: format!(
                "devices/{}/{}.xml",
                descriptor.manufacturer, descriptor.codename
            ),
        });
        self.metadata.insert(
            (descriptor.manufacturer.clone(), descriptor.codename.clone()),
            descriptor,
        );
        self
    }

    /// A catalog whose device list is present but empty.
    pub fn with_no_devices(mut self) -> Self {
        self.devices = Some(Vec::new());
        self
    }

    pub fn with_branches(mut self, repository: &str, names: &[&str]) -> Self {
        self.branches.insert(
            repository.to_string(),
            names.iter().map(|name| name.to_string()).collect(),
        );
        self
    }

    pub fn branch_queries(&self) -> Vec<String> {
        self.branch_queries.borrow().clone()
    }
}

impl RemoteCatalog for FakeCatalog {
    fn fetch_supported_devices(&self) -> Result<Vec<SupportedDevice>> {
        self.devices.clone().ok_or_else(|| Error::RemoteUnavailable {
            url: "fake://supported.xml".to_string(),
            message: "no device list".to_string(),
        })
    }

    fn fetch_device_metadata(
        &self,
        manufacturer: &str,
        codename: &str,
    ) -> Result<DeviceDescriptor> {
        self.metadata
            .get(&(manufacturer.to_string(), codename.to_string()))
            .cloned()
            .ok_or_else(|| Error::RemoteUnavailable {
                url: format!("fake://devices/{}/{}.xml", manufacturer, codename),
                message: "404 Not Found".to_string(),
            })
    }

    fn fetch_branches(&self, repository: &str) -> Result<BranchSet> {
        self.branch_queries.borrow_mut().push(repository.to_string());
        self.branches
            .get(repository)
            .map(|names| BranchSet::new(names.iter().cloned()))
            .ok_or_else(|| Error::RemoteUnavailable {
                url: format!("fake://branches/{}", repository),
                message: "404 Not Found".to_string(),
            })
    }
}

/// A synchronizer that records each batch and creates the checkout
/// directories under `root`, like a successful `repo sync` would.
pub struct RecordingSync {
    root: PathBuf,
    calls: RefCell<Vec<Vec<String>>>,
    fail_on: Option<String>,
}

impl RecordingSync {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            calls: RefCell::new(Vec::new()),
            fail_on: None,
        }
    }

    /// Fails any batch containing `path`.
    pub fn failing_on(mut self, path: &str) -> Self {
        self.fail_on = Some(path.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    /// Every synced path, in order.
    pub fn synced(&self) -> Vec<String> {
        self.calls.borrow().iter().flatten().cloned().collect()
    }
}

impl Synchronizer for RecordingSync {
    fn sync(&self, paths: &[String]) -> Result<()> {
        self.calls.borrow_mut().push(paths.to_vec());
        if let Some(bad) = &self.fail_on {
            if paths.contains(bad) {
                return Err(Error::SyncFailed {
                    paths: paths.to_vec(),
                    message: "exit status: 1".to_string(),
                });
            }
        }
        for path in paths {
            fs::create_dir_all(self.root.join(path))?;
        }
        Ok(())
    }
}
