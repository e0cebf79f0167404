//! # Remote Device Catalog
//!
//! The catalog is where device metadata and branch listings come from. It is
//! modelled as the `RemoteCatalog` trait so resolution logic can run against
//! an in-memory catalog in tests; `HttpCatalog` is the real implementation.
//!
//! ## Remote documents
//!
//! - **Supported devices** (XML): `<devices><device codename=".."
//!   manufacturer=".." relativePath=".." /></devices>` nested under the
//!   document element.
//! - **Device metadata** (XML, one per device at
//!   `<base><manufacturer>/<codename>.xml`): child elements `latestBranch`,
//!   `githubRemote` and `devicePath`.
//! - **Branches** (JSON): the GitHub branch listing, an array of objects with
//!   a `name` field.
//!
//! Every response is validated into typed values at this boundary. Transport
//! failures become `Error::RemoteUnavailable`; anything unparsable or missing
//! a required field becomes `Error::RemoteDataMalformed`.

use std::collections::HashSet;

use log::debug;
use serde::Deserialize;
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::xml::{self, Element};

/// One row of the supported device list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedDevice {
    pub codename: String,
    pub manufacturer: String,
    pub relative_path: String,
}

/// Metadata of a single device repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub codename: String,
    pub manufacturer: String,
    /// Checkout path of the device tree, e.g. `device/xiaomi/foo`.
    pub checkout_path: String,
    /// Preferred branch of the device repository.
    pub revision: String,
    /// Repository name under the organization, e.g. `android_device_xiaomi_foo`.
    pub repository: String,
}

/// Branch names found on a remote repository at query time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchSet {
    names: Vec<String>,
}

impl BranchSet {
    /// Builds a set from names in remote order, dropping repeats.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| seen.insert(name.clone()))
            .collect();
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|branch| branch == name)
    }

    /// Names in the order the remote listed them.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Source of remote repository metadata.
pub trait RemoteCatalog {
    /// Lists every supported device.
    fn fetch_supported_devices(&self) -> Result<Vec<SupportedDevice>>;

    /// Fetches the metadata document of one device.
    fn fetch_device_metadata(&self, manufacturer: &str, codename: &str)
        -> Result<DeviceDescriptor>;

    /// Lists the branches of `repository`.
    fn fetch_branches(&self, repository: &str) -> Result<BranchSet>;
}

/// Branches requested per page from the listing API.
const BRANCHES_PER_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
struct BranchRecord {
    name: String,
}

/// `RemoteCatalog` backed by HTTP requests.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    supported_devices_url: Url,
    device_manifest_base_url: Url,
    branches_api_base_url: Url,
    organization: String,
    token: Option<String>,
}

impl HttpCatalog {
    /// Builds a catalog from a configuration, validating its URLs.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            supported_devices_url: Url::parse(&config.supported_devices_url)?,
            device_manifest_base_url: Url::parse(&config.device_manifest_base_url)?,
            branches_api_base_url: Url::parse(&config.branches_api_base_url)?,
            organization: config.organization.clone(),
            token: config.github_token.clone(),
        })
    }

    pub fn device_metadata_url(&self, manufacturer: &str, codename: &str) -> Result<Url> {
        Ok(self
            .device_manifest_base_url
            .join(&format!("{}/{}.xml", manufacturer, codename))?)
    }

    pub fn branches_url(&self, repository: &str, page: usize) -> Result<Url> {
        let mut url = self
            .branches_api_base_url
            .join(&format!("{}/{}/branches", self.organization, repository))?;
        url.query_pairs_mut()
            .append_pair("per_page", &BRANCHES_PER_PAGE.to_string())
            .append_pair("page", &page.to_string());
        Ok(url)
    }

    fn get(&self, url: &Url) -> Result<ureq::Response> {
        debug!("GET {}", url);
        let mut request = ureq::get(url.as_str());
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("token {}", token));
        }
        request.call().map_err(|err| Error::RemoteUnavailable {
            url: url.to_string(),
            message: err.to_string(),
        })
    }

    fn get_text(&self, url: &Url) -> Result<String> {
        self.get(url)?
            .into_string()
            .map_err(|err| Error::RemoteUnavailable {
                url: url.to_string(),
                message: err.to_string(),
            })
    }

    fn get_xml(&self, url: &Url) -> Result<Element> {
        let body = self.get_text(url)?;
        xml::parse(&body).map_err(|err| Error::RemoteDataMalformed {
            url: url.to_string(),
            message: err.to_string(),
        })
    }
}

impl RemoteCatalog for HttpCatalog {
    fn fetch_supported_devices(&self) -> Result<Vec<SupportedDevice>> {
        let root = self.get_xml(&self.supported_devices_url)?;
        parse_supported_devices(&root).map_err(|message| Error::RemoteDataMalformed {
            url: self.supported_devices_url.to_string(),
            message,
        })
    }

    fn fetch_device_metadata(
        &self,
        manufacturer: &str,
        codename: &str,
    ) -> Result<DeviceDescriptor> {
        let url = self.device_metadata_url(manufacturer, codename)?;
        let root = self.get_xml(&url)?;
        parse_device_metadata(&root, manufacturer, codename).map_err(|message| {
            Error::RemoteDataMalformed {
                url: url.to_string(),
                message,
            }
        })
    }

    fn fetch_branches(&self, repository: &str) -> Result<BranchSet> {
        let mut names = Vec::new();
        for page in 1.. {
            let url = self.branches_url(repository, page)?;
            let records: Vec<BranchRecord> = self
                .get(&url)?
                .into_json()
                .map_err(|err| Error::RemoteDataMalformed {
                    url: url.to_string(),
                    message: err.to_string(),
                })?;
            let count = records.len();
            names.extend(records.into_iter().map(|record| record.name));
            if count < BRANCHES_PER_PAGE {
                break;
            }
        }
        Ok(BranchSet::new(names))
    }
}

/// Reads the `devices/device` rows of a supported device document.
pub fn parse_supported_devices(root: &Element) -> std::result::Result<Vec<SupportedDevice>, String> {
    let mut devices = Vec::new();
    for list in root.children_named("devices") {
        for device in list.children_named("device") {
            let field = |name: &str| {
                device
                    .attribute(name)
                    .map(str::to_string)
                    .ok_or_else(|| format!("device entry without a {} attribute", name))
            };
            devices.push(SupportedDevice {
                codename: field("codename")?,
                manufacturer: field("manufacturer")?,
                relative_path: field("relativePath")?,
            });
        }
    }
    Ok(devices)
}

/// Reads a per-device metadata document.
pub fn parse_device_metadata(
    root: &Element,
    manufacturer: &str,
    codename: &str,
) -> std::result::Result<DeviceDescriptor, String> {
    let field = |name: &str| {
        root.child_text(name)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .ok_or_else(|| format!("missing <{}>", name))
    };
    Ok(DeviceDescriptor {
        codename: codename.to_string(),
        manufacturer: manufacturer.to_string(),
        revision: field("latestBranch")?,
        repository: field("githubRemote")?,
        checkout_path: field("devicePath")?,
    })
}
