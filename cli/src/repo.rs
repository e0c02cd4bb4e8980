#![deny(missing_docs)]

//! # Model Repository
//!
//! Local cache of the upstream SDK repository holding the service models.
//!
//! Layout under the cache directory:
//! `src/<repo>/models/apis/<alias>/<version>/{api-2.json,docs-2.json}`.

use crate::error::{CliError, CliResult};
use apimodel_core::ApiModel;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

/// File name of an API model.
pub const MODEL_FILE: &str = "api-2.json";

/// File name of an API documentation document.
pub const DOCS_FILE: &str = "docs-2.json";

/// Selects APIs by alias and protocol. Empty lists match everything.
#[derive(Debug, Clone, Default)]
pub struct ApiFilter {
    /// Any-of aliases.
    pub aliases: Vec<String>,
    /// Any-of protocol tags.
    pub protocols: Vec<String>,
}

/// A checked-out model repository.
#[derive(Debug, Clone)]
pub struct ModelRepo {
    root: PathBuf,
}

impl ModelRepo {
    /// Opens an existing checkout without touching the network.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the checkout under `cache_dir`, cloning `repo_url` first if absent.
    pub fn ensure(cache_dir: &Path, repo_url: &str) -> CliResult<Self> {
        let clone_path = cache_dir.join("src").join(repo_name(repo_url));
        if clone_path.exists() {
            tracing::debug!(path = ?clone_path, "using cached model repository");
            return Ok(Self::open(clone_path));
        }

        if let Some(parent) = clone_path.parent() {
            fs::create_dir_all(parent)?;
        }
        tracing::info!(url = %repo_url, path = ?clone_path, "cloning model repository");
        let status = Command::new("git")
            .arg("clone")
            .arg("--depth")
            .arg("1")
            .arg(repo_url)
            .arg(&clone_path)
            .status()?;
        if !status.success() {
            return Err(CliError::Clone {
                url: repo_url.to_string(),
                status: status.to_string(),
            });
        }
        Ok(Self::open(clone_path))
    }

    /// Root of the checkout.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one subdirectory per API alias.
    pub fn apis_dir(&self) -> PathBuf {
        self.root.join("models").join("apis")
    }

    /// All API aliases, sorted.
    pub fn aliases(&self) -> CliResult<Vec<String>> {
        let mut aliases = Vec::new();
        for entry in WalkDir::new(self.apis_dir())
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            if entry.file_type().is_dir() {
                aliases.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(aliases)
    }

    /// The greatest version directory of an API.
    ///
    /// Versions are dates (`2017-11-01`), so lexical order is chronological.
    pub fn latest_version(&self, alias: &str) -> CliResult<String> {
        let alias_dir = self.apis_dir().join(alias);
        if !alias_dir.is_dir() {
            return Err(CliError::UnknownApi(alias.to_string()));
        }
        let mut latest: Option<String> = None;
        for entry in WalkDir::new(&alias_dir).min_depth(1).max_depth(1) {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !entry.file_type().is_dir() {
                return Err(CliError::General(format!(
                    "Expected only version directories in {:?} but found {}",
                    alias_dir, name
                )));
            }
            if latest.as_ref().map_or(true, |l| name > *l) {
                latest = Some(name);
            }
        }
        latest.ok_or_else(|| CliError::General(format!("No versions found for API '{}'", alias)))
    }

    /// Directory holding the latest model files of an API.
    pub fn version_dir(&self, alias: &str) -> CliResult<PathBuf> {
        let version = self.latest_version(alias)?;
        Ok(self.apis_dir().join(alias).join(version))
    }

    /// Loads the latest model of an API, with its documentation when present.
    pub fn model(&self, alias: &str) -> CliResult<ApiModel> {
        let dir = self.version_dir(alias)?;
        let model = ApiModel::load(alias, &dir.join(MODEL_FILE), Some(&dir.join(DOCS_FILE)))?;
        Ok(model)
    }

    /// Loads every API passing `filter`, in alias order.
    pub fn list_apis(&self, filter: &ApiFilter) -> CliResult<Vec<ApiModel>> {
        let mut apis = Vec::new();
        for alias in self.aliases()? {
            if !filter.aliases.is_empty() && !filter.aliases.contains(&alias) {
                continue;
            }
            let dir = self.version_dir(&alias)?;
            let model = ApiModel::load(alias.as_str(), &dir.join(MODEL_FILE), None)?;
            let protocol = model.protocol().as_str();
            if !filter.protocols.is_empty() && !filter.protocols.iter().any(|p| p == protocol) {
                continue;
            }
            apis.push(model);
        }
        Ok(apis)
    }
}

/// Checkout directory name for a repository URL.
fn repo_name(repo_url: &str) -> &str {
    let last = repo_url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(repo_url);
    last.strip_suffix(".git").unwrap_or(last)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::fs;
    use std::path::Path;

    pub const SNS_MODEL: &str = r#"{
        "metadata": {"apiVersion": "2010-03-31", "serviceFullName": "Amazon Simple Notification Service", "protocol": "query"},
        "operations": {
            "CreateTopic": {"http": {"method": "POST", "requestUri": "/"}, "input": {"shape": "CreateTopicInput"}, "output": {"shape": "CreateTopicResponse"}},
            "DeleteTopic": {"http": {"method": "POST", "requestUri": "/"}, "input": {"shape": "DeleteTopicInput"}}
        },
        "shapes": {
            "CreateTopicInput": {"type": "structure", "required": ["Name"], "members": {"Name": {"shape": "topicName"}}},
            "CreateTopicResponse": {"type": "structure", "members": {"TopicArn": {"shape": "topicARN"}}},
            "DeleteTopicInput": {"type": "structure", "required": ["TopicArn"], "members": {"TopicArn": {"shape": "topicARN"}}},
            "TopicList": {"type": "list", "member": {"shape": "topicARN"}},
            "topicName": {"type": "string"},
            "topicARN": {"type": "string"}
        }
    }"#;

    pub const EKS_MODEL: &str = r#"{
        "metadata": {"apiVersion": "2017-11-01", "serviceFullName": "Amazon Elastic Kubernetes Service", "protocol": "rest-json"},
        "operations": {
            "CreateCluster": {"http": {"method": "POST", "requestUri": "/clusters"}, "input": {"shape": "CreateClusterRequest"}, "output": {"shape": "CreateClusterResponse"}}
        },
        "shapes": {
            "CreateClusterRequest": {"type": "structure", "required": ["name"], "members": {"name": {"shape": "String"}}},
            "CreateClusterResponse": {"type": "structure", "members": {"cluster": {"shape": "Cluster"}}},
            "Cluster": {"type": "structure", "members": {"name": {"shape": "String"}, "status": {"shape": "String"}}},
            "String": {"type": "string"}
        }
    }"#;

    pub const SNS_DOCS: &str = r#"{"service": "Simple notifications.", "operations": {"CreateTopic": "Creates a topic."}}"#;

    /// Writes a fake checkout under `root` with `eks` and `sns`.
    pub fn write_repo(root: &Path) {
        let apis = root.join("models").join("apis");
        let eks = apis.join("eks").join("2017-11-01");
        fs::create_dir_all(&eks).unwrap();
        fs::write(eks.join("api-2.json"), EKS_MODEL).unwrap();

        let old_sns = apis.join("sns").join("2009-01-01");
        let sns = apis.join("sns").join("2010-03-31");
        fs::create_dir_all(&old_sns).unwrap();
        fs::create_dir_all(&sns).unwrap();
        fs::write(old_sns.join("api-2.json"), "{}").unwrap();
        fs::write(sns.join("api-2.json"), SNS_MODEL).unwrap();
        fs::write(sns.join("docs-2.json"), SNS_DOCS).unwrap();
    }
}
