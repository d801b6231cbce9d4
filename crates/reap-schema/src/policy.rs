//! Retention policies and the lookup table the sweep resolves against.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Company id under which the fallback policy is reported.
pub const DEFAULT_COMPANY_ID: &str = "default";

/// How long one company's buckets are kept.
///
/// Field names follow the on-disk policy document (`companyId`,
/// `companyName`, `retentionDays`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionPolicy {
    /// Top-level directory name this policy applies to.
    #[serde(default)]
    pub company_id: String,

    /// Human-readable name, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    /// Number of days a bucket is kept after its range has ended.
    pub retention_days: u32,
}

impl RetentionPolicy {
    /// Build a policy without a display name.
    pub fn new(company_id: impl Into<String>, retention_days: u32) -> Self {
        Self {
            company_id: company_id.into(),
            company_name: None,
            retention_days,
        }
    }
}

/// Errors raised while loading or building a [`PolicyTable`].
///
/// Every variant is a precondition failure: the sweep must not start.
#[derive(thiserror::Error, Debug)]
pub enum PolicyError {
    /// The policy file could not be read.
    #[error("Failed to read policy file {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON for the policy schema.
    #[error("Invalid JSON policy document: {0}")]
    Json(#[from] serde_json::Error),

    /// The document is not valid TOML for the policy schema.
    #[error("Invalid TOML policy document: {0}")]
    Toml(#[from] toml::de::Error),

    /// The document has no `default` entry.
    #[error("Policy document does not define a default policy")]
    MissingDefault,

    /// A company override has an empty `companyId` (index into `companies`).
    #[error("Company policy #{0} has an empty companyId")]
    EmptyCompanyId(usize),

    /// Two overrides (or an override and the default) share a company id.
    #[error("Duplicate policy for company '{0}'")]
    DuplicateCompany(String),
}

/// On-disk shape of the policy configuration.
///
/// ```json
/// {
///   "default":   { "companyId": "default", "retentionDays": 365 },
///   "companies": [ { "companyId": "acme", "companyName": "Acme", "retentionDays": 30 } ]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// Fallback policy for companies without an override.
    #[serde(default)]
    pub default: Option<RetentionPolicy>,

    /// Per-company overrides.
    #[serde(default)]
    pub companies: Vec<RetentionPolicy>,
}

impl PolicyDocument {
    /// Parse the JSON form of the document.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Json`] if the text does not match the schema
    /// (including negative retention values).
    pub fn from_json_str(text: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse the TOML form of the document (`[default]` + `[[companies]]`).
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Toml`] if the text does not match the schema.
    pub fn from_toml_str(text: &str) -> Result<Self, PolicyError> {
        Ok(toml::from_str(text)?)
    }
}

/// Company id to policy mapping with a mandatory default.
///
/// The default lives outside the map, so a table without one cannot be
/// constructed and [`PolicyTable::resolve`] never fails.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    default: RetentionPolicy,
    companies: HashMap<String, RetentionPolicy>,
}

impl PolicyTable {
    /// Create a table holding only the default policy.
    ///
    /// An empty `company_id` on the default is normalized to
    /// [`DEFAULT_COMPANY_ID`].
    pub fn new(mut default: RetentionPolicy) -> Self {
        if default.company_id.is_empty() {
            default.company_id = DEFAULT_COMPANY_ID.to_string();
        }
        Self {
            default,
            companies: HashMap::new(),
        }
    }

    /// Add a company override.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::DuplicateCompany`] if the id is already present
    /// or collides with the default policy's id.
    pub fn insert(&mut self, policy: RetentionPolicy) -> Result<(), PolicyError> {
        if policy.company_id == self.default.company_id
            || self.companies.contains_key(&policy.company_id)
        {
            return Err(PolicyError::DuplicateCompany(policy.company_id));
        }
        self.companies.insert(policy.company_id.clone(), policy);
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert).
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert).
    pub fn with_company(mut self, policy: RetentionPolicy) -> Result<Self, PolicyError> {
        self.insert(policy)?;
        Ok(self)
    }

    /// Validate a parsed document and build the table.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::MissingDefault`], [`PolicyError::EmptyCompanyId`]
    /// or [`PolicyError::DuplicateCompany`].
    pub fn from_document(doc: PolicyDocument) -> Result<Self, PolicyError> {
        let default = doc.default.ok_or(PolicyError::MissingDefault)?;
        let mut table = Self::new(default);
        for (idx, policy) in doc.companies.into_iter().enumerate() {
            if policy.company_id.trim().is_empty() {
                return Err(PolicyError::EmptyCompanyId(idx));
            }
            table.insert(policy)?;
        }
        Ok(table)
    }

    /// Read and validate a policy file.
    ///
    /// Files ending in `.toml` are parsed as TOML, everything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Io`] if the file cannot be read, or any parse
    /// or validation error from [`from_document`](Self::from_document).
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let text = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        let doc = if is_toml {
            PolicyDocument::from_toml_str(&text)?
        } else {
            PolicyDocument::from_json_str(&text)?
        };
        Self::from_document(doc)
    }

    /// Policy governing `company_id`; unknown ids get the default.
    pub fn resolve(&self, company_id: &str) -> &RetentionPolicy {
        self.companies.get(company_id).unwrap_or(&self.default)
    }

    /// The fallback policy.
    pub fn default_policy(&self) -> &RetentionPolicy {
        &self.default
    }

    /// Company overrides, sorted by id.
    pub fn overrides(&self) -> Vec<&RetentionPolicy> {
        let mut list: Vec<_> = self.companies.values().collect();
        list.sort_by(|a, b| a.company_id.cmp(&b.company_id));
        list
    }

    /// Number of company overrides (the default is not counted).
    pub fn override_count(&self) -> usize {
        self.companies.len()
    }
}
