//! Source résumé document in the JSON Resume shape.
//!
//! Every field is optional in practice, so every struct defaults missing keys and explicit
//! `null`s to empty values rather than failing the whole load. Only structurally invalid JSON
//! is a parse error.

use std::{fs, path::Path};

use serde::{Deserialize, Deserializer};

use crate::foundation::error::{FolioError, FolioResult};

/// Relative path the page loads its document from.
pub const DEFAULT_RESUME_PATH: &str = "resume.json";

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Resume {
    #[serde(deserialize_with = "nullable")]
    pub basics: Basics,
    #[serde(deserialize_with = "nullable")]
    pub education: Vec<Education>,
    #[serde(deserialize_with = "nullable")]
    pub work: Vec<Work>,
    #[serde(deserialize_with = "nullable")]
    pub projects: Vec<Project>,
    #[serde(deserialize_with = "nullable")]
    pub skills: Vec<Skill>,
    #[serde(deserialize_with = "nullable")]
    pub certificates: Vec<Certificate>,
    #[serde(deserialize_with = "nullable")]
    pub publications: Vec<Publication>,
    #[serde(deserialize_with = "nullable")]
    pub languages: Vec<Language>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Basics {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub label: String,
    #[serde(deserialize_with = "nullable")]
    pub image: String,
    #[serde(deserialize_with = "nullable")]
    pub email: String,
    #[serde(deserialize_with = "nullable")]
    pub url: String,
    #[serde(deserialize_with = "nullable")]
    pub summary: String,
    #[serde(deserialize_with = "nullable")]
    pub location: Location,
    #[serde(deserialize_with = "nullable")]
    pub profiles: Vec<Profile>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Location {
    #[serde(deserialize_with = "nullable")]
    pub city: String,
    #[serde(deserialize_with = "nullable")]
    pub region: String,
    #[serde(deserialize_with = "nullable")]
    pub country_code: String,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    #[serde(deserialize_with = "nullable")]
    pub network: String,
    #[serde(deserialize_with = "nullable")]
    pub username: String,
    #[serde(deserialize_with = "nullable")]
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Education {
    #[serde(deserialize_with = "nullable")]
    pub institution: String,
    #[serde(deserialize_with = "nullable")]
    pub url: String,
    #[serde(deserialize_with = "nullable")]
    pub area: String,
    #[serde(deserialize_with = "nullable")]
    pub study_type: String,
    #[serde(deserialize_with = "nullable")]
    pub start_date: String, // YYYY-MM or YYYY-MM-DD
    #[serde(deserialize_with = "nullable")]
    pub end_date: String,
    #[serde(deserialize_with = "nullable")]
    pub score: String,
    #[serde(deserialize_with = "nullable")]
    pub location: String,
    #[serde(deserialize_with = "nullable")]
    pub courses: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Work {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub position: String,
    #[serde(deserialize_with = "nullable")]
    pub location: String,
    #[serde(deserialize_with = "nullable")]
    pub url: String,
    #[serde(deserialize_with = "nullable")]
    pub start_date: String,
    #[serde(deserialize_with = "nullable")]
    pub end_date: String, // empty while the position is current
    #[serde(deserialize_with = "nullable")]
    pub summary: String,
    #[serde(deserialize_with = "nullable")]
    pub highlights: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub url: String,
    #[serde(deserialize_with = "nullable")]
    pub blog: String,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub highlights: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Skill {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub level: String,
    #[serde(deserialize_with = "nullable")]
    pub keywords: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Certificate {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub issuer: String,
    #[serde(deserialize_with = "nullable")]
    pub date: String,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Publication {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub publisher: String,
    #[serde(deserialize_with = "nullable")]
    pub release_date: String,
    #[serde(deserialize_with = "nullable")]
    pub summary: String,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Language {
    #[serde(deserialize_with = "nullable")]
    pub language: String,
    #[serde(deserialize_with = "nullable")]
    pub fluency: String,
}

impl Basics {
    /// URL of the first profile whose network label is exactly `network`.
    pub fn profile_url(&self, network: &str) -> Option<&str> {
        self.profiles
            .iter()
            .find(|p| p.network == network)
            .map(|p| p.url.as_str())
    }
}

/// `null` reads as the field's default, the same as a missing key.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse a résumé from JSON text.
pub fn parse_resume(json: &str) -> FolioResult<Resume> {
    serde_json::from_str(json).map_err(|e| FolioError::parse(format!("résumé JSON: {e}")))
}

/// Read and parse the résumé at `path`.
#[tracing::instrument]
pub fn load_resume(path: &Path) -> FolioResult<Resume> {
    let text = fs::read_to_string(path)
        .map_err(|e| FolioError::load(format!("read '{}': {e}", path.display())))?;
    let resume = parse_resume(&text)?;
    tracing::debug!(
        education = resume.education.len(),
        work = resume.work.len(),
        projects = resume.projects.len(),
        skills = resume.skills.len(),
        "loaded résumé"
    );
    Ok(resume)
}
