//! The bilingual content tree and its typed view.

use crate::value::ContentValue;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

const DEFAULT_CONTENT: &str = include_str!("../assets/default_content.json5");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Zh,
    En,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Zh, Language::En];

    pub fn code(self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
        }
    }

    pub fn toggled(self) -> Language {
        match self {
            Language::Zh => Language::En,
            Language::En => Language::Zh,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zh" => Ok(Language::Zh),
            "en" => Ok(Language::En),
            other => anyhow::bail!("unknown language {other:?} (expected zh or en)"),
        }
    }
}

// Typed view of one language document. Field names follow the tree keys.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataStore {
    pub zh: AppContent,
    pub en: AppContent,
}

impl DataStore {
    pub fn get(&self, lang: Language) -> &AppContent {
        match lang {
            Language::Zh => &self.zh,
            Language::En => &self.en,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppContent {
    pub nav: NavData,
    pub hero: HeroData,
    pub experience: ExperienceData,
    pub portfolio: PortfolioData,
    pub life: LifeData,
    pub footer: FooterData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavData {
    pub work: String,
    pub portfolio: String,
    pub life: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroData {
    pub name: String,
    pub title: String,
    pub subtitle: String,
    pub cta: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceData {
    pub title: String,
    pub items: Vec<ExperienceItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceItem {
    pub company: String,
    pub role: String,
    pub period: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioData {
    pub title: String,
    pub subtitle: String,
    pub items: Vec<ProjectData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Mobile,
    Desktop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    pub id: String,
    pub title: String,
    pub short_description: String,
    pub tags: Vec<String>,
    pub thumbnail: String,
    #[serde(rename = "type")]
    pub kind: ProjectType,
    pub detail_header: DetailHeader,
    pub challenge: ProjectDetailSection,
    pub process: ProjectDetailSection,
    pub solution: SolutionSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailHeader {
    pub timeline: String,
    pub role: String,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetailSection {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionSection {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_caption: Option<String>,
    pub features: Vec<SolutionFeature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionFeature {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeData {
    pub slogan: String,
    pub items: Vec<InterestItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestItem {
    pub id: String,
    pub title: String,
    pub image: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FooterData {
    pub message: String,
    pub copyright: String,
    pub qrcode: String,
}

/// The built-in default tree shipped with the binary.
pub fn builtin_default() -> anyhow::Result<ContentValue> {
    ContentValue::parse(DEFAULT_CONTENT).context("parsing built-in default content")
}

/// Interpret a raw tree through the typed view.
pub fn typed(tree: &ContentValue) -> anyhow::Result<DataStore> {
    DataStore::deserialize(tree).context("content does not match the portfolio shape")
}

/// Positional index of the project carrying `id`; field paths are built from
/// the index while selection keeps the id.
pub fn project_index(content: &AppContent, id: &str) -> Option<usize> {
    content.portfolio.items.iter().position(|p| p.id == id)
}

/// Every location where the `zh` and `en` documents differ in shape.
///
/// Keys, container kinds and sequence lengths must agree because one
/// relative path is resolved under both roots. Scalar values may differ.
pub fn shape_mismatches(tree: &ContentValue) -> Vec<String> {
    let mut out = Vec::new();
    match (tree.get(Language::Zh.code()), tree.get(Language::En.code())) {
        (Some(zh), Some(en)) => compare_shape(zh, en, "", &mut out),
        (zh, en) => {
            for (lang, doc) in [(Language::Zh, zh), (Language::En, en)] {
                if doc.is_none() {
                    out.push(format!("missing language root {lang}"));
                }
            }
        }
    }
    out
}

fn compare_shape(a: &ContentValue, b: &ContentValue, at: &str, out: &mut Vec<String>) {
    let join = |key: &str| {
        if at.is_empty() {
            key.to_string()
        } else {
            format!("{at}.{key}")
        }
    };
    match (a, b) {
        (ContentValue::Object(ma), ContentValue::Object(mb)) => {
            for (k, va) in ma {
                match mb.get(k) {
                    Some(vb) => compare_shape(va, vb, &join(k), out),
                    None => out.push(format!("{}: only in zh", join(k))),
                }
            }
            for k in mb.keys().filter(|k| !ma.contains_key(*k)) {
                out.push(format!("{}: only in en", join(k)));
            }
        }
        (ContentValue::Array(va), ContentValue::Array(vb)) => {
            if va.len() != vb.len() {
                out.push(format!(
                    "{}: sequence length {} vs {}",
                    if at.is_empty() { "<root>" } else { at },
                    va.len(),
                    vb.len()
                ));
            }
            for (i, (ia, ib)) in va.iter().zip(vb).enumerate() {
                compare_shape(ia, ib, &join(&i.to_string()), out);
            }
        }
        (a, b) if a.is_container() || b.is_container() => {
            out.push(format!(
                "{}: {} vs {}",
                if at.is_empty() { "<root>" } else { at },
                a.type_name(),
                b.type_name()
            ));
        }
        _ => {}
    }
}
