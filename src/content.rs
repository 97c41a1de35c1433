//! Site copy and tunables, read from `content/portfolio.json`.

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::theme::SystemSyncPolicy;

const EMBEDDED_CONTENT: &str = include_str!("../content/portfolio.json");

const DEFAULT_STAR_COUNT: usize = 7_000;
const DEFAULT_AUTO_ROTATE_SPEED: f64 = 0.5;

const STAR_COUNT_BOUNDS: (usize, usize) = (0, 20_000);
const AUTO_ROTATE_SPEED_BOUNDS: (f64, f64) = (0.0, 10.0);

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{section}[{index}] has an empty `{field}`")]
    EmptyField {
        section: &'static str,
        index: usize,
        field: &'static str,
    },
    #[error("contact link `{label}` has unsupported href `{href}`")]
    InvalidLink { label: String, href: String },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Hero {
    pub title: String,
    pub text: String,
}

/// A project or a role: `{title, subtitle, description, tags}`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Entry {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub period: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ContactLink {
    pub label: String,
    pub href: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct ThemeOptions {
    #[serde(default)]
    pub follow_system: SystemSyncPolicy,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
struct RawSceneOptions {
    star_count: Option<usize>,
    auto_rotate_speed: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneOptions {
    pub star_count: usize,
    pub auto_rotate_speed: f64,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            star_count: DEFAULT_STAR_COUNT,
            auto_rotate_speed: DEFAULT_AUTO_ROTATE_SPEED,
        }
    }
}

impl From<RawSceneOptions> for SceneOptions {
    fn from(raw: RawSceneOptions) -> Self {
        let star_count = raw
            .star_count
            .filter(|value| (STAR_COUNT_BOUNDS.0..=STAR_COUNT_BOUNDS.1).contains(value))
            .unwrap_or(DEFAULT_STAR_COUNT);
        let auto_rotate_speed = raw
            .auto_rotate_speed
            .filter(|value| (AUTO_ROTATE_SPEED_BOUNDS.0..=AUTO_ROTATE_SPEED_BOUNDS.1).contains(value))
            .unwrap_or(DEFAULT_AUTO_ROTATE_SPEED);

        Self {
            star_count,
            auto_rotate_speed,
        }
    }
}

#[derive(Deserialize)]
struct RawSiteContent {
    hero: Hero,
    #[serde(default)]
    projects: Vec<Entry>,
    #[serde(default)]
    experience: Vec<Entry>,
    #[serde(default)]
    contact: Vec<ContactLink>,
    #[serde(default)]
    theme: ThemeOptions,
    #[serde(default)]
    scene: RawSceneOptions,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SiteContent {
    pub hero: Hero,
    pub projects: Vec<Entry>,
    pub experience: Vec<Entry>,
    pub contact: Vec<ContactLink>,
    pub theme: ThemeOptions,
    pub scene: SceneOptions,
}

impl Default for SiteContent {
    fn default() -> Self {
        Self {
            hero: Hero {
                title: "Hi, I'm a Software Developer".to_string(),
                text: String::new(),
            },
            projects: Vec::new(),
            experience: Vec::new(),
            contact: Vec::new(),
            theme: ThemeOptions::default(),
            scene: SceneOptions::default(),
        }
    }
}

impl SiteContent {
    pub fn embedded() -> Result<Self, ContentError> {
        Self::parse(EMBEDDED_CONTENT)
    }

    pub fn parse(source: &str) -> Result<Self, ContentError> {
        let raw: RawSiteContent = serde_json::from_str(source)?;
        let content = Self {
            hero: raw.hero,
            projects: raw.projects,
            experience: raw.experience,
            contact: raw.contact,
            theme: raw.theme,
            scene: raw.scene.into(),
        };
        content.validate()?;
        Ok(content)
    }

    fn validate(&self) -> Result<(), ContentError> {
        require("hero", 0, "title", &self.hero.title)?;

        for (section, entries) in [("projects", &self.projects), ("experience", &self.experience)] {
            for (index, entry) in entries.iter().enumerate() {
                require(section, index, "title", &entry.title)?;
                require(section, index, "subtitle", &entry.subtitle)?;
                require(section, index, "description", &entry.description)?;
            }
        }

        for (index, link) in self.contact.iter().enumerate() {
            require("contact", index, "label", &link.label)?;
            if !is_allowed_href(&link.href) {
                return Err(ContentError::InvalidLink {
                    label: link.label.clone(),
                    href: link.href.clone(),
                });
            }
        }

        Ok(())
    }
}

fn require(
    section: &'static str,
    index: usize,
    field: &'static str,
    value: &str,
) -> Result<(), ContentError> {
    if value.trim().is_empty() {
        return Err(ContentError::EmptyField {
            section,
            index,
            field,
        });
    }
    Ok(())
}

fn is_allowed_href(href: &str) -> bool {
    let Ok(parsed) = Url::parse(href.trim()) else {
        return false;
    };

    match parsed.scheme() {
        "http" | "https" => parsed.host_str().is_some(),
        "mailto" => !parsed.path().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MINIMAL: &str = r#"{ "hero": { "title": "Hello", "text": "" } }"#;

    #[test]
    fn embedded_content_is_valid() {
        let content = SiteContent::embedded().expect("embedded content should parse");

        assert_eq!(content.projects.len(), 3);
        assert_eq!(content.experience.len(), 2);
        assert_eq!(content.contact.len(), 3);
        assert_eq!(content.projects[0].tags[0], "ASP.NET");
        assert_eq!(content.experience[0].period.as_deref(), Some("07/2024 - Present"));
        assert_eq!(content.theme.follow_system, SystemSyncPolicy::UntilToggled);
        assert_eq!(content.scene, SceneOptions::default());
    }

    #[test]
    fn missing_sections_use_defaults() {
        let content = SiteContent::parse(MINIMAL).expect("minimal content should parse");

        assert!(content.projects.is_empty());
        assert_eq!(content.scene, SceneOptions::default());
        assert_eq!(content.theme, ThemeOptions::default());
    }

    #[test]
    fn empty_entry_field_is_reported_with_position() {
        let source = r#"{
            "hero": { "title": "Hello", "text": "" },
            "experience": [
                { "title": "Engineer", "subtitle": "Acme", "description": "Built things" },
                { "title": "Engineer", "subtitle": " ", "description": "Built more" }
            ]
        }"#;

        let error = SiteContent::parse(source).expect_err("blank subtitle should be rejected");
        assert_eq!(error.to_string(), "experience[1] has an empty `subtitle`");
    }

    #[test]
    fn unsupported_contact_scheme_is_rejected() {
        let source = r#"{
            "hero": { "title": "Hello", "text": "" },
            "contact": [{ "label": "Home", "href": "javascript:alert(1)" }]
        }"#;

        let error = SiteContent::parse(source).expect_err("javascript href should be rejected");
        assert!(matches!(error, ContentError::InvalidLink { ref label, .. } if label == "Home"));
    }

    #[test]
    fn relative_contact_href_is_rejected() {
        assert!(!is_allowed_href("/resume.pdf"));
        assert!(is_allowed_href("mailto:someone@example.com"));
        assert!(is_allowed_href("https://github.com/developer"));
    }

    #[test]
    fn out_of_range_scene_options_fall_back() {
        let source = r#"{
            "hero": { "title": "Hello", "text": "" },
            "scene": { "star_count": 900000, "auto_rotate_speed": 2.0 }
        }"#;

        let content = SiteContent::parse(source).expect("content should parse");
        assert_eq!(content.scene.star_count, DEFAULT_STAR_COUNT);
        assert_eq!(content.scene.auto_rotate_speed, 2.0);
    }

    #[test]
    fn always_policy_is_parsed() {
        let source = r#"{
            "hero": { "title": "Hello", "text": "" },
            "theme": { "follow_system": "always" }
        }"#;

        let content = SiteContent::parse(source).expect("content should parse");
        assert_eq!(content.theme.follow_system, SystemSyncPolicy::Always);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let error = SiteContent::parse("{ not json").expect_err("should fail");
        assert!(matches!(error, ContentError::Parse(_)));
    }
}
