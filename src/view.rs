//! View model consumed by the renderer, decoupled from the résumé shape.
//!
//! This is also the `data.json` format written by `folio data`.

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Portfolio {
    pub personal: Personal,
    pub degrees: Vec<Degree>,
    pub skills: Vec<SkillGroup>,
    pub experience: Vec<Experience>,
    pub projects: Vec<ProjectEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Personal {
    pub name: String,
    pub tagline: String,
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Degree {
    pub institution: String,
    pub degree: String,
    pub year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    pub description: String,
    /// Shared key of a multi-institution program; `None` for standalone degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Only meaningful when `group` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
}

impl Degree {
    pub fn is_primary(&self) -> bool {
        self.group.is_some() && self.primary == Some(true)
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SkillGroup {
    pub category: String,
    pub skills: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Experience {
    pub company: String,
    pub role: String,
    pub period: String,
    pub achievements: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub link: String,
}

/// Degree entries clustered for display: program groups first (in order of first appearance),
/// then standalone degrees in source order.
#[derive(Clone, Debug, PartialEq)]
pub enum DegreeCard<'a> {
    Group {
        key: &'a str,
        members: Vec<&'a Degree>,
    },
    Single(&'a Degree),
}

impl Portfolio {
    pub fn degree_cards(&self) -> Vec<DegreeCard<'_>> {
        let mut groups: Vec<(&str, Vec<&Degree>)> = Vec::new();
        let mut singles = Vec::new();

        for degree in &self.degrees {
            match degree.group.as_deref() {
                Some(key) => match groups.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, members)) => members.push(degree),
                    None => groups.push((key, vec![degree])),
                },
                None => singles.push(DegreeCard::Single(degree)),
            }
        }

        groups
            .into_iter()
            .map(|(key, members)| DegreeCard::Group { key, members })
            .chain(singles)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degree(name: &str, group: Option<&str>, primary: Option<bool>) -> Degree {
        Degree {
            institution: name.to_string(),
            group: group.map(str::to_string),
            primary,
            ..Degree::default()
        }
    }

    #[test]
    fn groups_come_before_singles() {
        let p = Portfolio {
            degrees: vec![
                degree("solo-a", None, None),
                degree("dd-1", Some("dd"), Some(true)),
                degree("solo-b", None, None),
                degree("dd-2", Some("dd"), Some(false)),
            ],
            ..Portfolio::default()
        };
        let cards = p.degree_cards();
        assert_eq!(cards.len(), 3);
        match &cards[0] {
            DegreeCard::Group { key, members } => {
                assert_eq!(*key, "dd");
                assert_eq!(members.len(), 2);
                assert_eq!(members[1].institution, "dd-2");
            }
            other => panic!("expected group, got {other:?}"),
        }
        assert!(matches!(cards[1], DegreeCard::Single(d) if d.institution == "solo-a"));
        assert!(matches!(cards[2], DegreeCard::Single(d) if d.institution == "solo-b"));
    }

    #[test]
    fn primary_requires_group() {
        assert!(!degree("x", None, Some(true)).is_primary());
        assert!(degree("x", Some("g"), Some(true)).is_primary());
    }

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let s = serde_json::to_string(&degree("u", None, None)).unwrap();
        assert!(!s.contains("group"));
        assert!(!s.contains("grade"));
    }
}
