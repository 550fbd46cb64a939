use std::sync::LazyLock;

use regex::Regex;

use crate::{
    dates,
    foundation::error::{FolioError, FolioResult},
    resume::{Basics, Education, Project, Resume, Skill, Work},
    view::{Degree, Experience, Personal, Portfolio, ProjectEntry, SkillGroup},
};

/// `"<title> at <institution>, <location> (GPA <grade>)"`
static COURSE_PATTERN: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<title>.+?) at (?P<institution>[^,]+), (?P<location>.+) \(GPA (?P<grade>[^)]+)\)$",
    )
});

fn course_pattern() -> FolioResult<&'static Regex> {
    COURSE_PATTERN
        .as_ref()
        .map_err(|e| FolioError::Other(anyhow::anyhow!("course pattern: {e}")))
}

/// The multi-institution program whose course list expands into one degree per institution.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProgramOptions {
    /// Exact `institution` value of the education record to expand. Empty disables expansion.
    pub institution: String,
    /// Group key shared by every expanded entry.
    pub group: String,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            institution: "Double Degree Program".to_string(),
            group: "double-degree".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    pub program: ProgramOptions,
    /// Overrides `basics.image`.
    pub profile_picture: Option<String>,
    /// Path of a downloadable CV document.
    pub cv: Option<String>,
}

impl TransformOptions {
    pub fn validate(&self) -> FolioResult<()> {
        if !self.program.institution.trim().is_empty() && self.program.group.trim().is_empty() {
            return Err(FolioError::validation(
                "program group key must be non-empty when a program institution is set",
            ));
        }
        Ok(())
    }
}

/// A course string of the program record that did not match the expected pattern.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct DroppedCourse {
    pub institution: String,
    pub course: String,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct TransformReport {
    pub dropped_courses: Vec<DroppedCourse>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transformed {
    pub view: Portfolio,
    pub report: TransformReport,
}

/// Build the view model from a résumé. Every list keeps source order.
#[tracing::instrument(skip_all)]
pub fn transform(resume: &Resume, opts: &TransformOptions) -> FolioResult<Transformed> {
    let mut report = TransformReport::default();

    let mut degrees = Vec::with_capacity(resume.education.len());
    for edu in &resume.education {
        if is_program(edu, &opts.program) {
            degrees.extend(expand_program(edu, &opts.program, &mut report)?);
        } else {
            degrees.push(single_degree(edu));
        }
    }

    let view = Portfolio {
        personal: personal(&resume.basics, opts),
        degrees,
        skills: resume.skills.iter().map(skill_group).collect(),
        experience: resume.work.iter().map(experience).collect(),
        projects: resume.projects.iter().map(project).collect(),
    };

    if !report.dropped_courses.is_empty() {
        tracing::warn!(
            dropped = report.dropped_courses.len(),
            "program courses did not match the expected pattern and were skipped"
        );
    }
    tracing::debug!(
        degrees = view.degrees.len(),
        experience = view.experience.len(),
        projects = view.projects.len(),
        skills = view.skills.len(),
        "built view model"
    );

    Ok(Transformed { view, report })
}

fn personal(basics: &Basics, opts: &TransformOptions) -> Personal {
    let github = basics
        .profile_url("GitHub")
        .or(Some(basics.url.as_str()))
        .and_then(non_empty);
    let linkedin = basics.profile_url("LinkedIn").and_then(non_empty);

    Personal {
        name: basics.name.clone(),
        tagline: basics.label.clone(),
        bio: basics.summary.clone(),
        profile_picture: opts
            .profile_picture
            .clone()
            .or_else(|| non_empty(&basics.image)),
        cv: opts.cv.clone(),
        email: basics.email.clone(),
        github,
        linkedin,
    }
}

fn is_program(edu: &Education, program: &ProgramOptions) -> bool {
    !program.institution.is_empty() && edu.institution == program.institution
}

struct CourseMatch {
    title: String,
    institution: String,
    location: String,
    grade: String,
}

fn expand_program(
    edu: &Education,
    program: &ProgramOptions,
    report: &mut TransformReport,
) -> FolioResult<Vec<Degree>> {
    let pattern = course_pattern()?;

    let mut matches = Vec::with_capacity(edu.courses.len());
    for course in &edu.courses {
        match pattern.captures(course.trim()) {
            Some(caps) => matches.push(CourseMatch {
                title: caps["title"].trim().to_string(),
                institution: caps["institution"].trim().to_string(),
                location: caps["location"].trim().to_string(),
                grade: caps["grade"].trim().to_string(),
            }),
            None => {
                tracing::warn!(institution = %edu.institution, course = %course, "skipping course");
                report.dropped_courses.push(DroppedCourse {
                    institution: edu.institution.clone(),
                    course: course.clone(),
                });
            }
        }
    }

    let year = dates::year_range(&edu.start_date, &edu.end_date);
    let entries = matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let others: Vec<&str> = matches
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, o)| o.location.as_str())
                .collect();
            let description = if others.is_empty() {
                "Double degree programme".to_string()
            } else {
                format!("Double degree with {}", others.join(" and "))
            };
            Degree {
                institution: m.institution.clone(),
                degree: m.title.clone(),
                year: year.clone(),
                grade: non_empty(&m.grade),
                description,
                group: Some(program.group.clone()),
                primary: Some(i == 0),
            }
        })
        .collect();
    Ok(entries)
}

fn single_degree(edu: &Education) -> Degree {
    let degree = [edu.study_type.trim(), edu.area.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" in ");
    let grade = edu.score.strip_prefix("GPA ").unwrap_or(&edu.score);

    Degree {
        institution: edu.institution.clone(),
        degree,
        year: dates::year_range(&edu.start_date, &edu.end_date),
        grade: non_empty(grade),
        description: edu.courses.join(", "),
        group: None,
        primary: None,
    }
}

fn experience(work: &Work) -> Experience {
    Experience {
        company: work.name.clone(),
        role: work.position.clone(),
        period: dates::period(&work.start_date, &work.end_date),
        achievements: work.highlights.clone(),
    }
}

fn project(p: &Project) -> ProjectEntry {
    let description = if p.highlights.is_empty() {
        p.description.clone()
    } else {
        p.highlights.join(" ")
    };
    ProjectEntry {
        name: p.name.clone(),
        description,
        technologies: Vec::new(),
        link: p.url.clone(),
    }
}

fn skill_group(s: &Skill) -> SkillGroup {
    SkillGroup {
        category: s.name.clone(),
        skills: s.keywords.clone(),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::{Profile, parse_resume};

    fn run(resume: &Resume) -> Transformed {
        transform(resume, &TransformOptions::default()).unwrap()
    }

    fn program_record(courses: &[&str]) -> Education {
        Education {
            institution: "Double Degree Program".to_string(),
            start_date: "2019-09".to_string(),
            end_date: "2021-07".to_string(),
            courses: courses.iter().map(|s| s.to_string()).collect(),
            ..Education::default()
        }
    }

    #[test]
    fn open_work_entry_reads_present() {
        let r = parse_resume(
            r#"{"work":[{"name":"Acme","position":"Engineer","startDate":"2020-01"}]}"#,
        )
        .unwrap();
        let out = run(&r);
        assert_eq!(
            out.view.experience,
            vec![Experience {
                company: "Acme".to_string(),
                role: "Engineer".to_string(),
                period: "Jan 2020 - Present".to_string(),
                achievements: vec![],
            }]
        );
    }

    #[test]
    fn contact_links_from_profiles() {
        let mut r = Resume::default();
        r.basics.url = "https://home.example".to_string();
        r.basics.profiles = vec![
            Profile {
                network: "LinkedIn".to_string(),
                url: "https://linkedin.example/me".to_string(),
                ..Profile::default()
            },
            Profile {
                network: "GitHub".to_string(),
                url: "https://github.example/me".to_string(),
                ..Profile::default()
            },
        ];
        let p = run(&r).view.personal;
        assert_eq!(p.github.as_deref(), Some("https://github.example/me"));
        assert_eq!(p.linkedin.as_deref(), Some("https://linkedin.example/me"));
    }

    #[test]
    fn github_falls_back_to_general_url() {
        let mut r = Resume::default();
        r.basics.url = "https://home.example".to_string();
        let p = run(&r).view.personal;
        assert_eq!(p.github.as_deref(), Some("https://home.example"));
        assert_eq!(p.linkedin, None);

        let p = run(&Resume::default()).view.personal;
        assert_eq!(p.github, None);
    }

    #[test]
    fn program_expands_into_grouped_entries() {
        let mut r = Resume::default();
        r.education.push(program_record(&[
            "MSc Computer Science at TU Berlin, Berlin (GPA 1.3)",
            "MSc Informatics at KTH, Stockholm (GPA 4.8/5)",
        ]));
        let out = run(&r);
        let d = &out.view.degrees;
        assert_eq!(d.len(), 2);
        assert!(d.iter().all(|e| e.group.as_deref() == Some("double-degree")));
        assert_eq!(d.iter().filter(|e| e.is_primary()).count(), 1);
        assert!(d[0].is_primary());
        assert_eq!(d[0].institution, "TU Berlin");
        assert_eq!(d[0].degree, "MSc Computer Science");
        assert_eq!(d[0].grade.as_deref(), Some("1.3"));
        assert_eq!(d[0].description, "Double degree with Stockholm");
        assert_eq!(d[1].description, "Double degree with Berlin");
        assert_eq!(d[1].year, "2019/2021");
        assert!(out.report.dropped_courses.is_empty());
    }

    #[test]
    fn unmatched_program_courses_are_dropped_and_reported() {
        let mut r = Resume::default();
        r.education.push(program_record(&[
            "Exchange semester, no grade",
            "MSc Informatics at KTH, Stockholm (GPA 4.8)",
        ]));
        let out = run(&r);
        assert_eq!(out.view.degrees.len(), 1);
        assert!(out.view.degrees[0].is_primary());
        assert_eq!(out.view.degrees[0].description, "Double degree programme");
        assert_eq!(
            out.report.dropped_courses,
            vec![DroppedCourse {
                institution: "Double Degree Program".to_string(),
                course: "Exchange semester, no grade".to_string(),
            }]
        );
    }

    #[test]
    fn ordinary_education_is_one_ungrouped_entry() {
        let mut r = Resume::default();
        r.education.push(Education {
            institution: "State University".to_string(),
            study_type: "BSc".to_string(),
            area: "Physics".to_string(),
            start_date: "2020-09".to_string(),
            score: "GPA 3.9".to_string(),
            courses: vec!["Optics".to_string(), "Mechanics".to_string()],
            ..Education::default()
        });
        let d = &run(&r).view.degrees[0];
        assert_eq!(d.degree, "BSc in Physics");
        assert_eq!(d.year, "2020/");
        assert_eq!(d.grade.as_deref(), Some("3.9"));
        assert_eq!(d.description, "Optics, Mechanics");
        assert_eq!(d.group, None);
        assert_eq!(d.primary, None);
    }

    #[test]
    fn list_lengths_follow_source() {
        let r = parse_resume(
            r#"{
                "work":[{"name":"A"},{"name":"B"}],
                "projects":[{"name":"P","highlights":["fast","small"],"url":"https://p"}],
                "skills":[{"name":"Rust","keywords":["serde","tokio"]},{"name":"Ops"}],
                "education":[{"institution":"U"}]
            }"#,
        )
        .unwrap();
        let v = run(&r).view;
        assert_eq!(v.experience.len(), 2);
        assert_eq!(v.projects.len(), 1);
        assert_eq!(v.skills.len(), 2);
        assert!(v.degrees.len() >= r.education.len());
        assert_eq!(v.projects[0].description, "fast small");
        assert!(v.projects[0].technologies.is_empty());
        assert_eq!(v.skills[0].skills, vec!["serde", "tokio"]);
        assert_eq!(v.experience[1].company, "B");
    }

    #[test]
    fn configured_paths_flow_into_personal() {
        let opts = TransformOptions {
            cv: Some("cv.pdf".to_string()),
            profile_picture: Some("me.jpg".to_string()),
            ..TransformOptions::default()
        };
        let mut r = Resume::default();
        r.basics.image = "ignored.png".to_string();
        let p = transform(&r, &opts).unwrap().view.personal;
        assert_eq!(p.cv.as_deref(), Some("cv.pdf"));
        assert_eq!(p.profile_picture.as_deref(), Some("me.jpg"));
    }

    #[test]
    fn empty_program_name_disables_expansion() {
        let opts = TransformOptions {
            program: ProgramOptions {
                institution: String::new(),
                group: "g".to_string(),
            },
            ..TransformOptions::default()
        };
        let mut r = Resume::default();
        r.education.push(program_record(&["A at B, C (GPA 1)"]));
        let d = transform(&r, &opts).unwrap().view.degrees;
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].group, None);
    }
}
