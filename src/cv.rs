//! LaTeX CV generated from the same résumé document as the page.
//!
//! The output targets the `muratcan_cv` document class. Sections without entries are left
//! out entirely.

use std::{fs, path::Path};

use crate::{
    dates::{PRESENT, short_month_year},
    foundation::error::{FolioError, FolioResult},
    resume::{Basics, Resume},
};

const REPO_HOSTS: [&str; 3] = ["github.com", "gitlab.com", "bitbucket.org"];
const NUMBER_WORDS: [&str; 11] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
];

/// Render the complete `.tex` document.
#[tracing::instrument(skip_all)]
pub fn generate(resume: &Resume) -> String {
    let sections = [
        header(&resume.basics),
        experience(resume),
        education(resume),
        certifications(resume),
        skills(resume),
        projects(resume),
        publications(resume),
        languages(resume),
    ];
    let mut parts: Vec<String> = sections
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    parts.push(r"\end{document}".to_string());
    parts.join("\n")
}

pub fn write_cv(resume: &Resume, out: &Path) -> FolioResult<()> {
    fs::write(out, generate(resume))
        .map_err(|e| FolioError::render(format!("write cv '{}': {e}", out.display())))
}

/// Escape the characters LaTeX treats as markup.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\^{}"),
            _ => out.push(ch),
        }
    }
    out
}

/// Word used in skill macro names (`\skillone`, `\skilltwo`, ...). Digits past ten.
pub fn num_to_word(n: usize) -> String {
    NUMBER_WORDS
        .get(n)
        .map_or_else(|| n.to_string(), |w| (*w).to_string())
}

fn header(basics: &Basics) -> String {
    let profile = |network: &str| {
        basics
            .profiles
            .iter()
            .rev()
            .find(|p| p.network.eq_ignore_ascii_case(network))
            .map_or("", |p| p.url.as_str())
    };
    let lines = [
        r"\documentclass{muratcan_cv}".to_string(),
        String::new(),
        format!(r"\setname{{{}}}{{}}", escape_latex(&basics.name)),
        format!(r"\setposition{{{}}}", escape_latex(&basics.label)),
        format!(
            r"\setaddress{{{}, {}}}",
            escape_latex(&basics.location.city),
            escape_latex(&basics.location.region)
        ),
        format!(r"\setmail{{{}}}", escape_latex(&basics.email)),
        format!(r"\setlinkedinaccount{{{}}}", profile("linkedin")),
        format!(r"\setgithubaccount{{{}}}", profile("github")),
        format!(r"\setwebsite{{{}}}", profile("website")),
        format!(r"\setblog{{{}}}", profile("blog")),
        r"\setthemecolor{MidnightBlue}".to_string(),
        String::new(),
        r"\begin{document}".to_string(),
        String::new(),
        "%Create header".to_string(),
        r"\headerview".to_string(),
        r"\vspace{1ex}".to_string(),
    ];
    lines.join("\n")
}

fn bullet(lines: &mut Vec<String>, indent: &str, text: &str) {
    lines.push(format!(r"{indent}\coloredbullet\ %"));
    lines.push(format!("     {}", escape_latex(text)));
    lines.push(String::new());
}

fn experience(resume: &Resume) -> String {
    if resume.work.is_empty() {
        return String::new();
    }
    let mut lines = vec!["%".to_string(), r"\section{Experience}".to_string()];
    for job in &resume.work {
        let end = if job.end_date.is_empty() {
            PRESENT.to_string()
        } else {
            short_month_year(&job.end_date)
        };
        lines.push("    %".to_string());
        lines.push(format!(
            r"    \datedexperience{{{}}}{{{} - {end}}}",
            escape_latex(&job.name),
            short_month_year(&job.start_date)
        ));
        lines.push(format!(
            r"    \explanation{{{}}}{{{}}}",
            escape_latex(&job.position),
            escape_latex(&job.location)
        ));
        lines.push(r"    \explanationdetail{".to_string());
        lines.push(r"    \smallskip".to_string());
        for (i, highlight) in job.highlights.iter().enumerate() {
            bullet(&mut lines, "     ", highlight);
            if i + 1 < job.highlights.len() {
                lines.push(r"    \smallskip".to_string());
            }
        }
        lines.push(r"     \smallskip".to_string());
        lines.push("     }".to_string());
    }
    lines.join("\n")
}

fn education(resume: &Resume) -> String {
    if resume.education.is_empty() {
        return String::new();
    }
    let mut lines = vec!["%".to_string(), r"\section{Education}".to_string()];
    for edu in &resume.education {
        let title = format!("{} - {}", edu.study_type, edu.area);
        lines.push(format!(
            r"    \datedexperience{{{}}}{{{} - {}}}",
            escape_latex(&title),
            short_month_year(&edu.start_date),
            short_month_year(&edu.end_date)
        ));
        lines.push(format!(
            r"    \explanation{{{}}}{{{}}}",
            escape_latex(&edu.institution),
            escape_latex(&edu.location)
        ));
        lines.push(r"    \explanationdetail{".to_string());
        lines.push(r"    \smallskip".to_string());
        let details = (!edu.score.is_empty())
            .then_some(&edu.score)
            .into_iter()
            .chain(&edu.courses);
        for detail in details {
            bullet(&mut lines, "     ", detail);
            lines.push(r"    \smallskip".to_string());
        }
        lines.push("     }".to_string());
    }
    lines.join("\n")
}

fn certifications(resume: &Resume) -> String {
    if resume.certificates.is_empty() {
        return String::new();
    }
    let mut lines = vec![
        "%".to_string(),
        r"\section{Certifications}".to_string(),
        r"    \explanationdetail{".to_string(),
    ];
    for cert in &resume.certificates {
        lines.push(r"    \smallskip".to_string());
        lines.push(r"    \coloredbullet\ %".to_string());
        lines.push(format!(
            r"     \textbf{{{}}} - {}, {}",
            escape_latex(&cert.name),
            escape_latex(&cert.issuer),
            escape_latex(&cert.date)
        ));
        lines.push(String::new());
    }
    lines.push(r"     \smallskip".to_string());
    lines.push("     }".to_string());
    lines.join("\n")
}

fn skills(resume: &Resume) -> String {
    if resume.skills.is_empty() {
        return String::new();
    }
    let mut lines = vec!["%".to_string(), r"\section{Skills}".to_string()];
    for (i, skill) in resume.skills.iter().enumerate() {
        let keywords: Vec<String> = skill.keywords.iter().map(|k| escape_latex(k)).collect();
        lines.push(format!(
            r"    \newcommand{{\skill{}}}{{\createskill{{{}}}{{{}}}}}",
            num_to_word(i + 1),
            escape_latex(&skill.name),
            keywords.join(r" \cpshalf ")
        ));
        lines.push("    %".to_string());
    }
    let names: Vec<String> = (1..=resume.skills.len())
        .map(|i| format!(r"\skill{}", num_to_word(i)))
        .collect();
    lines.push(format!(r"    \createskills{{{}}}", names.join(", ")));
    lines.push(r"    \vspace{-3mm}".to_string());
    lines.join("\n")
}

fn projects(resume: &Resume) -> String {
    if resume.projects.is_empty() {
        return String::new();
    }
    let mut lines = vec!["%".to_string(), r"\section{Projects}".to_string()];
    for project in &resume.projects {
        let url = project.url.as_str();
        let label = if REPO_HOSTS.iter().any(|h| url.contains(h)) {
            "Repo".to_string()
        } else {
            url.replace("https://", "").replace("http://", "")
        };
        let mut links = format!(r"\href{{{url}}}{{{}}}", escape_latex(&label));
        if !project.blog.is_empty() {
            links.push_str(&format!(r" | \href{{{}}}{{Blog}}", project.blog));
        }

        lines.push("     %".to_string());
        lines.push(format!(
            r"    \datedexperience{{{}}}{{}}",
            escape_latex(&project.name)
        ));
        lines.push(format!(r"    \explanation{{{links}}}{{}}"));
        lines.push(r"    \explanationdetail{".to_string());
        lines.push(r"    \smallskip".to_string());
        for highlight in &project.highlights {
            bullet(&mut lines, "    ", highlight);
            lines.push(r"    \smallskip".to_string());
        }
        lines.push("     }".to_string());
    }
    lines.join("\n")
}

fn publications(resume: &Resume) -> String {
    if resume.publications.is_empty() {
        return String::new();
    }
    let mut lines = vec!["%".to_string(), r"\section{Articles}".to_string()];
    for publication in &resume.publications {
        lines.push("     %".to_string());
        lines.push(format!(
            r"    \datedexperience{{{}}}{{{}}}",
            escape_latex(&publication.name),
            escape_latex(&publication.release_date)
        ));
        lines.push(format!(
            r"    \explanation{{{}}}{{}}",
            escape_latex(&publication.publisher)
        ));
        lines.push(r"    \explanationdetail{".to_string());
        lines.push(r"    \smallskip".to_string());
        if !publication.summary.is_empty() {
            bullet(&mut lines, "    ", &publication.summary);
            lines.push(r"    \smallskip".to_string());
        }
        lines.push("     }".to_string());
    }
    lines.join("\n")
}

fn languages(resume: &Resume) -> String {
    if resume.languages.is_empty() {
        return String::new();
    }
    let items: Vec<String> = resume
        .languages
        .iter()
        .map(|l| {
            format!(
                "    \\coloredbullet\\ %\n     \\textbf{{{}}} - {}",
                escape_latex(&l.language),
                escape_latex(&l.fluency)
            )
        })
        .collect();
    [
        "%".to_string(),
        r"\section{Languages}".to_string(),
        r"\explanationdetail{".to_string(),
        items.join("\n     \\hspace{2cm}\n"),
        "     }".to_string(),
    ]
    .join("\n")
}
