//! `problem-set` directive.
//!
//! Content is a list of `{question, answer, solution}` records, read as YAML
//! first and JSON second:
//!
//! ```text
//! .. problem-set:: Homework for Week 1
//!     :numbering: none
//!     :solutions: hide
//!
//!     - question: What is the speed of light?
//!       answer: ":sci:`2.998E8` m/s"
//!       solution: Look it up.
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::utils::hash::fingerprint;
use crate::utils::html::escape;

/// List style of the problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numbering {
    /// Ordered list starting at the given number.
    Ordered(u32),
    Bullets,
    None,
}

impl FromStr for Numbering {
    type Err = std::convert::Infallible;

    /// Unknown values fall back to an ordered list from 1.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "none" => Self::None,
            "bullets" => Self::Bullets,
            other => Self::Ordered(other.parse().unwrap_or(1)),
        })
    }
}

/// Visibility of answers or solutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Show,
    Toggle,
    Hide,
}

impl Visibility {
    fn parse(value: Option<&str>, default: Self) -> Self {
        match value.map(str::trim) {
            Some("show") => Self::Show,
            Some("toggle") => Self::Toggle,
            Some("hide") => Self::Hide,
            _ => default,
        }
    }

    fn printed(self) -> bool {
        !matches!(self, Self::Hide)
    }
}

/// LaTeX layout of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrintStyle {
    #[default]
    Simple,
    /// Answers in the margin.
    Compact,
}

/// Directive options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProblemOptions {
    pub numbering: Numbering,
    pub answers: Visibility,
    pub solutions: Visibility,
    pub print_style: PrintStyle,
}

impl ProblemOptions {
    pub fn from_options(option: impl Fn(&str) -> Option<String>) -> Self {
        let numbering = option("numbering")
            .and_then(|v| v.parse().ok())
            .unwrap_or(Numbering::Ordered(1));
        let print_style = match option("print-style").as_deref().map(str::trim) {
            Some("compact") => PrintStyle::Compact,
            _ => PrintStyle::Simple,
        };
        Self {
            numbering,
            answers: Visibility::parse(option("answers").as_deref(), Visibility::Show),
            solutions: Visibility::parse(option("solutions").as_deref(), Visibility::Toggle),
            print_style,
        }
    }
}

/// Scalar field value; numbers are common in `answer`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawProblem {
    #[serde(default)]
    question: Option<Scalar>,
    #[serde(default)]
    answer: Option<Scalar>,
    #[serde(default)]
    solution: Option<Scalar>,
}

/// A problem with placeholders for missing parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub question: String,
    pub answer: String,
    pub solution: String,
}

impl From<RawProblem> for Problem {
    fn from(raw: RawProblem) -> Self {
        let part = |value: Option<Scalar>, missing: &str| {
            value
                .map(|v| v.to_string())
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| missing.to_string())
        };
        Self {
            question: part(raw.question, "Question not available"),
            answer: part(raw.answer, "[missing]"),
            solution: part(raw.solution, "No solution available"),
        }
    }
}

/// Parse directive content. `None` for malformed or empty content.
pub fn parse(content: &str) -> Option<Vec<Problem>> {
    let raw: Vec<RawProblem> = serde_yaml::from_str(content)
        .ok()
        .filter(|list: &Vec<RawProblem>| !list.is_empty())
        .or_else(|| serde_json::from_str(content).ok())?;
    (!raw.is_empty()).then(|| raw.into_iter().map(Problem::from).collect())
}

/// Prepare a part for the markup pipeline, escaping a leading `(`.
fn part_source(part: &str) -> String {
    let part = part.trim();
    if part.starts_with('(') {
        format!("\\{part}")
    } else {
        part.to_string()
    }
}

/// Deterministic toggle id for problem `index` of a set.
pub fn toggle_id(content: &str, index: usize) -> String {
    format!("{}{:03}", fingerprint(content), index)
}

/// HTML problem list. `inline` renders a fragment without its paragraph.
pub fn to_html(
    problems: &[Problem],
    content: &str,
    caption: &str,
    options: &ProblemOptions,
    inline: &mut dyn FnMut(&str) -> String,
) -> String {
    let mut out = String::new();
    if !caption.is_empty() {
        out.push_str(&format!("<h4>{}</h4>\n", inline(caption)));
    }
    match options.numbering {
        Numbering::Ordered(start) => out.push_str(&format!("<ol start=\"{start}\" class=\"inside-list\">\n")),
        Numbering::Bullets => out.push_str("<ul class=\"inside-list\">\n"),
        Numbering::None => {}
    }
    let listed = options.numbering != Numbering::None;

    for (index, problem) in problems.iter().enumerate() {
        let id = toggle_id(content, index);
        let question = inline(&part_source(&problem.question));
        let answer = inline(&part_source(&problem.answer));
        let solution = inline(&part_source(&problem.solution));

        if listed {
            out.push_str("<li>\n");
        }
        out.push_str(&format!("<p>{question}</p>\n"));

        if options.answers == Visibility::Toggle {
            out.push_str(&toggler('a', &id, "Answer"));
        }
        if options.solutions == Visibility::Toggle {
            out.push_str(&toggler('s', &id, "Solution"));
        }

        match options.answers {
            Visibility::Show => {
                out.push_str(&format!("<p id=\"a{id}\">\n<i>Answer:</i> {answer}\n</p>\n"));
            }
            Visibility::Toggle => out.push_str(&format!(
                "<div id=\"a{id}\" class=\"togglee\">\n<i>Answer:</i> {answer}\n</div>\n"
            )),
            Visibility::Hide => {}
        }
        match options.solutions {
            Visibility::Show => out.push_str(&format!(
                "<div id=\"s{id}\" class=\"solution\" style=\"display:block\">\n<p>{solution}</p>\n</div>\n"
            )),
            Visibility::Toggle => out.push_str(&format!(
                "<div id=\"s{id}\" class=\"solution togglee\">\n<p>{solution}</p>\n</div>\n"
            )),
            Visibility::Hide => {}
        }

        if listed {
            out.push_str("</li>\n");
        }
    }

    match options.numbering {
        Numbering::Ordered(_) => out.push_str("</ol>\n"),
        Numbering::Bullets => out.push_str("</ul>\n"),
        Numbering::None => {}
    }
    out
}

fn toggler(prefix: char, id: &str, what: &str) -> String {
    format!(
        "<input class=\"toggler\" type=\"button\" rel=\"{prefix}{id}\" value=\"Show {what}\" \
         onclick=\"buttonToggle(this,'Show {what}','Hide {what}')\">\n"
    )
}

/// Fallback output for content that is not a problem list.
pub fn malformed_html(content: &str) -> String {
    format!("<pre>Malformed input\n\n{}</pre>\n", escape(content))
}

/// LaTeX problem list for the page PDF.
pub fn to_latex(
    problems: &[Problem],
    caption: &str,
    options: &ProblemOptions,
    inline: &mut dyn FnMut(&str) -> String,
) -> String {
    let mut out = String::new();
    if !caption.is_empty() {
        out.push_str(&format!("\\subsubsection*{{{}}}\n\n", inline(caption)));
    }
    let start = match options.numbering {
        Numbering::Ordered(start) => start,
        _ => 1,
    };

    for (offset, problem) in problems.iter().enumerate() {
        let marker = match options.numbering {
            Numbering::Ordered(_) => format!("\\textbf{{{}.}}\n", start as usize + offset),
            Numbering::Bullets => "\\textbullet\n".to_string(),
            Numbering::None => String::new(),
        };
        let question = inline(&part_source(&problem.question));
        let answer = inline(&part_source(&problem.answer));
        let solution = inline(&part_source(&problem.solution));

        out.push_str(&marker);
        match options.print_style {
            PrintStyle::Simple => {
                out.push_str(&format!("\\quad\n{question}\n"));
                if options.answers.printed() {
                    out.push_str(&format!("\\par \\textbf{{Answer:}} {answer}\n"));
                }
            }
            PrintStyle::Compact => {
                if options.answers.printed() {
                    out.push_str(&format!("\\marginpar{{\\footnotesize\\sf {answer}}}\n"));
                }
                out.push_str(&format!("\\quad\n{question}\n"));
            }
        }
        if options.solutions.printed() {
            out.push_str(&format!("\\par \\textbf{{Solution:}}\n\\par {solution}\n"));
        }
        out.push('\n');
    }
    out
}

pub fn malformed_latex(content: &str) -> String {
    format!("\\emph{{Malformed input}}\n\\begin{{verbatim}}\n{content}\n\\end{{verbatim}}\n")
}
