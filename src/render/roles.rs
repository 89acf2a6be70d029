//! Inline roles: `:sci:`, `:atm:` and `:jargon:`.
//!
//! ```text
//! :sci:`4.5E+6`     -> \(4.5 \times 10^{6}\)
//! :atm:`U-235`      -> \({}^{235}_{\phantom{0}92}\text{U}\)
//! :jargon:`~Energy` -> <strong>Energy</strong>   (LaTeX: \textbf{Energy}\index{energy})
//! ```
//!
//! Math output is left for MathJax (HTML) or typeset directly (LaTeX).
//! Input a role cannot interpret is emitted unchanged.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::Target;
use super::placeholder::Placeholders;
use crate::utils::html::{escape, escape_latex};

/// Replace every role in `line` with an inline placeholder.
pub fn expand(line: &str, target: Target, slots: &mut Placeholders) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?::(sci|atm|jargon):`([^`\n]+)`)").expect("valid regex"));
    if !line.contains(':') {
        return line.to_string();
    }
    re.replace_all(line, |caps: &Captures<'_>| {
        let text = &caps[2];
        let output = match &caps[1] {
            "sci" => sci(text).unwrap_or_else(|| raw(text, target)),
            "atm" => atm(text).unwrap_or_else(|| raw(text, target)),
            _ => jargon(text, target),
        };
        slots.inline(output)
    })
    .into_owned()
}

fn raw(text: &str, target: Target) -> String {
    match target {
        Target::Html => escape(text).into_owned(),
        Target::Latex => escape_latex(text).into_owned(),
    }
}

/// Scientific notation. An abscissa of exactly `1` is dropped.
pub fn sci(text: &str) -> Option<String> {
    let lower = text.trim().to_ascii_lowercase();
    let (abscissa, exponent) = lower.split_once('e')?;
    abscissa.parse::<f64>().ok()?;
    let exponent: i64 = exponent.parse().ok()?;
    Some(if abscissa == "1" {
        format!(r"\(10^{{{exponent}}}\)")
    } else {
        format!(r"\({abscissa} \times 10^{{{exponent}}}\)")
    })
}

/// Nuclide notation with mass number over atomic number.
pub fn atm(text: &str) -> Option<String> {
    let text = text.trim();
    let (symbol, mass, number) = match special(text) {
        Some(found) => found,
        None => {
            let (symbol, mass) = text.split_once('-')?;
            let mass: i64 = mass.trim().parse().ok()?;
            (symbol, mass, atomic_number(&title_case(symbol))?)
        }
    };

    let mass_text = mass.to_string();
    let number_text = number.to_string();
    let offset = mass_text.len() as i64 - number_text.len() as i64;
    let pad = |n: i64| "0".repeat(n.unsigned_abs() as usize);
    Some(if offset > 0 {
        format!(
            r"\({{}}^{{{mass_text}}}_{{\phantom{{{}}}{number_text}}}\text{{{symbol}}}\)",
            pad(offset)
        )
    } else if offset < 0 {
        format!(
            r"\({{}}^{{\phantom{{{}}}{mass_text}}}_{{{number_text}}}\text{{{symbol}}}\)",
            pad(offset)
        )
    } else {
        format!(r"\({{}}^{{{mass_text}}}_{{{number_text}}}\text{{{symbol}}}\)")
    })
}

/// Bold term, plus an index entry for LaTeX. A leading `~` lowercases the key.
pub fn jargon(text: &str, target: Target) -> String {
    let (term, lowercase) = match text.strip_prefix('~') {
        Some(rest) => (rest, true),
        None => (text, false),
    };
    match target {
        Target::Html => format!("<strong>{}</strong>", escape(term)),
        Target::Latex => {
            let term = escape_latex(term);
            let key = if lowercase {
                term.to_lowercase()
            } else {
                term.to_string()
            };
            format!(r"\textbf{{{term}}}\index{{{key}}}")
        }
    }
}

fn special(text: &str) -> Option<(&'static str, i64, i64)> {
    match text {
        "neutron" => Some(("n", 1, 0)),
        "proton" => Some(("p", 1, 1)),
        "electron" => Some(("e", 0, -1)),
        _ => None,
    }
}

fn title_case(symbol: &str) -> String {
    let mut chars = symbol.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Element symbols in atomic-number order.
const ELEMENTS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn",
    "Uut", "Fl", "Uup", "Lv", "Uus", "Uuo",
];

fn atomic_number(symbol: &str) -> Option<i64> {
    ELEMENTS
        .iter()
        .position(|s| *s == symbol)
        .map(|index| index as i64 + 1)
}
