//! LaTeX writer: [`Document`] → a standalone XeLaTeX source file.
//!
//! The preamble loads `xeCJK` so CJK text compiles under `xelatex` without
//! extra setup. Body text is escaped here; code paragraphs go into
//! `verbatim` untouched.

use crate::document::{Document, Element, Paragraph, ParagraphStyle, TableGrid};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt::Write as _;
use tracing::debug;

static RE_SPECIAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[&%$#_{}~^\\]").unwrap());

const PREAMBLE: &str = r"\documentclass[12pt,a4paper]{article}
\usepackage{xeCJK}
\usepackage[margin=1in]{geometry}
\usepackage{graphicx}
\usepackage{booktabs}
\usepackage{longtable}
\usepackage{hyperref}
\usepackage{xcolor}
\usepackage{tikz}
\usetikzlibrary{shapes,arrows,positioning}
\usepackage{listings}
\lstset{
  basicstyle=\ttfamily\small,
  breaklines=true,
  frame=single,
  numbers=left,
  numberstyle=\tiny\color{gray}
}
";

/// Escape LaTeX special characters in ordinary text.
pub fn escape_latex(text: &str) -> String {
    RE_SPECIAL
        .replace_all(text, |caps: &Captures| match &caps[0] {
            "~" => r"\textasciitilde{}".to_string(),
            "^" => r"\^{}".to_string(),
            "\\" => r"\textbackslash{}".to_string(),
            other => format!("\\{other}"),
        })
        .into_owned()
}

/// Render `doc` as a complete `.tex` file.
///
/// The first title element becomes `\title{}`; title elements are not
/// repeated in the body. Pictures are not embedded.
pub fn render_latex(doc: &Document) -> String {
    let mut out = String::from(PREAMBLE);
    out.push('\n');
    let _ = writeln!(out, "\\title{{{}}}", escape_latex(doc.title().unwrap_or("")));
    out.push_str("\\author{}\n\\date{\\today}\n\n");
    out.push_str("\\begin{document}\n\n\\maketitle\n\\tableofcontents\n\\newpage\n\n");

    for element in doc.elements() {
        match element {
            Element::Title { .. } => {}
            Element::Heading { level, text } => heading(&mut out, *level, text),
            Element::Paragraph(p) => paragraph(&mut out, p),
            Element::Table(grid) => table(&mut out, grid),
            Element::Picture(pic) => {
                debug!("Skipping picture {} in LaTeX output", pic.path.display());
            }
        }
    }

    out.push_str("\\end{document}\n");
    out
}

fn heading(out: &mut String, level: u8, text: &str) {
    let command = match level {
        1 => "section",
        2 => "subsection",
        3 => "subsubsection",
        _ => "paragraph",
    };
    let _ = writeln!(out, "\\{command}{{{}}}\n", escape_latex(text));
}

fn paragraph(out: &mut String, p: &Paragraph) {
    match p.style {
        ParagraphStyle::Code => {
            let _ = writeln!(out, "\\begin{{verbatim}}\n{}\n\\end{{verbatim}}\n", p.text);
        }
        ParagraphStyle::Placeholder => {
            let _ = writeln!(
                out,
                "\\begin{{center}}\n\\fbox{{\\parbox{{0.8\\textwidth}}{{\\centering\\textbf{{{}}}}}}}\n\\end{{center}}\n",
                escape_latex(&p.text)
            );
        }
        ParagraphStyle::Normal => {
            let _ = writeln!(out, "{}\n", escape_latex(&p.text));
        }
    }
}

fn table(out: &mut String, grid: &TableGrid) {
    let columns = vec!["c"; grid.cols()].join("|");
    let _ = writeln!(out, "\\begin{{longtable}}{{|{columns}|}}\n\\hline");
    for (i, row) in grid.iter_rows().enumerate() {
        let cells: Vec<String> = row.iter().map(|c| escape_latex(c)).collect();
        let _ = writeln!(out, "{} \\\\", cells.join(" & "));
        if i == 0 || i + 1 == grid.rows() {
            out.push_str("\\hline\n");
        }
    }
    out.push_str("\\end{longtable}\n\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Picture;
    use std::path::PathBuf;

    #[test]
    fn escapes_specials() {
        assert_eq!(escape_latex("50% & $5 #1 a_b"), r"50\% \& \$5 \#1 a\_b");
        assert_eq!(escape_latex("{x}"), r"\{x\}");
        assert_eq!(
            escape_latex(r"~ ^ \"),
            r"\textasciitilde{} \^{} \textbackslash{}"
        );
    }

    #[test]
    fn skeleton_and_title() {
        let mut doc = Document::new();
        doc.add_title("R&D notes");
        let tex = render_latex(&doc);
        assert!(tex.starts_with("\\documentclass[12pt,a4paper]{article}"));
        assert!(tex.contains("\\usepackage{xeCJK}"));
        assert!(tex.contains("\\title{R\\&D notes}"));
        assert!(tex.contains("\\maketitle\n\\tableofcontents"));
        assert!(tex.trim_end().ends_with("\\end{document}"));
        assert_eq!(tex.matches("R\\&D notes").count(), 1);
    }

    #[test]
    fn heading_commands_by_level() {
        let mut doc = Document::new();
        for (level, text) in [(1, "A"), (2, "B"), (3, "C"), (4, "D"), (6, "F")] {
            doc.add_heading(level, text);
        }
        let tex = render_latex(&doc);
        assert!(tex.contains("\\section{A}"));
        assert!(tex.contains("\\subsection{B}"));
        assert!(tex.contains("\\subsubsection{C}"));
        assert!(tex.contains("\\paragraph{D}"));
        assert!(tex.contains("\\paragraph{F}"));
    }

    #[test]
    fn code_is_verbatim_and_unescaped() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::code("printf(\"%d\\n\", x_1);"));
        let tex = render_latex(&doc);
        assert!(tex.contains("\\begin{verbatim}\nprintf(\"%d\\n\", x_1);\n\\end{verbatim}"));
    }

    #[test]
    fn placeholder_is_boxed() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::placeholder("[omitted]"));
        let tex = render_latex(&doc);
        assert!(tex.contains("\\fbox{\\parbox{0.8\\textwidth}{\\centering\\textbf{[omitted]}}}"));
    }

    #[test]
    fn pictures_are_left_out() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::new("before"));
        doc.add_picture(Picture {
            path: PathBuf::from("/tmp/diagram.png"),
            width_px: 10,
            height_px: 10,
        });
        let tex = render_latex(&doc);
        assert!(tex.contains("before"));
        assert!(!tex.contains("\\includegraphics"));
        assert!(!tex.contains("diagram.png"));
    }

    #[test]
    fn longtable_rows() {
        let mut grid = TableGrid::new(2, 2);
        grid.set(0, 0, "Name");
        grid.set(0, 1, "Cost $");
        grid.set(1, 0, "a");
        grid.set(1, 1, "1");
        let mut doc = Document::new();
        doc.add_table(grid);
        let tex = render_latex(&doc);
        assert!(tex.contains("\\begin{longtable}{|c|c|}\n\\hline\nName & Cost \\$ \\\\\n\\hline\na & 1 \\\\\n\\hline\n\\end{longtable}"));
    }
}
