// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single-file HTML report of demo sections.

use core::fmt::Write as _;

use vistage_core::escape_xml;

/// One demo: a heading, a sentence about it and the SVG it produced.
#[derive(Debug)]
pub(crate) struct HtmlSection {
    pub(crate) title: &'static str,
    pub(crate) description: &'static str,
    pub(crate) svg: String,
    /// Event names the component emitted while building the section.
    pub(crate) events: Vec<&'static str>,
}

pub(crate) fn render_report(title: &str, sections: &[HtmlSection]) -> String {
    let title = escape_xml(title);
    let mut out = String::new();
    let _ = write!(
        out,
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>\n\
         body {{ font-family: system-ui, sans-serif; margin: 2rem; color: #222; }}\n\
         section {{ margin-bottom: 2.5rem; }}\n\
         svg {{ border: 1px solid #ddd; background: #fff; }}\n\
         .events {{ color: #666; font-size: 0.85rem; }}\n\
         </style>\n</head>\n<body>\n<h1>{title}</h1>\n"
    );
    for s in sections {
        let _ = write!(
            out,
            "<section>\n<h2>{}</h2>\n<p>{}</p>\n{}\n",
            escape_xml(s.title),
            escape_xml(s.description),
            s.svg
        );
        if !s.events.is_empty() {
            let _ = writeln!(
                out,
                "<p class=\"events\">events: {}</p>",
                escape_xml(&s.events.join(", "))
            );
        }
        out.push_str("</section>\n");
    }
    out.push_str("</body>\n</html>\n");
    out
}
