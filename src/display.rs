use std::fmt::Write as _;

use crate::declare::{Quote, Security};

/// Placeholder for a display field the quote did not carry.
const MISSING_VALUE: &str = "-";

/// A title framed by dashes of the same width.
pub fn header(title: &str) -> String {
    let rule = "-".repeat(title.chars().count());
    format!("{rule}\n{title}\n{rule}\n")
}

/// One `field : value` line per display field, in display order.
pub fn quote(quote: &Quote, fields: &[String], company_name: Option<&str>) -> String {
    let mut out = company_name.map(header).unwrap_or_default();

    for field in fields {
        let value = quote
            .text(field)
            .unwrap_or_else(|| MISSING_VALUE.to_string());
        let suffix = if field == "pChange" && value != MISSING_VALUE {
            "%"
        } else {
            ""
        };
        let _ = writeln!(out, "{:<15} : {}{}", field, value, suffix);
    }

    out
}

pub fn field_list(title: &str, fields: &[String]) -> String {
    let mut out = header(title);
    for field in fields {
        let _ = writeln!(out, "{}", field);
    }
    out
}

/// Help shown after an unknown security code.
pub fn probable_matches(code: &str, matches: &[Security]) -> String {
    let mut out = format!(
        "\"{}\" is invalid stock code\n\
If you are not sure about the stock code, try typing few characters of company name\n\
probable list based on current match:\n",
        code
    );
    for security in matches {
        let _ = writeln!(out, "{}\t\t{}", security.code, security.name);
    }
    out
}
