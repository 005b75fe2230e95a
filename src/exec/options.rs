// src/exec/options.rs

//! Job options → the single option string filters receive in argv[5].

use crate::types::JobOptions;

/// Characters that get a backslash in front of them inside a value.
const ESCAPED: [char; 4] = ['\\', ' ', '\t', '\n'];

/// Encode options as space-separated `name=value` tokens in input order.
///
/// `copies` is skipped; it travels in argv[4]. No options yields `""`.
pub fn encode_options(options: &JobOptions) -> String {
    let mut out = String::new();

    for (name, value) in options.iter() {
        if name.eq_ignore_ascii_case(JobOptions::COPIES) {
            continue;
        }

        if !out.is_empty() {
            out.push(' ');
        }

        out.push_str(name);
        out.push('=');
        for c in value.chars() {
            if ESCAPED.contains(&c) {
                out.push('\\');
            }
            out.push(c);
        }
    }

    out
}
