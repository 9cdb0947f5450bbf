// This file is part of oxsh, a POSIX command interpreter.
// Copyright (C) 2024 WATANABE Yuki
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Pathname expansion
//!
//! An unquoted field containing `*`, `?`, or `[` is matched against the
//! file system, one pathname component at a time. Quoted occurrences of
//! those characters are literal, a component pattern never matches a
//! leading period unless the pattern starts with a literal period, and a
//! field whose pattern matches nothing is kept as it is.
//!
//! Directories are scanned through the environment's
//! [`System`](oxsh_env::system::System) interface, so the expansion can
//! be exercised against a simulated file system in tests.

use super::AttrChar;
use oxsh_env::Env;
use oxsh_fnmatch::{Config, Pattern};
use std::ffi::CString;

/// Whether the attributed character is an active pattern character.
fn is_active(c: &AttrChar) -> bool {
    !c.is_quoted && !c.is_quoting && matches!(c.value, '*' | '?' | '[')
}

/// Renders the field as a pattern string, backslash-escaping quoted
/// characters so the matcher treats them literally.
fn to_pattern_string(field: &[AttrChar]) -> String {
    let mut pattern = String::new();
    for c in field {
        if c.is_quoting {
            continue;
        }
        let quoted = c.is_quoted || c.origin == super::Origin::HardExpansion;
        if quoted && matches!(c.value, '*' | '?' | '[' | ']' | '\\' | '!' | '^' | '-') {
            pattern.push('\\');
        }
        pattern.push(c.value);
    }
    pattern
}

/// The matcher configuration for one pathname component.
fn component_config() -> Config {
    let mut config = Config::default();
    config.anchor_slashes = true;
    config.literal_period = true;
    config
}

/// Whether the path exists, as far as the system can tell.
fn exists(env: &Env, path: &str) -> bool {
    match CString::new(path) {
        Ok(path) => env.system.stat(&path).is_ok(),
        Err(_) => false,
    }
}

/// Returns the entry names of the directory, or `None` if it cannot be
/// read.
fn entries_of(env: &Env, path: &str) -> Option<Vec<String>> {
    let path = if path.is_empty() { "." } else { path };
    let path = CString::new(path).ok()?;
    env.system.read_dir(&path).ok()
}

/// Performs pathname expansion on one field.
///
/// Returns the sorted matching pathnames, or `None` if the field contains
/// no active pattern character or matches nothing, in which case the
/// caller keeps the field as it is.
pub fn expand(env: &Env, field: &[AttrChar]) -> Option<Vec<String>> {
    if !field.iter().any(is_active) {
        return None;
    }

    let pattern = to_pattern_string(field);
    let absolute = pattern.starts_with('/');
    let mut candidates: Vec<String> = vec![if absolute { "/" } else { "" }.to_string()];

    for component in pattern.split('/').filter(|c| !c.is_empty()) {
        let sub_pattern = match Pattern::parse(component, component_config()) {
            Ok(pattern) => pattern,
            // An unparsable component matches nothing.
            Err(_) => return None,
        };

        if let Some(literal) = sub_pattern.as_literal() {
            // A literal component is appended without scanning the
            // directory; a nonexistent path drops out when a later
            // component scans it or at the final existence check.
            for candidate in &mut candidates {
                if !candidate.is_empty() && !candidate.ends_with('/') {
                    candidate.push('/');
                }
                candidate.push_str(&literal);
            }
            continue;
        }

        let mut next = Vec::new();
        for candidate in candidates {
            let Some(names) = entries_of(env, &candidate) else {
                continue;
            };
            for name in names {
                if sub_pattern.is_match(&name) {
                    let mut path = candidate.clone();
                    if !path.is_empty() && !path.ends_with('/') {
                        path.push('/');
                    }
                    path.push_str(&name);
                    next.push(path);
                }
            }
        }
        candidates = next;
        if candidates.is_empty() {
            return None;
        }
    }

    let mut paths: Vec<String> = candidates
        .into_iter()
        .filter(|path| exists(env, path))
        .collect();
    if paths.is_empty() {
        return None;
    }
    paths.sort();
    Some(paths)
}
