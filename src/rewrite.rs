use std::{
    fs::{File, read_to_string},
    io::Write,
    path::Path,
    sync::LazyLock,
};

use regex::{NoExpand, Regex};

use crate::error::{Error, Result};
use crate::fields::FieldHashMap;

/// Numeric token with optional dotted components: `1`, `1.2`, `1.2.3`.
static VERSION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)*").expect("version pattern is valid"));

/// Double-quoted alphanumeric token, including `""`.
static QUOTED_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""[a-zA-Z0-9]*""#).expect("quoted token pattern is valid"));

/// Line marker that enables the version substitution.
const VERSION_MARKER: &str = "version";

/// Rewrites formula lines for one target version and one set of hashes.
#[derive(Debug, Clone)]
pub struct Rewriter {
    version: String,
    fields: FieldHashMap,
}

impl Rewriter {
    pub fn new(version: impl Into<String>, fields: FieldHashMap) -> Self {
        Self {
            version: version.into(),
            fields,
        }
    }

    /// Reads the file at `path`, rewrites every line and writes the result
    /// back over the original contents.
    ///
    /// # Returns
    ///
    /// * `Ok(n)` with the number of lines whose text changed.
    /// * `Err(Error::FormulaFile)` if reading or writing fails.
    pub fn rewrite_file(&self, path: &Path) -> Result<usize> {
        let body = read_to_string(path).map_err(|source| Error::FormulaFile {
            action: "read",
            path: path.to_path_buf(),
            source,
        })?;

        let (transformed, changed) = self.rewrite_text(&body);

        let mut file = File::create(path).map_err(|source| Error::FormulaFile {
            action: "update",
            path: path.to_path_buf(),
            source,
        })?;
        file.write_all(transformed.as_bytes())
            .map_err(|source| Error::FormulaFile {
                action: "update",
                path: path.to_path_buf(),
                source,
            })?;

        Ok(changed)
    }

    /// Rewrites `body` line by line.
    ///
    /// Lines are split and rejoined on `\n` only, so carriage returns and a
    /// trailing newline pass through untouched and the line count is kept.
    /// Returns the new text and the number of changed lines.
    pub fn rewrite_text(&self, body: &str) -> (String, usize) {
        let mut changed = 0;
        let lines: Vec<String> = body
            .split('\n')
            .map(|line| {
                let out = self.rewrite_line(line);
                if out != line {
                    changed += 1;
                }
                out
            })
            .collect();

        (lines.join("\n"), changed)
    }

    /// Applies both substitutions to a single line.
    ///
    /// - A line containing `version` has every numeric-dot token replaced
    ///   with the target version.
    /// - A line containing a mapped key has every quoted alphanumeric token
    ///   replaced with the quoted hash of the first matching key.
    ///
    /// The matching key is looked up on the original line, so digits in a key
    /// such as `sha256` survive a version substitution on the same line. The
    /// hash replacement then runs on the version-rewritten text, so a line can
    /// receive both. Any other line is returned as-is.
    pub fn rewrite_line(&self, line: &str) -> String {
        let hash = self.fields.lookup(line);

        let mut out = if line.contains(VERSION_MARKER) {
            VERSION_TOKEN
                .replace_all(line, NoExpand(&self.version))
                .into_owned()
        } else {
            line.to_string()
        };

        if let Some(hash) = hash {
            let quoted = format!("\"{}\"", hash);
            out = QUOTED_TOKEN
                .replace_all(&out, NoExpand(&quoted))
                .into_owned();
        }

        out
    }
}
