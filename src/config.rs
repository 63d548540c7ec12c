use std::path::{Component, Path, PathBuf};

use clap::{ArgAction, Parser, builder::FalseyValueParser};

use crate::error::{Error, Result};
use crate::fields::FieldHashMap;
use crate::github::DEFAULT_API_URL;

/// Branch the pull request targets when `base` is not given.
pub const DEFAULT_BASE: &str = "main";

/// Raw invocation parameters.
///
/// Every option can come from a flag or from the environment variable a
/// GitHub Action exposes for its input (`INPUT_<NAME>`). Actions may export
/// unused inputs as empty strings, so [`Config::from_inputs`] treats blank
/// optional values as absent and checks the variant combination itself.
#[derive(Debug, Parser)]
#[command(
    name = "formula-bump",
    version,
    about = "Update a package formula's version and hashes, then open a pull request."
)]
pub struct Inputs {
    /// Formula file path, relative to the repository root
    #[arg(long, env = "INPUT_FILE")]
    pub file: String,

    /// Owner of the formula repository; also the push username
    #[arg(long, env = "INPUT_OWNER")]
    pub owner: String,

    /// Name of the formula repository
    #[arg(long, env = "INPUT_REPO")]
    pub repo: String,

    /// Version written into the formula
    #[arg(long = "release", value_name = "VERSION", env = "INPUT_VERSION")]
    pub release: String,

    /// Hash for the single-field variant
    #[arg(long, env = "INPUT_SHA256")]
    pub sha256: Option<String>,

    /// Field name for the single-field variant
    #[arg(long, env = "INPUT_FIELD")]
    pub field: Option<String>,

    /// JSON object of "<field>-<hash>" strings for the multi-field variant
    #[arg(long, env = "INPUT_FIELDS")]
    pub fields: Option<String>,

    /// Access token for the API and for pushing
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Branch the pull request targets [default: main]
    #[arg(long, value_name = "BRANCH", env = "INPUT_BASE")]
    pub base: Option<String>,

    /// REST API root, for GitHub Enterprise
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Rewrite the formula in a scratch clone without committing, pushing or
    /// opening a pull request
    #[arg(
        long,
        env = "INPUT_DRY_RUN",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    pub dry_run: bool,

    /// Log each step in detail
    #[arg(short, long)]
    pub verbose: bool,
}

/// Validated run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub file: PathBuf,
    pub owner: String,
    pub repo: String,
    pub version: String,
    pub fields: FieldHashMap,
    pub token: String,
    pub base: String,
    pub api_url: String,
    pub dry_run: bool,
}

impl Config {
    /// Validates `inputs` and decodes the field mapping.
    ///
    /// Runs before any network or file activity, so bad input (including
    /// malformed `fields` JSON) aborts the run with nothing touched.
    pub fn from_inputs(inputs: Inputs) -> Result<Self> {
        let owner = required("owner", inputs.owner)?;
        let repo = required("repo", inputs.repo)?;
        let version = required("version", inputs.release)?;
        let token = required("token", inputs.token)?;
        let base = present(inputs.base).unwrap_or_else(|| DEFAULT_BASE.to_string());
        let file = formula_path(&inputs.file)?;

        let fields = match (
            present(inputs.fields),
            present(inputs.field),
            present(inputs.sha256),
        ) {
            (Some(json), None, None) => FieldHashMap::from_json(&json)?,
            (None, Some(field), Some(hash)) => FieldHashMap::single(&field, &hash)?,
            (Some(_), _, _) => {
                return Err(Error::Config(String::from(
                    "`fields` cannot be combined with `field` or `sha256`",
                )));
            }
            (None, Some(_), None) => {
                return Err(Error::Config(String::from("`field` requires `sha256`")));
            }
            (None, None, Some(_)) => {
                return Err(Error::Config(String::from("`sha256` requires `field`")));
            }
            (None, None, None) => {
                return Err(Error::Config(String::from(
                    "supply either `fields` or both `field` and `sha256`",
                )));
            }
        };

        Ok(Self {
            file,
            owner,
            repo,
            version,
            fields,
            token,
            base,
            api_url: inputs.api_url,
            dry_run: inputs.dry_run,
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(name: &str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::Config(format!("`{}` must not be empty", name)))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Accepts a path that stays inside the repository.
///
/// A leading `/` is tolerated and stripped (`/slidesk.rb` names the file at
/// the repository root); `..` components are rejected.
fn formula_path(raw: &str) -> Result<PathBuf> {
    let trimmed = raw.trim().trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Config(String::from("`file` must not be empty")));
    }

    let path = Path::new(trimmed);
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => {
                return Err(Error::Config(format!(
                    "`file` must stay inside the repository, got `{}`",
                    raw
                )));
            }
        }
    }
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::{Config, Inputs};
    use crate::error::Error;
    use clap::Parser;
    use std::path::Path;

    fn parse(extra: &[&str]) -> Inputs {
        let mut args = vec![
            "formula-bump",
            "--file",
            "Formula/tool.rb",
            "--owner",
            "yodamad",
            "--repo",
            "homebrew-tools",
            "--release",
            "1.3.0",
            "--token",
            "t0k",
        ];
        args.extend_from_slice(extra);
        Inputs::try_parse_from(args).expect("inputs should parse")
    }

    #[test]
    fn single_field_variant() {
        let cfg = Config::from_inputs(parse(&["--field", "sha256", "--sha256", "cafef00d"]))
            .expect("valid config");
        assert_eq!(cfg.fields.lookup("sha256 \"x\""), Some("cafef00d"));
        assert_eq!(cfg.base, "main");
        assert_eq!(cfg.file, Path::new("Formula/tool.rb"));
        assert!(!cfg.dry_run);
    }

    #[test]
    fn multi_field_variant() {
        let cfg = Config::from_inputs(parse(&[
            "--fields",
            r#"{"a":"x86_64-aaa","b":"arm64-bbb"}"#,
            "--base",
            "develop",
            "--dry-run",
        ]))
        .expect("valid config");
        assert_eq!(cfg.fields.len(), 2);
        assert_eq!(cfg.base, "develop");
        assert!(cfg.dry_run);
    }

    #[test]
    fn blank_base_falls_back_to_main() {
        let cfg = Config::from_inputs(parse(&[
            "--field", "sha256", "--sha256", "abc", "--base", " ",
        ]))
        .expect("valid config");
        assert_eq!(cfg.base, super::DEFAULT_BASE);
    }

    #[test]
    fn missing_variant_is_rejected() {
        let err = Config::from_inputs(parse(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn field_without_hash_is_rejected() {
        let err = Config::from_inputs(parse(&["--field", "sha256"])).unwrap_err();
        assert!(err.to_string().contains("`field` requires `sha256`"));
    }

    #[test]
    fn fields_conflicts_with_single_variant() {
        let err = Config::from_inputs(parse(&["--fields", "{}", "--sha256", "abc"])).unwrap_err();
        assert!(err.to_string().contains("cannot be combined"));
    }

    #[test]
    fn blank_single_variant_values_are_ignored() {
        let cfg = Config::from_inputs(parse(&[
            "--fields",
            r#"{"a":"sha256-abc"}"#,
            "--field",
            "",
            "--sha256",
            " ",
        ]))
        .expect("valid config");
        assert_eq!(cfg.fields.lookup("sha256"), Some("abc"));
    }

    #[test]
    fn malformed_fields_is_a_fields_error() {
        let err = Config::from_inputs(parse(&["--fields", "{not json"])).unwrap_err();
        assert!(matches!(err, Error::Fields(_)));
    }

    #[test]
    fn blank_version_is_rejected() {
        let mut inputs = parse(&["--field", "sha256", "--sha256", "abc"]);
        inputs.release = String::from("  ");
        let err = Config::from_inputs(inputs).unwrap_err();
        assert!(err.to_string().contains("`version` must not be empty"));
    }

    #[test]
    fn leading_slash_is_stripped_from_file() {
        let mut inputs = parse(&["--field", "sha256", "--sha256", "abc"]);
        inputs.file = String::from("/slidesk.rb");
        let cfg = Config::from_inputs(inputs).expect("valid config");
        assert_eq!(cfg.file, Path::new("slidesk.rb"));
    }

    #[test]
    fn parent_components_are_rejected() {
        let mut inputs = parse(&["--field", "sha256", "--sha256", "abc"]);
        inputs.file = String::from("Formula/../../etc/passwd");
        let err = Config::from_inputs(inputs).unwrap_err();
        assert!(err.to_string().contains("must stay inside the repository"));
    }
}
