use console::{Color, measure_text_width, style};
use std::iter;

use crate::config::Config;
use crate::publisher::Outcome;

/// Prints a boxed summary of a finished run to stdout.
///
/// The frame is green when a pull request was opened and yellow after a dry
/// run.
///
/// # Examples
///
/// ```no_run
/// use formula_bump::banner::print_summary;
/// # fn demo(config: &formula_bump::config::Config, outcome: &formula_bump::publisher::Outcome) {
/// print_summary(config, outcome);
/// # }
/// ```
pub fn print_summary(config: &Config, outcome: &Outcome) {
    let color = if outcome.pull_request.is_some() {
        Color::Green
    } else {
        Color::Yellow
    };

    println!();
    for row in framed(&summary_lines(config, outcome), color) {
        println!("{row}");
    }
    println!();
}

/// Wraps `lines` in a rounded box, one output row per line plus the two
/// borders.
///
/// Padding is computed from the visible width, so styled content lines up
/// with plain ones.
fn framed(lines: &[String], color: Color) -> Vec<String> {
    let inner = lines.iter().map(|l| measure_text_width(l)).max().unwrap_or(0);
    let edge = |s: String| style(s).fg(color).to_string();
    let rule = "─".repeat(inner + 2);

    let mut rows = Vec::with_capacity(lines.len() + 2);
    rows.push(edge(format!("╭{rule}╮")));
    for line in lines {
        let pad = inner - measure_text_width(line);
        rows.push(format!(
            "{} {}{} {}",
            edge("│".into()),
            line,
            " ".repeat(pad),
            edge("│".into())
        ));
    }
    rows.push(edge(format!("╰{rule}╯")));
    rows
}

/// Builds the summary text: headline, repository details, then either the
/// pull request link or the dry-run notice.
///
/// The headline and the final line may carry ANSI styling.
fn summary_lines(config: &Config, outcome: &Outcome) -> Vec<String> {
    let headline = match &outcome.pull_request {
        Some(pr) => style(format!("✅ Opened pull request #{}", pr.number))
            .green()
            .bold()
            .to_string(),
        None => style("Dry run: formula rewritten, nothing published.")
            .yellow()
            .bold()
            .to_string(),
    };

    let details = [
        format!("Repository: {}/{}", config.owner, config.repo),
        format!("Formula:    {}", config.file.display()),
        format!("Version:    {}", config.version),
        format!("Branch:     {} -> {}", outcome.branch, config.base),
        format!("Changed:    {} line(s)", outcome.changed_lines),
    ];

    let link = match &outcome.pull_request {
        Some(pr) => style(pr.html_url.clone()).cyan().to_string(),
        None => style("(re-run without --dry-run to push and open the pull request)")
            .yellow()
            .to_string(),
    };

    iter::once(headline)
        .chain(iter::once(String::new()))
        .chain(details)
        .chain(iter::once(String::new()))
        .chain(iter::once(link))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{framed, summary_lines};
    use console::{Color, measure_text_width};
    use crate::config::Config;
    use crate::fields::FieldHashMap;
    use crate::github::PullRequest;
    use crate::publisher::Outcome;
    use std::path::PathBuf;

    fn config() -> Config {
        Config {
            file: PathBuf::from("Formula/slidesk.rb"),
            owner: String::from("yodamad"),
            repo: String::from("homebrew-tools"),
            version: String::from("2.0.1"),
            fields: FieldHashMap::single("sha256", "abc").unwrap(),
            token: String::from("t0k"),
            base: String::from("main"),
            api_url: String::from("https://api.github.com"),
            dry_run: false,
        }
    }

    #[test]
    fn summary_with_pull_request() {
        let outcome = Outcome {
            branch: String::from("pr-2.0.1"),
            changed_lines: 2,
            pull_request: Some(PullRequest {
                number: 9,
                html_url: String::from("https://github.com/yodamad/homebrew-tools/pull/9"),
            }),
        };
        let lines = summary_lines(&config(), &outcome);
        let s = lines.join("\n");

        assert!(s.contains("Opened pull request #9"));
        assert!(s.contains("Repository: yodamad/homebrew-tools"));
        assert!(s.contains("Formula:    Formula/slidesk.rb"));
        assert!(s.contains("Branch:     pr-2.0.1 -> main"));
        assert!(s.contains("https://github.com/yodamad/homebrew-tools/pull/9"));
        assert!(!s.contains("t0k"));
    }

    #[test]
    fn summary_for_dry_run() {
        let outcome = Outcome {
            branch: String::from("pr-2.0.1"),
            changed_lines: 0,
            pull_request: None,
        };
        let lines = summary_lines(&config(), &outcome);
        let s = lines.join("\n");

        assert!(s.contains("Dry run: formula rewritten, nothing published."));
        assert!(s.contains("Changed:    0 line(s)"));
        assert_eq!(lines.len(), 9);
    }

    #[test]
    fn frame_rows_share_one_visible_width() {
        let lines = vec![
            String::from("short"),
            String::new(),
            console::style("a longer, styled line").red().to_string(),
        ];
        let rows = framed(&lines, Color::Blue);

        assert_eq!(rows.len(), lines.len() + 2);
        let width = measure_text_width(&rows[0]);
        assert_eq!(width, "a longer, styled line".len() + 4);
        assert!(rows.iter().all(|r| measure_text_width(r) == width));
        assert!(console::strip_ansi_codes(&rows[1]).starts_with("│ short "));
    }
}
