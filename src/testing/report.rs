//! HTML report generation for fixture test results.

use std::{fs, path::Path};

use crate::error::Result;

use super::{RunResult, TestSummary};

/// Generate an HTML report from test results.
pub fn generate_html_report(results: &[RunResult], output_path: &Path) -> Result<()> {
   let summary = TestSummary::from_results(results);
   let html = render_report(results, &summary);
   fs::write(output_path, html)?;
   Ok(())
}

fn render_report(results: &[RunResult], summary: &TestSummary) -> String {
   let mut html = String::new();

   html.push_str(&format!(
      r#"<!DOCTYPE html>
<html lang="en">
<head>
   <meta charset="UTF-8">
   <meta name="viewport" content="width=device-width, initial-scale=1.0">
   <title>flowgit Fixture Test Report</title>
   <style>
      :root {{
         --bg: #0d1117;
         --fg: #c9d1d9;
         --fg-muted: #8b949e;
         --border: #30363d;
         --bg-card: #161b22;
         --green: #3fb950;
         --red: #f85149;
         --yellow: #d29922;
      }}
      * {{ box-sizing: border-box; margin: 0; padding: 0; }}
      body {{
         font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, sans-serif;
         background: var(--bg);
         color: var(--fg);
         line-height: 1.6;
         padding: 2rem;
      }}
      .container {{ max-width: 1200px; margin: 0 auto; }}
      h1 {{ margin-bottom: 1rem; font-weight: 600; }}
      .summary {{ display: flex; gap: 1rem; margin-bottom: 2rem; flex-wrap: wrap; }}
      .stat {{ background: var(--bg-card); border: 1px solid var(--border); border-radius: 6px; padding: 1rem 1.5rem; min-width: 120px; }}
      .stat-value {{ font-size: 2rem; font-weight: 600; }}
      .stat-label {{ color: var(--fg-muted); font-size: 0.875rem; }}
      .stat.passed .stat-value {{ color: var(--green); }}
      .stat.failed .stat-value {{ color: var(--red); }}
      .stat.no-golden .stat-value {{ color: var(--yellow); }}
      .stat.errors .stat-value {{ color: var(--red); }}
      .fixture {{ background: var(--bg-card); border: 1px solid var(--border); border-radius: 6px; margin-bottom: 1rem; padding: 1rem 1.5rem; }}
      .fixture-name {{ font-weight: 600; }}
      .fixture-status {{ padding: 0.2rem 0.6rem; border-radius: 20px; font-size: 0.8rem; margin-left: 0.5rem; }}
      .fixture-status.passed {{ background: rgba(63, 185, 80, 0.15); color: var(--green); }}
      .fixture-status.failed {{ background: rgba(248, 81, 73, 0.15); color: var(--red); }}
      .fixture-status.no-golden {{ background: rgba(210, 153, 34, 0.15); color: var(--yellow); }}
      .fixture-status.error {{ background: rgba(248, 81, 73, 0.15); color: var(--red); }}
      .detail {{ color: var(--fg-muted); font-size: 0.875rem; margin-top: 0.5rem; }}
      .error-message {{ background: rgba(248, 81, 73, 0.1); border: 1px solid var(--red); color: var(--red); padding: 0.75rem; border-radius: 6px; font-family: monospace; font-size: 0.8rem; margin-top: 0.5rem; }}
   </style>
</head>
<body>
   <div class="container">
      <h1>flowgit Fixture Test Report</h1>
      <div class="summary">
         <div class="stat"><div class="stat-value">{}</div><div class="stat-label">Total</div></div>
         <div class="stat passed"><div class="stat-value">{}</div><div class="stat-label">Passed</div></div>
         <div class="stat failed"><div class="stat-value">{}</div><div class="stat-label">Failed</div></div>
         <div class="stat no-golden"><div class="stat-value">{}</div><div class="stat-label">No Golden</div></div>
         <div class="stat errors"><div class="stat-value">{}</div><div class="stat-label">Errors</div></div>
      </div>
"#,
      summary.total, summary.passed, summary.failed, summary.no_golden, summary.errors
   ));

   for result in results {
      html.push_str(&render_fixture_result(result));
   }

   html.push_str("\n   </div>\n</body>\n</html>\n");
   html
}

fn render_fixture_result(result: &RunResult) -> String {
   let (status_class, status_text) = if result.error.is_some() {
      ("error", "Error")
   } else if let Some(ref cmp) = result.comparison {
      if cmp.passed { ("passed", "Passed") } else { ("failed", "Failed") }
   } else {
      ("no-golden", "No Golden")
   };

   let mut html = format!(
      r#"      <div class="fixture">
         <span class="fixture-name">{}</span><span class="fixture-status {}">{}</span>
"#,
      result.name, status_class, status_text
   );

   if let Some(ref err) = result.error {
      html.push_str(&format!(r#"         <div class="error-message">{}</div>"#, html_escape(err)));
   } else {
      html.push_str(&format!(
         r#"         <div class="detail">{} garbage path(s), {} group(s)</div>"#,
         result.garbage_paths.len(),
         result.groups.len()
      ));
      if let Some(ref cmp) = result.comparison {
         html.push_str(&format!(r#"<div class="detail">{}</div>"#, html_escape(&cmp.summary)));
      }
   }

   html.push_str("\n      </div>\n");
   html
}

fn html_escape(s: &str) -> String {
   s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;").replace('\'', "&#39;")
}
