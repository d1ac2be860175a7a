use tasi::MemberTable;

use crate::app::LastRun;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success {
        message: String,
        warnings: Vec<String>,
    },
    Error {
        message: String,
        warnings: Vec<String>,
    },
}

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>TASI Member Data Scraper</title>
<style>
body { font-family: sans-serif; margin: 2rem; }
.success { color: #0a6b2d; }
.error { color: #a4161a; }
.warning { color: #8a5a00; }
table { border-collapse: collapse; margin-top: 1rem; }
th, td { border: 1px solid #ccc; padding: 0.25rem 0.5rem; text-align: left; }
#busy { display: none; }
</style>
</head>
<body>
<h1>TASI Member Data Scraper</h1>
<p>This app scrapes member data from the TASI website and exports it as a CSV file.</p>
<form method="post" action="/scrape" onsubmit="startBusy()">
<button id="start" type="submit">Start Scraping</button>
</form>
<p id="busy">Scraping data... This may take a while. <span id="count"></span></p>
"#;

const TAIL: &str = r#"<script>
function startBusy() {
  document.getElementById("start").disabled = true;
  document.getElementById("busy").style.display = "block";
  const poller = setInterval(async () => {
    try {
      const p = await (await fetch("/progress")).json();
      if (p.total > 0) {
        document.getElementById("count").textContent = p.done + " / " + p.total;
      }
      if (!p.running) {
        clearInterval(poller);
      }
    } catch (e) {
      clearInterval(poller);
    }
  }, 1000);
}
</script>
</body>
</html>
"#;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_status(out: &mut String, status: &Status) {
    let (class, message, warnings) = match status {
        Status::Success { message, warnings } => ("success", message, warnings),
        Status::Error { message, warnings } => ("error", message, warnings),
    };

    for warning in warnings {
        out.push_str(&format!(
            "<p class=\"warning\">{}</p>\n",
            escape_html(warning)
        ));
    }
    out.push_str(&format!(
        "<p class=\"{}\">{}</p>\n",
        class,
        escape_html(message)
    ));
}

fn render_table(out: &mut String, table: &MemberTable) {
    out.push_str("<table>\n<thead><tr>");
    for column in table.columns() {
        out.push_str(&format!("<th>{}</th>", escape_html(column)));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for row in table.rows() {
        out.push_str("<tr>");
        for cell in row {
            out.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
}

pub fn render(last_run: &LastRun) -> String {
    let mut out = String::from(HEAD);

    if let Some(status) = &last_run.status {
        render_status(&mut out, status);
    }

    if let Some(table) = &last_run.table {
        out.push_str(r#"<p><a href="/download" download>Download CSV</a></p>"#);
        out.push('\n');
        render_table(&mut out, table);
    }

    out.push_str(TAIL);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasi::MemberRecord;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"A & B's"</b>"#),
            "&lt;b&gt;&quot;A &amp; B&#39;s&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_render_table_preview_escapes_cells() {
        let table = MemberTable::new(vec![
            [("Title", "Acme <Labs>"), ("Tel", "1")].into_iter().collect::<MemberRecord>(),
            [("Title", "Beta"), ("Fax", "2")].into_iter().collect(),
        ]);
        let last_run = LastRun {
            status: Some(Status::Success {
                message: "Scraping completed!".to_string(),
                warnings: vec!["Error fetching details from http://x/?F=3: boom".to_string()],
            }),
            table: Some(table),
        };

        let html = render(&last_run);

        assert!(html.contains(r#"<p class="success">Scraping completed!</p>"#));
        assert!(html.contains("<th>Title</th><th>Tel</th><th>Fax</th>"));
        assert!(html.contains("<td>Acme &lt;Labs&gt;</td><td>1</td><td></td>"));
        assert!(html.contains("<td>Beta</td><td></td><td>2</td>"));
        assert!(html.contains(r#"class="warning""#));
        assert!(html.contains("Download CSV"));
    }

    #[test]
    fn test_render_error_without_table() {
        let last_run = LastRun {
            status: Some(Status::Error {
                message: "No data scraped.".to_string(),
                warnings: Vec::new(),
            }),
            table: None,
        };

        let html = render(&last_run);

        assert!(html.contains(r#"<p class="error">No data scraped.</p>"#));
        assert!(!html.contains("<table>"));
        assert!(!html.contains("Download CSV"));
    }

    #[test]
    fn test_progress_poller_stops_when_idle() {
        let html = render(&LastRun::default());

        assert!(html.contains("const poller = setInterval("));
        assert!(html.contains("if (!p.running) {\n        clearInterval(poller);"));
        assert!(html.contains("} catch (e) {\n      clearInterval(poller);"));
    }
}
