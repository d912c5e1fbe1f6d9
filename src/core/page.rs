use crate::domain::ports::StaticPage;
use serde::{Deserialize, Serialize};

pub const PAGE_FILE_NAME: &str = "index.html";

/// Document-level attributes of the published page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageShell {
    pub lang: String,
    pub dir: String,
}

impl Default for PageShell {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            dir: "ltr".to_string(),
        }
    }
}

impl PageShell {
    /// Wraps generated code into a single HTML document. The code runs as an
    /// inline module with React, ReactDOM and Tailwind loaded from CDNs.
    pub fn render(&self, title: &str, code: &str) -> StaticPage {
        let data = format!(
            r#"<!DOCTYPE html>
<html lang="{lang}" dir="{dir}">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <script crossorigin src="https://unpkg.com/react@18/umd/react.production.min.js"></script>
  <script crossorigin src="https://unpkg.com/react-dom@18/umd/react-dom.production.min.js"></script>
  <script src="https://cdn.tailwindcss.com"></script>
</head>
<body>
  <div id="root"></div>
  <script type="module">
{code}
  </script>
</body>
</html>
"#,
            lang = escape_html(&self.lang),
            dir = escape_html(&self.dir),
            title = escape_html(title),
            code = escape_script(code),
        );

        StaticPage {
            file: PAGE_FILE_NAME.to_string(),
            data,
        }
    }
}

fn escape_html(text: &str) -> String {
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

// 避免程式碼中的 "</script" 提前結束 script 區塊
fn escape_script(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut rest = code;
    while let Some(pos) = find_ascii_case_insensitive(rest, "</script") {
        out.push_str(&rest[..pos]);
        out.push_str("<\\/");
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_embeds_code_as_module() {
        let page = PageShell::default().render("My Site", "const App = () => null;");
        assert_eq!(page.file, "index.html");
        assert!(page.data.starts_with("<!DOCTYPE html>"));
        assert!(page.data.contains("<title>My Site</title>"));
        assert!(page.data.contains("<script type=\"module\">\nconst App = () => null;\n"));
        assert!(page.data.contains("react-dom@18"));
    }

    #[test]
    fn test_title_is_escaped() {
        let page = PageShell::default().render("<b>Tom & Jerry</b>", "");
        assert!(page.data.contains("<title>&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;</title>"));
    }

    #[test]
    fn test_closing_script_tags_in_code_are_escaped() {
        let page = PageShell::default().render("x", "const s = '</script><script>alert(1)</SCRIPT>';");
        assert!(!page.data.contains("'</script>"));
        assert!(page.data.contains("'<\\/script><script>alert(1)<\\/SCRIPT>'"));
        // the shell's own closing tag is untouched
        assert!(page.data.contains("\n  </script>\n</body>"));
    }

    #[test]
    fn test_custom_shell_attributes() {
        let shell = PageShell {
            lang: "ar".to_string(),
            dir: "rtl".to_string(),
        };
        let page = shell.render("موقعي", "");
        assert!(page.data.contains("<html lang=\"ar\" dir=\"rtl\">"));
        assert!(page.data.contains("<title>موقعي</title>"));
    }
}
