use crate::{answer::equation_answer, riddle::RiddleSolver};
use std::fmt::Write;

/// Everything shown on the main page.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Page {
    pub equation: String,
    pub equation_answer: Option<String>,
    pub riddle: String,
    pub riddle_answer: Option<String>,
}

impl Page {
    /// Handle a submitted form, solving whichever of the equation and
    /// riddle fields were filled in.
    pub fn from_form(body: &[u8], riddles: &dyn RiddleSolver) -> Page {
        let mut page = Page::default();

        for (key, value) in form_urlencoded::parse(body) {
            match key.as_ref() {
                "equation" => page.equation = value.trim().to_string(),
                "riddle" => page.riddle = value.trim().to_string(),
                _ => {},
            }
        }

        if !page.equation.is_empty() {
            page.equation_answer = Some(equation_answer(&page.equation));
        }
        if !page.riddle.is_empty() {
            page.riddle_answer = Some(riddles.answer(&page.riddle));
        }

        page
    }

    /// Both fields live in one form so submitting either keeps the other.
    pub fn render(&self) -> String {
        let mut html = String::from(HEADER);

        // writing to a String can't fail
        let _ = write!(
            html,
            r#"<form method="post" action="/">
<section>
<h2>Equation</h2>
<input type="text" name="equation" placeholder="2x + 3 = 7" value="{}">
"#,
            escape_html(&self.equation)
        );
        write_answer(&mut html, self.equation_answer.as_deref());

        let _ = write!(
            html,
            r#"</section>
<section>
<h2>Riddle</h2>
<textarea name="riddle" placeholder="What has keys but can't open locks?">{}</textarea>
"#,
            escape_html(&self.riddle)
        );
        write_answer(&mut html, self.riddle_answer.as_deref());

        html.push_str(FOOTER);
        html
    }
}

fn write_answer(html: &mut String, answer: Option<&str>) {
    if let Some(answer) = answer {
        let _ = writeln!(
            html,
            r#"<p class="answer">{}</p>"#,
            escape_html(answer)
        );
    }
}

const HEADER: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Puzzle Solver</title>
</head>
<body>
<h1>Puzzle Solver</h1>
"#;

const FOOTER: &str = r#"</section>
<button type="submit">Solve</button>
</form>
</body>
</html>
"#;

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }

    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Remembers every riddle it was asked.
    #[derive(Debug, Default)]
    struct FakeSolver {
        asked: RefCell<Vec<String>>,
    }

    impl RiddleSolver for FakeSolver {
        fn answer(&self, riddle: &str) -> String {
            self.asked.borrow_mut().push(riddle.to_string());
            String::from("A piano")
        }
    }

    #[test]
    fn both_fields_are_answered() {
        let riddles = FakeSolver::default();

        let got = Page::from_form(
            b"equation=2x%2B3%3D7&riddle=+What+has+keys%3F+",
            &riddles,
        );

        assert_eq!(
            got,
            Page {
                equation: String::from("2x+3=7"),
                equation_answer: Some(String::from("x = 2")),
                riddle: String::from("What has keys?"),
                riddle_answer: Some(String::from("A piano")),
            }
        );
        assert_eq!(*riddles.asked.borrow(), vec!["What has keys?"]);
    }

    #[test]
    fn empty_fields_are_skipped() {
        let riddles = FakeSolver::default();

        let got = Page::from_form(b"equation=x%5E2%3D4&riddle=++", &riddles);

        assert_eq!(
            got.equation_answer.as_deref(),
            Some("Solutions: x = -2, x = 2")
        );
        assert_eq!(got.riddle_answer, None);
        assert!(riddles.asked.borrow().is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let got = Page::from_form(b"name=bob", &FakeSolver::default());

        assert_eq!(got, Page::default());
    }

    #[test]
    fn user_input_is_escaped() {
        let page = Page {
            equation: String::from("<script>alert(1)</script>"),
            equation_answer: Some(String::from("x < \"2\" & 'y'")),
            ..Page::default()
        };

        let got = page.render();

        assert!(got.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(got.contains("x &lt; &quot;2&quot; &amp; &#x27;y&#x27;"));
        assert!(!got.contains("<script>"));
    }

    #[test]
    fn both_fields_are_submitted_together() {
        let page = Page {
            equation: String::from("x = 1"),
            equation_answer: Some(String::from("x = 1")),
            riddle: String::from("What has keys?"),
            riddle_answer: Some(String::from("A piano")),
        };

        let got = page.render();

        assert_eq!(got.matches("<form").count(), 1);
        let start = got.find("<form").unwrap();
        let end = got.find("</form>").unwrap();
        let form = &got[start..end];
        assert!(form.contains(r#"name="equation""#));
        assert!(form.contains(r#"name="riddle""#));
        assert!(form.contains(r#"value="x = 1""#));
        assert!(form.contains(">What has keys?</textarea>"));
        assert!(form.contains(r#"<p class="answer">A piano</p>"#));
    }

    #[test]
    fn answers_are_only_shown_when_present() {
        let got = Page::default().render();

        assert!(!got.contains(r#"class="answer""#));
        assert!(got.contains(r#"name="equation""#));
        assert!(got.contains(r#"name="riddle""#));
    }
}
