//! HTML pages. Templates are compiled into the binary; every `.html`
//! template is auto-escaped, so note content is always rendered as text.

use std::time::Duration;

use minijinja::{context, Environment};

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("success.html", include_str!("../templates/success.html")),
    ("note.html", include_str!("../templates/note.html")),
    ("notfound.html", include_str!("../templates/notfound.html")),
];

pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn new() -> Result<Pages, minijinja::Error> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Pages { env })
    }

    pub fn index(&self, max_lifetime: Duration) -> Result<String, minijinja::Error> {
        self.env.get_template("index.html")?.render(context! {
            title => "New note",
            max_lifetime_secs => max_lifetime.as_secs(),
            max_lifetime_label => lifetime_label(max_lifetime),
        })
    }

    pub fn success(
        &self,
        note_url: &str,
        self_destruct: bool,
    ) -> Result<String, minijinja::Error> {
        self.env.get_template("success.html")?.render(context! {
            title => "Note created",
            note_url,
            self_destruct,
        })
    }

    pub fn note(&self, payload: &[u8], consumed: bool) -> Result<String, minijinja::Error> {
        self.env.get_template("note.html")?.render(context! {
            title => "Note",
            content => String::from_utf8_lossy(payload),
            consumed,
        })
    }

    pub fn not_found(&self, note_id: &str) -> Result<String, minijinja::Error> {
        self.env.get_template("notfound.html")?.render(context! {
            title => "Note Not Found",
            message => format!("Note with ID {note_id} does not exist."),
        })
    }
}

fn lifetime_label(lifetime: Duration) -> String {
    let secs = lifetime.as_secs();
    match secs {
        s if s >= 86_400 => format!("{} days", s / 86_400),
        s if s >= 3_600 => format!("{} hours", s / 3_600),
        s => format!("{s} seconds"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_content_is_escaped() {
        let pages = Pages::new().unwrap();
        let html = pages.note(b"<script>alert('x')</script>", true).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("has been destroyed"));
    }

    #[test]
    fn not_found_names_the_id() {
        let pages = Pages::new().unwrap();
        let html = pages.not_found("abc").unwrap();
        assert!(html.contains("Note Not Found"));
        assert!(html.contains("Note with ID abc does not exist."));
    }

    #[test]
    fn success_shows_url() {
        let pages = Pages::new().unwrap();
        let html = pages.success("http://localhost:3000/abc", false).unwrap();
        let unescaped = html.replace("&#x2f;", "/");
        assert!(unescaped.contains("http://localhost:3000/abc"));
        assert!(html.contains("until it expires"));
    }

    #[test]
    fn index_offers_configured_lifetime() {
        let pages = Pages::new().unwrap();
        let html = pages.index(Duration::from_secs(31_536_000)).unwrap();
        assert!(html.contains("31536000"));
        assert!(html.contains("365 days"));
        assert!(html.contains(r#"name="message""#));
    }
}
