use std::str::FromStr;

const EMAIL_HREF: &str = "mailto:larrieu.sebastian@gmail.com";
const GITHUB_HREF: &str = "https://github.com/sebalr";
const LINKEDIN_HREF: &str = "https://www.linkedin.com/in/slarrieu/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Email,
    Github,
    Linkedin,
}

impl ContactKind {
    pub fn href(self) -> &'static str {
        match self {
            ContactKind::Email => EMAIL_HREF,
            ContactKind::Github => GITHUB_HREF,
            ContactKind::Linkedin => LINKEDIN_HREF,
        }
    }
}

impl FromStr for ContactKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(ContactKind::Email),
            "github" => Ok(ContactKind::Github),
            "linkedin" => Ok(ContactKind::Linkedin),
            _ => Err(()),
        }
    }
}

/// Maps a contact kind to its link target, or returns `fallback` for kinds we don't know.
pub fn contact_href<'a>(kind: &str, fallback: &'a str) -> &'a str {
    match kind.parse::<ContactKind>() {
        Ok(kind) => kind.href(),
        Err(()) => fallback,
    }
}
