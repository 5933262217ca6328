use std::{collections::HashMap, io::ErrorKind, path::Path};

use gray_matter::{engine::YAML, Matter};
use tokio::fs;
use tracing::{error, info, warn};

use crate::config::SiteConfig;
use crate::error::PostError;
use crate::layout::DefaultLayout;
use crate::markdown::MarkdownRenderer;
use crate::models::{FrontMatter, PageData, PostEntry, PostSummary};
use crate::slug::validate_slug;
use crate::state::AppState;

/// Slug to post source table, built once per content load.
#[derive(Debug, Clone)]
pub struct PostRegistry {
    entries: HashMap<String, PostEntry>,
    renderer: MarkdownRenderer,
}

impl PostRegistry {
    pub async fn scan(posts_dir: &Path, renderer: MarkdownRenderer) -> std::io::Result<Self> {
        let mut entries = HashMap::new();
        let mut dir = fs::read_dir(posts_dir).await?;

        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if !path.extension().map_or(false, |ext| ext == "md") {
                continue;
            }
            let Some(slug) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            if validate_slug(&slug).is_err() {
                warn!(path = %path.display(), "Skipping post whose file name is not a valid slug");
                continue;
            }

            let file_content = match fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %path.display(), "Skipping unreadable post: {}", e);
                    continue;
                }
            };
            match parse_post(&slug, &file_content) {
                Ok((front_matter, _)) => {
                    let summary = PostSummary {
                        slug: slug.clone(),
                        title: front_matter.title,
                        date: front_matter.date,
                    };
                    entries.insert(slug, PostEntry { source: path, summary });
                }
                Err(e) => warn!(path = %path.display(), "Skipping post: {}", e),
            }
        }

        Ok(Self { entries, renderer })
    }

    /// Newest first.
    pub fn posts(&self) -> Vec<PostSummary> {
        let mut posts: Vec<PostSummary> =
            self.entries.values().map(|e| e.summary.clone()).collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
        posts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Re-reads and renders the post on every call.
    pub async fn load(&self, slug: &str) -> Result<PageData, PostError> {
        validate_slug(slug)?;
        let entry = self
            .entries
            .get(slug)
            .ok_or_else(|| PostError::NotFound(slug.to_string()))?;

        let file_content = fs::read_to_string(&entry.source).await.map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                PostError::NotFound(slug.to_string())
            } else {
                PostError::Io { slug: slug.to_string(), source }
            }
        })?;

        let (front_matter, body) = parse_post(slug, &file_content)?;
        Ok(PageData {
            content: self.renderer.render(&body),
            title: front_matter.title,
            date: front_matter.date,
        })
    }
}

fn parse_post(slug: &str, file_content: &str) -> Result<(FrontMatter, String), PostError> {
    let matter = Matter::<YAML>::new();
    let parsed = matter
        .parse::<FrontMatter>(file_content)
        .map_err(|e| PostError::FrontMatter {
            slug: slug.to_string(),
            message: e.to_string(),
        })?;
    let front_matter = parsed
        .data
        .ok_or_else(|| PostError::MissingFrontMatter(slug.to_string()))?;
    Ok((front_matter, parsed.content))
}

/// Everything the site serves, read from the content directory.
pub struct SiteContent {
    pub layout: DefaultLayout,
    pub home_html: String,
    pub not_found_html: String,
    pub registry: PostRegistry,
}

pub async fn load_content(config: &SiteConfig) -> anyhow::Result<SiteContent> {
    let dir = &config.content_dir;
    let renderer = MarkdownRenderer::new(config.math);

    let banner_html = fs::read_to_string(dir.join("banner.html")).await?;
    let layout_html = fs::read_to_string(dir.join("layout.html")).await?;
    let not_found_html = fs::read_to_string(dir.join("not_found.html")).await?;
    let home_md = fs::read_to_string(dir.join("home.md")).await?;

    let layout = DefaultLayout::new(layout_html, banner_html)?;
    let home_html = renderer.render(&home_md);
    let registry = PostRegistry::scan(&config.posts_dir(), renderer).await?;
    info!(posts = registry.len(), "Loaded site content");

    Ok(SiteContent {
        layout,
        home_html,
        not_found_html,
        registry,
    })
}

pub async fn reload_content(app_state: &AppState) {
    info!("Reloading application content...");
    match load_content(&app_state.config).await {
        Ok(content) => {
            *app_state.layout.write().await = content.layout;
            *app_state.home_html.write().await = content.home_html;
            *app_state.not_found_html.write().await = content.not_found_html;
            *app_state.registry.write().await = content.registry;
            info!("Content successfully reloaded.");
        }
        Err(e) => {
            error!("Failed to reload content: {:#}", e);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use super::{load_content, PostRegistry};
    use crate::config::SiteConfig;
    use crate::error::PostError;
    use crate::markdown::MarkdownRenderer;

    pub(crate) fn write(dir: &Path, name: &str, contents: &str) {
        let path = dir.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    /// A complete content directory with one post, `hello-world`.
    pub(crate) fn site_fixture() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "layout.html",
            "<html><head><title>{{ title }}</title></head><body>{{ banner }}\
             <nav><a id=\"github\" href=\"{{ contact:github }}\">GitHub</a></nav>\
             <ul id=\"posts\">{{ posts }}</ul><main>{{ content }}</main></body></html>",
        );
        write(root, "banner.html", "<header>Seba</header>");
        write(root, "home.md", "# Welcome\n");
        write(root, "not_found.html", "<p id=\"missing\">No post called {{slug}}</p>");
        write(root, "static/styles.css", "body {}\n");
        write(
            root,
            "posts/hello-world.md",
            "---\ntitle: Hello World\ndate: \"2020-01-01\"\n---\nFirst *post*.\n",
        );
        dir
    }

    fn config_for(dir: &TempDir) -> SiteConfig {
        SiteConfig {
            content_dir: dir.path().to_path_buf(),
            math: false,
            ..SiteConfig::default()
        }
    }

    async fn registry_for(dir: &TempDir) -> PostRegistry {
        PostRegistry::scan(&dir.path().join("posts"), MarkdownRenderer::new(false))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn loads_existing_post() {
        let dir = site_fixture();
        let page = registry_for(&dir).await.load("hello-world").await.unwrap();

        assert_eq!(page.title, "Hello World");
        assert_eq!(page.date, "2020-01-01");
        assert!(page.content.contains("<em>post</em>"));
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let dir = site_fixture();
        let err = registry_for(&dir).await.load("no-such-post").await.unwrap_err();
        assert!(matches!(err, PostError::NotFound(ref slug) if slug == "no-such-post"));
    }

    #[tokio::test]
    async fn traversal_slug_is_rejected_before_lookup() {
        let dir = site_fixture();
        let err = registry_for(&dir).await.load("../layout").await.unwrap_err();
        assert!(matches!(err, PostError::InvalidSlug(_)));
    }

    #[tokio::test]
    async fn every_load_rereads_the_source() {
        let dir = site_fixture();
        let registry = registry_for(&dir).await;
        registry.load("hello-world").await.unwrap();

        write(
            dir.path(),
            "posts/hello-world.md",
            "---\ntitle: Hello Again\ndate: \"2020-01-02\"\n---\nEdited.\n",
        );
        let page = registry.load("hello-world").await.unwrap();
        assert_eq!(page.title, "Hello Again");
        assert!(page.content.contains("Edited."));
    }

    #[tokio::test]
    async fn deleted_source_is_not_found() {
        let dir = site_fixture();
        let registry = registry_for(&dir).await;
        std::fs::remove_file(dir.path().join("posts/hello-world.md")).unwrap();

        let err = registry.load("hello-world").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn scan_skips_bad_names_and_headers() {
        let dir = site_fixture();
        write(dir.path(), "posts/Bad_Name.md", "---\ntitle: Bad\ndate: \"2021-01-01\"\n---\n");
        write(dir.path(), "posts/no-header.md", "just text\n");
        write(dir.path(), "posts/notes.txt", "ignored");
        write(
            dir.path(),
            "posts/newer-post.md",
            "---\ntitle: Newer\ndate: \"2021-06-01\"\n---\nBody\n",
        );

        let registry = registry_for(&dir).await;
        let slugs: Vec<String> = registry.posts().into_iter().map(|p| p.slug).collect();
        assert_eq!(slugs, vec!["newer-post", "hello-world"]);
    }

    #[tokio::test]
    async fn non_utf8_post_is_skipped() {
        let dir = site_fixture();
        std::fs::write(dir.path().join("posts/broken.md"), [0xff, 0xfe, 0x00]).unwrap();

        let content = load_content(&config_for(&dir)).await.unwrap();
        let slugs: Vec<String> = content.registry.posts().into_iter().map(|p| p.slug).collect();
        assert_eq!(slugs, vec!["hello-world"]);
    }

    #[tokio::test]
    async fn loads_whole_site() {
        let dir = site_fixture();
        let content = load_content(&config_for(&dir)).await.unwrap();

        assert!(content.home_html.contains("<h1>Welcome</h1>"));
        assert!(content.not_found_html.contains("{{slug}}"));
        assert_eq!(content.registry.len(), 1);
    }

    #[tokio::test]
    async fn missing_layout_fails_the_load() {
        let dir = site_fixture();
        std::fs::remove_file(dir.path().join("layout.html")).unwrap();
        assert!(load_content(&config_for(&dir)).await.is_err());
    }
}
