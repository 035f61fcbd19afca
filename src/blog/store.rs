use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use toml::Value;

use super::{BlogError, front_matter, render};

pub const DEFAULT_POSTS_DIR: &str = "content/posts";
const POST_EXTENSION: &str = "md";

/// Metadata of a post. The slug always comes from the file name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostMeta {
    #[serde(skip_deserializing)]
    pub slug: String,
    pub title: String,
    pub date: String,
    pub excerpt: String,
    pub category: String,
    #[serde(alias = "read_time")]
    pub read_time: String,
    pub image: String,
    #[serde(alias = "is_featured")]
    pub is_featured: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PostMeta {
    #[must_use]
    pub fn published_on(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    #[serde(flatten)]
    pub meta: PostMeta,
    pub content_html: String,
}

/// Listing filter; `None` or the category `All` match everything.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub category: Option<String>,
    pub query: Option<String>,
}

impl PostFilter {
    #[must_use]
    pub fn matches(&self, post: &PostMeta) -> bool {
        let category_ok = match self.category.as_deref() {
            None | Some("All") => true,
            Some(category) => post.category == category,
        };
        let query_ok = match self.query.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => {
                let query = query.to_lowercase();
                post.title.to_lowercase().contains(&query)
                    || post.excerpt.to_lowercase().contains(&query)
            }
        };
        category_ok && query_ok
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub pages: Vec<PathBuf>,
    pub index: PathBuf,
}

/// Markdown posts stored as `<slug>.md` files in one directory.
#[derive(Debug, Clone)]
pub struct BlogStore {
    dir: PathBuf,
}

impl BlogStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn post_slugs(&self) -> Result<Vec<String>, BlogError> {
        let mut slugs = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(POST_EXTENSION)
            {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if is_valid_slug(stem) => slugs.push(stem.to_string()),
                _ => tracing::warn!(path = %path.display(), "Skipping post with unusable slug"),
            }
        }
        slugs.sort();
        Ok(slugs)
    }

    pub fn post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, BlogError> {
        let Some(path) = self.path_for(slug) else {
            tracing::warn!(slug, "Blog post not found");
            return Ok(None);
        };

        let source = fs::read_to_string(&path)?;
        let (meta, body) = read_meta(slug, &source)?;
        let content_html = render::markdown_to_html(body)?;

        Ok(Some(BlogPost { meta, content_html }))
    }

    /// All posts, newest first. Posts with an unreadable date come last.
    pub fn all_posts(&self) -> Result<Vec<PostMeta>, BlogError> {
        let mut posts = Vec::new();
        for slug in self.post_slugs()? {
            let source = fs::read_to_string(self.dir.join(format!("{slug}.{POST_EXTENSION}")))?;
            let (meta, _) = read_meta(&slug, &source)?;
            posts.push(meta);
        }
        posts.sort_by_key(|p| Reverse(p.published_on()));
        Ok(posts)
    }

    /// The first post flagged as featured, else the newest one.
    pub fn featured_post(&self) -> Result<Option<PostMeta>, BlogError> {
        let mut posts = self.all_posts()?;
        let idx = posts.iter().position(|p| p.is_featured).unwrap_or(0);
        if posts.is_empty() {
            return Ok(None);
        }
        Ok(Some(posts.swap_remove(idx)))
    }

    pub fn unique_categories(&self) -> Result<Vec<String>, BlogError> {
        let categories: BTreeSet<String> = self
            .all_posts()?
            .into_iter()
            .map(|p| p.category)
            .filter(|c| !c.trim().is_empty())
            .collect();
        Ok(categories.into_iter().collect())
    }

    pub fn filter_posts(&self, filter: &PostFilter) -> Result<Vec<PostMeta>, BlogError> {
        Ok(self
            .all_posts()?
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect())
    }

    /// Renders every post to `<out_dir>/<slug>.html` and writes the listing
    /// to `<out_dir>/index.json`.
    pub fn export(&self, out_dir: &Path) -> Result<ExportSummary, BlogError> {
        fs::create_dir_all(out_dir)?;

        let posts = self.all_posts()?;
        let mut pages = Vec::with_capacity(posts.len());
        for meta in &posts {
            let Some(post) = self.post_by_slug(&meta.slug)? else {
                tracing::warn!(slug = %meta.slug, "Post vanished during export");
                continue;
            };
            let page = out_dir.join(format!("{}.html", meta.slug));
            fs::write(&page, render::page(&post))?;
            tracing::debug!(slug = %meta.slug, path = %page.display(), "Rendered post");
            pages.push(page);
        }

        let index = out_dir.join("index.json");
        fs::write(&index, serde_json::to_string_pretty(&posts)?)?;
        tracing::info!(posts = pages.len(), dir = %out_dir.display(), "Exported blog");

        Ok(ExportSummary { pages, index })
    }

    fn path_for(&self, slug: &str) -> Option<PathBuf> {
        if !is_valid_slug(slug) {
            return None;
        }
        let path = self.dir.join(format!("{slug}.{POST_EXTENSION}"));
        path.is_file().then_some(path)
    }
}

/// Slugs end up in URLs and file names, so only `[alnum-_.]` is accepted and
/// a leading dot is refused.
fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('.')
        && slug
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn read_meta<'a>(slug: &str, source: &'a str) -> Result<(PostMeta, &'a str), BlogError> {
    let (mut table, body) = front_matter::split(source)?;
    table.remove("slug");
    let mut meta: PostMeta = Value::Table(table).try_into()?;
    meta.slug = slug.to_string();
    Ok((meta, body))
}

/// Parses the date formats posts use in practice.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}
