use std::path::Path;

use super::args::BlogSubcommands;
use crate::blog::{BlogStore, PostFilter, PostMeta, render};
use crate::error::{AppError, Result};

pub fn run(posts_dir: &Path, command: BlogSubcommands) -> Result<()> {
    let store = BlogStore::new(posts_dir);

    match command {
        BlogSubcommands::List { category, search } => {
            let filter = PostFilter {
                category,
                query: search,
            };
            let featured = store.featured_post()?.map(|p| p.slug);
            let posts = store.filter_posts(&filter)?;
            if posts.is_empty() {
                println!("No posts found");
            }
            for post in &posts {
                println!("{}", list_line(post, featured.as_deref() == Some(post.slug.as_str())));
            }
        }
        BlogSubcommands::Show { slug, json } => {
            let post = store
                .post_by_slug(&slug)?
                .ok_or(AppError::PostNotFound(slug))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&post)?);
            } else {
                print!("{}", render::page(&post));
            }
        }
        BlogSubcommands::Build { out } => {
            let summary = store.export(&out)?;
            println!(
                "✓ Exported {} posts to {}",
                summary.pages.len(),
                out.display()
            );
        }
        BlogSubcommands::Categories => {
            for category in store.unique_categories()? {
                println!("{category}");
            }
        }
    }

    Ok(())
}

fn list_line(post: &PostMeta, featured: bool) -> String {
    let marker = if featured { '*' } else { ' ' };
    let date = if post.date.is_empty() { "-" } else { &post.date };
    format!(
        "{marker} {date:<16} {category:<14} {slug}  {title}",
        category = post.category,
        slug = post.slug,
        title = post.title,
    )
}
