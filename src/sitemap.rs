//! `sitemap.xml` for the public site.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{repository::RecipeRepository, store::RecipeStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFrequency {
    Weekly,
    Monthly,
    Yearly,
}

impl ChangeFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
            ChangeFrequency::Yearly => "yearly",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub url: String,
    pub last_modified: DateTime<Utc>,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

fn static_entries(base_url: &str, now: DateTime<Utc>) -> Vec<SitemapEntry> {
    vec![
        SitemapEntry {
            url: base_url.to_string(),
            last_modified: now,
            change_frequency: ChangeFrequency::Yearly,
            priority: 1.0,
        },
        SitemapEntry {
            url: format!("{base_url}/recepti"),
            last_modified: now,
            change_frequency: ChangeFrequency::Weekly,
            priority: 0.8,
        },
    ]
}

/// Home page, recipe index, and one entry per recipe. A failing store only
/// costs the per-recipe entries.
pub async fn sitemap_entries<S: RecipeStore>(
    repository: &RecipeRepository<S>,
    base_url: &str,
) -> Vec<SitemapEntry> {
    let base_url = base_url.trim_end_matches('/');
    let mut entries = static_entries(base_url, Utc::now());

    match repository.get_all().await {
        Ok(recipes) => entries.extend(recipes.into_iter().map(|recipe| SitemapEntry {
            url: format!("{base_url}/recept/{}", recipe.slug),
            last_modified: recipe.updated_at,
            change_frequency: ChangeFrequency::Monthly,
            priority: 0.9,
        })),
        Err(e) => log::warn!("Sitemap is missing recipes: {e}"),
    }

    entries
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn render(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );

    for entry in entries {
        xml.push_str(&format!(
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{:.1}</priority>\n  </url>\n",
            escape_xml(&entry.url),
            entry
                .last_modified
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            entry.change_frequency.as_str(),
            entry.priority,
        ));
    }

    xml.push_str("</urlset>\n");
    xml
}
