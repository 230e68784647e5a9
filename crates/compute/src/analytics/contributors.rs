use std::collections::HashMap;

use serde::Serialize;

use chorus_core::Post;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorCount {
    pub author: String,
    pub count: usize,
}

/// Most active authors by post count, ties broken by author name.
pub fn top_contributors(posts: &[Post], limit: usize) -> Vec<AuthorCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for post in posts {
        *counts.entry(post.author.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<AuthorCount> = counts
        .into_iter()
        .map(|(author, count)| AuthorCount {
            author: author.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.author.cmp(&b.author)));
    ranked.truncate(limit);
    ranked
}
